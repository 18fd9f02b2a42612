//! Error types for configuration rendering.

use std::path::PathBuf;

use shared_types::{ConfigurationError, NodeRole};
use thiserror::Error;

/// Result type alias for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Configuration rendering errors.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The node definition cannot be rendered as requested.
    #[error("Invalid node definition: {0}")]
    Configuration(#[from] ConfigurationError),

    /// `render_bootnode` called for a non-bootnode, or vice versa.
    #[error("Node {node} has role {role} which cannot be rendered as {expected}")]
    WrongRole {
        node: String,
        role: NodeRole,
        expected: &'static str,
    },

    /// TOML serialisation failed.
    #[error("Failed to serialise config for {node}: {source}")]
    Serialize {
        node: String,
        #[source]
        source: toml::ser::Error,
    },

    /// Writing the artifact failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
