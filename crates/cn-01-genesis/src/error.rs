//! Error types for genesis generation.

use std::path::PathBuf;

use shared_types::{Address, ConfigurationError};
use thiserror::Error;

/// Result type alias for genesis operations.
pub type Result<T> = std::result::Result<T, GenesisError>;

/// Genesis document creation errors.
#[derive(Debug, Error)]
pub enum GenesisError {
    /// Invalid genesis configuration.
    #[error("Invalid genesis configuration: {0}")]
    Configuration(#[from] ConfigurationError),

    /// The same signer appears twice in the validator list.
    #[error("Validator {0} is listed more than once")]
    DuplicateValidator(Address),

    /// extraData does not follow the vanity ‖ signers ‖ seal layout.
    #[error("Malformed extraData: {0}")]
    MalformedExtraData(String),

    /// Serialising or parsing the JSON document failed.
    #[error("Genesis JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading or writing the genesis file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
