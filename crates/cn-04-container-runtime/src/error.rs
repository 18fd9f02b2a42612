//! Error types for container runtime operations.

use std::net::Ipv4Addr;

use thiserror::Error;

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Container runtime failures. Messages from the runtime are kept verbatim.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The runtime executable could not be launched.
    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The runtime ran but reported failure.
    #[error("`{command}` failed (exit {status}): {stderr}")]
    CommandFailed {
        command: String,
        status: i32,
        stderr: String,
    },

    /// Runtime output could not be interpreted.
    #[error("Unexpected output from {context}: {reason}")]
    Parse { context: String, reason: String },

    /// Referenced object does not exist.
    #[error("{kind} {name} not found")]
    NotFound { kind: &'static str, name: String },

    /// An object with this name already exists.
    #[error("{kind} {name} already exists")]
    AlreadyExists { kind: &'static str, name: String },

    /// Static address already held by another container.
    #[error("Address {ip} is already in use on network {network}")]
    AddressInUse { network: String, ip: Ipv4Addr },
}
