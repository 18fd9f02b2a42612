//! Error types for node JSON-RPC calls.

use thiserror::Error;

/// Result type alias for RPC operations.
pub type Result<T> = std::result::Result<T, RpcError>;

/// Errors that can occur when talking to a node.
#[derive(Debug, Error)]
pub enum RpcError {
    /// Nothing is listening yet (typical while a node boots).
    #[error("Cannot connect to {endpoint}")]
    Connection { endpoint: String },

    /// HTTP-level failure other than connecting.
    #[error("HTTP request to {endpoint} failed: {reason}")]
    Http { endpoint: String, reason: String },

    /// The node answered with a JSON-RPC error object.
    #[error("RPC error {code} from {method}: {message}")]
    Rpc {
        method: String,
        code: i64,
        message: String,
    },

    /// The response could not be interpreted.
    #[error("Failed to parse {method} response: {reason}")]
    Parse { method: String, reason: String },
}

impl RpcError {
    pub(crate) fn parse(method: &str, reason: impl Into<String>) -> Self {
        Self::Parse {
            method: method.to_string(),
            reason: reason.into(),
        }
    }
}
