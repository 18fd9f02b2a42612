//! Crypto error types.

use std::path::PathBuf;

use thiserror::Error;

/// Key material errors.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Invalid public key
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Invalid private key
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// Input is not valid hex
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    /// An on-disk artifact disagrees with the key it belongs to
    #[error("Artifact {path} holds {found}, expected {expected}")]
    ArtifactMismatch {
        /// Offending file
        path: PathBuf,
        /// Value derived from the private key
        expected: String,
        /// Value found on disk
        found: String,
    },

    /// Reading or writing an artifact failed
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl CryptoError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
