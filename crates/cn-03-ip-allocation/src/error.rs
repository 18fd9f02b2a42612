//! Error types for address allocation.

use std::net::Ipv4Addr;
use std::path::PathBuf;

use shared_types::Ipv4Subnet;
use thiserror::Error;

use crate::adapters::lock::LockError;
use crate::ports::outbound::InspectorError;

/// Result type alias for allocation operations.
pub type Result<T> = std::result::Result<T, IpAllocationError>;

/// Address allocation errors.
#[derive(Debug, Error)]
pub enum IpAllocationError {
    /// No free host address left in the scanned ranges.
    #[error("No free address for {node} in network {network} ({subnet})")]
    ResourceExhausted {
        network: String,
        node: String,
        subnet: Ipv4Subnet,
    },

    /// The address is already mapped to another node.
    #[error("Address {ip} in network {network} is already assigned to {owner}")]
    Conflict {
        network: String,
        ip: Ipv4Addr,
        owner: String,
    },

    /// Asking the container runtime about the network failed.
    #[error("Network inspection failed for {network}: {source}")]
    Inspector {
        network: String,
        #[source]
        source: InspectorError,
    },

    /// The store lock could not be taken.
    #[error(transparent)]
    Lock(#[from] LockError),

    /// Reading or writing the store failed.
    #[error("Mapping store I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The store exists but cannot be parsed.
    #[error("Corrupt mapping store {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The blocking store update did not complete.
    #[error("Mapping store update for {network} was interrupted: {reason}")]
    Interrupted { network: String, reason: String },

    /// The store belongs to a different network.
    #[error("Mapping store {path} belongs to network {found}, expected {expected}")]
    NetworkMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },
}
