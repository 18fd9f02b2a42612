//! # Orchestrator Errors
//!
//! Every variant names the network and, where one is involved, the node.
//! Soft consensus failures never appear here; they are reported through
//! [`cn_06_consensus_membership::MembershipOutcome`].

use std::net::Ipv4Addr;
use std::path::PathBuf;

use cn_01_genesis::GenesisError;
use cn_02_node_config::RenderError;
use cn_03_ip_allocation::IpAllocationError;
use cn_04_container_runtime::RuntimeError;
use cn_05_node_rpc::RpcError;
use shared_crypto::CryptoError;
use shared_types::{ConfigurationError, InvalidTransition, Ipv4Subnet};
use thiserror::Error;

/// Result type alias for orchestration operations.
pub type Result<T> = std::result::Result<T, OrchestratorError>;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The network definition violates an invariant.
    #[error("Invalid configuration for network {network}: {source}")]
    Configuration {
        network: String,
        #[source]
        source: ConfigurationError,
    },

    /// No free address left for a node.
    #[error("No free address for node {node} in network {network} ({subnet})")]
    ResourceExhausted {
        network: String,
        node: String,
        subnet: Ipv4Subnet,
    },

    /// The node never answered `eth_blockNumber`.
    #[error("Node {node} in network {network} not ready after {attempts} attempts{}", last_error_suffix(.last_error))]
    NodeNotReady {
        network: String,
        node: String,
        attempts: u32,
        last_error: Option<String>,
    },

    /// The container runtime rejected a call; the cause is kept verbatim.
    #[error("Container runtime failure for {} in network {network}: {source}", .node.as_deref().unwrap_or("<network>"))]
    ContainerRuntime {
        network: String,
        node: Option<String>,
        #[source]
        source: RuntimeError,
    },

    /// Address allocation failed for a reason other than exhaustion.
    #[error("Address allocation failed for node {node} in network {network}: {source}")]
    IpAllocation {
        network: String,
        node: String,
        #[source]
        source: IpAllocationError,
    },

    /// A declared address is held by another node.
    #[error("Address {ip} for node {node} in network {network} is held by {owner}")]
    AddressConflict {
        network: String,
        node: String,
        ip: Ipv4Addr,
        owner: String,
    },

    #[error("Genesis generation failed for network {network}: {source}")]
    Genesis {
        network: String,
        #[source]
        source: GenesisError,
    },

    #[error("Key material error for node {node} in network {network}: {source}")]
    KeyMaterial {
        network: String,
        node: String,
        #[source]
        source: CryptoError,
    },

    #[error("Config rendering failed for node {node} in network {network}: {source}")]
    Render {
        network: String,
        node: String,
        #[source]
        source: RenderError,
    },

    /// An RPC call outside the readiness loop failed.
    #[error("RPC to node {node} in network {network} failed: {source}")]
    Rpc {
        network: String,
        node: String,
        #[source]
        source: RpcError,
    },

    #[error("Illegal lifecycle transition in network {network}: {source}")]
    Lifecycle {
        network: String,
        #[source]
        source: InvalidTransition,
    },

    #[error("I/O error at {path} for network {network}: {source}")]
    Io {
        network: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A definition file could not be read or parsed.
    #[error("Invalid definition file {path}: {reason}")]
    Definition { path: PathBuf, reason: String },

    #[error("Unknown network: {network}")]
    UnknownNetwork { network: String },

    #[error("Network {network} is already registered")]
    NetworkExists { network: String },
}

fn last_error_suffix(last_error: &Option<String>) -> String {
    match last_error {
        Some(e) => format!(" (last error: {})", e),
        None => String::new(),
    }
}

impl OrchestratorError {
    pub fn configuration(network: &str, source: ConfigurationError) -> Self {
        Self::Configuration {
            network: network.to_string(),
            source,
        }
    }

    pub fn runtime(network: &str, node: Option<&str>, source: RuntimeError) -> Self {
        Self::ContainerRuntime {
            network: network.to_string(),
            node: node.map(str::to_string),
            source,
        }
    }

    pub fn io(network: &str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            network: network.to_string(),
            path: path.into(),
            source,
        }
    }

    /// Map an allocation failure, lifting exhaustion and conflicts into
    /// their own variants.
    pub fn allocation(network: &str, node: &str, source: IpAllocationError) -> Self {
        match source {
            IpAllocationError::ResourceExhausted { subnet, .. } => Self::ResourceExhausted {
                network: network.to_string(),
                node: node.to_string(),
                subnet,
            },
            IpAllocationError::Conflict { ip, owner, .. } => Self::AddressConflict {
                network: network.to_string(),
                node: node.to_string(),
                ip,
                owner,
            },
            source => Self::IpAllocation {
                network: network.to_string(),
                node: node.to_string(),
                source,
            },
        }
    }

    /// Short machine-friendly kind, used as a metric label.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration",
            Self::ResourceExhausted { .. } => "resource_exhausted",
            Self::NodeNotReady { .. } => "node_not_ready",
            Self::ContainerRuntime { .. } => "container_runtime",
            Self::IpAllocation { .. } | Self::AddressConflict { .. } => "ip_allocation",
            Self::Genesis { .. } => "genesis",
            Self::KeyMaterial { .. } => "key_material",
            Self::Render { .. } => "render",
            Self::Rpc { .. } => "rpc",
            Self::Lifecycle { .. } => "lifecycle",
            Self::Io { .. } | Self::Definition { .. } => "io",
            Self::UnknownNetwork { .. } | Self::NetworkExists { .. } => "registry",
        }
    }
}
