//! # Driven Ports (Outbound SPI)
//!
//! What the allocator needs to know about a live container network.

use std::net::Ipv4Addr;

use async_trait::async_trait;
use shared_types::Ipv4Subnet;
use thiserror::Error;

/// Failure reported by a [`NetworkInspector`], carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct InspectorError(pub String);

/// Read-only view of a container network.
///
/// Implemented on top of the container runtime by the orchestrator.
#[async_trait]
pub trait NetworkInspector: Send + Sync {
    /// Subnet the network was created with.
    async fn subnet(&self, network: &str) -> Result<Option<Ipv4Subnet>, InspectorError>;

    /// Addresses currently held by containers attached to the network.
    async fn addresses_in_use(&self, network: &str) -> Result<Vec<Ipv4Addr>, InspectorError>;
}
