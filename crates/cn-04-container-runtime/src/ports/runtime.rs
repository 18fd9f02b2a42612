//! # Container Runtime Port
//!
//! The only way the orchestrator touches containers. Implementations may
//! shell out to a CLI or talk to a daemon API; callers never assume which.
//!
//! Calls carry no timeout of their own and failures are not retried.

use async_trait::async_trait;
use shared_types::Ipv4Subnet;

use crate::domain::{ContainerFilter, ContainerInfo, ContainerSpec, NetworkInfo};
use crate::error::Result;

/// Container and network lifecycle operations.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Create a bridge network, returning its id.
    async fn create_network(&self, name: &str, subnet: Option<Ipv4Subnet>) -> Result<String>;

    /// Inspect a network; `None` if it does not exist.
    async fn inspect_network(&self, name: &str) -> Result<Option<NetworkInfo>>;

    /// Remove a network, first force-removing attached containers when
    /// `remove_containers` is set. Removing a missing network succeeds.
    async fn remove_network(&self, name: &str, remove_containers: bool) -> Result<()>;

    /// Create and start a container, returning its id.
    async fn run_container(&self, spec: &ContainerSpec) -> Result<String>;

    /// Start an existing, stopped container.
    async fn start_container(&self, name: &str) -> Result<()>;

    async fn stop_container(&self, name: &str) -> Result<()>;

    /// Force-remove a container. Removing a missing container succeeds.
    async fn remove_container(&self, name: &str) -> Result<()>;

    /// Inspect a container; `None` if it does not exist.
    async fn container_info(&self, name: &str) -> Result<Option<ContainerInfo>>;

    async fn list_containers(&self, filter: &ContainerFilter) -> Result<Vec<ContainerInfo>>;

    async fn network_exists(&self, name: &str) -> Result<bool> {
        Ok(self.inspect_network(name).await?.is_some())
    }
}
