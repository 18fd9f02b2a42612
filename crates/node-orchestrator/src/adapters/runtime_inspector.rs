//! Answers the address allocator's questions from the container runtime.

use std::net::Ipv4Addr;
use std::sync::Arc;

use async_trait::async_trait;
use cn_03_ip_allocation::{InspectorError, NetworkInspector};
use cn_04_container_runtime::{ContainerFilter, ContainerRuntime};
use shared_types::Ipv4Subnet;

/// [`NetworkInspector`] backed by a [`ContainerRuntime`].
pub struct RuntimeNetworkInspector {
    runtime: Arc<dyn ContainerRuntime>,
}

impl RuntimeNetworkInspector {
    pub fn new(runtime: Arc<dyn ContainerRuntime>) -> Self {
        Self { runtime }
    }
}

#[async_trait]
impl NetworkInspector for RuntimeNetworkInspector {
    async fn subnet(&self, network: &str) -> Result<Option<Ipv4Subnet>, InspectorError> {
        let info = self
            .runtime
            .inspect_network(network)
            .await
            .map_err(|e| InspectorError(e.to_string()))?;
        Ok(info.and_then(|n| n.subnet))
    }

    async fn addresses_in_use(&self, network: &str) -> Result<Vec<Ipv4Addr>, InspectorError> {
        let containers = self
            .runtime
            .list_containers(&ContainerFilter::on_network(network))
            .await
            .map_err(|e| InspectorError(e.to_string()))?;
        Ok(containers.into_iter().filter_map(|c| c.ip_address).collect())
    }
}
