//! # IP Allocator Service
//!
//! `get_or_assign` flow:
//!
//! 1. A persisted mapping for the node wins (idempotent).
//! 2. The network's subnet is asked from the runtime; if that fails the
//!    configured fallback `/16` is used instead. The fallback only matches
//!    networks created with that range, so a warning is logged.
//! 3. Addresses persisted for other nodes and addresses held by running
//!    containers are excluded, then the scan in [`crate::domain::scan`] runs.
//! 4. The new mapping is persisted under the store lock.

use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::sync::Arc;

use shared_types::Ipv4Subnet;
use tracing::{debug, info, warn};

use crate::adapters::FileMappingStore;
use crate::domain::{find_free_address, IpMappings};
use crate::error::{IpAllocationError, Result};
use crate::ports::NetworkInspector;

/// Assigns and persists one stable address per node.
pub struct IpAllocator {
    store: FileMappingStore,
    inspector: Arc<dyn NetworkInspector>,
    fallback_subnet: Ipv4Subnet,
}

impl IpAllocator {
    pub fn new(data_root: impl Into<PathBuf>, inspector: Arc<dyn NetworkInspector>) -> Self {
        Self {
            store: FileMappingStore::new(data_root),
            inspector,
            fallback_subnet: Ipv4Subnet::DEVNET_FALLBACK,
        }
    }

    pub fn with_fallback_subnet(mut self, subnet: Ipv4Subnet) -> Self {
        self.fallback_subnet = subnet;
        self
    }

    pub fn with_store(mut self, store: FileMappingStore) -> Self {
        self.store = store;
        self
    }

    pub fn store(&self) -> &FileMappingStore {
        &self.store
    }

    /// Address of `node` in `network`, assigning a free one on first call.
    pub async fn get_or_assign(&self, node: &str, network: &str) -> Result<Ipv4Addr> {
        if let Some(ip) = self.store.load(network)?.get(node) {
            debug!(network, node, %ip, "Reusing persisted address");
            return Ok(ip);
        }

        let subnet = self.resolve_subnet(network).await;
        let in_use = self
            .inspector
            .addresses_in_use(network)
            .await
            .map_err(|source| IpAllocationError::Inspector {
                network: network.to_string(),
                source,
            })?;

        // The store lock may sleep while another process holds it.
        let store = self.store.clone();
        let (owned_network, owned_node) = (network.to_string(), node.to_string());
        let ip = tokio::task::spawn_blocking(move || {
            store.update(&owned_network, |mappings| {
                if let Some(ip) = mappings.get(&owned_node) {
                    return Ok(ip);
                }
                let mut taken = mappings.assigned();
                taken.extend(in_use.iter().copied());

                let ip = find_free_address(&subnet, &taken).ok_or_else(|| {
                    IpAllocationError::ResourceExhausted {
                        network: owned_network.clone(),
                        node: owned_node.clone(),
                        subnet,
                    }
                })?;
                mappings.insert(&owned_node, ip);
                Ok(ip)
            })
        })
        .await
        .map_err(|e| IpAllocationError::Interrupted {
            network: network.to_string(),
            reason: e.to_string(),
        })??;

        info!(network, node, %ip, %subnet, "Assigned address");
        Ok(ip)
    }

    /// Record a caller-chosen address for `node`.
    ///
    /// Blocks while another process holds the store lock.
    ///
    /// Re-reserving the same address is a no-op; an address held by another
    /// node is a [`IpAllocationError::Conflict`].
    pub fn reserve(&self, node: &str, network: &str, ip: Ipv4Addr) -> Result<()> {
        self.store.update(network, |mappings| {
            if let Some(owner) = mappings.owner_of(ip).filter(|owner| *owner != node) {
                return Err(IpAllocationError::Conflict {
                    network: network.to_string(),
                    ip,
                    owner: owner.to_string(),
                });
            }
            mappings.insert(node, ip);
            Ok(())
        })?;
        debug!(network, node, %ip, "Reserved address");
        Ok(())
    }

    /// Drop the mapping of `node`, returning the freed address. Blocks like
    /// [`Self::reserve`].
    pub fn release(&self, node: &str, network: &str) -> Result<Option<Ipv4Addr>> {
        let released = self.store.update(network, |mappings| Ok(mappings.remove(node)))?;
        if let Some(ip) = released {
            info!(network, node, %ip, "Released address");
        }
        Ok(released)
    }

    /// Persisted address of `node`, without assigning.
    pub fn lookup(&self, node: &str, network: &str) -> Result<Option<Ipv4Addr>> {
        Ok(self.store.load(network)?.get(node))
    }

    pub fn mappings(&self, network: &str) -> Result<IpMappings> {
        self.store.load(network)
    }

    async fn resolve_subnet(&self, network: &str) -> Ipv4Subnet {
        match self.inspector.subnet(network).await {
            Ok(Some(subnet)) => subnet,
            Ok(None) => {
                warn!(network, fallback = %self.fallback_subnet, "Network reports no subnet; using fallback range");
                self.fallback_subnet
            }
            Err(e) => {
                warn!(network, fallback = %self.fallback_subnet, error = %e, "Subnet lookup failed; using fallback range");
                self.fallback_subnet
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::StaticNetworkInspector;

    fn allocator(dir: &tempfile::TempDir, inspector: StaticNetworkInspector) -> IpAllocator {
        IpAllocator::new(dir.path(), Arc::new(inspector))
    }

    fn net1() -> StaticNetworkInspector {
        StaticNetworkInspector::new("10.5.0.0/16".parse().unwrap())
    }

    #[tokio::test]
    async fn test_get_or_assign_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let allocator = allocator(&dir, net1());
        let first = allocator.get_or_assign("bootnode", "net1").await.unwrap();
        let second = allocator.get_or_assign("bootnode", "net1").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first, Ipv4Addr::new(10, 5, 0, 10));
    }

    #[tokio::test]
    async fn test_waiting_for_store_lock_leaves_runtime_free() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileMappingStore::new(dir.path()).with_lock_timeout(std::time::Duration::from_secs(2));
        let allocator = allocator(&dir, net1()).with_store(store);
        std::fs::create_dir_all(dir.path().join("net1")).unwrap();
        let held = crate::StoreLock::acquire(
            &dir.path().join("net1").join("ip_mappings.lock"),
            std::time::Duration::from_millis(100),
        )
        .unwrap();

        // Released by a task on the same single-threaded runtime.
        let release = tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            drop(held);
        });

        let ip = allocator.get_or_assign("bootnode", "net1").await.unwrap();
        release.await.unwrap();
        assert_eq!(ip, Ipv4Addr::new(10, 5, 0, 10));
    }

    #[tokio::test]
    async fn test_never_returns_mapped_address() {
        let dir = tempfile::tempdir().unwrap();
        let allocator = allocator(&dir, net1());
        let mut seen = std::collections::BTreeSet::new();
        for i in 0..20 {
            let ip = allocator.get_or_assign(&format!("node-{}", i), "net1").await.unwrap();
            assert!(seen.insert(ip), "duplicate address {}", ip);
        }
        assert_eq!(allocator.mappings("net1").unwrap().len(), 20);
    }

    #[tokio::test]
    async fn test_skips_addresses_in_use() {
        let dir = tempfile::tempdir().unwrap();
        let inspector = net1().with_in_use(vec![Ipv4Addr::new(10, 5, 0, 10)]);
        let allocator = allocator(&dir, inspector);
        let ip = allocator.get_or_assign("miner", "net1").await.unwrap();
        assert_eq!(ip, Ipv4Addr::new(10, 5, 0, 11));
    }

    #[tokio::test]
    async fn test_unknown_subnet_uses_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let allocator = allocator(&dir, StaticNetworkInspector::unknown());
        let ip = allocator.get_or_assign("bootnode", "legacy").await.unwrap();
        assert_eq!(ip, Ipv4Addr::new(172, 28, 0, 10));
    }

    #[tokio::test]
    async fn test_failing_lookup_uses_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let allocator = allocator(&dir, StaticNetworkInspector::failing_subnet())
            .with_fallback_subnet("10.99.0.0/16".parse().unwrap());
        let ip = allocator.get_or_assign("bootnode", "legacy").await.unwrap();
        assert_eq!(ip, Ipv4Addr::new(10, 99, 0, 10));
    }

    #[tokio::test]
    async fn test_exhaustion_falls_back_then_fails() {
        let dir = tempfile::tempdir().unwrap();
        let allocator = allocator(&dir, net1());
        for d in 10..=254u8 {
            allocator
                .reserve(&format!("a-{}", d), "net1", Ipv4Addr::new(10, 5, 0, d))
                .unwrap();
        }
        let ip = allocator.get_or_assign("overflow", "net1").await.unwrap();
        assert_eq!(ip, Ipv4Addr::new(10, 5, 1, 10));

        for d in 11..=254u8 {
            allocator
                .reserve(&format!("b-{}", d), "net1", Ipv4Addr::new(10, 5, 1, d))
                .unwrap();
        }
        let err = allocator.get_or_assign("one-too-many", "net1").await.unwrap_err();
        assert!(matches!(err, IpAllocationError::ResourceExhausted { .. }));
        assert_eq!(allocator.lookup("one-too-many", "net1").unwrap(), None);
    }

    #[tokio::test]
    async fn test_reserve_conflict_and_release() {
        let dir = tempfile::tempdir().unwrap();
        let allocator = allocator(&dir, net1());
        let ip = Ipv4Addr::new(10, 5, 0, 50);
        allocator.reserve("rpc", "net1", ip).unwrap();
        allocator.reserve("rpc", "net1", ip).unwrap();
        assert!(matches!(
            allocator.reserve("other", "net1", ip),
            Err(IpAllocationError::Conflict { .. })
        ));

        assert_eq!(allocator.release("rpc", "net1").unwrap(), Some(ip));
        assert_eq!(allocator.release("rpc", "net1").unwrap(), None);
        allocator.reserve("other", "net1", ip).unwrap();
    }

    #[tokio::test]
    async fn test_inspector_listing_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let allocator = allocator(&dir, net1().failing_listing());
        assert!(matches!(
            allocator.get_or_assign("bootnode", "net1").await,
            Err(IpAllocationError::Inspector { .. })
        ));
    }
}
