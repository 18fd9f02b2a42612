//! # Control Plane
//!
//! The entry point for every operation: provision a network, add or remove
//! nodes, tear down, report status. Definitions are kept in the
//! [`NetworkRegistry`] and persisted as `<data_root>/<network>/network.json`
//! so a later invocation can pick them up again.
//!
//! Mutating operations are serialised; status queries are not.

use std::path::Path;

use cn_06_consensus_membership::MembershipOutcome;
use shared_types::{NetworkDefinition, NodeDefinition};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::definition::{read_network_definition, write_network_definition};
use crate::error::{OrchestratorError, Result};
use crate::orchestrator::NodeLifecycleOrchestrator;
use crate::registry::NetworkRegistry;
use crate::report::{NetworkReport, NetworkStatus, NodeReport};

pub struct ControlPlane {
    orchestrator: NodeLifecycleOrchestrator,
    registry: NetworkRegistry,
    operations: Mutex<()>,
}

impl ControlPlane {
    pub fn new(orchestrator: NodeLifecycleOrchestrator) -> Self {
        Self {
            orchestrator,
            registry: NetworkRegistry::new(),
            operations: Mutex::new(()),
        }
    }

    pub fn registry(&self) -> &NetworkRegistry {
        &self.registry
    }

    pub fn orchestrator(&self) -> &NodeLifecycleOrchestrator {
        &self.orchestrator
    }

    /// Registered definition of `network`, or the default network.
    pub fn network(&self, network: Option<&str>) -> Result<NetworkDefinition> {
        let name = self.registry.resolve(network)?;
        self.registry
            .get(&name)
            .ok_or(OrchestratorError::UnknownNetwork { network: name })
    }

    /// Register every network persisted under the data root.
    ///
    /// Unreadable definitions are skipped with a warning.
    pub fn load_persisted(&self) -> Result<usize> {
        let layout = self.orchestrator.layout();
        let mut loaded = 0;
        for name in layout.persisted_networks()? {
            match read_network_definition(&layout.definition_file(&name)) {
                Ok(network) => {
                    self.registry.upsert(network);
                    loaded += 1;
                }
                Err(e) => warn!(network = %name, error = %e, "Skipping unreadable network definition"),
            }
        }
        info!(networks = loaded, root = %layout.root().display(), "Loaded persisted networks");
        Ok(loaded)
    }

    /// Start (or resume) a network.
    ///
    /// Re-running with the same definition reuses keys, genesis, addresses
    /// and running containers. The definition is persisted even when startup
    /// fails after validation, so the partial network can be torn down.
    pub async fn provision(&self, mut network: NetworkDefinition) -> Result<NetworkReport> {
        let _guard = self.operations.lock().await;

        let result = self.orchestrator.start_network(&mut network).await;
        if let Err(OrchestratorError::Configuration { .. }) = &result {
            return result;
        }
        self.persist(&network)?;
        self.registry.upsert(network);
        result
    }

    /// Read a definition file and provision it.
    pub async fn provision_file(&self, path: &Path) -> Result<NetworkReport> {
        let network = read_network_definition(path)?;
        self.provision(network).await
    }

    pub async fn add_node(&self, network: Option<&str>, node: NodeDefinition) -> Result<NodeReport> {
        let _guard = self.operations.lock().await;
        let mut definition = self.network(network)?;

        let result = self.orchestrator.add_node(&mut definition, node).await;
        if result.is_ok() {
            self.persist(&definition)?;
            self.registry.upsert(definition);
        }
        result
    }

    pub async fn remove_node(&self, network: Option<&str>, node: &str) -> Result<Option<MembershipOutcome>> {
        let _guard = self.operations.lock().await;
        let mut definition = self.network(network)?;

        let outcome = self.orchestrator.remove_node(&mut definition, node).await?;
        self.persist(&definition)?;
        self.registry.upsert(definition);
        Ok(outcome)
    }

    /// Remove a network's containers and forget it.
    ///
    /// Keys, genesis and address mappings stay on disk unless `purge_data`
    /// is set, so the same definition can be provisioned again later.
    pub async fn teardown(&self, network: Option<&str>, purge_data: bool) -> Result<()> {
        let _guard = self.operations.lock().await;
        let name = self.registry.resolve(network)?;

        self.orchestrator.teardown(&name, purge_data).await?;
        if !purge_data {
            let path = self.orchestrator.layout().definition_file(&name);
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(OrchestratorError::io(&name, path, e)),
            }
        }
        self.registry.remove(&name);
        Ok(())
    }

    pub async fn status(&self, network: Option<&str>) -> Result<NetworkStatus> {
        let definition = self.network(network)?;
        self.orchestrator.status(&definition).await
    }

    fn persist(&self, network: &NetworkDefinition) -> Result<()> {
        let path = self.orchestrator.layout().definition_file(&network.name);
        write_network_definition(&path, network)
    }
}
