//! Shared harness: an orchestrator wired to an in-memory container runtime
//! and a scripted RPC transport, rooted in a temporary directory.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use cn_04_container_runtime::test_utils::InMemoryContainerRuntime;
use cn_05_node_rpc::test_utils::ScriptedRpcTransport;
use cn_05_node_rpc::{RpcEndpoint, ADMIN_NODE_INFO, CLIQUE_GET_SIGNERS, ETH_BLOCK_NUMBER, NET_PEER_COUNT};
use node_orchestrator::{ControlPlane, NodeLifecycleOrchestrator, OrchestratorConfig};
use serde_json::json;
use shared_crypto::KeyMaterial;
use shared_types::{Address, NetworkDefinition, NodeDefinition, NodeRole, RetryPolicy};

/// Node id the scripted bootnode advertises.
pub const BOOTNODE_ID: &str = "8f2ba2b4b5c1a6e7d3f0c9e8b7a6d5c4b3a29180f7e6d5c4b3a2918f7e6d5c4b8f2ba2b4b5c1a6e7d3f0c9e8b7a6d5c4b3a29180f7e6d5c4b3a2918f7e6d5c4b";

pub const RPC_HOST: &str = "127.0.0.1";

pub struct Harness {
    pub plane: ControlPlane,
    pub runtime: Arc<InMemoryContainerRuntime>,
    pub transport: Arc<ScriptedRpcTransport>,
    pub dir: tempfile::TempDir,
}

impl Harness {
    /// Every node answers `eth_blockNumber` and the bootnode reports a
    /// wildcard enode.
    pub fn new() -> Self {
        Self::with_readiness(3)
    }

    pub fn with_readiness(max_attempts: u32) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(ScriptedRpcTransport::new());
        let runtime = Arc::new(InMemoryContainerRuntime::new());
        let plane = ControlPlane::new(NodeLifecycleOrchestrator::new(
            config(dir.path(), max_attempts),
            runtime.clone(),
            transport.clone(),
        ));
        let harness = Self {
            plane,
            runtime,
            transport,
            dir,
        };
        harness.answer_readiness();
        harness
    }

    /// A second control plane over the same data root and collaborators.
    pub fn reopen(&self) -> ControlPlane {
        ControlPlane::new(NodeLifecycleOrchestrator::new(
            config(self.dir.path(), 3),
            self.runtime.clone(),
            self.transport.clone(),
        ))
    }

    pub fn answer_readiness(&self) {
        self.transport.respond_any(ETH_BLOCK_NUMBER, json!("0x5"));
        self.transport.respond_any(NET_PEER_COUNT, json!("0x2"));
        self.transport.respond_any(
            ADMIN_NODE_INFO,
            json!({
                "id": BOOTNODE_ID,
                "name": "besu/v24.1.0",
                "enode": format!("enode://{}@0.0.0.0:30303", BOOTNODE_ID),
            }),
        );
    }

    /// Pre-create a node's keys so its address is known before startup.
    pub fn node_key(&self, network: &str, node: &str) -> Address {
        let dir = self.plane.orchestrator().layout().node_dir(network, node);
        let (material, _) = KeyMaterial::load_or_generate(&dir).unwrap();
        material.address()
    }

    /// Script `clique_getSigners` on a node's endpoint.
    pub fn signers_at(&self, rpc_port: u16, signers: &[Address]) {
        let list: Vec<String> = signers.iter().map(|a| format!("0x{}", a.to_hex())).collect();
        self.transport
            .respond(&endpoint(rpc_port), CLIQUE_GET_SIGNERS, json!(list));
    }
}

pub fn endpoint(rpc_port: u16) -> RpcEndpoint {
    RpcEndpoint::new(RPC_HOST, rpc_port)
}

fn config(root: &Path, max_attempts: u32) -> OrchestratorConfig {
    let mut config = OrchestratorConfig {
        data_root: root.to_path_buf(),
        rpc_host: RPC_HOST.to_string(),
        readiness: RetryPolicy::new(max_attempts, Duration::ZERO),
        ..OrchestratorConfig::default()
    };
    config.membership.proposal_pause_ms = 0;
    config.membership.settle = RetryPolicy::new(1, Duration::ZERO);
    config
}

/// `net1`, chain 1337, `10.5.0.0/16`: bootnode, miner, normal.
pub fn net1() -> NetworkDefinition {
    NetworkDefinition::new("net1", 1337, "10.5.0.0/16".parse().unwrap())
        .with_node(NodeDefinition::new("bootnode", NodeRole::Bootnode, 8545, 30303))
        .with_node(NodeDefinition::new("miner", NodeRole::Miner, 8546, 30304))
        .with_node(NodeDefinition::new("normal", NodeRole::Normal, 8547, 30305))
}
