//! Results of orchestration operations.

use std::net::Ipv4Addr;

use cn_04_container_runtime::ContainerState;
use cn_06_consensus_membership::MembershipOutcome;
use serde::Serialize;
use shared_types::{Address, Enode, NodeLifecycle, NodeRole, NodeState};

/// How one node came up.
#[derive(Debug)]
pub struct NodeReport {
    pub name: String,
    pub role: NodeRole,
    pub ip: Ipv4Addr,
    pub address: Option<Address>,
    pub container: String,
    /// The container was already running and left untouched.
    pub reused: bool,
    pub lifecycle: NodeLifecycle,
    /// Set for sealing nodes that are not genesis signers.
    pub membership: Option<MembershipOutcome>,
}

impl NodeReport {
    pub fn state(&self) -> &NodeState {
        self.lifecycle.state()
    }
}

/// Outcome of a network startup.
#[derive(Debug)]
pub struct NetworkReport {
    pub network: String,
    pub bootnode_enode: Enode,
    /// `false` when an existing genesis document was reused.
    pub genesis_created: bool,
    /// In startup order, bootnode first.
    pub nodes: Vec<NodeReport>,
}

impl NetworkReport {
    pub fn node(&self, name: &str) -> Option<&NodeReport> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// `clique_propose` calls that succeeded across the startup.
    pub fn votes_cast(&self) -> usize {
        self.nodes
            .iter()
            .filter_map(|n| n.membership.as_ref())
            .map(MembershipOutcome::votes)
            .sum()
    }
}

/// Live view of one node.
#[derive(Debug, Clone, Serialize)]
pub struct NodeStatus {
    pub name: String,
    pub role: NodeRole,
    pub container: String,
    /// `None` when no container exists.
    pub state: Option<ContainerState>,
    pub ip: Option<Ipv4Addr>,
    pub rpc_port: u16,
    pub address: Option<Address>,
    pub block_number: Option<u64>,
    pub peer_count: Option<u64>,
}

/// Live view of a network.
#[derive(Debug, Clone, Serialize)]
pub struct NetworkStatus {
    pub network: String,
    pub chain_id: u64,
    pub bootnode_enode: Option<Enode>,
    pub nodes: Vec<NodeStatus>,
}

impl NetworkStatus {
    pub fn running(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| n.state.as_ref().is_some_and(ContainerState::is_running))
            .count()
    }
}
