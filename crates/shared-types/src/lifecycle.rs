//! # Node Lifecycle
//!
//! ```text
//! Created → Starting → Ready ──────────────────────────→ Running
//!              │         └→ Proposed → Admitted | Pending → Running
//!              └→ Failed(reason)
//! ```
//!
//! `Failed` is terminal and only reachable before the node is Ready.

use std::fmt;

use crate::errors::InvalidTransition;

/// Where a node is in its startup sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeState {
    /// Definition materialised, no container yet.
    Created,
    /// Container started, RPC not answering yet.
    Starting,
    /// RPC answering.
    Ready,
    /// Signer proposal sent to the existing validators.
    Proposed,
    /// Proposal reached a majority; node is a signer.
    Admitted,
    /// Proposal sent but not (yet) admitted.
    Pending,
    /// Steady state.
    Running,
    /// Startup aborted.
    Failed(String),
}

impl NodeState {
    /// Whether the state machine allows `self → next`.
    pub fn can_transition_to(&self, next: &NodeState) -> bool {
        use NodeState::*;
        matches!(
            (self, next),
            (Created, Starting)
                | (Created, Failed(_))
                | (Starting, Ready)
                | (Starting, Failed(_))
                | (Ready, Proposed)
                | (Ready, Running)
                | (Proposed, Admitted)
                | (Proposed, Pending)
                | (Admitted, Running)
                | (Pending, Running)
        )
    }

    /// No further transitions possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, NodeState::Running | NodeState::Failed(_))
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeState::Created => f.write_str("created"),
            NodeState::Starting => f.write_str("starting"),
            NodeState::Ready => f.write_str("ready"),
            NodeState::Proposed => f.write_str("proposed"),
            NodeState::Admitted => f.write_str("admitted"),
            NodeState::Pending => f.write_str("pending"),
            NodeState::Running => f.write_str("running"),
            NodeState::Failed(reason) => write!(f, "failed({})", reason),
        }
    }
}

/// Tracks one node through its lifecycle, rejecting illegal transitions.
#[derive(Debug, Clone)]
pub struct NodeLifecycle {
    node: String,
    state: NodeState,
    history: Vec<NodeState>,
}

impl NodeLifecycle {
    pub fn new(node: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            state: NodeState::Created,
            history: vec![NodeState::Created],
        }
    }

    pub fn node(&self) -> &str {
        &self.node
    }

    pub fn state(&self) -> &NodeState {
        &self.state
    }

    /// Every state visited, oldest first.
    pub fn history(&self) -> &[NodeState] {
        &self.history
    }

    /// Move to `next`.
    pub fn advance(&mut self, next: NodeState) -> Result<(), InvalidTransition> {
        if !self.state.can_transition_to(&next) {
            return Err(InvalidTransition {
                node: self.node.clone(),
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        tracing::info!(node = %self.node, from = %self.state, to = %next, "Node state changed");
        self.history.push(next.clone());
        self.state = next;
        Ok(())
    }
}
