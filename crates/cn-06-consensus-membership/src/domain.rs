//! Voting domain types.

use std::time::Duration;

use cn_05_node_rpc::RpcEndpoint;
use serde::{Deserialize, Serialize};
use shared_types::{Address, RetryPolicy};

use crate::error::ConsensusProposalError;

/// A signer (or candidate) reachable over JSON-RPC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerHandle {
    pub name: String,
    pub address: Address,
    pub endpoint: RpcEndpoint,
}

impl SignerHandle {
    pub fn new(name: impl Into<String>, address: Address, endpoint: RpcEndpoint) -> Self {
        Self {
            name: name.into(),
            address,
            endpoint,
        }
    }
}

/// Direction of a `clique_propose` vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    Authorize,
    Deauthorize,
}

impl Vote {
    pub fn as_bool(&self) -> bool {
        matches!(self, Vote::Authorize)
    }
}

/// Result of one membership change.
#[derive(Debug)]
pub enum MembershipOutcome {
    /// No other signers exist; nothing to vote on.
    NotRequired,
    /// The candidate appears in the signer set.
    Admitted { votes: usize },
    /// The target no longer appears in the signer set.
    Removed { votes: usize },
    /// The change was not observed; the node keeps running as a
    /// non-validating peer (or, for removals, as a signer).
    Pending {
        votes: usize,
        errors: Vec<ConsensusProposalError>,
    },
}

impl MembershipOutcome {
    /// Successful `clique_propose` calls.
    pub fn votes(&self) -> usize {
        match self {
            Self::NotRequired => 0,
            Self::Admitted { votes } | Self::Removed { votes } | Self::Pending { votes, .. } => *votes,
        }
    }

    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Pending { .. })
    }

    /// Proposal attempts that failed outright.
    pub fn failed_proposals(&self) -> usize {
        match self {
            Self::Pending { errors, .. } => errors
                .iter()
                .filter(|e| matches!(e, ConsensusProposalError::Proposal { .. }))
                .count(),
            _ => 0,
        }
    }
}

/// Timing of a voting round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipConfig {
    /// Pause between consecutive proposals, in milliseconds.
    pub proposal_pause_ms: u64,
    /// How long to wait for the signer set to reflect the vote.
    pub settle: RetryPolicy,
}

impl MembershipConfig {
    pub fn proposal_pause(&self) -> Duration {
        Duration::from_millis(self.proposal_pause_ms)
    }
}

impl Default for MembershipConfig {
    fn default() -> Self {
        Self {
            proposal_pause_ms: 1_000,
            settle: RetryPolicy::once(),
        }
    }
}
