//! # Consensus Membership Manager
//!
//! Adds or removes Clique signers by voting from the existing signers.
//!
//! ## Round
//!
//! 1. No voters: nothing to do (a sole signer is in the set from genesis).
//! 2. For each voter: confirm it is a signer via `clique_getSigners` (skip
//!    otherwise), then `clique_propose(target, vote)`. Voters are paused
//!    between proposals.
//! 3. Check the signer set through the settle policy and report.
//!
//! Failures are logged at `warn` and collected; a round never errors.

use std::sync::Arc;

use cn_05_node_rpc::{NodeRpcClient, RpcTransport};
use shared_types::{poll_until, Address};
use tracing::{debug, info, warn};

use crate::domain::{MembershipConfig, MembershipOutcome, SignerHandle, Vote};
use crate::error::ConsensusProposalError;

/// Drives `clique_propose` voting rounds.
pub struct ConsensusMembershipManager {
    transport: Arc<dyn RpcTransport>,
    config: MembershipConfig,
}

impl ConsensusMembershipManager {
    pub fn new(transport: Arc<dyn RpcTransport>, config: MembershipConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &MembershipConfig {
        &self.config
    }

    /// Propose `candidate` to the existing signers.
    pub async fn propose_new_signer(
        &self,
        candidate: &SignerHandle,
        existing: &[SignerHandle],
    ) -> MembershipOutcome {
        self.run_round(candidate, existing, Vote::Authorize).await
    }

    /// Vote `target` out of the signer set using the remaining signers.
    pub async fn propose_signer_removal(
        &self,
        target: &SignerHandle,
        remaining: &[SignerHandle],
    ) -> MembershipOutcome {
        self.run_round(target, remaining, Vote::Deauthorize).await
    }

    async fn run_round(
        &self,
        target: &SignerHandle,
        voters: &[SignerHandle],
        vote: Vote,
    ) -> MembershipOutcome {
        let voters: Vec<&SignerHandle> = voters
            .iter()
            .filter(|v| v.address != target.address)
            .collect();
        if voters.is_empty() {
            debug!(node = %target.name, "No other signers; membership vote not required");
            return MembershipOutcome::NotRequired;
        }

        let mut votes = 0usize;
        let mut errors = Vec::new();

        for (index, voter) in voters.iter().enumerate() {
            if index > 0 && !self.config.proposal_pause().is_zero() {
                tokio::time::sleep(self.config.proposal_pause()).await;
            }
            let client = self.client(voter);

            match client.clique_get_signers().await {
                Ok(signers) if signers.contains(&voter.address) => {}
                Ok(_) => {
                    warn!(proposer = %voter.name, "Proposer is not a current signer; skipping");
                    errors.push(ConsensusProposalError::NotASigner {
                        proposer: voter.name.clone(),
                    });
                    continue;
                }
                Err(source) => {
                    warn!(proposer = %voter.name, error = %source, "Signer query failed; skipping proposer");
                    errors.push(ConsensusProposalError::SignerQuery {
                        proposer: voter.name.clone(),
                        source,
                    });
                    continue;
                }
            }

            match client.clique_propose(&target.address, vote.as_bool()).await {
                Ok(_) => {
                    votes += 1;
                    info!(
                        proposer = %voter.name,
                        node = %target.name,
                        address = %target.address,
                        authorize = vote.as_bool(),
                        "Clique proposal cast"
                    );
                }
                Err(source) => {
                    warn!(proposer = %voter.name, node = %target.name, error = %source, "Clique proposal failed");
                    errors.push(ConsensusProposalError::Proposal {
                        proposer: voter.name.clone(),
                        source,
                    });
                }
            }
        }

        if self.settled(&target.address, &voters, vote).await {
            info!(node = %target.name, address = %target.address, votes, "Signer set change observed");
            return match vote {
                Vote::Authorize => MembershipOutcome::Admitted { votes },
                Vote::Deauthorize => MembershipOutcome::Removed { votes },
            };
        }

        errors.push(ConsensusProposalError::NotSettled {
            address: target.address,
            attempts: self.config.settle.attempts(),
        });
        warn!(
            node = %target.name,
            address = %target.address,
            votes,
            failures = errors.len(),
            "Signer set change not observed yet; a majority of signers may still need to vote"
        );
        MembershipOutcome::Pending { votes, errors }
    }

    /// Whether some voter's signer set reflects `vote` for `address`.
    async fn settled(&self, address: &Address, voters: &[&SignerHandle], vote: Vote) -> bool {
        let clients: Vec<NodeRpcClient> = voters.iter().map(|v| self.client(v)).collect();
        poll_until(&self.config.settle, |_| {
            let clients = clients.clone();
            async move {
                let mut last_error = None;
                for client in &clients {
                    match client.clique_get_signers().await {
                        Ok(signers) => {
                            let present = signers.contains(address);
                            return Ok(if present == vote.as_bool() { Some(()) } else { None });
                        }
                        Err(e) => last_error = Some(e),
                    }
                }
                match last_error {
                    Some(e) => Err(e),
                    None => Ok(None),
                }
            }
        })
        .await
        .is_ok()
    }

    fn client(&self, signer: &SignerHandle) -> NodeRpcClient {
        NodeRpcClient::new(self.transport.clone(), signer.endpoint.clone())
    }
}
