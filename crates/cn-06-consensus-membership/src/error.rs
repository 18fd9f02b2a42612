//! Soft failures of validator-set voting.
//!
//! These are never returned as `Err`: Clique admission needs a majority of
//! signers, which this crate cannot guarantee, so failures are logged and
//! collected into [`crate::MembershipOutcome::Pending`].

use cn_05_node_rpc::RpcError;
use shared_types::Address;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsensusProposalError {
    /// The proposer is not in its own view of the signer set.
    #[error("{proposer} is not a current signer; skipped")]
    NotASigner { proposer: String },

    /// `clique_getSigners` on the proposer failed.
    #[error("Signer query on {proposer} failed: {source}")]
    SignerQuery {
        proposer: String,
        #[source]
        source: RpcError,
    },

    /// `clique_propose` on the proposer failed.
    #[error("Proposal from {proposer} failed: {source}")]
    Proposal {
        proposer: String,
        #[source]
        source: RpcError,
    },

    /// The vote did not take effect within the settle window.
    #[error("Signer set change for {address} not observed after {attempts} checks")]
    NotSettled { address: Address, attempts: u32 },
}
