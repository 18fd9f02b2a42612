//! # Consensus Membership
//!
//! Best-effort management of the Clique signer set: newly started signer
//! and miner nodes are proposed by the existing signers, removed ones are
//! voted out.
//!
//! Clique applies a change once a majority of signers proposed it, which
//! is outside this crate's control; every outcome is therefore reported as
//! a [`MembershipOutcome`] rather than an error.

pub mod domain;
pub mod error;
pub mod service;

pub use domain::{MembershipConfig, MembershipOutcome, SignerHandle, Vote};
pub use error::ConsensusProposalError;
pub use service::ConsensusMembershipManager;
