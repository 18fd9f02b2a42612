//! # Node RPC
//!
//! JSON-RPC 2.0 access to Besu nodes: readiness probing, enode discovery,
//! status and Clique validator voting.
//!
//! ## Architecture
//!
//! - **Domain Layer:** request/response envelopes, endpoint, payloads
//! - **Ports Layer:** [`RpcTransport`]
//! - **Adapters Layer:** [`HttpRpcTransport`] (reqwest)
//! - **Client:** [`NodeRpcClient`], typed methods over any transport
//! - **Test Utilities:** `ScriptedRpcTransport` (feature `test-utils`)

pub mod adapters;
pub mod client;
pub mod domain;
pub mod error;
pub mod ports;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use adapters::HttpRpcTransport;
pub use client::{
    NodeRpcClient, ADMIN_NODE_INFO, CLIQUE_GET_SIGNERS, CLIQUE_PROPOSE, ETH_BLOCK_NUMBER,
    NET_PEER_COUNT,
};
pub use domain::*;
pub use error::{Result, RpcError};
pub use ports::RpcTransport;
