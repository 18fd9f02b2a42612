//! # Node RPC Client
//!
//! Typed wrappers for the Besu methods the orchestrator consumes:
//!
//! | Method | Use |
//! |--------|-----|
//! | `eth_blockNumber` | readiness probe, status |
//! | `net_peerCount` | status |
//! | `admin_nodeInfo` | bootnode enode discovery |
//! | `clique_getSigners` | current validator set |
//! | `clique_propose` | validator set votes |

use std::sync::Arc;

use serde_json::{json, Value};
use shared_types::{Address, Enode};

use crate::domain::{parse_quantity, NodeInfo, RpcEndpoint};
use crate::error::{Result, RpcError};
use crate::ports::RpcTransport;

pub const ETH_BLOCK_NUMBER: &str = "eth_blockNumber";
pub const NET_PEER_COUNT: &str = "net_peerCount";
pub const ADMIN_NODE_INFO: &str = "admin_nodeInfo";
pub const CLIQUE_GET_SIGNERS: &str = "clique_getSigners";
pub const CLIQUE_PROPOSE: &str = "clique_propose";

/// Client bound to one node's endpoint.
#[derive(Clone)]
pub struct NodeRpcClient {
    transport: Arc<dyn RpcTransport>,
    endpoint: RpcEndpoint,
}

impl NodeRpcClient {
    pub fn new(transport: Arc<dyn RpcTransport>, endpoint: RpcEndpoint) -> Self {
        Self {
            transport,
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &RpcEndpoint {
        &self.endpoint
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        self.transport.call(&self.endpoint, method, params).await
    }

    /// Current head block number.
    pub async fn block_number(&self) -> Result<u64> {
        let value = self.call(ETH_BLOCK_NUMBER, json!([])).await?;
        quantity(ETH_BLOCK_NUMBER, &value)
    }

    pub async fn peer_count(&self) -> Result<u64> {
        let value = self.call(NET_PEER_COUNT, json!([])).await?;
        quantity(NET_PEER_COUNT, &value)
    }

    pub async fn node_info(&self) -> Result<NodeInfo> {
        let value = self.call(ADMIN_NODE_INFO, json!([])).await?;
        serde_json::from_value(value).map_err(|e| RpcError::parse(ADMIN_NODE_INFO, e.to_string()))
    }

    /// The node's advertised enode, as reported.
    pub async fn enode(&self) -> Result<Enode> {
        let info = self.node_info().await?;
        info.enode
            .parse()
            .map_err(|e: shared_types::ParseError| RpcError::parse(ADMIN_NODE_INFO, e.to_string()))
    }

    /// Signers at the latest block.
    pub async fn clique_get_signers(&self) -> Result<Vec<Address>> {
        let value = self.call(CLIQUE_GET_SIGNERS, json!(["latest"])).await?;
        let raw: Vec<String> = serde_json::from_value(value)
            .map_err(|e| RpcError::parse(CLIQUE_GET_SIGNERS, e.to_string()))?;
        raw.iter()
            .map(|s| {
                s.parse::<Address>()
                    .map_err(|e| RpcError::parse(CLIQUE_GET_SIGNERS, e.to_string()))
            })
            .collect()
    }

    /// Vote to add (`authorize = true`) or drop `address` from the signer set.
    pub async fn clique_propose(&self, address: &Address, authorize: bool) -> Result<bool> {
        let value = self
            .call(CLIQUE_PROPOSE, json!([address.to_string(), authorize]))
            .await?;
        Ok(value.as_bool().unwrap_or(true))
    }
}

fn quantity(method: &str, value: &Value) -> Result<u64> {
    match value {
        Value::String(raw) => {
            parse_quantity(raw).ok_or_else(|| RpcError::parse(method, format!("invalid quantity {}", raw)))
        }
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| RpcError::parse(method, format!("invalid quantity {}", n))),
        other => Err(RpcError::parse(method, format!("unexpected result {}", other))),
    }
}
