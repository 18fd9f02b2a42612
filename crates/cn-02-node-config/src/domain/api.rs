//! JSON-RPC API namespaces enabled per role.

use std::fmt;

use serde::{Deserialize, Serialize};
use shared_types::NodeRole;

/// Besu JSON-RPC namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RpcApi {
    Eth,
    Net,
    Web3,
    Admin,
    Txpool,
    Clique,
    Miner,
    Debug,
    Trace,
}

impl RpcApi {
    pub fn as_str(&self) -> &'static str {
        match self {
            RpcApi::Eth => "ETH",
            RpcApi::Net => "NET",
            RpcApi::Web3 => "WEB3",
            RpcApi::Admin => "ADMIN",
            RpcApi::Txpool => "TXPOOL",
            RpcApi::Clique => "CLIQUE",
            RpcApi::Miner => "MINER",
            RpcApi::Debug => "DEBUG",
            RpcApi::Trace => "TRACE",
        }
    }
}

impl fmt::Display for RpcApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Namespaces every node exposes. `ADMIN` is needed for `admin_nodeInfo`.
const BASE_APIS: [RpcApi; 5] = [
    RpcApi::Eth,
    RpcApi::Net,
    RpcApi::Web3,
    RpcApi::Admin,
    RpcApi::Txpool,
];

/// Enabled API set for `role`.
pub fn api_set(role: NodeRole) -> Vec<RpcApi> {
    let mut apis = BASE_APIS.to_vec();
    match role {
        NodeRole::Signer | NodeRole::Miner => {
            apis.extend([RpcApi::Clique, RpcApi::Miner]);
        }
        NodeRole::Rpc => {
            apis.extend([RpcApi::Debug, RpcApi::Trace]);
        }
        NodeRole::Bootnode | NodeRole::Normal => {}
    }
    apis
}
