//! JSON-RPC wire types and node-side data.

pub mod endpoint;
pub mod types;

pub use endpoint::RpcEndpoint;
pub use types::{parse_quantity, JsonRpcError, JsonRpcRequest, JsonRpcResponse, NodeInfo};
