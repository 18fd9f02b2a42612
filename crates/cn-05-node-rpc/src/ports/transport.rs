//! # RPC Transport Port
//!
//! Raw JSON-RPC call to one endpoint. The typed [`crate::NodeRpcClient`] sits
//! on top; tests swap in a scripted transport.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::RpcEndpoint;
use crate::error::Result;

#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Invoke `method` with positional `params`, returning the `result` member.
    async fn call(&self, endpoint: &RpcEndpoint, method: &str, params: Value) -> Result<Value>;
}
