//! HTTP JSON-RPC transport (reqwest).

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::trace;

use crate::domain::{JsonRpcRequest, JsonRpcResponse, RpcEndpoint};
use crate::error::{Result, RpcError};
use crate::ports::RpcTransport;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// JSON-RPC over HTTP POST.
pub struct HttpRpcTransport {
    client: Client,
    request_id: AtomicU64,
}

impl HttpRpcTransport {
    pub fn new() -> Result<Self> {
        Self::with_timeouts(DEFAULT_TIMEOUT, DEFAULT_CONNECT_TIMEOUT)
    }

    pub fn with_timeouts(timeout: Duration, connect_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| RpcError::Http {
                endpoint: "<client>".to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            client,
            request_id: AtomicU64::new(1),
        })
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::Relaxed)
    }
}

#[async_trait]
impl RpcTransport for HttpRpcTransport {
    async fn call(&self, endpoint: &RpcEndpoint, method: &str, params: Value) -> Result<Value> {
        let request = JsonRpcRequest::new(method, params, self.next_id());
        trace!(%endpoint, method, id = request.id, "JSON-RPC request");

        let response = self
            .client
            .post(endpoint.url())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    RpcError::Connection {
                        endpoint: endpoint.url(),
                    }
                } else {
                    RpcError::Http {
                        endpoint: endpoint.url(),
                        reason: e.to_string(),
                    }
                }
            })?;

        let rpc_response: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| RpcError::parse(method, e.to_string()))?;

        if let Some(error) = rpc_response.error {
            return Err(RpcError::Rpc {
                method: method.to_string(),
                code: error.code,
                message: error.message,
            });
        }

        rpc_response
            .result
            .ok_or_else(|| RpcError::parse(method, "missing result in response"))
    }
}
