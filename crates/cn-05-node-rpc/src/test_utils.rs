//! Test utilities for node RPC.
//!
//! Enable with the `test-utils` feature flag.
//!
//! [`ScriptedRpcTransport`] answers from per-endpoint scripts and records
//! every call. Endpoints without a script behave like a node that is not
//! listening yet.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::domain::RpcEndpoint;
use crate::error::{Result, RpcError};
use crate::ports::RpcTransport;

/// One call seen by the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub endpoint: RpcEndpoint,
    pub method: String,
    pub params: Value,
}

#[derive(Debug, Clone)]
enum Reply {
    Value(Value),
    Error(String),
}

#[derive(Debug, Clone)]
struct Script {
    /// Calls answered with a connection error before `reply` applies.
    unreachable_for: u32,
    reply: Reply,
}

#[derive(Default)]
struct Inner {
    scripts: HashMap<(RpcEndpoint, String), Script>,
    any_endpoint: HashMap<String, Script>,
    calls: Vec<RecordedCall>,
}

/// Scripted JSON-RPC transport.
#[derive(Default)]
pub struct ScriptedRpcTransport {
    inner: Mutex<Inner>,
}

impl ScriptedRpcTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self, endpoint: &RpcEndpoint, method: &str, script: Script) {
        self.inner
            .lock()
            .scripts
            .insert((endpoint.clone(), method.to_string()), script);
    }

    /// Answer `method` on `endpoint` with `result`.
    pub fn respond(&self, endpoint: &RpcEndpoint, method: &str, result: Value) {
        self.respond_after(endpoint, method, 0, result);
    }

    /// Refuse the first `unreachable_for` calls, then answer with `result`.
    pub fn respond_after(&self, endpoint: &RpcEndpoint, method: &str, unreachable_for: u32, result: Value) {
        self.script(
            endpoint,
            method,
            Script {
                unreachable_for,
                reply: Reply::Value(result),
            },
        );
    }

    /// Answer `method` with `result` on any endpoint without its own script.
    pub fn respond_any(&self, method: &str, result: Value) {
        self.inner.lock().any_endpoint.insert(
            method.to_string(),
            Script {
                unreachable_for: 0,
                reply: Reply::Value(result),
            },
        );
    }

    /// Answer `method` on `endpoint` with a JSON-RPC error.
    pub fn fail(&self, endpoint: &RpcEndpoint, method: &str, message: &str) {
        self.script(
            endpoint,
            method,
            Script {
                unreachable_for: 0,
                reply: Reply::Error(message.to_string()),
            },
        );
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.inner.lock().calls.clone()
    }

    pub fn calls_to(&self, method: &str) -> Vec<RecordedCall> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter(|call| call.method == method)
            .cloned()
            .collect()
    }

    pub fn calls_to_endpoint(&self, endpoint: &RpcEndpoint, method: &str) -> usize {
        self.inner
            .lock()
            .calls
            .iter()
            .filter(|call| &call.endpoint == endpoint && call.method == method)
            .count()
    }
}

#[async_trait]
impl RpcTransport for ScriptedRpcTransport {
    async fn call(&self, endpoint: &RpcEndpoint, method: &str, params: Value) -> Result<Value> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        inner.calls.push(RecordedCall {
            endpoint: endpoint.clone(),
            method: method.to_string(),
            params,
        });

        let key = (endpoint.clone(), method.to_string());
        let script = match inner.scripts.get_mut(&key) {
            Some(script) => Some(script),
            None => inner.any_endpoint.get_mut(method),
        };
        let Some(script) = script else {
            return Err(RpcError::Connection {
                endpoint: endpoint.url(),
            });
        };

        if script.unreachable_for > 0 {
            script.unreachable_for -= 1;
            return Err(RpcError::Connection {
                endpoint: endpoint.url(),
            });
        }
        match &script.reply {
            Reply::Value(value) => Ok(value.clone()),
            Reply::Error(message) => Err(RpcError::Rpc {
                method: method.to_string(),
                code: -32000,
                message: message.clone(),
            }),
        }
    }
}
