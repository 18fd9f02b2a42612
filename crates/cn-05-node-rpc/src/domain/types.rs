//! JSON-RPC 2.0 envelope and response payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC request structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub method: String,
    pub params: Value,
    pub id: u64,
}

impl JsonRpcRequest {
    pub fn new(method: impl Into<String>, params: Value, id: u64) -> Self {
        Self {
            jsonrpc: "2.0",
            method: method.into(),
            params,
            id,
        }
    }
}

/// JSON-RPC response structure.
#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl std::fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RPC Error {}: {}", self.code, self.message)
    }
}

/// Subset of the `admin_nodeInfo` result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    pub enode: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub listen_addr: String,
}

/// Decode an Ethereum hex quantity (`"0x1a"`).
pub fn parse_quantity(raw: &str) -> Option<u64> {
    let digits = raw.strip_prefix("0x")?;
    if digits.is_empty() {
        return None;
    }
    u64::from_str_radix(digits, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("0x0"), Some(0));
        assert_eq!(parse_quantity("0x1a"), Some(26));
        assert_eq!(parse_quantity("26"), None);
        assert_eq!(parse_quantity("0x"), None);
    }

    #[test]
    fn test_request_envelope() {
        let request = JsonRpcRequest::new("eth_blockNumber", Value::Array(vec![]), 7);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["jsonrpc"], "2.0");
        assert_eq!(json["method"], "eth_blockNumber");
        assert_eq!(json["id"], 7);
        assert!(json["params"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_node_info_from_besu() {
        let raw = r#"{"enode":"enode://abc@0.0.0.0:30303","id":"abc","ip":"0.0.0.0","listenAddr":"0.0.0.0:30303","name":"besu/v24","ports":{"discovery":30303,"listener":30303}}"#;
        let info: NodeInfo = serde_json::from_str(raw).unwrap();
        assert_eq!(info.listen_addr, "0.0.0.0:30303");
        assert!(info.enode.starts_with("enode://"));
    }
}
