//! Besu TOML configuration file model.
//!
//! Field names match Besu's command-line options, which is what Besu expects
//! as keys in a `--config-file`.

use serde::{Deserialize, Serialize};

/// One node's `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BesuNodeConfig {
    pub data_path: String,
    pub genesis_file: String,
    pub node_private_key_file: String,
    pub network_id: u64,

    pub p2p_host: String,
    pub p2p_port: u16,
    pub discovery_enabled: bool,
    /// Enode URLs to dial. Empty only for the bootnode.
    pub bootnodes: Vec<String>,

    pub rpc_http_enabled: bool,
    pub rpc_http_host: String,
    pub rpc_http_port: u16,
    pub rpc_http_api: Vec<String>,
    pub rpc_http_cors_origins: Vec<String>,
    pub host_allowlist: Vec<String>,

    pub min_gas_price: u64,
    pub miner_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub miner_coinbase: Option<String>,
}

impl BesuNodeConfig {
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }
}
