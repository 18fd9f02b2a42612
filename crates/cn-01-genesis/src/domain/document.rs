//! The genesis JSON document as consumed by Besu.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use shared_types::Address;

use super::extra_data::decode_extra_data;
use crate::error::{GenesisError, Result};

/// Clique engine parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliqueConfig {
    #[serde(rename = "blockperiodseconds")]
    pub block_period_seconds: u64,
    #[serde(rename = "epochlength")]
    pub epoch_length: u64,
    #[serde(rename = "createemptyblocks")]
    pub create_empty_blocks: bool,
}

/// Chain configuration. Every fork is active from block 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainConfig {
    pub chain_id: u64,
    pub homestead_block: u64,
    pub eip150_block: u64,
    pub eip155_block: u64,
    pub eip158_block: u64,
    pub byzantium_block: u64,
    pub constantinople_block: u64,
    pub petersburg_block: u64,
    pub istanbul_block: u64,
    pub berlin_block: u64,
    pub london_block: u64,
    pub clique: CliqueConfig,
}

impl ChainConfig {
    pub fn all_forks_at_genesis(chain_id: u64, clique: CliqueConfig) -> Self {
        Self {
            chain_id,
            homestead_block: 0,
            eip150_block: 0,
            eip155_block: 0,
            eip158_block: 0,
            byzantium_block: 0,
            constantinople_block: 0,
            petersburg_block: 0,
            istanbul_block: 0,
            berlin_block: 0,
            london_block: 0,
            clique,
        }
    }
}

/// One prefunded account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocEntry {
    /// `0x`-prefixed hex wei.
    pub balance: String,
}

impl AllocEntry {
    pub fn new(balance: U256) -> Self {
        Self {
            balance: format!("0x{:x}", balance),
        }
    }

    pub fn balance(&self) -> Option<U256> {
        let digits = self.balance.strip_prefix("0x").unwrap_or(&self.balance);
        U256::from_str_radix(digits, 16).ok()
    }
}

/// Genesis file contents.
///
/// `alloc` is keyed by lowercase hex address without `0x` and kept in a
/// `BTreeMap` so the serialised form is stable across runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenesisDocument {
    pub config: ChainConfig,
    pub nonce: String,
    pub timestamp: String,
    pub extra_data: String,
    pub gas_limit: String,
    pub difficulty: String,
    pub mix_hash: String,
    pub coinbase: String,
    pub alloc: BTreeMap<String, AllocEntry>,
}

impl GenesisDocument {
    pub fn chain_id(&self) -> u64 {
        self.config.chain_id
    }

    /// Signers encoded in extraData, in encoded order.
    pub fn validators(&self) -> Result<Vec<Address>> {
        let digits = self.extra_data.strip_prefix("0x").unwrap_or(&self.extra_data);
        let bytes = hex::decode(digits)
            .map_err(|e| GenesisError::MalformedExtraData(format!("invalid hex: {}", e)))?;
        decode_extra_data(&bytes)
    }

    /// Prefunded balance of `address`, if any.
    pub fn balance_of(&self, address: &Address) -> Option<U256> {
        self.alloc.get(&address.to_hex()).and_then(AllocEntry::balance)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Write the document to `path`, creating parent directories.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| GenesisError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, self.to_json_pretty()?).map_err(|source| GenesisError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn read_from(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| GenesisError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }
}
