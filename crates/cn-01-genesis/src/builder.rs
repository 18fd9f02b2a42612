//! # Genesis Builder
//!
//! Turns a [`GenesisConfig`] into the [`GenesisDocument`] every node of a
//! network boots from.
//!
//! ## Output
//!
//! - `extraData` = 32 zero bytes ‖ 20-byte signer addresses ‖ 65 zero bytes
//! - `alloc` = test accounts (optional) plus explicit allocations
//! - all forks active at block 0, difficulty 1, zero mix hash and coinbase

use std::collections::BTreeMap;

use shared_types::Address;
use tracing::{debug, info};

use crate::domain::{
    extra_data_hex, test_account_balance, test_accounts, AllocEntry, ChainConfig, CliqueConfig,
    GenesisConfig, GenesisDocument,
};
use crate::error::Result;

const GENESIS_NONCE: &str = "0x0";
const GENESIS_TIMESTAMP: &str = "0x0";
const GENESIS_DIFFICULTY: &str = "0x1";

/// Genesis document builder.
pub struct GenesisBuilder {
    config: GenesisConfig,
}

impl GenesisBuilder {
    pub fn new(config: GenesisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GenesisConfig {
        &self.config
    }

    /// Build the genesis document.
    ///
    /// Deterministic: the same config always serialises to the same bytes.
    pub fn build(&self) -> Result<GenesisDocument> {
        self.config.validate()?;

        let validators = self.config.ordered_validators();
        let extra_data = extra_data_hex(&validators);
        let alloc = self.allocations();

        let clique = CliqueConfig {
            block_period_seconds: self.config.block_period,
            epoch_length: self.config.epoch_length,
            create_empty_blocks: self.config.create_empty_blocks,
        };

        info!(
            chain_id = self.config.chain_id,
            validators = validators.len(),
            accounts = alloc.len(),
            "Built Clique genesis"
        );

        Ok(GenesisDocument {
            config: ChainConfig::all_forks_at_genesis(self.config.chain_id, clique),
            nonce: GENESIS_NONCE.to_string(),
            timestamp: GENESIS_TIMESTAMP.to_string(),
            extra_data,
            gas_limit: format!("0x{:x}", self.config.gas_limit),
            difficulty: GENESIS_DIFFICULTY.to_string(),
            mix_hash: format!("0x{}", "00".repeat(32)),
            coinbase: format!("0x{}", "00".repeat(Address::LEN)),
            alloc,
        })
    }

    fn allocations(&self) -> BTreeMap<String, AllocEntry> {
        let mut alloc = BTreeMap::new();
        if self.config.include_test_accounts {
            let balance = test_account_balance();
            for account in test_accounts() {
                alloc.insert(account.to_hex(), AllocEntry::new(balance));
            }
        }
        for (address, balance) in &self.config.allocations {
            debug!(%address, %balance, "Prefunding account");
            alloc.insert(address.to_hex(), AllocEntry::new(*balance));
        }
        alloc
    }
}
