//! Genesis configuration.

use std::collections::BTreeMap;

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use shared_types::{Address, ConfigurationError, DEFAULT_BLOCK_PERIOD, DEFAULT_EPOCH_LENGTH};

use crate::error::{GenesisError, Result};

/// Block gas limit written into genesis.
pub const DEFAULT_GAS_LIMIT: u64 = 0x1f_ffff_ffff_ffff;

/// How the signer list is ordered inside extraData.
///
/// Clique nodes sort signers themselves when tallying, so either order yields
/// the same consensus; `Ascending` gives a byte-stable document regardless of
/// declaration order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidatorOrdering {
    /// Keep the order the signers were declared in.
    #[default]
    Declaration,
    /// Sort by address bytes.
    Ascending,
}

/// Everything needed to build a Clique genesis document.
#[derive(Debug, Clone)]
pub struct GenesisConfig {
    pub chain_id: u64,
    /// Seconds between blocks.
    pub block_period: u64,
    /// Blocks per Clique epoch (vote checkpoint interval).
    pub epoch_length: u64,
    pub create_empty_blocks: bool,
    /// Initial signers.
    pub validators: Vec<Address>,
    /// Extra prefunded accounts. Entries override test account balances.
    pub allocations: BTreeMap<Address, U256>,
    /// Seed the well-known development accounts.
    pub include_test_accounts: bool,
    pub validator_ordering: ValidatorOrdering,
    pub gas_limit: u64,
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            chain_id: 1337,
            block_period: DEFAULT_BLOCK_PERIOD,
            epoch_length: DEFAULT_EPOCH_LENGTH,
            create_empty_blocks: true,
            validators: Vec::new(),
            allocations: BTreeMap::new(),
            include_test_accounts: true,
            validator_ordering: ValidatorOrdering::default(),
            gas_limit: DEFAULT_GAS_LIMIT,
        }
    }
}

impl GenesisConfig {
    /// Config for `chain_id` signed by `validators`, defaults elsewhere.
    pub fn new(chain_id: u64, validators: Vec<Address>) -> Self {
        Self {
            chain_id,
            validators,
            ..Default::default()
        }
    }

    pub fn with_block_period(mut self, seconds: u64) -> Self {
        self.block_period = seconds;
        self
    }

    pub fn with_epoch_length(mut self, blocks: u64) -> Self {
        self.epoch_length = blocks;
        self
    }

    pub fn with_allocation(mut self, address: Address, balance: U256) -> Self {
        self.allocations.insert(address, balance);
        self
    }

    pub fn with_ordering(mut self, ordering: ValidatorOrdering) -> Self {
        self.validator_ordering = ordering;
        self
    }

    pub fn without_test_accounts(mut self) -> Self {
        self.include_test_accounts = false;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.validators.is_empty() {
            return Err(ConfigurationError::EmptyValidatorSet.into());
        }
        if self.chain_id == 0 {
            return Err(invalid("chain_id", "must be non-zero"));
        }
        if self.block_period == 0 {
            return Err(invalid("block_period", "must be at least one second"));
        }
        if self.epoch_length == 0 {
            return Err(invalid("epoch_length", "must be at least one block"));
        }

        let mut seen = std::collections::BTreeSet::new();
        for validator in &self.validators {
            if !seen.insert(*validator) {
                return Err(GenesisError::DuplicateValidator(*validator));
            }
        }
        Ok(())
    }

    /// Signers in the order they go into extraData.
    pub fn ordered_validators(&self) -> Vec<Address> {
        let mut validators = self.validators.clone();
        if self.validator_ordering == ValidatorOrdering::Ascending {
            validators.sort();
        }
        validators
    }
}

fn invalid(field: &'static str, reason: &str) -> GenesisError {
    ConfigurationError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
    .into()
}
