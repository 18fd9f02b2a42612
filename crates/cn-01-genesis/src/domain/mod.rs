//! Genesis domain: configuration, the document written to disk and the
//! Clique extraData codec.

pub mod config;
pub mod document;
pub mod extra_data;
pub mod test_accounts;

pub use config::{GenesisConfig, ValidatorOrdering, DEFAULT_GAS_LIMIT};
pub use document::{AllocEntry, ChainConfig, CliqueConfig, GenesisDocument};
pub use extra_data::{decode_extra_data, encode_extra_data, extra_data_hex, extra_data_len};
pub use test_accounts::{test_account_balance, test_accounts};
