//! # Clique Genesis
//!
//! Builds the `genesis.json` shared by every node of a Clique network.
//!
//! ## Invariants
//!
//! - The validator list is non-empty.
//! - extraData length is `32 + 20·V + 65` bytes for `V` validators.
//! - Output is deterministic for a given [`GenesisConfig`].
//!
//! ## Usage
//!
//! ```ignore
//! let config = GenesisConfig::new(1337, vec![miner_address]);
//! let genesis = GenesisBuilder::new(config).build()?;
//! genesis.write_to(&network_dir.join("genesis.json"))?;
//! ```

pub mod builder;
pub mod domain;
pub mod error;

pub use builder::GenesisBuilder;
pub use domain::*;
pub use error::{GenesisError, Result};
