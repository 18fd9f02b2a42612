//! # Orchestrator Configuration
//!
//! Loading order: defaults → optional TOML file → environment overrides.
//!
//! ```toml
//! data_root = "./devnet-data"
//! besu_image = "hyperledger/besu:latest"
//! rpc_host = "127.0.0.1"
//!
//! [readiness]
//! max_attempts = 30
//! interval_ms = 2000
//!
//! [genesis]
//! validator_ordering = "declaration"
//! include_test_accounts = true
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;

use cn_01_genesis::ValidatorOrdering;
use cn_02_node_config::ContainerPaths;
use cn_06_consensus_membership::MembershipConfig;
use serde::{Deserialize, Serialize};
use shared_types::{Ipv4Subnet, RetryPolicy};
use thiserror::Error;
use tracing::warn;

/// Complete orchestrator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Root of all per-network data directories.
    pub data_root: PathBuf,
    /// Client image every node runs.
    pub besu_image: String,
    /// Container runtime CLI.
    pub docker_binary: PathBuf,
    /// Host on which node RPC ports are published.
    pub rpc_host: String,
    /// Readiness polling (`eth_blockNumber`) after a container starts.
    pub readiness: RetryPolicy,
    /// Clique voting.
    pub membership: MembershipConfig,
    /// Genesis generation.
    pub genesis: GenesisSettings,
    /// Range used when the runtime cannot report a network's subnet.
    pub fallback_subnet: Ipv4Subnet,
    /// Mount points inside node containers.
    pub container_paths: ContainerPaths,
}

/// Genesis options that are not part of a network definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenesisSettings {
    pub validator_ordering: ValidatorOrdering,
    /// Seed the well-known development accounts.
    pub include_test_accounts: bool,
}

impl Default for GenesisSettings {
    fn default() -> Self {
        Self {
            validator_ordering: ValidatorOrdering::Declaration,
            include_test_accounts: true,
        }
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("./devnet-data"),
            besu_image: "hyperledger/besu:latest".to_string(),
            docker_binary: PathBuf::from("docker"),
            rpc_host: "127.0.0.1".to_string(),
            readiness: RetryPolicy::default(),
            membership: MembershipConfig::default(),
            genesis: GenesisSettings::default(),
            fallback_subnet: Ipv4Subnet::DEVNET_FALLBACK,
            container_paths: ContainerPaths::default(),
        }
    }
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl OrchestratorConfig {
    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Defaults, then `path` if given, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply `CN_*` overrides looked up through `lookup`.
    ///
    /// Unparseable numeric values are ignored with a warning.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup("CN_DATA_ROOT") {
            self.data_root = PathBuf::from(root);
        }
        if let Some(image) = lookup("CN_BESU_IMAGE") {
            self.besu_image = image;
        }
        if let Some(binary) = lookup("CN_DOCKER_BIN") {
            self.docker_binary = PathBuf::from(binary);
        }
        if let Some(host) = lookup("CN_RPC_HOST") {
            self.rpc_host = host;
        }
        if let Some(attempts) = parsed(&lookup, "CN_READINESS_ATTEMPTS") {
            self.readiness.max_attempts = attempts;
        }
        if let Some(interval) = parsed(&lookup, "CN_READINESS_INTERVAL_MS") {
            self.readiness.interval_ms = interval;
        }
    }
}

fn parsed<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparseable override");
            None
        }
    }
}
