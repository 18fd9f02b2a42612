//! On-disk layout of network data.
//!
//! ```text
//! <data_root>/
//! └── <network>/
//!     ├── genesis.json
//!     ├── network.json
//!     ├── ip_mappings.json
//!     └── <node>/
//!         ├── key, address, publicKey
//!         ├── config.toml
//!         └── enode            (bootnode only)
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use shared_types::Enode;

use crate::error::{OrchestratorError, Result};

pub const GENESIS_FILE: &str = "genesis.json";
pub const DEFINITION_FILE: &str = "network.json";
pub const ENODE_FILE: &str = "enode";

/// Path arithmetic over the data root.
#[derive(Debug, Clone)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    /// Relative roots are made absolute so they can be bind-mounted.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let root = std::path::absolute(&root).unwrap_or(root);
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn network_dir(&self, network: &str) -> PathBuf {
        self.root.join(network)
    }

    pub fn node_dir(&self, network: &str, node: &str) -> PathBuf {
        self.network_dir(network).join(node)
    }

    pub fn genesis_file(&self, network: &str) -> PathBuf {
        self.network_dir(network).join(GENESIS_FILE)
    }

    pub fn definition_file(&self, network: &str) -> PathBuf {
        self.network_dir(network).join(DEFINITION_FILE)
    }

    pub fn enode_file(&self, network: &str, node: &str) -> PathBuf {
        self.node_dir(network, node).join(ENODE_FILE)
    }

    /// Persist the bootnode enode next to its keys.
    pub fn write_enode(&self, network: &str, node: &str, enode: &Enode) -> Result<PathBuf> {
        let path = self.enode_file(network, node);
        fs::write(&path, enode.to_string()).map_err(|e| OrchestratorError::io(network, &path, e))?;
        Ok(path)
    }

    /// Networks that have a persisted definition.
    pub fn persisted_networks(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(OrchestratorError::io("*", &self.root, e)),
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().join(DEFINITION_FILE).is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        names.sort();
        Ok(names)
    }
}
