//! Network and node definition files.
//!
//! `.json` files are read with serde_json, everything else as TOML. The
//! persisted copy under the data root is always JSON.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use shared_types::{NetworkDefinition, NodeDefinition};

use crate::error::{OrchestratorError, Result};

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn read_definition<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).map_err(|e| OrchestratorError::Definition {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let parsed = if is_json(path) {
        serde_json::from_str(&raw).map_err(|e| e.to_string())
    } else {
        toml::from_str(&raw).map_err(|e| e.to_string())
    };
    parsed.map_err(|reason| OrchestratorError::Definition {
        path: path.to_path_buf(),
        reason,
    })
}

/// Read a network definition (JSON or TOML).
pub fn read_network_definition(path: &Path) -> Result<NetworkDefinition> {
    read_definition(path)
}

/// Read a single node definition (JSON or TOML).
pub fn read_node_definition(path: &Path) -> Result<NodeDefinition> {
    read_definition(path)
}

/// Persist `network` as pretty JSON.
pub fn write_network_definition(path: &Path, network: &NetworkDefinition) -> Result<()> {
    let json = serde_json::to_string_pretty(network).map_err(|e| OrchestratorError::Definition {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| OrchestratorError::io(&network.name, parent, e))?;
    }
    fs::write(path, json).map_err(|e| OrchestratorError::io(&network.name, path, e))
}
