//! Paths as seen from inside a node container.

use serde::{Deserialize, Serialize};

/// Mount points and file locations inside the Besu container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerPaths {
    /// Node directory mount point.
    pub data_dir: String,
    /// Shared genesis file mount point.
    pub genesis_file: String,
}

impl Default for ContainerPaths {
    fn default() -> Self {
        Self {
            data_dir: "/opt/besu/data".to_string(),
            genesis_file: "/opt/besu/genesis.json".to_string(),
        }
    }
}

impl ContainerPaths {
    /// Rendered config file inside the container.
    pub fn config_file(&self) -> String {
        format!("{}/{}", self.data_dir, crate::CONFIG_FILE)
    }

    /// Node private key inside the container.
    pub fn key_file(&self) -> String {
        format!("{}/key", self.data_dir)
    }

    /// Container command line.
    pub fn command(&self) -> Vec<String> {
        vec![format!("--config-file={}", self.config_file())]
    }
}
