//! # File Mapping Store
//!
//! One JSON document per network at `<data_root>/<network>/ip_mappings.json`.
//! Updates take the store lock, re-read the file, apply the change and
//! replace the file atomically (write to a temp file, then rename).

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::trace;

use super::lock::{StoreLock, DEFAULT_LOCK_TIMEOUT};
use crate::domain::IpMappings;
use crate::error::{IpAllocationError, Result};

/// Mapping store file name inside a network directory.
pub const MAPPING_FILE: &str = "ip_mappings.json";
const LOCK_FILE: &str = "ip_mappings.lock";

/// Mapping stores rooted at a data directory.
#[derive(Debug, Clone)]
pub struct FileMappingStore {
    data_root: PathBuf,
    lock_timeout: Duration,
}

impl FileMappingStore {
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    /// Store file of `network`.
    pub fn path(&self, network: &str) -> PathBuf {
        self.data_root.join(network).join(MAPPING_FILE)
    }

    /// Current mappings; an absent store reads as empty.
    pub fn load(&self, network: &str) -> Result<IpMappings> {
        let path = self.path(network);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(IpMappings::new(network)),
            Err(source) => return Err(IpAllocationError::Io { path, source }),
        };
        let mappings: IpMappings = serde_json::from_str(&raw)
            .map_err(|source| IpAllocationError::Corrupt {
                path: path.clone(),
                source,
            })?;
        if mappings.network != network {
            return Err(IpAllocationError::NetworkMismatch {
                path,
                expected: network.to_string(),
                found: mappings.network,
            });
        }
        Ok(mappings)
    }

    /// Locked read-modify-write. The file is rewritten only if `apply`
    /// changed the mappings.
    pub fn update<T, F>(&self, network: &str, apply: F) -> Result<T>
    where
        F: FnOnce(&mut IpMappings) -> Result<T>,
    {
        let dir = self.data_root.join(network);
        fs::create_dir_all(&dir).map_err(|source| IpAllocationError::Io {
            path: dir.clone(),
            source,
        })?;
        let _lock = StoreLock::acquire(&dir.join(LOCK_FILE), self.lock_timeout)?;

        let before = self.load(network)?;
        let mut after = before.clone();
        let value = apply(&mut after)?;
        if after != before {
            self.save(&after)?;
        }
        Ok(value)
    }

    fn save(&self, mappings: &IpMappings) -> Result<()> {
        let path = self.path(&mappings.network);
        let tmp = path.with_extension("json.tmp");
        let rendered = serde_json::to_string_pretty(mappings).map_err(|source| {
            IpAllocationError::Corrupt {
                path: path.clone(),
                source,
            }
        })?;
        fs::write(&tmp, rendered).map_err(|source| IpAllocationError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| IpAllocationError::Io {
            path: path.clone(),
            source,
        })?;
        trace!(network = %mappings.network, entries = mappings.len(), "Mapping store written");
        Ok(())
    }
}
