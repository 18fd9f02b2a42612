//! # Network Registry
//!
//! The set of networks this process manages, plus an optional default
//! network used when an operation names none. The registry is owned by the
//! [`ControlPlane`](crate::ControlPlane) and handed out by reference.
//!
//! ```text
//! register ──→ get / update ──→ remove
//!     │                           │
//!     └─ first one becomes default └─ default cleared if it was this one
//! ```

use std::collections::BTreeMap;

use parking_lot::RwLock;
use shared_types::NetworkDefinition;
use tracing::info;

use crate::error::{OrchestratorError, Result};

/// Registered network definitions.
#[derive(Default)]
pub struct NetworkRegistry {
    networks: RwLock<BTreeMap<String, NetworkDefinition>>,
    default_network: RwLock<Option<String>>,
}

impl NetworkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a network. The first registered network becomes the default.
    pub fn register(&self, network: NetworkDefinition) -> Result<()> {
        let name = network.name.clone();
        {
            let mut networks = self.networks.write();
            if networks.contains_key(&name) {
                return Err(OrchestratorError::NetworkExists { network: name });
            }
            networks.insert(name.clone(), network);
        }

        let mut default = self.default_network.write();
        if default.is_none() {
            *default = Some(name.clone());
        }
        info!(network = %name, "[Registry] Network registered");
        Ok(())
    }

    /// Add or replace a network.
    pub fn upsert(&self, network: NetworkDefinition) {
        let name = network.name.clone();
        self.networks.write().insert(name.clone(), network);
        let mut default = self.default_network.write();
        if default.is_none() {
            *default = Some(name);
        }
    }

    /// Snapshot of a network definition.
    pub fn get(&self, name: &str) -> Option<NetworkDefinition> {
        self.networks.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.networks.read().contains_key(name)
    }

    /// Mutate a registered network in place.
    pub fn update<T, F>(&self, name: &str, apply: F) -> Result<T>
    where
        F: FnOnce(&mut NetworkDefinition) -> T,
    {
        let mut networks = self.networks.write();
        let network = networks
            .get_mut(name)
            .ok_or_else(|| OrchestratorError::UnknownNetwork {
                network: name.to_string(),
            })?;
        Ok(apply(network))
    }

    /// Drop a network, clearing the default if it pointed here.
    pub fn remove(&self, name: &str) -> Option<NetworkDefinition> {
        let removed = self.networks.write().remove(name);
        if removed.is_some() {
            let mut default = self.default_network.write();
            if default.as_deref() == Some(name) {
                *default = None;
            }
            info!(network = %name, "[Registry] Network removed");
        }
        removed
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.networks.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.networks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.read().is_empty()
    }

    /// Make `name` the default network.
    pub fn set_default(&self, name: &str) -> Result<()> {
        if !self.contains(name) {
            return Err(OrchestratorError::UnknownNetwork {
                network: name.to_string(),
            });
        }
        *self.default_network.write() = Some(name.to_string());
        Ok(())
    }

    pub fn default_network(&self) -> Option<String> {
        self.default_network.read().clone()
    }

    /// `name` if given, otherwise the default network.
    pub fn resolve(&self, name: Option<&str>) -> Result<String> {
        match name {
            Some(name) if self.contains(name) => Ok(name.to_string()),
            Some(name) => Err(OrchestratorError::UnknownNetwork {
                network: name.to_string(),
            }),
            None => self
                .default_network()
                .ok_or_else(|| OrchestratorError::UnknownNetwork {
                    network: "<default>".to_string(),
                }),
        }
    }
}
