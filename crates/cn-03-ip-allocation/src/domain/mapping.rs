//! Persisted node → address record of one network.

use std::collections::{BTreeMap, BTreeSet};
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

/// Contents of `ip_mappings.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpMappings {
    pub network: String,
    #[serde(default)]
    pub mappings: BTreeMap<String, Ipv4Addr>,
}

impl IpMappings {
    pub fn new(network: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            mappings: BTreeMap::new(),
        }
    }

    pub fn get(&self, node: &str) -> Option<Ipv4Addr> {
        self.mappings.get(node).copied()
    }

    /// Node holding `ip`, if any.
    pub fn owner_of(&self, ip: Ipv4Addr) -> Option<&str> {
        self.mappings
            .iter()
            .find(|(_, mapped)| **mapped == ip)
            .map(|(node, _)| node.as_str())
    }

    pub fn assigned(&self) -> BTreeSet<Ipv4Addr> {
        self.mappings.values().copied().collect()
    }

    pub fn insert(&mut self, node: impl Into<String>, ip: Ipv4Addr) {
        self.mappings.insert(node.into(), ip);
    }

    pub fn remove(&mut self, node: &str) -> Option<Ipv4Addr> {
        self.mappings.remove(node)
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}
