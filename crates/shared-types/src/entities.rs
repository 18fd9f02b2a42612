//! # Domain Entities
//!
//! Node and network definitions as declared by the caller, plus the account
//! address value object.
//!
//! ## Invariants
//!
//! - Exactly one [`NodeRole::Bootnode`] per network.
//! - Node names, RPC ports, P2P ports and declared IPs are unique per network.
//! - Nodes are appended, never reordered.

use std::collections::HashSet;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::enode::Enode;
use crate::errors::{ConfigurationError, ParseError};
use crate::subnet::Ipv4Subnet;

/// Default Clique block period in seconds.
pub const DEFAULT_BLOCK_PERIOD: u64 = 5;

/// Default Clique epoch length in blocks.
pub const DEFAULT_EPOCH_LENGTH: u64 = 30_000;

// =============================================================================
// ADDRESS
// =============================================================================

/// A 20-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address([u8; 20]);

impl Address {
    /// Address length in bytes.
    pub const LEN: usize = 20;

    /// Wrap raw bytes.
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Lowercase hex without `0x`.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse hex with or without `0x`, any case.
    pub fn from_hex(raw: &str) -> Result<Self, ParseError> {
        let trimmed = raw.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let bytes = hex::decode(digits).map_err(|_| ParseError::InvalidAddress(raw.to_string()))?;
        let bytes: [u8; 20] = bytes
            .try_into()
            .map_err(|_| ParseError::InvalidAddress(raw.to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address(0x{})", self.to_hex())
    }
}

impl FromStr for Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_hex(&raw).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// NODE ROLE
// =============================================================================

/// What a node does in the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    /// P2P seed started before every other node.
    Bootnode,
    /// Clique signer.
    Signer,
    /// Clique signer that also runs the mining loop.
    Miner,
    /// Plain peer.
    Normal,
    /// Peer exposing a wider JSON-RPC surface for clients.
    Rpc,
}

impl NodeRole {
    /// Stable lowercase name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bootnode => "bootnode",
            Self::Signer => "signer",
            Self::Miner => "miner",
            Self::Normal => "normal",
            Self::Rpc => "rpc",
        }
    }

    /// Whether nodes of this role take part in Clique sealing.
    #[must_use]
    pub fn seals_blocks(&self) -> bool {
        match self {
            Self::Signer | Self::Miner => true,
            Self::Bootnode | Self::Normal | Self::Rpc => false,
        }
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// NODE DEFINITION
// =============================================================================

/// A node as declared by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDefinition {
    /// Unique within the network; also the container name suffix.
    pub name: String,
    pub role: NodeRole,
    /// Static address; allocated when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<Ipv4Addr>,
    /// JSON-RPC port, published on the host.
    pub rpc_port: u16,
    /// devp2p port inside the container network.
    pub p2p_port: u16,
    /// Part of the genesis signer set.
    #[serde(default)]
    pub is_validator: bool,
    /// Peer this node dials for discovery in addition to the bootnode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_to: Option<String>,
    /// Account address, known once key material exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

impl NodeDefinition {
    pub fn new(name: impl Into<String>, role: NodeRole, rpc_port: u16, p2p_port: u16) -> Self {
        Self {
            name: name.into(),
            role,
            ip: None,
            rpc_port,
            p2p_port,
            is_validator: false,
            linked_to: None,
            address: None,
        }
    }

    /// Pin the node to a static address.
    pub fn with_ip(mut self, ip: Ipv4Addr) -> Self {
        self.ip = Some(ip);
        self
    }

    /// Mark the node as a genesis signer.
    pub fn as_validator(mut self) -> Self {
        self.is_validator = true;
        self
    }

    /// Dial `peer` for discovery.
    pub fn linked_to(mut self, peer: impl Into<String>) -> Self {
        self.linked_to = Some(peer.into());
        self
    }
}

// =============================================================================
// NETWORK DEFINITION
// =============================================================================

fn default_block_period() -> u64 {
    DEFAULT_BLOCK_PERIOD
}

fn default_epoch_length() -> u64 {
    DEFAULT_EPOCH_LENGTH
}

/// A private Clique network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDefinition {
    pub name: String,
    pub chain_id: u64,
    pub subnet: Ipv4Subnet,
    /// Seconds between blocks.
    #[serde(default = "default_block_period")]
    pub block_period: u64,
    /// Blocks between Clique checkpoints.
    #[serde(default = "default_epoch_length")]
    pub epoch_length: u64,
    #[serde(default)]
    pub nodes: Vec<NodeDefinition>,
    /// Set once the bootnode answers `admin_nodeInfo`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bootnode_enode: Option<Enode>,
}

impl NetworkDefinition {
    pub fn new(name: impl Into<String>, chain_id: u64, subnet: Ipv4Subnet) -> Self {
        Self {
            name: name.into(),
            chain_id,
            subnet,
            block_period: DEFAULT_BLOCK_PERIOD,
            epoch_length: DEFAULT_EPOCH_LENGTH,
            nodes: Vec::new(),
            bootnode_enode: None,
        }
    }

    /// Append a node without validation (builder style).
    pub fn with_node(mut self, node: NodeDefinition) -> Self {
        self.nodes.push(node);
        self
    }

    /// The bootnode, if declared.
    pub fn bootnode(&self) -> Option<&NodeDefinition> {
        self.nodes.iter().find(|n| n.role == NodeRole::Bootnode)
    }

    pub fn node(&self, name: &str) -> Option<&NodeDefinition> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn node_mut(&mut self, name: &str) -> Option<&mut NodeDefinition> {
        self.nodes.iter_mut().find(|n| n.name == name)
    }

    /// Nodes baked into the genesis signer list, in declaration order.
    ///
    /// Sealing nodes flagged `is_validator` are genesis signers. When none
    /// is flagged, the first sealing node is.
    pub fn genesis_signers(&self) -> Vec<&NodeDefinition> {
        let flagged: Vec<&NodeDefinition> = self
            .nodes
            .iter()
            .filter(|n| n.role.seals_blocks() && n.is_validator)
            .collect();
        if !flagged.is_empty() {
            return flagged;
        }
        self.nodes
            .iter()
            .find(|n| n.role.seals_blocks())
            .into_iter()
            .collect()
    }

    /// Check every invariant of the definition.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.name.trim().is_empty() {
            return Err(ConfigurationError::EmptyNetworkName);
        }
        if self.chain_id == 0 {
            return Err(ConfigurationError::InvalidValue {
                field: "chain_id",
                reason: "must be non-zero".to_string(),
            });
        }
        if self.block_period == 0 {
            return Err(ConfigurationError::InvalidValue {
                field: "block_period",
                reason: "must be at least one second".to_string(),
            });
        }

        let bootnodes = self
            .nodes
            .iter()
            .filter(|n| n.role == NodeRole::Bootnode)
            .count();
        match bootnodes {
            0 => return Err(ConfigurationError::MissingBootnode),
            1 => {}
            count => return Err(ConfigurationError::MultipleBootnodes { count }),
        }

        for (index, node) in self.nodes.iter().enumerate() {
            check_node(&self.subnet, &self.nodes[..index], node)?;
        }

        if self.genesis_signers().is_empty() {
            return Err(ConfigurationError::EmptyValidatorSet);
        }
        Ok(())
    }

    /// Check that `node` can be appended to this (already valid) network.
    pub fn validate_addition(&self, node: &NodeDefinition) -> Result<(), ConfigurationError> {
        if node.role == NodeRole::Bootnode && self.bootnode().is_some() {
            return Err(ConfigurationError::MultipleBootnodes { count: 2 });
        }
        check_node(&self.subnet, &self.nodes, node)
    }

    /// Validate and append.
    pub fn push_node(&mut self, node: NodeDefinition) -> Result<(), ConfigurationError> {
        self.validate_addition(&node)?;
        self.nodes.push(node);
        Ok(())
    }

    /// Remove a node by name, keeping the order of the rest.
    pub fn remove_node(&mut self, name: &str) -> Option<NodeDefinition> {
        let index = self.nodes.iter().position(|n| n.name == name)?;
        Some(self.nodes.remove(index))
    }
}

/// Check `node` against the nodes declared before it.
fn check_node(
    subnet: &Ipv4Subnet,
    earlier: &[NodeDefinition],
    node: &NodeDefinition,
) -> Result<(), ConfigurationError> {
    if node.name.trim().is_empty() {
        return Err(ConfigurationError::EmptyNodeName);
    }
    if node.rpc_port == node.p2p_port {
        return Err(ConfigurationError::PortCollision {
            node: node.name.clone(),
            port: node.rpc_port,
        });
    }
    if node.is_validator && !node.role.seals_blocks() {
        return Err(ConfigurationError::ValidatorRoleMismatch {
            node: node.name.clone(),
            role: node.role,
        });
    }
    if let Some(ip) = node.ip {
        if !subnet.contains(ip) {
            return Err(ConfigurationError::IpOutsideSubnet {
                node: node.name.clone(),
                ip,
                subnet: subnet.to_string(),
            });
        }
    }

    let names: HashSet<&str> = earlier.iter().map(|n| n.name.as_str()).collect();
    if names.contains(node.name.as_str()) {
        return Err(ConfigurationError::DuplicateNodeName {
            node: node.name.clone(),
        });
    }
    if earlier.iter().any(|n| n.rpc_port == node.rpc_port) {
        return Err(ConfigurationError::DuplicateRpcPort {
            node: node.name.clone(),
            port: node.rpc_port,
        });
    }
    if earlier.iter().any(|n| n.p2p_port == node.p2p_port) {
        return Err(ConfigurationError::DuplicateP2pPort {
            node: node.name.clone(),
            port: node.p2p_port,
        });
    }
    if let Some(ip) = node.ip {
        if earlier.iter().any(|n| n.ip == Some(ip)) {
            return Err(ConfigurationError::DuplicateIp {
                node: node.name.clone(),
                ip,
            });
        }
    }
    if let Some(target) = &node.linked_to {
        if !names.contains(target.as_str()) {
            return Err(ConfigurationError::UnknownLink {
                node: node.name.clone(),
                target: target.clone(),
            });
        }
    }
    Ok(())
}
