//! # Error Types
//!
//! Defines error types used across crates.

use std::net::Ipv4Addr;

use thiserror::Error;

use crate::entities::NodeRole;

/// Errors raised while parsing value objects from strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Not a 20-byte hex address.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Not an IPv4 CIDR block.
    #[error("Invalid subnet: {0}")]
    InvalidSubnet(String),

    /// Not an `enode://<id>@<host>:<port>` URL.
    #[error("Invalid enode: {0}")]
    InvalidEnode(String),
}

/// Violations of the network definition invariants.
///
/// The orchestrator wraps these with the offending network name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// Network name is empty.
    #[error("Network name must not be empty")]
    EmptyNetworkName,

    /// Node name is empty.
    #[error("Node name must not be empty")]
    EmptyNodeName,

    /// No node has the bootnode role.
    #[error("Network has no bootnode")]
    MissingBootnode,

    /// More than one node has the bootnode role.
    #[error("Network declares {count} bootnodes, exactly one is required")]
    MultipleBootnodes { count: usize },

    /// Two nodes share a name.
    #[error("Duplicate node name: {node}")]
    DuplicateNodeName { node: String },

    /// Two nodes share an RPC port.
    #[error("Node {node} reuses RPC port {port}")]
    DuplicateRpcPort { node: String, port: u16 },

    /// Two nodes share a P2P port.
    #[error("Node {node} reuses P2P port {port}")]
    DuplicateP2pPort { node: String, port: u16 },

    /// A node's RPC and P2P ports are the same.
    #[error("Node {node} uses port {port} for both RPC and P2P")]
    PortCollision { node: String, port: u16 },

    /// Two nodes share an IP address.
    #[error("Node {node} reuses IP address {ip}")]
    DuplicateIp { node: String, ip: Ipv4Addr },

    /// A declared IP lies outside the network subnet.
    #[error("Node {node} address {ip} is outside subnet {subnet}")]
    IpOutsideSubnet {
        node: String,
        ip: Ipv4Addr,
        subnet: String,
    },

    /// `linked_to` names a node that is not declared before it.
    #[error("Node {node} links to unknown node {target}")]
    UnknownLink { node: String, target: String },

    /// `is_validator` set on a role that never seals blocks.
    #[error("Node {node} has role {role} and cannot be a genesis validator")]
    ValidatorRoleMismatch { node: String, role: NodeRole },

    /// Clique requires at least one signer in genesis.
    #[error("Validator set is empty, Clique requires at least one signer")]
    EmptyValidatorSet,

    /// A node needs an account address that has not been materialised.
    #[error("Node {node} has no account address")]
    MissingAddress { node: String },

    /// The bootnode cannot be removed from a running network.
    #[error("Bootnode {node} cannot be removed")]
    BootnodeRemoval { node: String },

    /// Node is not part of the network.
    #[error("Unknown node: {node}")]
    UnknownNode { node: String },

    /// A scalar parameter is out of range.
    #[error("Invalid {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// A lifecycle transition that the node state machine does not allow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Node {node} cannot move from {from} to {to}")]
pub struct InvalidTransition {
    pub node: String,
    pub from: String,
    pub to: String,
}
