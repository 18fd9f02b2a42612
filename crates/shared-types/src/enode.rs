//! Enode URLs (`enode://<node-id>@<host>:<port>?discport=<port>`).

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::ParseError;

/// Hex length of a node id (64-byte uncompressed public key without prefix).
pub const NODE_ID_HEX_LEN: usize = 128;

/// Hosts a client advertises when bound to every interface.
const WILDCARD_HOSTS: [&str; 3] = ["0.0.0.0", "[::]", "::"];

/// A parsed enode URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Enode {
    /// Lowercase hex node id.
    pub node_id: String,
    /// Host part as advertised (IP literal, IPv6 kept in brackets).
    pub host: String,
    /// TCP listening port.
    pub port: u16,
    /// UDP discovery port when it differs from `port`.
    pub discovery_port: Option<u16>,
}

impl Enode {
    /// Build an enode for a node reachable at `ip:port`.
    pub fn from_parts(node_id: &str, ip: Ipv4Addr, port: u16) -> Result<Self, ParseError> {
        let node_id = normalise_node_id(node_id)?;
        Ok(Self {
            node_id,
            host: ip.to_string(),
            port,
            discovery_port: None,
        })
    }

    /// Whether the advertised host is an any-interface bind address.
    pub fn is_wildcard_host(&self) -> bool {
        WILDCARD_HOSTS.contains(&self.host.as_str())
    }

    /// Replace the advertised host.
    pub fn with_host(mut self, ip: Ipv4Addr) -> Self {
        self.host = ip.to_string();
        self
    }
}

fn normalise_node_id(raw: &str) -> Result<String, ParseError> {
    let id = raw.strip_prefix("0x").unwrap_or(raw).to_ascii_lowercase();
    if id.len() != NODE_ID_HEX_LEN || !id.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ParseError::InvalidEnode(format!(
            "node id must be {} hex characters",
            NODE_ID_HEX_LEN
        )));
    }
    Ok(id)
}

impl fmt::Display for Enode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "enode://{}@{}:{}", self.node_id, self.host, self.port)?;
        if let Some(discport) = self.discovery_port {
            write!(f, "?discport={}", discport)?;
        }
        Ok(())
    }
}

impl FromStr for Enode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidEnode(s.to_string());

        let rest = s.trim().strip_prefix("enode://").ok_or_else(invalid)?;
        let (node_id, location) = rest.split_once('@').ok_or_else(invalid)?;
        let node_id = normalise_node_id(node_id)?;

        let (endpoint, query) = match location.split_once('?') {
            Some((endpoint, query)) => (endpoint, Some(query)),
            None => (location, None),
        };
        let (host, port) = endpoint.rsplit_once(':').ok_or_else(invalid)?;
        if host.is_empty() {
            return Err(invalid());
        }
        let port: u16 = port.parse().map_err(|_| invalid())?;

        let mut discovery_port = None;
        if let Some(query) = query {
            for pair in query.split('&') {
                if let Some(value) = pair.strip_prefix("discport=") {
                    discovery_port = Some(value.parse().map_err(|_| invalid())?);
                }
            }
        }

        Ok(Self {
            node_id,
            host: host.to_string(),
            port,
            discovery_port,
        })
    }
}

impl Serialize for Enode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Enode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
