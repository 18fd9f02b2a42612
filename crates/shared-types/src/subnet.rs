//! IPv4 CIDR blocks for container networks.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::ParseError;

/// An IPv4 network in CIDR notation, normalised to its network address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Subnet {
    network: Ipv4Addr,
    prefix_len: u8,
}

impl Ipv4Subnet {
    /// Range assumed when a network's real subnet cannot be determined.
    pub const DEVNET_FALLBACK: Ipv4Subnet = Ipv4Subnet {
        network: Ipv4Addr::new(172, 28, 0, 0),
        prefix_len: 16,
    };

    /// Build a subnet; host bits of `addr` are cleared.
    pub fn new(addr: Ipv4Addr, prefix_len: u8) -> Result<Self, ParseError> {
        if prefix_len > 32 {
            return Err(ParseError::InvalidSubnet(format!(
                "{}/{}: prefix length exceeds 32",
                addr, prefix_len
            )));
        }
        let network = Ipv4Addr::from(u32::from(addr) & Self::mask_for(prefix_len));
        Ok(Self {
            network,
            prefix_len,
        })
    }

    fn mask_for(prefix_len: u8) -> u32 {
        if prefix_len == 0 {
            0
        } else {
            u32::MAX << (32 - u32::from(prefix_len))
        }
    }

    /// Network address (host bits zero).
    pub fn network(&self) -> Ipv4Addr {
        self.network
    }

    /// Prefix length in bits.
    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Netmask as a host-order integer.
    pub fn mask(&self) -> u32 {
        Self::mask_for(self.prefix_len)
    }

    /// Whether `ip` lies inside this block.
    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        u32::from(ip) & self.mask() == u32::from(self.network)
    }

    /// The `/16` enclosing this block's network address.
    pub fn enclosing_16(&self) -> Ipv4Subnet {
        let [a, b, _, _] = self.network.octets();
        Self {
            network: Ipv4Addr::new(a, b, 0, 0),
            prefix_len: 16,
        }
    }
}

impl fmt::Display for Ipv4Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix_len)
    }
}

impl FromStr for Ipv4Subnet {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr, prefix) = s
            .trim()
            .split_once('/')
            .ok_or_else(|| ParseError::InvalidSubnet(s.to_string()))?;
        let addr: Ipv4Addr = addr
            .parse()
            .map_err(|_| ParseError::InvalidSubnet(s.to_string()))?;
        let prefix: u8 = prefix
            .parse()
            .map_err(|_| ParseError::InvalidSubnet(s.to_string()))?;
        Self::new(addr, prefix)
    }
}

impl Serialize for Ipv4Subnet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Ipv4Subnet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
