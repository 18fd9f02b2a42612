//! Container network description.

use serde::{Deserialize, Serialize};
use shared_types::Ipv4Subnet;

/// A user-defined container network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub id: String,
    pub name: String,
    /// First IPAM subnet, if the runtime reports one.
    pub subnet: Option<Ipv4Subnet>,
}
