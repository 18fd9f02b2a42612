//! Container specifications and inspection results.

use std::collections::BTreeMap;
use std::fmt;
use std::net::Ipv4Addr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Label carrying the owning network name.
pub const LABEL_NETWORK: &str = "clique-net.network";
/// Label carrying the node name.
pub const LABEL_NODE: &str = "clique-net.node";
/// Label carrying the node role.
pub const LABEL_ROLE: &str = "clique-net.role";

/// Bind mount from the host into the container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeMount {
    pub host_path: PathBuf,
    pub container_path: String,
    pub read_only: bool,
}

impl VolumeMount {
    pub fn new(host_path: impl Into<PathBuf>, container_path: impl Into<String>) -> Self {
        Self {
            host_path: host_path.into(),
            container_path: container_path.into(),
            read_only: false,
        }
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }
}

/// Host port published for a container port (TCP).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortBinding {
    pub container_port: u16,
    pub host_port: u16,
}

impl PortBinding {
    /// Publish `port` under the same number on the host.
    pub fn same(port: u16) -> Self {
        Self {
            container_port: port,
            host_port: port,
        }
    }
}

/// Everything needed to start one container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    pub network: String,
    /// Static address on `network`; the runtime picks one when `None`.
    pub ip: Option<Ipv4Addr>,
    pub volumes: Vec<VolumeMount>,
    pub ports: Vec<PortBinding>,
    /// Arguments passed to the image entrypoint.
    pub command: Vec<String>,
    pub labels: BTreeMap<String, String>,
}

impl ContainerSpec {
    pub fn new(name: impl Into<String>, image: impl Into<String>, network: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            network: network.into(),
            ip: None,
            volumes: Vec::new(),
            ports: Vec::new(),
            command: Vec::new(),
            labels: BTreeMap::new(),
        }
    }

    pub fn with_ip(mut self, ip: Ipv4Addr) -> Self {
        self.ip = Some(ip);
        self
    }

    pub fn with_volume(mut self, volume: VolumeMount) -> Self {
        self.volumes.push(volume);
        self
    }

    pub fn with_port(mut self, port: PortBinding) -> Self {
        self.ports.push(port);
        self
    }

    pub fn with_command(mut self, command: Vec<String>) -> Self {
        self.command = command;
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }
}

/// Container status as reported by the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerState {
    Created,
    Running,
    Restarting,
    Paused,
    Exited,
    Dead,
    Unknown(String),
}

impl ContainerState {
    /// Map a runtime status string (`running`, `exited`, ...).
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "created" => Self::Created,
            "running" => Self::Running,
            "restarting" => Self::Restarting,
            "paused" => Self::Paused,
            "exited" => Self::Exited,
            "dead" => Self::Dead,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl fmt::Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => f.write_str("created"),
            Self::Running => f.write_str("running"),
            Self::Restarting => f.write_str("restarting"),
            Self::Paused => f.write_str("paused"),
            Self::Exited => f.write_str("exited"),
            Self::Dead => f.write_str("dead"),
            Self::Unknown(raw) => write!(f, "unknown({})", raw),
        }
    }
}

/// Inspection result for one container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerInfo {
    pub id: String,
    pub name: String,
    pub state: ContainerState,
    /// Address on the container's first network.
    pub ip_address: Option<Ipv4Addr>,
    pub ports: Vec<PortBinding>,
    pub labels: BTreeMap<String, String>,
}

impl ContainerInfo {
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }
}

/// Selection criteria for listing containers. All criteria must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerFilter {
    /// Attached to this network.
    pub network: Option<String>,
    /// Carrying all these labels.
    pub labels: BTreeMap<String, String>,
    /// Include containers that are not running.
    pub include_stopped: bool,
}

impl ContainerFilter {
    /// Containers attached to `network`, running or not.
    pub fn on_network(network: impl Into<String>) -> Self {
        Self {
            network: Some(network.into()),
            labels: BTreeMap::new(),
            include_stopped: true,
        }
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn running_only(mut self) -> Self {
        self.include_stopped = false;
        self
    }

    /// Whether `info` (attached to `network`) satisfies the filter.
    pub fn matches(&self, info: &ContainerInfo, network: &str) -> bool {
        if let Some(wanted) = &self.network {
            if wanted != network {
                return false;
            }
        }
        if !self.include_stopped && !info.state.is_running() {
            return false;
        }
        self.labels
            .iter()
            .all(|(key, value)| info.label(key) == Some(value.as_str()))
    }
}
