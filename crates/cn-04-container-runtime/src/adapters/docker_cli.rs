//! # Docker CLI Adapter
//!
//! Drives the `docker` executable through `tokio::process`, parsing the JSON
//! that `docker inspect` prints. Any executable speaking the same CLI
//! (e.g. `podman`) can be configured instead.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use shared_types::Ipv4Subnet;
use tokio::process::Command;
use tracing::{debug, info};

use crate::domain::{
    ContainerFilter, ContainerInfo, ContainerSpec, ContainerState, NetworkInfo, PortBinding,
    LABEL_NETWORK,
};
use crate::error::{Result, RuntimeError};
use crate::ports::ContainerRuntime;

/// Container runtime backed by the Docker command line.
#[derive(Debug, Clone)]
pub struct DockerCli {
    binary: PathBuf,
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new("docker")
    }
}

impl DockerCli {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    async fn exec(&self, args: &[String]) -> Result<String> {
        let command_line = format!("{} {}", self.binary.display(), args.join(" "));
        debug!(command = %command_line, "Running container runtime command");

        let output = Command::new(&self.binary)
            .args(args)
            .output()
            .await
            .map_err(|source| RuntimeError::Spawn {
                program: self.binary.display().to_string(),
                source,
            })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            Err(RuntimeError::CommandFailed {
                command: command_line,
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    /// Like [`Self::exec`], mapping "no such object" failures to `None`.
    async fn exec_optional(&self, args: &[String]) -> Result<Option<String>> {
        match self.exec(args).await {
            Ok(out) => Ok(Some(out)),
            Err(RuntimeError::CommandFailed { stderr, .. }) if is_not_found(&stderr) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl ContainerRuntime for DockerCli {
    async fn create_network(&self, name: &str, subnet: Option<Ipv4Subnet>) -> Result<String> {
        let mut args = strings(&["network", "create", "--driver", "bridge"]);
        if let Some(subnet) = subnet {
            args.push("--subnet".into());
            args.push(subnet.to_string());
        }
        args.push("--label".into());
        args.push(format!("{}={}", LABEL_NETWORK, name));
        args.push(name.to_string());

        let id = self.exec(&args).await?;
        info!(network = name, id = %id, "Created container network");
        Ok(id)
    }

    async fn inspect_network(&self, name: &str) -> Result<Option<NetworkInfo>> {
        let args = strings(&["network", "inspect", name]);
        match self.exec_optional(&args).await? {
            Some(raw) => Ok(parse_network_inspect(&raw)?.into_iter().next()),
            None => Ok(None),
        }
    }

    async fn remove_network(&self, name: &str, remove_containers: bool) -> Result<()> {
        if remove_containers {
            for container in self.list_containers(&ContainerFilter::on_network(name)).await? {
                self.remove_container(&container.name).await?;
            }
        }
        if self.exec_optional(&strings(&["network", "rm", name])).await?.is_some() {
            info!(network = name, "Removed container network");
        }
        Ok(())
    }

    async fn run_container(&self, spec: &ContainerSpec) -> Result<String> {
        let id = self.exec(&run_args(spec)).await?;
        info!(container = %spec.name, network = %spec.network, id = %id, "Started container");
        Ok(id)
    }

    async fn start_container(&self, name: &str) -> Result<()> {
        self.exec(&strings(&["start", name]))
            .await
            .map(|_| ())
            .map_err(|e| missing_container(name, e))
    }

    async fn stop_container(&self, name: &str) -> Result<()> {
        self.exec(&strings(&["stop", name]))
            .await
            .map(|_| ())
            .map_err(|e| missing_container(name, e))
    }

    async fn remove_container(&self, name: &str) -> Result<()> {
        self.exec_optional(&strings(&["rm", "-f", name])).await.map(|_| ())
    }

    async fn container_info(&self, name: &str) -> Result<Option<ContainerInfo>> {
        let args = strings(&["inspect", "--type", "container", name]);
        match self.exec_optional(&args).await? {
            Some(raw) => Ok(parse_container_inspect(&raw)?.into_iter().next()),
            None => Ok(None),
        }
    }

    async fn list_containers(&self, filter: &ContainerFilter) -> Result<Vec<ContainerInfo>> {
        let mut args = strings(&["ps", "--no-trunc", "--format", "{{.Names}}"]);
        if filter.include_stopped {
            args.push("--all".into());
        }
        if let Some(network) = &filter.network {
            args.push("--filter".into());
            args.push(format!("network={}", network));
        }
        for (key, value) in &filter.labels {
            args.push("--filter".into());
            args.push(format!("label={}={}", key, value));
        }

        let names = self.exec(&args).await?;
        let mut containers = Vec::new();
        for name in names.lines().map(str::trim).filter(|n| !n.is_empty()) {
            if let Some(info) = self.container_info(name).await? {
                containers.push(info);
            }
        }
        Ok(containers)
    }
}

fn strings(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

fn is_not_found(stderr: &str) -> bool {
    let lower = stderr.to_ascii_lowercase();
    lower.contains("no such") || lower.contains("not found")
}

/// Turn a "no such container" failure into [`RuntimeError::NotFound`].
pub fn missing_container(name: &str, error: RuntimeError) -> RuntimeError {
    match error {
        RuntimeError::CommandFailed { ref stderr, .. } if is_not_found(stderr) => RuntimeError::NotFound {
            kind: "container",
            name: name.to_string(),
        },
        other => other,
    }
}

/// `docker run` arguments for `spec`.
pub fn run_args(spec: &ContainerSpec) -> Vec<String> {
    let mut args = strings(&["run", "--detach", "--name"]);
    args.push(spec.name.clone());
    args.push("--network".into());
    args.push(spec.network.clone());
    if let Some(ip) = spec.ip {
        args.push("--ip".into());
        args.push(ip.to_string());
    }
    for volume in &spec.volumes {
        args.push("--volume".into());
        let mut mount = format!("{}:{}", volume.host_path.display(), volume.container_path);
        if volume.read_only {
            mount.push_str(":ro");
        }
        args.push(mount);
    }
    for port in &spec.ports {
        args.push("--publish".into());
        args.push(format!("{}:{}", port.host_port, port.container_port));
    }
    for (key, value) in &spec.labels {
        args.push("--label".into());
        args.push(format!("{}={}", key, value));
    }
    args.push(spec.image.clone());
    args.extend(spec.command.iter().cloned());
    args
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawNetwork {
    id: String,
    name: String,
    #[serde(rename = "IPAM", default)]
    ipam: Option<RawIpam>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawIpam {
    #[serde(default)]
    config: Option<Vec<RawIpamConfig>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawIpamConfig {
    #[serde(default)]
    subnet: Option<String>,
}

/// Parse `docker network inspect` output.
pub fn parse_network_inspect(raw: &str) -> Result<Vec<NetworkInfo>> {
    let networks: Vec<RawNetwork> = serde_json::from_str(raw).map_err(|e| RuntimeError::Parse {
        context: "network inspect".into(),
        reason: e.to_string(),
    })?;
    Ok(networks
        .into_iter()
        .map(|network| {
            let subnet = network
                .ipam
                .and_then(|ipam| ipam.config)
                .unwrap_or_default()
                .into_iter()
                .filter_map(|config| config.subnet)
                .find_map(|subnet| subnet.parse::<Ipv4Subnet>().ok());
            NetworkInfo {
                id: network.id,
                name: network.name,
                subnet,
            }
        })
        .collect())
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawContainer {
    id: String,
    name: String,
    state: RawState,
    #[serde(default)]
    config: Option<RawConfig>,
    #[serde(default)]
    network_settings: Option<RawNetworkSettings>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawState {
    status: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawConfig {
    #[serde(default)]
    labels: Option<BTreeMap<String, String>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawNetworkSettings {
    #[serde(default)]
    networks: Option<BTreeMap<String, RawEndpoint>>,
    #[serde(default)]
    ports: Option<BTreeMap<String, Option<Vec<RawHostPort>>>>,
}

#[derive(Deserialize)]
struct RawEndpoint {
    #[serde(rename = "IPAddress", default)]
    ip_address: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawHostPort {
    host_port: String,
}

/// Parse `docker inspect --type container` output.
pub fn parse_container_inspect(raw: &str) -> Result<Vec<ContainerInfo>> {
    let containers: Vec<RawContainer> =
        serde_json::from_str(raw).map_err(|e| RuntimeError::Parse {
            context: "container inspect".into(),
            reason: e.to_string(),
        })?;
    Ok(containers.into_iter().map(into_info).collect())
}

fn into_info(raw: RawContainer) -> ContainerInfo {
    let labels = raw.config.and_then(|c| c.labels).unwrap_or_default();
    let (networks, raw_ports) = match raw.network_settings {
        Some(settings) => (
            settings.networks.unwrap_or_default(),
            settings.ports.unwrap_or_default(),
        ),
        None => (BTreeMap::new(), BTreeMap::new()),
    };

    let ip_address = networks
        .values()
        .find_map(|endpoint| endpoint.ip_address.parse::<Ipv4Addr>().ok());

    let mut ports = Vec::new();
    for (key, bindings) in raw_ports {
        let Some(container_port) = key.split('/').next().and_then(|p| p.parse::<u16>().ok()) else {
            continue;
        };
        for binding in bindings.unwrap_or_default() {
            if let Ok(host_port) = binding.host_port.parse::<u16>() {
                let port = PortBinding {
                    container_port,
                    host_port,
                };
                if !ports.contains(&port) {
                    ports.push(port);
                }
            }
        }
    }

    ContainerInfo {
        id: raw.id,
        name: raw.name.trim_start_matches('/').to_string(),
        state: ContainerState::parse(&raw.state.status),
        ip_address,
        ports,
        labels,
    }
}
