//! Test utilities for container orchestration.
//!
//! Enable with the `test-utils` feature flag.
//!
//! [`InMemoryContainerRuntime`] mimics the observable behaviour of a Docker
//! daemon closely enough for orchestration tests: name and address
//! uniqueness, network attachment, start/stop state and a call log.

use std::collections::{BTreeMap, BTreeSet};
use std::net::Ipv4Addr;

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::Ipv4Subnet;

use crate::domain::{ContainerFilter, ContainerInfo, ContainerSpec, ContainerState, NetworkInfo};
use crate::error::{Result, RuntimeError};
use crate::ports::ContainerRuntime;

/// One recorded runtime call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeCall {
    CreateNetwork(String),
    RemoveNetwork { name: String, remove_containers: bool },
    RunContainer(String),
    StartContainer(String),
    StopContainer(String),
    RemoveContainer(String),
}

struct StoredContainer {
    spec: ContainerSpec,
    info: ContainerInfo,
}

#[derive(Default)]
struct Inner {
    networks: BTreeMap<String, NetworkInfo>,
    containers: BTreeMap<String, StoredContainer>,
    calls: Vec<RuntimeCall>,
    next_id: u64,
    fail_run: BTreeSet<String>,
}

impl Inner {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}{:012x}", prefix, self.next_id)
    }

    fn addresses_on(&self, network: &str) -> BTreeSet<Ipv4Addr> {
        self.containers
            .values()
            .filter(|c| c.spec.network == network)
            .filter_map(|c| c.info.ip_address)
            .collect()
    }
}

/// Container runtime kept entirely in memory.
#[derive(Default)]
pub struct InMemoryContainerRuntime {
    inner: Mutex<Inner>,
}

impl InMemoryContainerRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `run_container` fail for the container called `name`.
    pub fn fail_run_for(&self, name: impl Into<String>) {
        self.inner.lock().fail_run.insert(name.into());
    }

    pub fn calls(&self) -> Vec<RuntimeCall> {
        self.inner.lock().calls.clone()
    }

    /// Names passed to successful `run_container` calls, in order.
    pub fn started(&self) -> Vec<String> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                RuntimeCall::RunContainer(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn spec(&self, name: &str) -> Option<ContainerSpec> {
        self.inner.lock().containers.get(name).map(|c| c.spec.clone())
    }

    pub fn running(&self) -> Vec<ContainerInfo> {
        self.inner
            .lock()
            .containers
            .values()
            .filter(|c| c.info.state.is_running())
            .map(|c| c.info.clone())
            .collect()
    }

    pub fn has_network(&self, name: &str) -> bool {
        self.inner.lock().networks.contains_key(name)
    }

    /// Force a container into `state`.
    pub fn set_state(&self, name: &str, state: ContainerState) {
        if let Some(container) = self.inner.lock().containers.get_mut(name) {
            container.info.state = state;
        }
    }
}

#[async_trait]
impl ContainerRuntime for InMemoryContainerRuntime {
    async fn create_network(&self, name: &str, subnet: Option<Ipv4Subnet>) -> Result<String> {
        let mut inner = self.inner.lock();
        if inner.networks.contains_key(name) {
            return Err(RuntimeError::AlreadyExists {
                kind: "network",
                name: name.to_string(),
            });
        }
        let id = inner.next_id("net");
        inner.networks.insert(
            name.to_string(),
            NetworkInfo {
                id: id.clone(),
                name: name.to_string(),
                subnet,
            },
        );
        inner.calls.push(RuntimeCall::CreateNetwork(name.to_string()));
        Ok(id)
    }

    async fn inspect_network(&self, name: &str) -> Result<Option<NetworkInfo>> {
        Ok(self.inner.lock().networks.get(name).cloned())
    }

    async fn remove_network(&self, name: &str, remove_containers: bool) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.calls.push(RuntimeCall::RemoveNetwork {
            name: name.to_string(),
            remove_containers,
        });
        let attached: Vec<String> = inner
            .containers
            .iter()
            .filter(|(_, c)| c.spec.network == name)
            .map(|(n, _)| n.clone())
            .collect();
        if !attached.is_empty() && !remove_containers {
            return Err(RuntimeError::CommandFailed {
                command: format!("network rm {}", name),
                status: 1,
                stderr: format!("network {} has active endpoints", name),
            });
        }
        for container in attached {
            inner.containers.remove(&container);
            inner.calls.push(RuntimeCall::RemoveContainer(container));
        }
        inner.networks.remove(name);
        Ok(())
    }

    async fn run_container(&self, spec: &ContainerSpec) -> Result<String> {
        let mut inner = self.inner.lock();
        if inner.fail_run.contains(&spec.name) {
            return Err(RuntimeError::CommandFailed {
                command: format!("run {}", spec.name),
                status: 125,
                stderr: "injected failure".to_string(),
            });
        }
        let subnet = match inner.networks.get(&spec.network) {
            Some(network) => network.subnet,
            None => {
                return Err(RuntimeError::NotFound {
                    kind: "network",
                    name: spec.network.clone(),
                })
            }
        };
        if inner.containers.contains_key(&spec.name) {
            return Err(RuntimeError::AlreadyExists {
                kind: "container",
                name: spec.name.clone(),
            });
        }

        let used = inner.addresses_on(&spec.network);
        let ip = match spec.ip {
            Some(ip) if used.contains(&ip) => {
                return Err(RuntimeError::AddressInUse {
                    network: spec.network.clone(),
                    ip,
                })
            }
            Some(ip) => Some(ip),
            None => subnet.and_then(|subnet| {
                let base = u32::from(subnet.network());
                (2..=254u32)
                    .map(|offset| Ipv4Addr::from(base + offset))
                    .find(|ip| subnet.contains(*ip) && !used.contains(ip))
            }),
        };

        let id = inner.next_id("ctr");
        let info = ContainerInfo {
            id: id.clone(),
            name: spec.name.clone(),
            state: ContainerState::Running,
            ip_address: ip,
            ports: spec.ports.clone(),
            labels: spec.labels.clone(),
        };
        inner.containers.insert(
            spec.name.clone(),
            StoredContainer {
                spec: spec.clone(),
                info,
            },
        );
        inner.calls.push(RuntimeCall::RunContainer(spec.name.clone()));
        Ok(id)
    }

    async fn start_container(&self, name: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        let container = inner.containers.get_mut(name).ok_or_else(|| RuntimeError::NotFound {
            kind: "container",
            name: name.to_string(),
        })?;
        container.info.state = ContainerState::Running;
        inner.calls.push(RuntimeCall::StartContainer(name.to_string()));
        Ok(())
    }

    async fn stop_container(&self, name: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        let container = inner.containers.get_mut(name).ok_or_else(|| RuntimeError::NotFound {
            kind: "container",
            name: name.to_string(),
        })?;
        container.info.state = ContainerState::Exited;
        inner.calls.push(RuntimeCall::StopContainer(name.to_string()));
        Ok(())
    }

    async fn remove_container(&self, name: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.containers.remove(name);
        inner.calls.push(RuntimeCall::RemoveContainer(name.to_string()));
        Ok(())
    }

    async fn container_info(&self, name: &str) -> Result<Option<ContainerInfo>> {
        Ok(self.inner.lock().containers.get(name).map(|c| c.info.clone()))
    }

    async fn list_containers(&self, filter: &ContainerFilter) -> Result<Vec<ContainerInfo>> {
        Ok(self
            .inner
            .lock()
            .containers
            .values()
            .filter(|c| filter.matches(&c.info, &c.spec.network))
            .map(|c| c.info.clone())
            .collect())
    }
}
