//! # Node Lifecycle Orchestrator
//!
//! Brings a Clique network up in dependency order.
//!
//! ## Startup Sequence
//!
//! 1. Validate the definition (fail fast, nothing started)
//! 2. Create the container network if absent
//! 3. Load or generate key material for every node
//! 4. Write genesis from the declared signers (only if absent)
//! 5. Start the bootnode, wait for RPC, record its enode
//! 6. Start every other node in declared order, waiting for each
//! 7. Propose sealing nodes that are not genesis signers
//!
//! Startup is strictly sequential. A failure aborts the remaining steps and
//! leaves already started containers running; teardown is a separate call.

use std::collections::BTreeSet;
use std::fs;
use std::net::Ipv4Addr;
use std::sync::Arc;

use cn_01_genesis::{test_account_balance, GenesisBuilder, GenesisConfig, GenesisDocument};
use cn_02_node_config::ConfigRenderer;
use cn_03_ip_allocation::IpAllocator;
use cn_04_container_runtime::{
    ContainerRuntime, ContainerSpec, PortBinding, RuntimeError, VolumeMount, LABEL_NETWORK,
    LABEL_NODE, LABEL_ROLE,
};
use cn_05_node_rpc::{NodeRpcClient, RpcEndpoint, RpcTransport};
use cn_06_consensus_membership::{ConsensusMembershipManager, MembershipOutcome, SignerHandle};
use devnet_telemetry::{
    HistogramTimer, CLIQUE_PROPOSALS, CONTAINERS_STARTED, IPS_ALLOCATED, NODES_RUNNING,
    ORCHESTRATOR_ERRORS, READINESS_PROBES, SIGNER_CHANGES,
};
use shared_crypto::{read_public_key, KeyMaterial};
use shared_types::{
    poll_until, Address, ConfigurationError, Enode, NetworkDefinition, NodeDefinition,
    NodeLifecycle, NodeRole, NodeState,
};
use tracing::{debug, error, info, warn};

use crate::adapters::RuntimeNetworkInspector;
use crate::config::OrchestratorConfig;
use crate::error::{OrchestratorError, Result};
use crate::layout::DataLayout;
use crate::report::{NetworkReport, NetworkStatus, NodeReport, NodeStatus};

/// Container name of `node` in `network`.
pub fn container_name(network: &str, node: &str) -> String {
    format!("{}-{}", network, node)
}

/// Sequences node startup against a container runtime and node RPC.
pub struct NodeLifecycleOrchestrator {
    config: OrchestratorConfig,
    layout: DataLayout,
    runtime: Arc<dyn ContainerRuntime>,
    transport: Arc<dyn RpcTransport>,
    allocator: IpAllocator,
    renderer: ConfigRenderer,
    membership: ConsensusMembershipManager,
}

impl NodeLifecycleOrchestrator {
    pub fn new(
        config: OrchestratorConfig,
        runtime: Arc<dyn ContainerRuntime>,
        transport: Arc<dyn RpcTransport>,
    ) -> Self {
        let layout = DataLayout::new(&config.data_root);
        let inspector = Arc::new(RuntimeNetworkInspector::new(runtime.clone()));
        let allocator = IpAllocator::new(layout.root(), inspector)
            .with_fallback_subnet(config.fallback_subnet);
        let renderer = ConfigRenderer::new(config.container_paths.clone());
        let membership = ConsensusMembershipManager::new(transport.clone(), config.membership);

        Self {
            config,
            layout,
            runtime,
            transport,
            allocator,
            renderer,
            membership,
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    pub fn allocator(&self) -> &IpAllocator {
        &self.allocator
    }

    pub fn runtime(&self) -> &Arc<dyn ContainerRuntime> {
        &self.runtime
    }

    /// RPC endpoint of `node` as published on the host.
    pub fn endpoint(&self, node: &NodeDefinition) -> RpcEndpoint {
        RpcEndpoint::new(self.config.rpc_host.clone(), node.rpc_port)
    }

    pub fn rpc_client(&self, node: &NodeDefinition) -> NodeRpcClient {
        NodeRpcClient::new(self.transport.clone(), self.endpoint(node))
    }

    // =========================================================================
    // NETWORK STARTUP
    // =========================================================================

    /// Start every node of `network`.
    ///
    /// `network` is updated in place with node addresses, allocated IPs and
    /// the bootnode enode, also when startup fails part way.
    pub async fn start_network(&self, network: &mut NetworkDefinition) -> Result<NetworkReport> {
        info!(network = %network.name, nodes = network.nodes.len(), "Starting network");
        let result = self.start_network_inner(network).await;
        match &result {
            Ok(report) => {
                NODES_RUNNING
                    .with_label_values(&[&network.name])
                    .set(report.nodes.len() as f64);
                info!(
                    network = %network.name,
                    nodes = report.nodes.len(),
                    enode = %report.bootnode_enode,
                    "Network started"
                );
            }
            Err(e) => self.record_failure(&network.name, e),
        }
        result
    }

    async fn start_network_inner(&self, network: &mut NetworkDefinition) -> Result<NetworkReport> {
        network
            .validate()
            .map_err(|e| OrchestratorError::configuration(&network.name, e))?;

        self.ensure_container_network(network).await?;
        self.reserve_declared_addresses(network)?;
        for index in 0..network.nodes.len() {
            let name = network.nodes[index].name.clone();
            self.materialize_key(network, &name)?;
        }
        let genesis_created = self.ensure_genesis(network)?;

        let bootnode = network
            .bootnode()
            .map(|n| n.name.clone())
            .ok_or_else(|| OrchestratorError::configuration(&network.name, ConfigurationError::MissingBootnode))?;
        let (mut boot_report, enode) = self.start_bootnode(network, &bootnode).await?;
        self.advance(&network.name, &mut boot_report.lifecycle, NodeState::Running)?;
        let mut reports = vec![boot_report];

        let genesis_signers: BTreeSet<String> = network
            .genesis_signers()
            .iter()
            .map(|n| n.name.clone())
            .collect();
        let peers: Vec<String> = network
            .nodes
            .iter()
            .filter(|n| n.role != NodeRole::Bootnode)
            .map(|n| n.name.clone())
            .collect();

        // Candidates wait until every genesis signer is up, wherever they
        // are declared.
        let mut candidates: Vec<usize> = Vec::new();
        for name in peers {
            let mut report = self.start_peer(network, &name, &enode).await?;
            let node = self.node(network, &name)?;

            if node.role.seals_blocks() && !genesis_signers.contains(&name) {
                candidates.push(reports.len());
            } else {
                self.advance(&network.name, &mut report.lifecycle, NodeState::Running)?;
            }
            reports.push(report);
        }

        let mut voters: Vec<SignerHandle> = network
            .genesis_signers()
            .iter()
            .map(|n| self.signer_handle(&network.name, n))
            .collect::<Result<_>>()?;
        for index in candidates {
            let report = &mut reports[index];
            let node = self.node(network, &report.name)?;
            let outcome = self.admit_signer(network, &node, &voters, &mut report.lifecycle).await?;
            report.membership = Some(outcome);
            self.advance(&network.name, &mut report.lifecycle, NodeState::Running)?;
            voters.push(self.signer_handle(&network.name, &node)?);
        }

        Ok(NetworkReport {
            network: network.name.clone(),
            bootnode_enode: enode,
            genesis_created,
            nodes: reports,
        })
    }

    async fn ensure_container_network(&self, network: &NetworkDefinition) -> Result<()> {
        let exists = self
            .runtime
            .network_exists(&network.name)
            .await
            .map_err(|e| OrchestratorError::runtime(&network.name, None, e))?;
        if exists {
            debug!(network = %network.name, "Container network already exists");
            return Ok(());
        }
        let id = self
            .runtime
            .create_network(&network.name, Some(network.subnet))
            .await
            .map_err(|e| OrchestratorError::runtime(&network.name, None, e))?;
        info!(network = %network.name, subnet = %network.subnet, id = %id, "Created container network");
        Ok(())
    }

    /// Record every declared IP before any address is allocated.
    fn reserve_declared_addresses(&self, network: &NetworkDefinition) -> Result<()> {
        for node in &network.nodes {
            if let Some(ip) = node.ip {
                self.allocator
                    .reserve(&node.name, &network.name, ip)
                    .map_err(|e| OrchestratorError::allocation(&network.name, &node.name, e))?;
            }
        }
        Ok(())
    }

    /// Load or create the node's keys and record its address.
    fn materialize_key(&self, network: &mut NetworkDefinition, name: &str) -> Result<Address> {
        let dir = self.layout.node_dir(&network.name, name);
        let (material, created) =
            KeyMaterial::load_or_generate(&dir).map_err(|source| OrchestratorError::KeyMaterial {
                network: network.name.clone(),
                node: name.to_string(),
                source,
            })?;
        let address = material.address();
        if created {
            debug!(network = %network.name, node = name, %address, "New node key");
        }
        if let Some(node) = network.node_mut(name) {
            node.address = Some(address);
        }
        Ok(address)
    }

    /// Write genesis unless the network already has one.
    ///
    /// Returns whether a document was written.
    fn ensure_genesis(&self, network: &NetworkDefinition) -> Result<bool> {
        let path = self.layout.genesis_file(&network.name);
        let genesis_error = |source| OrchestratorError::Genesis {
            network: network.name.clone(),
            source,
        };

        if path.is_file() {
            let existing = GenesisDocument::read_from(&path).map_err(genesis_error)?;
            if existing.chain_id() != network.chain_id {
                warn!(
                    network = %network.name,
                    genesis_chain_id = existing.chain_id(),
                    declared_chain_id = network.chain_id,
                    "Existing genesis disagrees with the definition; keeping it"
                );
            }
            debug!(network = %network.name, path = %path.display(), "Reusing genesis");
            return Ok(false);
        }

        let signers = network
            .genesis_signers()
            .iter()
            .map(|node| {
                node.address.ok_or_else(|| {
                    OrchestratorError::configuration(
                        &network.name,
                        ConfigurationError::MissingAddress {
                            node: node.name.clone(),
                        },
                    )
                })
            })
            .collect::<Result<Vec<Address>>>()?;

        let settings = self.config.genesis;
        let mut config = GenesisConfig::new(network.chain_id, signers.clone())
            .with_block_period(network.block_period)
            .with_epoch_length(network.epoch_length)
            .with_ordering(settings.validator_ordering);
        if !settings.include_test_accounts {
            config = config.without_test_accounts();
        }
        for address in network
            .nodes
            .iter()
            .filter(|n| n.role.seals_blocks())
            .filter_map(|n| n.address)
        {
            config = config.with_allocation(address, test_account_balance());
        }

        let document = GenesisBuilder::new(config).build().map_err(genesis_error)?;
        let dir = self.layout.network_dir(&network.name);
        fs::create_dir_all(&dir).map_err(|e| OrchestratorError::io(&network.name, &dir, e))?;
        document.write_to(&path).map_err(genesis_error)?;

        info!(
            network = %network.name,
            chain_id = network.chain_id,
            signers = signers.len(),
            path = %path.display(),
            "Genesis written"
        );
        Ok(true)
    }

    // =========================================================================
    // NODE STARTUP
    // =========================================================================

    async fn start_bootnode(&self, network: &mut NetworkDefinition, name: &str) -> Result<(NodeReport, Enode)> {
        let ip = self.assign_address(network, name).await?;
        let node = self.node(network, name)?;
        let dir = self.layout.node_dir(&network.name, name);
        self.renderer
            .render_bootnode(&node, network, &dir)
            .map_err(|source| OrchestratorError::Render {
                network: network.name.clone(),
                node: name.to_string(),
                source,
            })?;

        let report = self.launch_until_ready(&network.name, &node, ip).await?;
        let enode = self.discover_enode(&network.name, &node, ip).await?;
        network.bootnode_enode = Some(enode.clone());
        Ok((report, enode))
    }

    async fn start_peer(&self, network: &mut NetworkDefinition, name: &str, bootnode: &Enode) -> Result<NodeReport> {
        let ip = self.assign_address(network, name).await?;
        let node = self.node(network, name)?;
        let linked = self.linked_enode(network, &node)?;
        let dir = self.layout.node_dir(&network.name, name);
        self.renderer
            .render_node(&node, network, bootnode, linked.as_ref(), &dir)
            .map_err(|source| OrchestratorError::Render {
                network: network.name.clone(),
                node: name.to_string(),
                source,
            })?;

        self.launch_until_ready(&network.name, &node, ip).await
    }

    /// Start the container (unless running) and wait for RPC.
    async fn launch_until_ready(&self, network: &str, node: &NodeDefinition, ip: Ipv4Addr) -> Result<NodeReport> {
        let mut lifecycle = NodeLifecycle::new(node.name.clone());
        let reused = self.launch_container(network, node, ip).await?;
        self.advance(network, &mut lifecycle, NodeState::Starting)?;

        if let Err(e) = self.wait_until_ready(network, node).await {
            self.advance(network, &mut lifecycle, NodeState::Failed(e.to_string()))?;
            return Err(e);
        }
        self.advance(network, &mut lifecycle, NodeState::Ready)?;

        Ok(NodeReport {
            name: node.name.clone(),
            role: node.role,
            ip,
            address: node.address,
            container: container_name(network, &node.name),
            reused,
            lifecycle,
            membership: None,
        })
    }

    /// Allocate (or confirm) the node's address and store it on the node.
    async fn assign_address(&self, network: &mut NetworkDefinition, name: &str) -> Result<Ipv4Addr> {
        let declared = self.node(network, name)?.ip;
        let ip = match declared {
            Some(ip) => ip,
            None => {
                let ip = self
                    .allocator
                    .get_or_assign(name, &network.name)
                    .await
                    .map_err(|e| OrchestratorError::allocation(&network.name, name, e))?;
                IPS_ALLOCATED.with_label_values(&[&network.name]).inc();
                ip
            }
        };
        if let Some(node) = network.node_mut(name) {
            node.ip = Some(ip);
        }
        Ok(ip)
    }

    fn container_spec(&self, network: &str, node: &NodeDefinition, ip: Ipv4Addr) -> ContainerSpec {
        let paths = &self.config.container_paths;
        ContainerSpec::new(container_name(network, &node.name), &self.config.besu_image, network)
            .with_ip(ip)
            .with_volume(VolumeMount::new(
                self.layout.node_dir(network, &node.name),
                paths.data_dir.clone(),
            ))
            .with_volume(VolumeMount::new(self.layout.genesis_file(network), paths.genesis_file.clone()).read_only())
            .with_port(PortBinding::same(node.rpc_port))
            .with_command(paths.command())
            .with_label(LABEL_NETWORK, network)
            .with_label(LABEL_NODE, node.name.clone())
            .with_label(LABEL_ROLE, node.role.name())
    }

    /// Run the node's container. Returns `true` if it was already running.
    async fn launch_container(&self, network: &str, node: &NodeDefinition, ip: Ipv4Addr) -> Result<bool> {
        let name = container_name(network, &node.name);
        let runtime_error = |e| OrchestratorError::runtime(network, Some(&node.name), e);

        match self.runtime.container_info(&name).await.map_err(runtime_error)? {
            Some(info) if info.state.is_running() => {
                info!(network, node = %node.name, container = %name, "Container already running");
                return Ok(true);
            }
            Some(info) => {
                info!(network, node = %node.name, container = %name, state = %info.state, "Restarting existing container");
                self.runtime.start_container(&name).await.map_err(runtime_error)?;
            }
            None => {
                let spec = self.container_spec(network, node, ip);
                let id = self.runtime.run_container(&spec).await.map_err(runtime_error)?;
                info!(network, node = %node.name, container = %name, %ip, id = %id, "Container started");
            }
        }
        CONTAINERS_STARTED
            .with_label_values(&[network, node.role.name()])
            .inc();
        Ok(false)
    }

    /// Poll `eth_blockNumber` until the node answers.
    async fn wait_until_ready(&self, network: &str, node: &NodeDefinition) -> Result<u64> {
        let client = self.rpc_client(node);
        let policy = self.config.readiness;
        let timer = HistogramTimer::node_startup(network);

        let result = poll_until(&policy, |attempt| {
            let client = client.clone();
            let name = node.name.clone();
            async move {
                debug!(node = %name, attempt, "Probing eth_blockNumber");
                client.block_number().await.map(Some)
            }
        })
        .await;

        match result {
            Ok(block) => {
                drop(timer);
                READINESS_PROBES.with_label_values(&[network, "ready"]).inc();
                info!(network, node = %node.name, block, "Node answering RPC");
                Ok(block)
            }
            Err(exhausted) => {
                timer.discard();
                READINESS_PROBES.with_label_values(&[network, "timeout"]).inc();
                Err(OrchestratorError::NodeNotReady {
                    network: network.to_string(),
                    node: node.name.clone(),
                    attempts: exhausted.attempts,
                    last_error: exhausted.last_error,
                })
            }
        }
    }

    /// Ask the bootnode for its enode and persist it.
    ///
    /// An any-interface host is replaced with the container's address.
    async fn discover_enode(&self, network: &str, bootnode: &NodeDefinition, ip: Ipv4Addr) -> Result<Enode> {
        let enode = self
            .rpc_client(bootnode)
            .enode()
            .await
            .map_err(|source| OrchestratorError::Rpc {
                network: network.to_string(),
                node: bootnode.name.clone(),
                source,
            })?;

        let enode = if enode.is_wildcard_host() {
            let actual = self
                .runtime
                .container_info(&container_name(network, &bootnode.name))
                .await
                .map_err(|e| OrchestratorError::runtime(network, Some(&bootnode.name), e))?
                .and_then(|info| info.ip_address)
                .unwrap_or(ip);
            info!(network, advertised = %enode.host, host = %actual, "Rewriting wildcard enode host");
            enode.with_host(actual)
        } else {
            enode
        };

        let path = self.layout.write_enode(network, &bootnode.name, &enode)?;
        info!(network, enode = %enode, path = %path.display(), "Bootnode enode recorded");
        Ok(enode)
    }

    /// Enode of the node's `linked_to` peer, if any.
    fn linked_enode(&self, network: &NetworkDefinition, node: &NodeDefinition) -> Result<Option<Enode>> {
        let Some(target) = node.linked_to.as_deref() else {
            return Ok(None);
        };
        let unknown = || {
            OrchestratorError::configuration(
                &network.name,
                ConfigurationError::UnknownLink {
                    node: node.name.clone(),
                    target: target.to_string(),
                },
            )
        };

        let peer = network.node(target).ok_or_else(unknown)?;
        if peer.role == NodeRole::Bootnode {
            return Ok(network.bootnode_enode.clone());
        }
        let ip = peer.ip.ok_or_else(unknown)?;
        let public_key = read_public_key(&self.layout.node_dir(&network.name, &peer.name)).map_err(|source| {
            OrchestratorError::KeyMaterial {
                network: network.name.clone(),
                node: peer.name.clone(),
                source,
            }
        })?;
        let enode = Enode::from_parts(&public_key.to_hex(), ip, peer.p2p_port).map_err(|e| {
            OrchestratorError::configuration(
                &network.name,
                ConfigurationError::InvalidValue {
                    field: "linked_to",
                    reason: e.to_string(),
                },
            )
        })?;
        Ok(Some(enode))
    }

    // =========================================================================
    // SIGNER MEMBERSHIP
    // =========================================================================

    fn signer_handle(&self, network: &str, node: &NodeDefinition) -> Result<SignerHandle> {
        let address = node.address.ok_or_else(|| {
            OrchestratorError::configuration(
                network,
                ConfigurationError::MissingAddress {
                    node: node.name.clone(),
                },
            )
        })?;
        Ok(SignerHandle::new(node.name.clone(), address, self.endpoint(node)))
    }

    /// Sealing nodes of `network` other than `except`, as voters.
    fn sealers(&self, network: &NetworkDefinition, except: &str) -> Result<Vec<SignerHandle>> {
        network
            .nodes
            .iter()
            .filter(|n| n.role.seals_blocks() && n.name != except)
            .map(|n| self.signer_handle(&network.name, n))
            .collect()
    }

    /// Propose `node` to `voters` and walk its lifecycle to the outcome.
    async fn admit_signer(
        &self,
        network: &NetworkDefinition,
        node: &NodeDefinition,
        voters: &[SignerHandle],
        lifecycle: &mut NodeLifecycle,
    ) -> Result<MembershipOutcome> {
        let candidate = self.signer_handle(&network.name, node)?;
        let outcome = self.membership.propose_new_signer(&candidate, voters).await;
        self.record_membership(&network.name, &outcome);

        match &outcome {
            MembershipOutcome::NotRequired => {}
            MembershipOutcome::Admitted { .. } => {
                self.advance(&network.name, lifecycle, NodeState::Proposed)?;
                self.advance(&network.name, lifecycle, NodeState::Admitted)?;
            }
            MembershipOutcome::Pending { .. } | MembershipOutcome::Removed { .. } => {
                self.advance(&network.name, lifecycle, NodeState::Proposed)?;
                self.advance(&network.name, lifecycle, NodeState::Pending)?;
                warn!(
                    network = %network.name,
                    node = %node.name,
                    votes = outcome.votes(),
                    "Signer not admitted yet; node keeps running as a non-validating peer"
                );
            }
        }
        Ok(outcome)
    }

    fn record_membership(&self, network: &str, outcome: &MembershipOutcome) {
        let cast = outcome.votes() as f64;
        let failed = outcome.failed_proposals() as f64;
        CLIQUE_PROPOSALS.with_label_values(&[network, "cast"]).inc_by(cast);
        CLIQUE_PROPOSALS.with_label_values(&[network, "failed"]).inc_by(failed);
        let result = match outcome {
            MembershipOutcome::NotRequired => "not_required",
            MembershipOutcome::Admitted { .. } => "admitted",
            MembershipOutcome::Removed { .. } => "removed",
            MembershipOutcome::Pending { .. } => "pending",
        };
        SIGNER_CHANGES.with_label_values(&[network, result]).inc();
    }

    // =========================================================================
    // LATER CHANGES
    // =========================================================================

    /// Append `node` to a started network and bring it up.
    ///
    /// Sealing nodes are proposed to the network's other sealing nodes. On
    /// failure the node is dropped from the definition again; its container
    /// and address mapping are left for a retry or `remove_node`.
    pub async fn add_node(&self, network: &mut NetworkDefinition, node: NodeDefinition) -> Result<NodeReport> {
        let name = node.name.clone();
        info!(network = %network.name, node = %name, role = %node.role, "Adding node");

        let declared = network.node(&name).is_some();
        let result = self.add_node_inner(network, node).await;
        if let Err(e) = &result {
            if !declared {
                network.remove_node(&name);
            }
            self.record_failure(&network.name, e);
        } else {
            NODES_RUNNING.with_label_values(&[&network.name]).inc();
        }
        result
    }

    async fn add_node_inner(&self, network: &mut NetworkDefinition, node: NodeDefinition) -> Result<NodeReport> {
        let bootnode = network.bootnode_enode.clone().ok_or_else(|| {
            OrchestratorError::configuration(
                &network.name,
                ConfigurationError::InvalidValue {
                    field: "bootnode_enode",
                    reason: "network has not been started".to_string(),
                },
            )
        })?;
        network
            .push_node(node.clone())
            .map_err(|e| OrchestratorError::configuration(&network.name, e))?;

        if let Some(ip) = node.ip {
            self.allocator
                .reserve(&node.name, &network.name, ip)
                .map_err(|e| OrchestratorError::allocation(&network.name, &node.name, e))?;
        }
        self.materialize_key(network, &node.name)?;

        let mut report = self.start_peer(network, &node.name, &bootnode).await?;
        let node = self.node(network, &node.name)?;
        if node.role.seals_blocks() {
            let voters = self.sealers(network, &node.name)?;
            let outcome = self.admit_signer(network, &node, &voters, &mut report.lifecycle).await?;
            report.membership = Some(outcome);
        }
        self.advance(&network.name, &mut report.lifecycle, NodeState::Running)?;
        Ok(report)
    }

    /// Stop and forget a node.
    ///
    /// Sealing nodes are first voted out by the remaining sealing nodes; the
    /// vote is best effort. The bootnode cannot be removed.
    pub async fn remove_node(&self, network: &mut NetworkDefinition, name: &str) -> Result<Option<MembershipOutcome>> {
        let node = network.node(name).cloned().ok_or_else(|| {
            OrchestratorError::configuration(
                &network.name,
                ConfigurationError::UnknownNode {
                    node: name.to_string(),
                },
            )
        })?;
        if node.role == NodeRole::Bootnode {
            return Err(OrchestratorError::configuration(
                &network.name,
                ConfigurationError::BootnodeRemoval {
                    node: name.to_string(),
                },
            ));
        }

        let mut outcome = None;
        if node.role.seals_blocks() && node.address.is_some() {
            let target = self.signer_handle(&network.name, &node)?;
            let remaining = self.sealers(network, name)?;
            let result = self.membership.propose_signer_removal(&target, &remaining).await;
            self.record_membership(&network.name, &result);
            outcome = Some(result);
        }

        let container = container_name(&network.name, name);
        ignore_missing(self.runtime.stop_container(&container).await)
            .map_err(|e| OrchestratorError::runtime(&network.name, Some(name), e))?;
        ignore_missing(self.runtime.remove_container(&container).await)
            .map_err(|e| OrchestratorError::runtime(&network.name, Some(name), e))?;

        let released = self
            .allocator
            .release(name, &network.name)
            .map_err(|e| OrchestratorError::allocation(&network.name, name, e))?;
        network.remove_node(name);
        NODES_RUNNING.with_label_values(&[&network.name]).dec();

        info!(
            network = %network.name,
            node = name,
            ip = ?released,
            "Node removed"
        );
        Ok(outcome)
    }

    /// Remove the container network and its containers.
    ///
    /// With `purge_data` the network's data directory (keys, genesis,
    /// mappings) is deleted too.
    pub async fn teardown(&self, network: &str, purge_data: bool) -> Result<()> {
        let exists = self
            .runtime
            .network_exists(network)
            .await
            .map_err(|e| OrchestratorError::runtime(network, None, e))?;
        if exists {
            self.runtime
                .remove_network(network, true)
                .await
                .map_err(|e| OrchestratorError::runtime(network, None, e))?;
        }
        NODES_RUNNING.with_label_values(&[network]).set(0.0);

        if purge_data {
            let dir = self.layout.network_dir(network);
            match fs::remove_dir_all(&dir) {
                Ok(()) => info!(network, path = %dir.display(), "Network data purged"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(OrchestratorError::io(network, dir, e)),
            }
        }
        info!(network, purge_data, "Network torn down");
        Ok(())
    }

    /// Container state and chain progress of every node.
    pub async fn status(&self, network: &NetworkDefinition) -> Result<NetworkStatus> {
        let mut nodes = Vec::with_capacity(network.nodes.len());
        for node in &network.nodes {
            let container = container_name(&network.name, &node.name);
            let info = self
                .runtime
                .container_info(&container)
                .await
                .map_err(|e| OrchestratorError::runtime(&network.name, Some(&node.name), e))?;

            let running = info.as_ref().is_some_and(|i| i.state.is_running());
            let (block_number, peer_count) = if running {
                let client = self.rpc_client(node);
                (client.block_number().await.ok(), client.peer_count().await.ok())
            } else {
                (None, None)
            };

            nodes.push(NodeStatus {
                name: node.name.clone(),
                role: node.role,
                container,
                ip: info.as_ref().and_then(|i| i.ip_address).or(node.ip),
                state: info.map(|i| i.state),
                rpc_port: node.rpc_port,
                address: node.address,
                block_number,
                peer_count,
            });
        }

        let status = NetworkStatus {
            network: network.name.clone(),
            chain_id: network.chain_id,
            bootnode_enode: network.bootnode_enode.clone(),
            nodes,
        };
        NODES_RUNNING
            .with_label_values(&[&network.name])
            .set(status.running() as f64);
        Ok(status)
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    fn node(&self, network: &NetworkDefinition, name: &str) -> Result<NodeDefinition> {
        network.node(name).cloned().ok_or_else(|| {
            OrchestratorError::configuration(
                &network.name,
                ConfigurationError::UnknownNode {
                    node: name.to_string(),
                },
            )
        })
    }

    fn advance(&self, network: &str, lifecycle: &mut NodeLifecycle, next: NodeState) -> Result<()> {
        lifecycle
            .advance(next)
            .map_err(|source| OrchestratorError::Lifecycle {
                network: network.to_string(),
                source,
            })
    }

    fn record_failure(&self, network: &str, e: &OrchestratorError) {
        ORCHESTRATOR_ERRORS
            .with_label_values(&[network, e.kind()])
            .inc();
        error!(network, error = %e, "Operation failed");
    }
}

/// Treat a missing container as already gone.
fn ignore_missing(result: std::result::Result<(), RuntimeError>) -> std::result::Result<(), RuntimeError> {
    match result {
        Err(RuntimeError::NotFound { .. }) => Ok(()),
        other => other,
    }
}
