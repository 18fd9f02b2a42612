//! # Config Renderer
//!
//! Renders a node's `config.toml` from its definition and role:
//!
//! | Role | APIs | Bootnodes | Mining |
//! |------|------|-----------|--------|
//! | Bootnode | base | none | off |
//! | Signer / Miner | base + CLIQUE, MINER | bootnode (+ linked peer) | on, coinbase = node address |
//! | Normal | base | bootnode (+ linked peer) | off |
//! | Rpc | base + DEBUG, TRACE | bootnode (+ linked peer) | off |
//!
//! Rendering touches only the node directory; it never makes network calls.

use std::fs;
use std::path::{Path, PathBuf};

use shared_types::{ConfigurationError, Enode, NetworkDefinition, NodeDefinition, NodeRole};
use tracing::debug;

use crate::domain::{api_set, BesuNodeConfig, ContainerPaths};
use crate::error::{RenderError, Result};
use crate::CONFIG_FILE;

const BIND_ALL: &str = "0.0.0.0";

/// Renders Besu configuration artifacts.
#[derive(Debug, Clone, Default)]
pub struct ConfigRenderer {
    paths: ContainerPaths,
}

impl ConfigRenderer {
    pub fn new(paths: ContainerPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &ContainerPaths {
        &self.paths
    }

    /// Configuration for the network's bootnode (no bootnode list).
    pub fn bootnode_config(
        &self,
        node: &NodeDefinition,
        network: &NetworkDefinition,
    ) -> Result<BesuNodeConfig> {
        if node.role != NodeRole::Bootnode {
            return Err(RenderError::WrongRole {
                node: node.name.clone(),
                role: node.role,
                expected: "bootnode",
            });
        }
        self.base_config(node, network, Vec::new())
    }

    /// Configuration for any non-bootnode node.
    ///
    /// `linked` is the enode of the node's `linked_to` peer, dialled in
    /// addition to the bootnode.
    pub fn node_config(
        &self,
        node: &NodeDefinition,
        network: &NetworkDefinition,
        bootnode: &Enode,
        linked: Option<&Enode>,
    ) -> Result<BesuNodeConfig> {
        if node.role == NodeRole::Bootnode {
            return Err(RenderError::WrongRole {
                node: node.name.clone(),
                role: node.role,
                expected: "peer node",
            });
        }
        let mut bootnodes = vec![bootnode.to_string()];
        if let Some(peer) = linked.filter(|peer| *peer != bootnode) {
            bootnodes.push(peer.to_string());
        }
        self.base_config(node, network, bootnodes)
    }

    /// Render and write the bootnode's `config.toml` into `node_dir`.
    pub fn render_bootnode(
        &self,
        node: &NodeDefinition,
        network: &NetworkDefinition,
        node_dir: &Path,
    ) -> Result<BesuNodeConfig> {
        let config = self.bootnode_config(node, network)?;
        self.write(&node.name, &config, node_dir)?;
        Ok(config)
    }

    /// Render and write a peer node's `config.toml` into `node_dir`.
    pub fn render_node(
        &self,
        node: &NodeDefinition,
        network: &NetworkDefinition,
        bootnode: &Enode,
        linked: Option<&Enode>,
        node_dir: &Path,
    ) -> Result<BesuNodeConfig> {
        let config = self.node_config(node, network, bootnode, linked)?;
        self.write(&node.name, &config, node_dir)?;
        Ok(config)
    }

    /// Serialise `config` to `<node_dir>/config.toml`.
    pub fn write(&self, node: &str, config: &BesuNodeConfig, node_dir: &Path) -> Result<PathBuf> {
        let rendered = config.to_toml().map_err(|source| RenderError::Serialize {
            node: node.to_string(),
            source,
        })?;
        fs::create_dir_all(node_dir).map_err(|source| RenderError::Io {
            path: node_dir.to_path_buf(),
            source,
        })?;
        let path = node_dir.join(CONFIG_FILE);
        fs::write(&path, rendered).map_err(|source| RenderError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(node, path = %path.display(), "Rendered node config");
        Ok(path)
    }

    fn base_config(
        &self,
        node: &NodeDefinition,
        network: &NetworkDefinition,
        bootnodes: Vec<String>,
    ) -> Result<BesuNodeConfig> {
        let (miner_enabled, miner_coinbase) = match node.role {
            NodeRole::Signer | NodeRole::Miner => {
                let address = node.address.ok_or_else(|| ConfigurationError::MissingAddress {
                    node: node.name.clone(),
                })?;
                (true, Some(address.to_string()))
            }
            NodeRole::Bootnode | NodeRole::Normal | NodeRole::Rpc => (false, None),
        };

        Ok(BesuNodeConfig {
            data_path: self.paths.data_dir.clone(),
            genesis_file: self.paths.genesis_file.clone(),
            node_private_key_file: self.paths.key_file(),
            network_id: network.chain_id,
            p2p_host: BIND_ALL.to_string(),
            p2p_port: node.p2p_port,
            discovery_enabled: true,
            bootnodes,
            rpc_http_enabled: true,
            rpc_http_host: BIND_ALL.to_string(),
            rpc_http_port: node.rpc_port,
            rpc_http_api: api_set(node.role).iter().map(|api| api.to_string()).collect(),
            rpc_http_cors_origins: vec!["*".to_string()],
            host_allowlist: vec!["*".to_string()],
            min_gas_price: 0,
            miner_enabled,
            miner_coinbase,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{Address, Ipv4Subnet};
    use std::net::Ipv4Addr;

    const NODE_ID: &str = "6f8a80d14311c39f35f516fa664deaaaa13e85b2f7493f37f6144d86991ec012937307647bd3b9a82abe2974e1407241d54947bbb39763a4cac9f77166ad92a0";

    fn network() -> NetworkDefinition {
        NetworkDefinition::new("net1", 1337, "10.5.0.0/16".parse::<Ipv4Subnet>().unwrap())
    }

    fn bootnode_enode() -> Enode {
        Enode::from_parts(NODE_ID, Ipv4Addr::new(10, 5, 0, 10), 30303).unwrap()
    }

    #[test]
    fn test_bootnode_has_no_bootnodes() {
        let node = NodeDefinition::new("boot", NodeRole::Bootnode, 8545, 30303);
        let config = ConfigRenderer::default().bootnode_config(&node, &network()).unwrap();
        assert!(config.bootnodes.is_empty());
        assert!(!config.miner_enabled);
        assert_eq!(config.network_id, 1337);
        assert_eq!(config.p2p_port, 30303);
    }

    #[test]
    fn test_miner_gets_mining_flags() {
        let address = Address::new([0xab; 20]);
        let mut node = NodeDefinition::new("miner", NodeRole::Miner, 8546, 30304);
        node.address = Some(address);

        let config = ConfigRenderer::default()
            .node_config(&node, &network(), &bootnode_enode(), None)
            .unwrap();
        assert!(config.miner_enabled);
        assert_eq!(config.miner_coinbase, Some(address.to_string()));
        assert!(config.rpc_http_api.contains(&"CLIQUE".to_string()));
        assert_eq!(config.bootnodes, vec![bootnode_enode().to_string()]);
    }

    #[test]
    fn test_signer_without_address_fails() {
        let node = NodeDefinition::new("signer", NodeRole::Signer, 8546, 30304);
        let err = ConfigRenderer::default()
            .node_config(&node, &network(), &bootnode_enode(), None)
            .unwrap_err();
        assert!(matches!(
            err,
            RenderError::Configuration(ConfigurationError::MissingAddress { .. })
        ));
    }

    #[test]
    fn test_normal_node_base_apis_only() {
        let node = NodeDefinition::new("normal", NodeRole::Normal, 8547, 30305);
        let config = ConfigRenderer::default()
            .node_config(&node, &network(), &bootnode_enode(), None)
            .unwrap();
        assert!(!config.miner_enabled);
        assert!(config.miner_coinbase.is_none());
        assert!(!config.rpc_http_api.contains(&"MINER".to_string()));
    }

    #[test]
    fn test_linked_peer_appended() {
        let node = NodeDefinition::new("normal", NodeRole::Normal, 8547, 30305);
        let linked = Enode::from_parts(NODE_ID, Ipv4Addr::new(10, 5, 0, 11), 30304).unwrap();
        let config = ConfigRenderer::default()
            .node_config(&node, &network(), &bootnode_enode(), Some(&linked))
            .unwrap();
        assert_eq!(config.bootnodes.len(), 2);
        assert_eq!(config.bootnodes[1], linked.to_string());

        let same = ConfigRenderer::default()
            .node_config(&node, &network(), &bootnode_enode(), Some(&bootnode_enode()))
            .unwrap();
        assert_eq!(same.bootnodes.len(), 1);
    }

    #[test]
    fn test_wrong_role_rejected() {
        let boot = NodeDefinition::new("boot", NodeRole::Bootnode, 8545, 30303);
        assert!(ConfigRenderer::default()
            .node_config(&boot, &network(), &bootnode_enode(), None)
            .is_err());
        let normal = NodeDefinition::new("normal", NodeRole::Normal, 8547, 30305);
        assert!(ConfigRenderer::default().bootnode_config(&normal, &network()).is_err());
    }

    #[test]
    fn test_render_writes_parseable_toml() {
        let dir = tempfile::tempdir().unwrap();
        let node = NodeDefinition::new("boot", NodeRole::Bootnode, 8545, 30303);
        let config = ConfigRenderer::default()
            .render_bootnode(&node, &network(), dir.path())
            .unwrap();

        let raw = fs::read_to_string(dir.path().join(CONFIG_FILE)).unwrap();
        assert!(raw.contains("rpc-http-port = 8545"));
        assert!(raw.contains("data-path = \"/opt/besu/data\""));
        assert!(!raw.contains("miner-coinbase"));
        assert_eq!(BesuNodeConfig::from_toml(&raw).unwrap(), config);
    }
}
