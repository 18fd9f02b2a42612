//! # Sequenced Startup
//!
//! Bootnode first, enode discovery, then the remaining nodes in declared
//! order; readiness bounded by the configured attempt count.

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use cn_01_genesis::{decode_extra_data, extra_data_len, GenesisDocument};
    use cn_04_container_runtime::test_utils::RuntimeCall;
    use cn_04_container_runtime::LABEL_NODE;
    use cn_05_node_rpc::{ADMIN_NODE_INFO, CLIQUE_PROPOSE, ETH_BLOCK_NUMBER};
    use node_orchestrator::OrchestratorError;
    use primitive_types::U256;
    use shared_crypto::read_public_key;
    use shared_types::{NetworkDefinition, NodeDefinition, NodeRole, NodeState};

    use crate::integration::fixtures::{endpoint, net1, Harness, BOOTNODE_ID};

    // =========================================================================
    // CONTAINERS
    // =========================================================================

    #[tokio::test]
    async fn test_every_declared_node_gets_a_unique_container() {
        let h = Harness::new();
        let mut network = net1()
            .with_node(NodeDefinition::new("signer", NodeRole::Signer, 8548, 30306))
            .with_node(NodeDefinition::new("rpc", NodeRole::Rpc, 8549, 30307));
        let declared = network.nodes.len();

        let report = h.plane.provision(network.clone()).await.unwrap();
        network = h.plane.network(Some("net1")).unwrap();

        let running = h.runtime.running();
        assert_eq!(running.len(), declared);
        assert_eq!(report.nodes.len(), declared);

        let mut names = HashSet::new();
        let mut ips = HashSet::new();
        let mut rpc_ports = HashSet::new();
        let mut p2p_ports = HashSet::new();
        for node in &network.nodes {
            assert!(names.insert(node.name.clone()));
            assert!(ips.insert(node.ip.unwrap()));
            assert!(rpc_ports.insert(node.rpc_port));
            assert!(p2p_ports.insert(node.p2p_port));

            let container = running
                .iter()
                .find(|c| c.label(LABEL_NODE) == Some(node.name.as_str()))
                .unwrap();
            assert_eq!(container.ip_address, node.ip);
        }
    }

    #[tokio::test]
    async fn test_bootnode_starts_first_then_declared_order() {
        let h = Harness::new();
        h.plane.provision(net1()).await.unwrap();

        assert_eq!(
            h.runtime.started(),
            vec!["net1-bootnode", "net1-miner", "net1-normal"]
        );
        assert_eq!(h.runtime.calls()[0], RuntimeCall::CreateNetwork("net1".to_string()));
    }

    #[tokio::test]
    async fn test_lifecycle_ends_running_for_every_node() {
        let h = Harness::new();
        let report = h.plane.provision(net1()).await.unwrap();

        for node in &report.nodes {
            assert_eq!(
                node.lifecycle.history(),
                &[
                    NodeState::Created,
                    NodeState::Starting,
                    NodeState::Ready,
                    NodeState::Running
                ]
            );
        }
    }

    // =========================================================================
    // ENODE DISCOVERY
    // =========================================================================

    #[tokio::test]
    async fn test_wildcard_enode_rewritten_to_container_address() {
        let h = Harness::new();
        let report = h.plane.provision(net1()).await.unwrap();
        let network = h.plane.network(Some("net1")).unwrap();
        let boot_ip = network.node("bootnode").unwrap().ip.unwrap();

        assert_eq!(report.bootnode_enode.host, boot_ip.to_string());
        assert_eq!(report.bootnode_enode.node_id, BOOTNODE_ID);

        let layout = h.plane.orchestrator().layout();
        let persisted = std::fs::read_to_string(layout.enode_file("net1", "bootnode")).unwrap();
        assert_eq!(persisted, report.bootnode_enode.to_string());

        let config = std::fs::read_to_string(layout.node_dir("net1", "miner").join("config.toml")).unwrap();
        assert!(config.contains(&report.bootnode_enode.to_string()));
        assert!(!config.contains("0.0.0.0:30303"));
    }

    #[tokio::test]
    async fn test_linked_peer_enode_added_to_bootnodes() {
        let h = Harness::new();
        let network = net1().with_node(
            NodeDefinition::new("follower", NodeRole::Normal, 8548, 30306).linked_to("miner"),
        );
        h.plane.provision(network).await.unwrap();

        let network = h.plane.network(Some("net1")).unwrap();
        let layout = h.plane.orchestrator().layout();
        let miner = network.node("miner").unwrap();
        let miner_key = read_public_key(&layout.node_dir("net1", "miner")).unwrap();
        let expected = format!("enode://{}@{}:30304", miner_key.to_hex(), miner.ip.unwrap());

        let config =
            std::fs::read_to_string(layout.node_dir("net1", "follower").join("config.toml")).unwrap();
        assert!(config.contains(&expected));
    }

    #[tokio::test]
    async fn test_enode_queried_from_bootnode_only() {
        let h = Harness::new();
        h.plane.provision(net1()).await.unwrap();

        let calls = h.transport.calls_to(ADMIN_NODE_INFO);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].endpoint, endpoint(8545));
    }

    // =========================================================================
    // READINESS
    // =========================================================================

    #[tokio::test]
    async fn test_silent_node_fails_after_exact_attempt_count() {
        let h = Harness::with_readiness(5);
        // Only the bootnode answers; the miner's RPC never comes up.
        h.transport.respond(&endpoint(8545), ETH_BLOCK_NUMBER, serde_json::json!("0x0"));
        h.transport.fail(&endpoint(8546), ETH_BLOCK_NUMBER, "connection refused");

        let err = h.plane.provision(net1()).await.unwrap_err();

        match &err {
            OrchestratorError::NodeNotReady {
                network,
                node,
                attempts,
                last_error,
            } => {
                assert_eq!(network, "net1");
                assert_eq!(node, "miner");
                assert_eq!(*attempts, 5);
                assert!(last_error.as_deref().unwrap_or_default().contains("connection refused"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(h.transport.calls_to_endpoint(&endpoint(8546), ETH_BLOCK_NUMBER), 5);
        // Remaining nodes are not started; started ones are left running.
        assert_eq!(h.runtime.started(), vec!["net1-bootnode", "net1-miner"]);
        assert_eq!(h.runtime.running().len(), 2);
    }

    #[tokio::test]
    async fn test_late_answer_within_budget_succeeds() {
        let h = Harness::with_readiness(4);
        h.transport
            .respond_after(&endpoint(8545), ETH_BLOCK_NUMBER, 3, serde_json::json!("0x0"));

        h.plane.provision(net1()).await.unwrap();
        assert_eq!(h.transport.calls_to_endpoint(&endpoint(8545), ETH_BLOCK_NUMBER), 4);
    }

    #[tokio::test]
    async fn test_partial_start_is_persisted_for_teardown() {
        let h = Harness::with_readiness(1);
        h.transport.fail(&endpoint(8547), ETH_BLOCK_NUMBER, "down");

        assert!(h.plane.provision(net1()).await.is_err());
        assert!(h.plane.registry().contains("net1"));

        h.plane.teardown(Some("net1"), false).await.unwrap();
        assert!(h.runtime.running().is_empty());
    }

    // =========================================================================
    // GENESIS
    // =========================================================================

    #[tokio::test]
    async fn test_sole_miner_is_funded_genesis_signer() {
        let h = Harness::new();
        h.plane.provision(net1()).await.unwrap();

        let network = h.plane.network(Some("net1")).unwrap();
        let miner = network.node("miner").unwrap().address.unwrap();
        let genesis =
            GenesisDocument::read_from(&h.plane.orchestrator().layout().genesis_file("net1")).unwrap();

        assert_eq!(genesis.chain_id(), 1337);
        assert!(genesis.balance_of(&miner).unwrap() > U256::zero());
        assert_eq!(genesis.validators().unwrap(), vec![miner]);
        assert!(genesis.extra_data.contains(&miner.to_hex()));
        assert_eq!(
            genesis.extra_data.len(),
            2 + 2 * extra_data_len(1)
        );
        assert!(h.transport.calls_to(CLIQUE_PROPOSE).is_empty());
    }

    #[tokio::test]
    async fn test_flagged_validators_all_in_extra_data() {
        let h = Harness::new();
        let network = NetworkDefinition::new("net2", 2024, "10.6.0.0/16".parse().unwrap())
            .with_node(NodeDefinition::new("bootnode", NodeRole::Bootnode, 9545, 31303))
            .with_node(NodeDefinition::new("a", NodeRole::Signer, 9546, 31304).as_validator())
            .with_node(NodeDefinition::new("b", NodeRole::Miner, 9547, 31305).as_validator());
        let a = h.node_key("net2", "a");
        let b = h.node_key("net2", "b");

        h.plane.provision(network).await.unwrap();

        let genesis =
            GenesisDocument::read_from(&h.plane.orchestrator().layout().genesis_file("net2")).unwrap();
        let raw = hex_bytes(&genesis.extra_data);
        assert_eq!(decode_extra_data(&raw).unwrap(), vec![a, b]);
        assert!(h.transport.calls_to(CLIQUE_PROPOSE).is_empty());
    }

    #[tokio::test]
    async fn test_invalid_definition_touches_nothing() {
        let h = Harness::new();
        let network = net1().with_node(NodeDefinition::new("dup", NodeRole::Normal, 8546, 30399));

        let err = h.plane.provision(network).await.unwrap_err();

        assert!(matches!(err, OrchestratorError::Configuration { .. }));
        assert!(h.runtime.calls().is_empty());
        assert!(h.transport.calls().is_empty());
        assert!(!h.plane.orchestrator().layout().genesis_file("net1").exists());
    }

    fn hex_bytes(raw: &str) -> Vec<u8> {
        let digits = raw.trim_start_matches("0x");
        (0..digits.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&digits[i..i + 2], 16).unwrap())
            .collect()
    }
}
