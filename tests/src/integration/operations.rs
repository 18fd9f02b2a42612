//! # Operations on Provisioned Networks
//!
//! Re-running provisioning, removing nodes, teardown and status.

#[cfg(test)]
mod tests {
    use cn_01_genesis::GenesisDocument;
    use cn_04_container_runtime::test_utils::RuntimeCall;
    use cn_04_container_runtime::ContainerState;
    use node_orchestrator::OrchestratorError;
    use shared_types::{ConfigurationError, NodeDefinition, NodeRole};

    use crate::integration::fixtures::{endpoint, net1, Harness};

    // =========================================================================
    // RE-RUN
    // =========================================================================

    #[tokio::test]
    async fn test_rerun_reuses_keys_genesis_and_containers() {
        let h = Harness::new();
        let first = h.plane.provision(net1()).await.unwrap();
        let layout = h.plane.orchestrator().layout();
        let genesis_before = std::fs::read_to_string(layout.genesis_file("net1")).unwrap();
        let before = h.plane.network(Some("net1")).unwrap();
        let runs = h.runtime.started().len();

        let second = h.plane.provision(net1()).await.unwrap();
        let after = h.plane.network(Some("net1")).unwrap();

        assert!(first.genesis_created);
        assert!(!second.genesis_created);
        assert!(second.nodes.iter().all(|n| n.reused));
        assert_eq!(h.runtime.started().len(), runs);
        assert_eq!(
            std::fs::read_to_string(layout.genesis_file("net1")).unwrap(),
            genesis_before
        );
        for (old, new) in before.nodes.iter().zip(&after.nodes) {
            assert_eq!(old.address, new.address);
            assert_eq!(old.ip, new.ip);
        }
    }

    #[tokio::test]
    async fn test_stopped_container_restarted_on_rerun() {
        let h = Harness::new();
        h.plane.provision(net1()).await.unwrap();
        h.runtime.set_state("net1-normal", ContainerState::Exited);

        let report = h.plane.provision(net1()).await.unwrap();

        assert!(h
            .runtime
            .calls()
            .contains(&RuntimeCall::StartContainer("net1-normal".to_string())));
        assert!(!report.node("normal").unwrap().reused);
        assert!(report.node("miner").unwrap().reused);
    }

    #[tokio::test]
    async fn test_new_process_reloads_persisted_networks() {
        let h = Harness::new();
        h.plane.provision(net1()).await.unwrap();
        let expected = h.plane.network(Some("net1")).unwrap();

        let reopened = h.reopen();
        assert_eq!(reopened.load_persisted().unwrap(), 1);
        assert_eq!(reopened.network(None).unwrap(), expected);
    }

    // =========================================================================
    // REMOVE NODE
    // =========================================================================

    #[tokio::test]
    async fn test_remove_node_frees_container_and_address() {
        let h = Harness::new();
        h.plane.provision(net1()).await.unwrap();
        let allocator = h.plane.orchestrator().allocator();
        let freed = allocator.lookup("normal", "net1").unwrap().unwrap();

        let outcome = h.plane.remove_node(Some("net1"), "normal").await.unwrap();

        assert!(outcome.is_none());
        assert!(h.runtime.spec("net1-normal").is_none());
        assert_eq!(allocator.lookup("normal", "net1").unwrap(), None);
        assert!(h.plane.network(Some("net1")).unwrap().node("normal").is_none());

        // The freed address goes to the next node that needs one.
        let report = h
            .plane
            .add_node(Some("net1"), NodeDefinition::new("replacement", NodeRole::Normal, 8548, 30306))
            .await
            .unwrap();
        assert_eq!(report.ip, freed);
    }

    #[tokio::test]
    async fn test_remove_unknown_node_is_configuration_error() {
        let h = Harness::new();
        h.plane.provision(net1()).await.unwrap();

        let err = h.plane.remove_node(Some("net1"), "ghost").await.unwrap_err();

        assert!(matches!(
            err,
            OrchestratorError::Configuration {
                source: ConfigurationError::UnknownNode { .. },
                ..
            }
        ));
    }

    // =========================================================================
    // TEARDOWN
    // =========================================================================

    #[tokio::test]
    async fn test_teardown_keeps_data_for_reprovisioning() {
        let h = Harness::new();
        h.plane.provision(net1()).await.unwrap();
        let before = h.plane.network(Some("net1")).unwrap();

        h.plane.teardown(Some("net1"), false).await.unwrap();

        assert!(!h.runtime.has_network("net1"));
        assert!(h.runtime.running().is_empty());
        assert!(h.plane.registry().is_empty());
        assert!(h
            .runtime
            .calls()
            .contains(&RuntimeCall::RemoveNetwork {
                name: "net1".to_string(),
                remove_containers: true
            }));

        let report = h.plane.provision(net1()).await.unwrap();
        assert!(!report.genesis_created);
        let after = h.plane.network(Some("net1")).unwrap();
        for (old, new) in before.nodes.iter().zip(&after.nodes) {
            assert_eq!(old.address, new.address);
            assert_eq!(old.ip, new.ip);
        }
    }

    #[tokio::test]
    async fn test_teardown_with_purge_removes_data_dir() {
        let h = Harness::new();
        h.plane.provision(net1()).await.unwrap();
        let dir = h.plane.orchestrator().layout().network_dir("net1");

        h.plane.teardown(None, true).await.unwrap();

        assert!(!dir.exists());
        assert_eq!(h.reopen().load_persisted().unwrap(), 0);
    }

    // =========================================================================
    // STATUS
    // =========================================================================

    #[tokio::test]
    async fn test_status_reports_chain_progress_of_running_nodes() {
        let h = Harness::new();
        h.plane.provision(net1()).await.unwrap();
        h.runtime.set_state("net1-normal", ContainerState::Exited);

        let status = h.plane.status(Some("net1")).await.unwrap();

        assert_eq!(status.chain_id, 1337);
        assert_eq!(status.running(), 2);
        let miner = status.nodes.iter().find(|n| n.name == "miner").unwrap();
        assert_eq!(miner.block_number, Some(5));
        assert_eq!(miner.peer_count, Some(2));
        let normal = status.nodes.iter().find(|n| n.name == "normal").unwrap();
        assert_eq!(normal.state, Some(ContainerState::Exited));
        assert_eq!(normal.block_number, None);

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["network"], "net1");
    }

    #[tokio::test]
    async fn test_genesis_survives_definition_changes() {
        let h = Harness::new();
        h.plane.provision(net1()).await.unwrap();
        let layout = h.plane.orchestrator().layout();
        let original = GenesisDocument::read_from(&layout.genesis_file("net1")).unwrap();

        h.plane
            .add_node(Some("net1"), NodeDefinition::new("signer2", NodeRole::Signer, 8548, 30306))
            .await
            .unwrap();

        let current = GenesisDocument::read_from(&layout.genesis_file("net1")).unwrap();
        assert_eq!(current, original);
    }
}
