//! # Signer Membership
//!
//! Sealing nodes that are not genesis signers are proposed to the running
//! signers. Proposal failures never fail the node.

#[cfg(test)]
mod tests {
    use cn_05_node_rpc::{CLIQUE_GET_SIGNERS, CLIQUE_PROPOSE};
    use cn_06_consensus_membership::{ConsensusProposalError, MembershipOutcome};
    use serde_json::json;
    use shared_types::{NetworkDefinition, NodeDefinition, NodeRole, NodeState};

    use crate::integration::fixtures::{endpoint, net1, Harness};

    fn signer2() -> NodeDefinition {
        NodeDefinition::new("signer2", NodeRole::Signer, 8548, 30306)
    }

    // =========================================================================
    // STARTUP
    // =========================================================================

    #[tokio::test]
    async fn test_second_declared_signer_proposed_by_first() {
        let h = Harness::new();
        let miner = h.node_key("net1", "miner");
        let candidate = h.node_key("net1", "signer2");
        h.signers_at(8546, &[miner]);
        h.transport.respond(&endpoint(8546), CLIQUE_PROPOSE, json!(true));

        let report = h.plane.provision(net1().with_node(signer2())).await.unwrap();

        let proposals = h.transport.calls_to(CLIQUE_PROPOSE);
        assert_eq!(proposals.len(), 1);
        assert_eq!(proposals[0].endpoint, endpoint(8546));
        assert_eq!(proposals[0].params, json!([candidate.to_string(), true]));

        let node = report.node("signer2").unwrap();
        assert!(matches!(node.membership, Some(MembershipOutcome::Pending { votes: 1, .. })));
        assert_eq!(
            node.lifecycle.history(),
            &[
                NodeState::Created,
                NodeState::Starting,
                NodeState::Ready,
                NodeState::Proposed,
                NodeState::Pending,
                NodeState::Running
            ]
        );
        assert_eq!(report.votes_cast(), 1);
    }

    #[tokio::test]
    async fn test_admission_observed_in_signer_set() {
        let h = Harness::new();
        let miner = h.node_key("net1", "miner");
        let candidate = h.node_key("net1", "signer2");
        h.signers_at(8546, &[miner, candidate]);
        h.transport.respond(&endpoint(8546), CLIQUE_PROPOSE, json!(true));

        let report = h.plane.provision(net1().with_node(signer2())).await.unwrap();

        let node = report.node("signer2").unwrap();
        assert!(matches!(node.membership, Some(MembershipOutcome::Admitted { votes: 1 })));
        assert!(node.lifecycle.history().contains(&NodeState::Admitted));
        assert_eq!(*node.state(), NodeState::Running);
    }

    #[tokio::test]
    async fn test_signer_declared_before_genesis_signer_is_proposed() {
        let h = Harness::new();
        let network = NetworkDefinition::new("net1", 1337, "10.5.0.0/16".parse().unwrap())
            .with_node(NodeDefinition::new("bootnode", NodeRole::Bootnode, 8545, 30303))
            .with_node(NodeDefinition::new("s1", NodeRole::Signer, 8546, 30304))
            .with_node(NodeDefinition::new("s2", NodeRole::Signer, 8547, 30305).as_validator());
        let s1 = h.node_key("net1", "s1");
        let s2 = h.node_key("net1", "s2");
        h.signers_at(8547, &[s2]);
        h.transport.respond(&endpoint(8547), CLIQUE_PROPOSE, json!(true));

        let report = h.plane.provision(network).await.unwrap();

        let proposals = h.transport.calls_to(CLIQUE_PROPOSE);
        assert_eq!(proposals.len(), 1);
        assert_eq!(proposals[0].endpoint, endpoint(8547));
        assert_eq!(proposals[0].params, json!([s1.to_string(), true]));

        let node = report.node("s1").unwrap();
        assert!(matches!(node.membership, Some(MembershipOutcome::Pending { votes: 1, .. })));
        assert_eq!(*node.state(), NodeState::Running);
        assert!(report.node("s2").unwrap().membership.is_none());
        assert_eq!(
            h.runtime.started(),
            vec!["net1-bootnode", "net1-s1", "net1-s2"]
        );
    }

    #[tokio::test]
    async fn test_genesis_signers_are_never_proposed() {
        let h = Harness::new();
        let network = NetworkDefinition::new("net1", 1337, "10.5.0.0/16".parse().unwrap())
            .with_node(NodeDefinition::new("bootnode", NodeRole::Bootnode, 8545, 30303))
            .with_node(NodeDefinition::new("a", NodeRole::Signer, 8546, 30304).as_validator())
            .with_node(NodeDefinition::new("b", NodeRole::Signer, 8547, 30305).as_validator());

        let report = h.plane.provision(network).await.unwrap();

        assert!(h.transport.calls_to(CLIQUE_PROPOSE).is_empty());
        assert!(report.nodes.iter().all(|n| n.membership.is_none()));
    }

    // =========================================================================
    // ADD NODE
    // =========================================================================

    #[tokio::test]
    async fn test_added_signer_issues_exactly_one_proposal() {
        let h = Harness::new();
        let miner = h.node_key("net1", "miner");
        h.signers_at(8546, &[miner]);
        h.transport.respond(&endpoint(8546), CLIQUE_PROPOSE, json!(true));
        h.plane.provision(net1()).await.unwrap();

        let report = h.plane.add_node(Some("net1"), signer2()).await.unwrap();

        assert_eq!(h.transport.calls_to(CLIQUE_PROPOSE).len(), 1);
        assert_eq!(report.membership.as_ref().map(|m| m.votes()), Some(1));
        assert_eq!(*report.state(), NodeState::Running);

        let network = h.plane.network(Some("net1")).unwrap();
        assert_eq!(network.nodes.last().map(|n| n.name.as_str()), Some("signer2"));
        assert!(h.plane.orchestrator().layout().definition_file("net1").is_file());
    }

    #[tokio::test]
    async fn test_failed_proposal_still_completes_node_start() {
        let h = Harness::new();
        let miner = h.node_key("net1", "miner");
        h.signers_at(8546, &[miner]);
        h.transport.fail(&endpoint(8546), CLIQUE_PROPOSE, "method not enabled");
        h.plane.provision(net1()).await.unwrap();

        let report = h.plane.add_node(Some("net1"), signer2()).await.unwrap();

        assert_eq!(h.transport.calls_to(CLIQUE_PROPOSE).len(), 1);
        let outcome = report.membership.as_ref().unwrap();
        assert_eq!(outcome.votes(), 0);
        assert_eq!(outcome.failed_proposals(), 1);
        assert_eq!(*report.state(), NodeState::Running);
        assert!(h
            .runtime
            .running()
            .iter()
            .any(|c| c.name == "net1-signer2"));
    }

    #[tokio::test]
    async fn test_voter_missing_from_signer_set_is_skipped() {
        let h = Harness::new();
        h.signers_at(8546, &[]);
        h.plane.provision(net1()).await.unwrap();

        let report = h.plane.add_node(Some("net1"), signer2()).await.unwrap();

        assert!(h.transport.calls_to(CLIQUE_PROPOSE).is_empty());
        match report.membership.unwrap() {
            MembershipOutcome::Pending { votes, errors } => {
                assert_eq!(votes, 0);
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, ConsensusProposalError::NotASigner { .. })));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_added_normal_node_needs_no_vote() {
        let h = Harness::new();
        h.plane.provision(net1()).await.unwrap();

        let report = h
            .plane
            .add_node(Some("net1"), NodeDefinition::new("rpc2", NodeRole::Rpc, 8548, 30306))
            .await
            .unwrap();

        assert!(report.membership.is_none());
        assert!(h.transport.calls_to(CLIQUE_GET_SIGNERS).is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_port_rejected_without_side_effects() {
        let h = Harness::new();
        h.plane.provision(net1()).await.unwrap();
        let started = h.runtime.started().len();

        let err = h
            .plane
            .add_node(Some("net1"), NodeDefinition::new("clash", NodeRole::Normal, 8546, 30399))
            .await
            .unwrap_err();

        assert!(matches!(err, node_orchestrator::OrchestratorError::Configuration { .. }));
        assert_eq!(h.runtime.started().len(), started);
        assert!(h.plane.network(Some("net1")).unwrap().node("clash").is_none());
    }

    // =========================================================================
    // REMOVAL
    // =========================================================================

    #[tokio::test]
    async fn test_removed_signer_voted_out_by_remaining() {
        let h = Harness::new();
        let network = NetworkDefinition::new("net1", 1337, "10.5.0.0/16".parse().unwrap())
            .with_node(NodeDefinition::new("bootnode", NodeRole::Bootnode, 8545, 30303))
            .with_node(NodeDefinition::new("a", NodeRole::Signer, 8546, 30304).as_validator())
            .with_node(NodeDefinition::new("b", NodeRole::Signer, 8547, 30305).as_validator());
        let a = h.node_key("net1", "a");
        let b = h.node_key("net1", "b");
        h.signers_at(8546, &[a]);
        h.transport.respond(&endpoint(8546), CLIQUE_PROPOSE, json!(true));
        h.plane.provision(network).await.unwrap();

        let outcome = h.plane.remove_node(Some("net1"), "b").await.unwrap();

        let proposals = h.transport.calls_to(CLIQUE_PROPOSE);
        assert_eq!(proposals.len(), 1);
        assert_eq!(proposals[0].params, json!([b.to_string(), false]));
        assert!(matches!(outcome, Some(MembershipOutcome::Removed { votes: 1 })));
    }
}
