//! # Static Addresses
//!
//! Addresses are stable across runs, never handed out twice, spill into the
//! next `/24` once `.10`–`.254` are used and fail once both blocks are full.

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use node_orchestrator::OrchestratorError;
    use shared_types::{NodeDefinition, NodeRole};

    use crate::integration::fixtures::{net1, Harness};

    /// Hold `.10`–`.254` of `10.5.<block>.0/24` under placeholder names.
    fn fill_block(h: &Harness, block: u8) {
        let allocator = h.plane.orchestrator().allocator();
        for octet in 10..=254u8 {
            allocator
                .reserve(&format!("held-{}-{}", block, octet), "net1", Ipv4Addr::new(10, 5, block, octet))
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_first_nodes_start_at_dot_ten() {
        let h = Harness::new();
        h.plane.provision(net1()).await.unwrap();

        let network = h.plane.network(Some("net1")).unwrap();
        let ips: Vec<Ipv4Addr> = network.nodes.iter().map(|n| n.ip.unwrap()).collect();
        assert_eq!(
            ips,
            vec![
                Ipv4Addr::new(10, 5, 0, 10),
                Ipv4Addr::new(10, 5, 0, 11),
                Ipv4Addr::new(10, 5, 0, 12)
            ]
        );
    }

    #[tokio::test]
    async fn test_allocation_is_idempotent_per_node() {
        let h = Harness::new();
        let allocator = h.plane.orchestrator().allocator();

        let first = allocator.get_or_assign("miner", "net1").await.unwrap();
        let again = allocator.get_or_assign("miner", "net1").await.unwrap();
        let other = allocator.get_or_assign("normal", "net1").await.unwrap();

        assert_eq!(first, again);
        assert_ne!(first, other);
    }

    #[tokio::test]
    async fn test_full_first_block_falls_back_to_next() {
        let h = Harness::new();
        fill_block(&h, 0);

        h.plane.provision(net1()).await.unwrap();

        let network = h.plane.network(Some("net1")).unwrap();
        for node in &network.nodes {
            let octets = node.ip.unwrap().octets();
            assert_eq!(&octets[..3], &[10, 5, 1]);
        }
        assert_eq!(network.node("bootnode").unwrap().ip, Some(Ipv4Addr::new(10, 5, 1, 10)));
    }

    #[tokio::test]
    async fn test_both_blocks_full_is_resource_exhausted() {
        let h = Harness::new();
        fill_block(&h, 0);
        fill_block(&h, 1);

        let err = h.plane.provision(net1()).await.unwrap_err();

        match err {
            OrchestratorError::ResourceExhausted { network, node, subnet } => {
                assert_eq!(network, "net1");
                assert_eq!(node, "bootnode");
                assert_eq!(subnet.to_string(), "10.5.0.0/16");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(h.runtime.started().is_empty());
    }

    #[tokio::test]
    async fn test_declared_address_is_honoured_and_reserved() {
        let h = Harness::new();
        let mut network = net1();
        network.nodes[1] = NodeDefinition::new("miner", NodeRole::Miner, 8546, 30304)
            .with_ip(Ipv4Addr::new(10, 5, 0, 10));

        h.plane.provision(network).await.unwrap();

        let spec = h.runtime.spec("net1-miner").unwrap();
        assert_eq!(spec.ip, Some(Ipv4Addr::new(10, 5, 0, 10)));
        let mappings = h.plane.orchestrator().allocator().mappings("net1").unwrap();
        assert_eq!(mappings.get("miner"), Some(Ipv4Addr::new(10, 5, 0, 10)));
        // The bootnode skips the reserved address.
        assert_eq!(mappings.get("bootnode"), Some(Ipv4Addr::new(10, 5, 0, 11)));
    }

    #[tokio::test]
    async fn test_declared_address_held_by_other_node_conflicts() {
        let h = Harness::new();
        h.plane
            .orchestrator()
            .allocator()
            .reserve("someone-else", "net1", Ipv4Addr::new(10, 5, 0, 50))
            .unwrap();
        let mut network = net1();
        network.nodes[2].ip = Some(Ipv4Addr::new(10, 5, 0, 50));

        let err = h.plane.provision(network).await.unwrap_err();

        assert!(matches!(err, OrchestratorError::AddressConflict { ref node, .. } if node == "normal"));
        assert!(h.runtime.started().is_empty());
    }

    #[tokio::test]
    async fn test_unreported_subnet_uses_fallback_range() {
        let h = Harness::new();
        let allocator = h.plane.orchestrator().allocator();

        // No container network named "ghost" exists, so no subnet is known.
        let ip = allocator.get_or_assign("node", "ghost").await.unwrap();

        let fallback = h.plane.orchestrator().config().fallback_subnet;
        assert!(fallback.contains(ip));
    }
}
