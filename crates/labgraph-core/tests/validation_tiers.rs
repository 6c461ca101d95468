//! # Validation Tier Tests (T0-T4)
//!
//! End-to-end behaviour on the three-layer demo topology.
//!
//! ## Tiers
//! - T0: Model Integrity
//! - T1: Single-Hop Routes
//! - T2: Multi-Hop Routes
//! - T3: Failure Outcomes
//! - T4: Inspection and Reporting

use labgraph_core::demo::{self, LAYER_A, LAYER_B, LAYER_C};
use labgraph_core::{
    CancellationToken, Graph, GraphError, GraphStore, LineWriter, PathReporter, RedbGraph,
    Selector, Session, find_route,
};

fn demo_session() -> Session {
    let mut graph = Graph::new();
    demo::populate(&mut graph).expect("populate");
    Session::with_graph(graph)
}

fn keys(session: &Session, from: (&str, &str), to: (&str, &str)) -> Vec<String> {
    let route = session
        .find_route(from.0, from.1, to.0, to.1)
        .expect("route");
    PathReporter::default().render(&route)
}

// =============================================================================
// TIER T0: MODEL INTEGRITY
// =============================================================================

mod t0_model_integrity {
    use super::*;
    use labgraph_core::NodeId;

    /// T0.1: Empty labels are rejected.
    #[test]
    fn empty_label_rejected() {
        let mut session = Session::new();
        let result = session.create_keyed_node("", "1");
        assert!(matches!(result, Err(GraphError::InvalidLabel(_))));
        assert_eq!(session.node_count().expect("count"), 0);
    }

    /// T0.2: Relationships need both endpoints in the store.
    #[test]
    fn invalid_endpoint_rejected() {
        let mut session = Session::new();
        let a = session.create_keyed_node(LAYER_A, "1").expect("a");

        let result = session.create_relationship(a.id, NodeId(99), "X");
        assert!(matches!(result, Err(GraphError::InvalidEndpoint(NodeId(99)))));
        assert_eq!(session.relationship_count().expect("count"), 0);
    }

    /// T0.3: Parallel relationships between the same pair are kept.
    #[test]
    fn parallel_relationships_kept() {
        let mut session = Session::new();
        let a = session.create_keyed_node(LAYER_A, "1").expect("a");
        let b = session.create_keyed_node(LAYER_B, "11").expect("b");

        session.create_relationship(a.id, b.id, "X").expect("x");
        session.create_relationship(a.id, b.id, "X").expect("x again");
        session.create_relationship(a.id, b.id, "Y").expect("y");

        assert_eq!(session.relationship_count().expect("count"), 3);
    }
}

// =============================================================================
// TIER T1: SINGLE-HOP ROUTES
// =============================================================================

mod t1_single_hop {
    use super::*;

    /// T1.1: A direct relationship is a one-hop route.
    #[test]
    fn direct_relationship_is_route() {
        let mut session = Session::new();
        let a = session.create_keyed_node(LAYER_A, "1").expect("a");
        let b = session.create_keyed_node(LAYER_B, "11").expect("b");
        session.create_relationship(a.id, b.id, "X").expect("x");

        assert_eq!(keys(&session, ("A", "1"), ("B", "11")), vec!["1", "11"]);
    }

    /// T1.2: Start equal to goal is a single-node route.
    #[test]
    fn start_is_goal() {
        let session = demo_session();
        let route = session.find_route("B", "22", "B", "22").expect("route");
        assert_eq!(route.hops(), 0);
        assert_eq!(route.explored, 1);
    }
}

// =============================================================================
// TIER T2: MULTI-HOP ROUTES
// =============================================================================

mod t2_multi_hop {
    use super::*;

    /// T2.1: A1 reaches C111 through the first-discovered B node.
    #[test]
    fn a1_to_c111_on_demo_graph() {
        let session = demo_session();
        assert_eq!(
            keys(&session, ("A", "1"), ("C", "111")),
            vec!["1", "33", "111"]
        );
    }

    /// T2.2: Every A node reaches some C node in exactly two hops.
    #[test]
    fn a_layer_reaches_c_layer_in_two_hops() {
        let session = demo_session();
        for a in ["1", "2", "3", "4", "5"] {
            for c in ["111", "222", "333", "444", "555"] {
                match session.find_route(LAYER_A, a, LAYER_C, c) {
                    Ok(route) => assert_eq!(route.hops(), 2, "A {} -> C {}", a, c),
                    Err(e) => assert!(e.is_no_route(), "A {} -> C {}: {}", a, c, e),
                }
            }
        }
    }

    /// T2.3: Routes are stable across repeated searches.
    #[test]
    fn repeated_searches_agree() {
        let session = demo_session();
        let first = session.find_route("A", "4", "C", "555").expect("route");
        for _ in 0..10 {
            assert_eq!(
                session.find_route("A", "4", "C", "555").expect("route"),
                first
            );
        }
    }

    /// T2.4: The redb backend finds the same route as the in-memory graph.
    #[test]
    fn redb_backend_agrees_with_memory() {
        let temp = tempfile::tempdir().expect("temp dir");
        let mut redb = RedbGraph::open(temp.path().join("demo.redb")).expect("open");
        demo::populate(&mut redb).expect("populate");

        let mut memory = Graph::new();
        demo::populate(&mut memory).expect("populate");

        let from = Selector::by_key("A", "3");
        let to = Selector::by_key("C", "111");
        assert_eq!(
            find_route(&redb, &from, &to).expect("redb route"),
            find_route(&memory, &from, &to).expect("memory route")
        );
    }

    /// T2.5: Independent searches may run on separate threads.
    #[test]
    fn concurrent_searches_share_read_access() {
        let session = demo_session();
        let expected = session.find_route("A", "1", "C", "111").expect("route");

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| session.find_route("A", "1", "C", "111")))
                .collect();
            for handle in handles {
                let route = handle.join().expect("join").expect("route");
                assert_eq!(route, expected);
            }
        });
    }
}

// =============================================================================
// TIER T3: FAILURE OUTCOMES
// =============================================================================

mod t3_failures {
    use super::*;

    /// T3.1: An unknown goal fails before traversal.
    #[test]
    fn unknown_goal_is_node_not_found() {
        let session = demo_session();
        let result = session.find_route("A", "1", "C", "999");
        let expected = Selector::by_key("C", "999");
        assert!(matches!(&result, Err(GraphError::NodeNotFound(s)) if *s == expected));
    }

    /// T3.2: Only outgoing relationships are followed.
    #[test]
    fn reverse_direction_is_no_route() {
        let session = demo_session();
        let result = session.find_route("C", "111", "A", "1");
        assert!(matches!(result, Err(GraphError::NoRoute { .. })));
    }

    /// T3.3: A C node never reaches another C node.
    #[test]
    fn sink_layer_has_no_routes() {
        let session = demo_session();
        assert!(matches!(
            session.find_route("C", "111", "C", "222"),
            Err(GraphError::NoRoute { .. })
        ));
    }

    /// T3.4: A cancelled search reports cancellation, not a route.
    #[test]
    fn cancelled_search() {
        let session = demo_session();
        let token = CancellationToken::new();
        token.cancel();
        assert!(matches!(
            session.find_route_with_cancellation("A", "1", "C", "111", token),
            Err(GraphError::Cancelled)
        ));
    }
}

// =============================================================================
// TIER T4: INSPECTION AND REPORTING
// =============================================================================

mod t4_inspection {
    use super::*;

    /// T4.1: Listing shows each outgoing relationship with its target key.
    #[test]
    fn list_two_outgoing_relationships() {
        let mut session = Session::new();
        let a = session.create_keyed_node(LAYER_A, "1").expect("a");
        let b1 = session.create_keyed_node(LAYER_B, "11").expect("b1");
        let b3 = session.create_keyed_node(LAYER_B, "33").expect("b3");
        session.create_relationship(a.id, b3.id, "X").expect("x");
        session.create_relationship(a.id, b1.id, "X").expect("x");

        let views = session.list_outgoing_relationships("A", "1").expect("list");
        let rendered: Vec<_> = views
            .iter()
            .map(|v| (v.rel_type.as_str(), v.target_label.as_str(), v.target_key.as_str()))
            .collect();
        assert_eq!(rendered, vec![("X", "B", "33"), ("X", "B", "11")]);
    }

    /// T4.2: Listing an unknown node is NodeNotFound.
    #[test]
    fn list_unknown_node() {
        let session = demo_session();
        assert!(matches!(
            session.list_outgoing_relationships("A", "42"),
            Err(GraphError::NodeNotFound(_))
        ));
    }

    /// T4.3: The line writer prints one key per line.
    #[test]
    fn route_written_line_by_line() {
        let session = demo_session();
        let route = session.find_route("A", "1", "C", "111").expect("route");

        let mut writer = LineWriter::new(Vec::new());
        PathReporter::default()
            .report(&route, &mut writer)
            .expect("report");
        let text = String::from_utf8(writer.into_inner()).expect("utf8");
        assert_eq!(text, "1\n33\n111\n");
    }

    /// T4.4: Snapshots of a persistent session keep every relationship.
    #[test]
    fn persistent_snapshot_keeps_demo_graph() {
        let temp = tempfile::tempdir().expect("temp dir");
        let mut session = Session::with_redb(temp.path().join("demo.redb")).expect("open");
        demo::populate(session.store_mut()).expect("populate");

        let snapshot = session.snapshot().expect("snapshot");
        assert_eq!(snapshot.node_count().expect("count"), 15);
        assert_eq!(snapshot.relationship_count().expect("count"), 23);
    }
}
