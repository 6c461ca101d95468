//! # Property-Based Tests
//!
//! Route search invariants over randomly generated directed graphs.
//!
//! Every generated graph uses label `N` and keys `"0"..` in creation order,
//! so node `i` is `NodeId(i)` and `Selector::by_key("N", i)`.

use labgraph_core::{
    AttributeValue, Attributes, Graph, GraphError, GraphStore, Label, NodeId, RelationshipType,
    Selector, find_route,
};
use proptest::collection::vec;
use proptest::prelude::*;
use std::collections::{BTreeSet, VecDeque};

// =============================================================================
// HELPERS
// =============================================================================

fn build_graph(size: usize, edges: &[(usize, usize)]) -> Graph {
    let mut graph = Graph::new();
    for i in 0..size {
        let mut attributes = Attributes::new();
        attributes.insert("name".to_string(), AttributeValue::from(i.to_string()));
        graph
            .create_node(Label::new("N"), attributes)
            .expect("create node");
    }
    for &(from, to) in edges {
        graph
            .create_relationship(
                NodeId((from % size) as u64),
                NodeId((to % size) as u64),
                RelationshipType::new("E"),
            )
            .expect("create relationship");
    }
    graph
}

fn selector(i: usize) -> Selector {
    Selector::by_key("N", i.to_string())
}

/// Reference hop distance, computed on a plain adjacency list.
fn reference_distance(
    size: usize,
    edges: &[(usize, usize)],
    start: usize,
    goal: usize,
) -> Option<usize> {
    let mut adjacency = vec![Vec::new(); size];
    for &(from, to) in edges {
        adjacency[from % size].push(to % size);
    }

    let mut distance = vec![None; size];
    distance[start] = Some(0usize);
    let mut queue = VecDeque::from([start]);
    while let Some(u) = queue.pop_front() {
        let d = distance[u]?;
        for &v in &adjacency[u] {
            if distance[v].is_none() {
                distance[v] = Some(d + 1);
                queue.push_back(v);
            }
        }
    }
    distance[goal]
}

fn graph_strategy() -> impl Strategy<Value = (usize, Vec<(usize, usize)>, usize, usize)> {
    (1usize..24).prop_flat_map(|size| {
        (
            Just(size),
            vec((0..size, 0..size), 0..64),
            0..size,
            0..size,
        )
    })
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Same graph, same selectors: same route.
    #[test]
    fn determinism_same_route_for_same_input((size, edges, start, goal) in graph_strategy()) {
        let graph1 = build_graph(size, &edges);
        let graph2 = build_graph(size, &edges);

        let route1 = find_route(&graph1, &selector(start), &selector(goal)).map(|r| r.ids());
        let route2 = find_route(&graph2, &selector(start), &selector(goal)).map(|r| r.ids());
        let again = find_route(&graph1, &selector(start), &selector(goal)).map(|r| r.ids());

        prop_assert_eq!(&route1, &route2);
        prop_assert_eq!(&route1, &again);
    }

    /// A found route has exactly the BFS distance in hops and follows real edges.
    #[test]
    fn shortest_path_matches_reference_distance((size, edges, start, goal) in graph_strategy()) {
        let graph = build_graph(size, &edges);
        let expected = reference_distance(size, &edges, start, goal);

        match find_route(&graph, &selector(start), &selector(goal)) {
            Ok(route) => {
                prop_assert_eq!(Some(route.hops()), expected);

                let ids = route.ids();
                prop_assert_eq!(ids.first().copied(), Some(NodeId(start as u64)));
                prop_assert_eq!(ids.last().copied(), Some(NodeId(goal as u64)));
                for pair in ids.windows(2) {
                    let linked = graph
                        .outgoing(pair[0])
                        .expect("outgoing")
                        .iter()
                        .any(|r| r.target == pair[1]);
                    prop_assert!(linked, "route step {:?} is not an edge", pair);
                }
            }
            Err(e) => {
                prop_assert!(e.is_no_route(), "unexpected error: {}", e);
                prop_assert_eq!(expected, None);
            }
        }
    }

    /// Unreachable goals always yield NoRoute, never a route.
    #[test]
    fn completeness_no_false_positives((size, edges, start, goal) in graph_strategy()) {
        prop_assume!(reference_distance(size, &edges, start, goal).is_none());
        let graph = build_graph(size, &edges);

        let result = find_route(&graph, &selector(start), &selector(goal));
        let is_no_route = matches!(result, Err(GraphError::NoRoute { .. }));
        prop_assert!(is_no_route);
    }

    /// Each node is expanded at most once and never repeats on the route.
    #[test]
    fn visited_once((size, edges, start, goal) in graph_strategy()) {
        let graph = build_graph(size, &edges);

        if let Ok(route) = find_route(&graph, &selector(start), &selector(goal)) {
            prop_assert!(route.explored <= size);
            let distinct: BTreeSet<_> = route.ids().into_iter().collect();
            prop_assert_eq!(distinct.len(), route.nodes.len());
        }
    }

    /// Start == goal returns a single node without expanding anything else.
    #[test]
    fn degenerate_route_is_single_node((size, edges, start, _goal) in graph_strategy()) {
        let graph = build_graph(size, &edges);

        let route = find_route(&graph, &selector(start), &selector(start)).expect("route");
        prop_assert_eq!(route.ids(), vec![NodeId(start as u64)]);
        prop_assert_eq!(route.explored, 1);
    }

    /// A relationship to a node outside the store is rejected without side effects.
    #[test]
    fn endpoint_validation_leaves_store_unmodified(
        (size, edges, start, _goal) in graph_strategy(),
        offset in 0u64..100,
    ) {
        let mut graph = build_graph(size, &edges);
        let before = graph.relationship_count().expect("count");
        let outside = NodeId(size as u64 + offset);

        let result = graph.create_relationship(
            NodeId(start as u64),
            outside,
            RelationshipType::new("E"),
        );

        let rejected = matches!(result, Err(GraphError::InvalidEndpoint(id)) if id == outside);
        prop_assert!(rejected);
        prop_assert_eq!(graph.relationship_count().expect("count"), before);
        prop_assert!(graph.incoming(outside).expect("incoming").is_empty());
    }
}
