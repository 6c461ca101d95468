//! # Demo Topology
//!
//! The three-layer sample graph used by the `populate` command and the
//! scenario tests.
//!
//! - Layer A: keys `1`..`5`
//! - Layer B: keys `11`..`55`
//! - Layer C: keys `111`..`555`
//! - `X` relationships run A -> B, `Y` relationships run B -> C
//!
//! Relationships are created in a fixed order, so routes found on this graph
//! are reproducible.

use crate::graph::GraphStore;
use crate::primitives::KEY_ATTRIBUTE;
use crate::{AttributeValue, Attributes, GraphError, Label, NodeId, RelationshipType};

pub const LAYER_A: &str = "A";
pub const LAYER_B: &str = "B";
pub const LAYER_C: &str = "C";

const KEYS_A: [&str; 5] = ["1", "2", "3", "4", "5"];
const KEYS_B: [&str; 5] = ["11", "22", "33", "44", "55"];
const KEYS_C: [&str; 5] = ["111", "222", "333", "444", "555"];

/// `(a, b)` index pairs into the layers, in creation order.
const X_EDGES: [(usize, usize); 12] = [
    (0, 2),
    (0, 3),
    (0, 0),
    (1, 0),
    (1, 2),
    (2, 1),
    (2, 2),
    (3, 2),
    (3, 1),
    (4, 4),
    (4, 2),
    (4, 0),
];

/// `(b, c)` index pairs into the layers, in creation order.
const Y_EDGES: [(usize, usize); 11] = [
    (0, 0),
    (0, 3),
    (0, 2),
    (1, 4),
    (1, 1),
    (2, 2),
    (2, 1),
    (2, 0),
    (3, 4),
    (4, 3),
    (4, 0),
];

/// Handles to the nodes created by `populate`, in key order per layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoGraph {
    pub a: Vec<NodeId>,
    pub b: Vec<NodeId>,
    pub c: Vec<NodeId>,
    pub relationships: usize,
}

/// Build the demo graph into `store`.
pub fn populate<G: GraphStore + ?Sized>(store: &mut G) -> Result<DemoGraph, GraphError> {
    let a = create_layer(store, LAYER_A, &KEYS_A)?;
    let b = create_layer(store, LAYER_B, &KEYS_B)?;
    let c = create_layer(store, LAYER_C, &KEYS_C)?;

    let mut relationships = 0usize;
    relationships += link_layers(store, &a, &b, &X_EDGES, "X")?;
    relationships += link_layers(store, &b, &c, &Y_EDGES, "Y")?;

    tracing::debug!(
        nodes = a.len() + b.len() + c.len(),
        relationships,
        "demo graph populated"
    );

    Ok(DemoGraph {
        a,
        b,
        c,
        relationships,
    })
}

fn create_layer<G: GraphStore + ?Sized>(
    store: &mut G,
    label: &str,
    keys: &[&str],
) -> Result<Vec<NodeId>, GraphError> {
    keys.iter()
        .map(|key| {
            let mut attributes = Attributes::new();
            attributes.insert(KEY_ATTRIBUTE.to_string(), AttributeValue::from(*key));
            store
                .create_node(Label::new(label), attributes)
                .map(|node| node.id)
        })
        .collect()
}

fn link_layers<G: GraphStore + ?Sized>(
    store: &mut G,
    sources: &[NodeId],
    targets: &[NodeId],
    pairs: &[(usize, usize)],
    rel_type: &str,
) -> Result<usize, GraphError> {
    for &(from, to) in pairs {
        let (Some(&source), Some(&target)) = (sources.get(from), targets.get(to)) else {
            return Err(GraphError::TraversalFailed);
        };
        store.create_relationship(source, target, RelationshipType::new(rel_type))?;
    }
    Ok(pairs.len())
}
