//! # Graph Benchmarks
//!
//! Performance benchmarks for labgraph-core store and route operations.
//!
//! Run with: `cargo bench -p labgraph-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use labgraph_core::{
    AttributeValue, Attributes, Graph, GraphStore, Label, NodeId, RelationshipType, Selector,
    find_route, graph_to_bytes,
};
use std::hint::black_box;

fn keyed(i: usize) -> Attributes {
    let mut attributes = Attributes::new();
    attributes.insert("name".to_string(), AttributeValue::from(i.to_string()));
    attributes
}

/// Create a chain of N nodes: 0 -> 1 -> ... -> N-1.
fn create_chain(size: usize) -> Graph {
    let mut graph = Graph::new();
    let mut prev: Option<NodeId> = None;

    for i in 0..size {
        let node = graph.create_node(Label::new("N"), keyed(i)).expect("node");
        if let Some(prev) = prev {
            graph
                .create_relationship(prev, node.id, RelationshipType::new("NEXT"))
                .expect("relationship");
        }
        prev = Some(node.id);
    }

    graph
}

/// Create a layered graph where every node links to every node of the next layer.
fn create_layers(layers: usize, width: usize) -> Graph {
    let mut graph = Graph::new();
    let mut previous: Vec<NodeId> = Vec::new();

    for layer in 0..layers {
        let current: Vec<NodeId> = (0..width)
            .map(|i| {
                graph
                    .create_node(Label::new(format!("L{}", layer)), keyed(i))
                    .expect("node")
                    .id
            })
            .collect();
        for &source in &previous {
            for &target in &current {
                graph
                    .create_relationship(source, target, RelationshipType::new("E"))
                    .expect("relationship");
            }
        }
        previous = current;
    }

    graph
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_node_creation(c: &mut Criterion) {
    let mut group = c.benchmark_group("node_creation");

    for size in [100, 1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                let mut graph = Graph::new();
                for i in 0..size {
                    let _ = graph.create_node(Label::new("N"), keyed(i));
                }
                black_box(graph)
            });
        });
    }

    group.finish();
}

fn bench_find_node(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_node");

    for size in [100, 1000, 10000].iter() {
        let graph = create_chain(*size);
        let label = Label::new("N");
        let value = AttributeValue::from((size / 2).to_string());

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(graph.find_node(&label, "name", &value)));
        });
    }

    group.finish();
}

fn bench_route_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("route_chain");

    for size in [100, 500, 1000].iter() {
        let graph = create_chain(*size);
        let from = Selector::by_key("N", "0");
        let to = Selector::by_key("N", (size - 1).to_string());

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(find_route(&graph, &from, &to)));
        });
    }

    group.finish();
}

fn bench_route_layers(c: &mut Criterion) {
    let mut group = c.benchmark_group("route_layers");

    for width in [4, 16, 32].iter() {
        let graph = create_layers(6, *width);
        let from = Selector::by_key("L0", "0");
        let to = Selector::by_key("L5", (width - 1).to_string());

        group.bench_with_input(BenchmarkId::from_parameter(width), width, |b, _| {
            b.iter(|| black_box(find_route(&graph, &from, &to)));
        });
    }

    group.finish();
}

fn bench_route_unreachable(c: &mut Criterion) {
    let mut group = c.benchmark_group("route_unreachable");

    for size in [100, 500, 1000].iter() {
        let graph = create_chain(*size);
        // Reverse direction: the whole chain is never walked backwards.
        let from = Selector::by_key("N", (size - 1).to_string());
        let to = Selector::by_key("N", "0");

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(find_route(&graph, &from, &to)));
        });
    }

    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot");

    for size in [100, 500, 1000].iter() {
        let graph = create_chain(*size);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(graph_to_bytes(&graph)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_node_creation,
    bench_find_node,
    bench_route_chain,
    bench_route_layers,
    bench_route_unreachable,
    bench_snapshot
);
criterion_main!(benches);
