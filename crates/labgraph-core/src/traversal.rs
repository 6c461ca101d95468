//! # Traversal Engine
//!
//! Breadth-first reachability and shortest-route search over outgoing
//! relationships.
//!
//! - Start and goal are resolved through `GraphStore::find_node` before any
//!   traversal; an unresolved selector is `GraphError::NodeNotFound`.
//! - Nodes are marked visited when enqueued, so each node is enqueued at
//!   most once and the search terminates in O(V + E) on any finite graph.
//! - The goal test runs on dequeue and compares label and attribute by value.
//! - Among equal-length routes the first one discovered in outgoing
//!   enumeration order wins.
//!
//! Each search owns its frontier, visited set and parent map; concurrent
//! searches over the same store only share read access.

use crate::graph::GraphStore;
use crate::reporter::{ParentMap, reconstruct_path};
use crate::{AttributeValue, GraphError, Node, NodeId, Selector};
use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

// =============================================================================
// CANCELLATION
// =============================================================================

/// Cooperative cancellation flag, checked once per dequeue.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

// =============================================================================
// ROUTE
// =============================================================================

/// A discovered route, start first and goal last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Nodes from start to goal inclusive.
    pub nodes: Vec<Node>,
    /// Number of nodes dequeued before the goal was reached.
    pub explored: usize,
}

impl Route {
    /// Edge count of the route.
    #[must_use]
    pub fn hops(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// Node ids in route order.
    #[must_use]
    pub fn ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|n| n.id).collect()
    }

    /// Values of `attribute` along the route (`None` where absent).
    #[must_use]
    pub fn values(&self, attribute: &str) -> Vec<Option<&AttributeValue>> {
        self.nodes.iter().map(|n| n.attribute(attribute)).collect()
    }
}

// =============================================================================
// SEARCH
// =============================================================================

/// A configured route search between two selectors.
#[derive(Debug, Clone)]
pub struct RouteSearch {
    from: Selector,
    to: Selector,
    cancellation: Option<CancellationToken>,
}

impl RouteSearch {
    #[must_use]
    pub fn new(from: Selector, to: Selector) -> Self {
        Self {
            from,
            to,
            cancellation: None,
        }
    }

    /// Abort with `GraphError::Cancelled` once `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Run the search against `store`.
    pub fn run<G: GraphStore + ?Sized>(&self, store: &G) -> Result<Route, GraphError> {
        let start = resolve(store, &self.from)?;
        // The goal only has to exist; matching happens per dequeued node.
        resolve(store, &self.to)?;

        tracing::debug!(from = %self.from, to = %self.to, start = %start.id, "route search started");

        let mut frontier: VecDeque<Node> = VecDeque::new();
        let mut visited: BTreeSet<NodeId> = BTreeSet::new();
        let mut parents = ParentMap::new();
        let mut explored = 0usize;

        visited.insert(start.id);
        frontier.push_back(start);

        while let Some(current) = frontier.pop_front() {
            if self.is_cancelled() {
                tracing::debug!(explored, "route search cancelled");
                return Err(GraphError::Cancelled);
            }
            explored = explored.saturating_add(1);

            if current.matches(&self.to) {
                let path = reconstruct_path(&parents, current.id)?;
                let nodes = materialize(store, &path, current)?;
                tracing::debug!(hops = nodes.len().saturating_sub(1), explored, "route found");
                return Ok(Route { nodes, explored });
            }

            for relationship in store.outgoing(current.id)? {
                let next = relationship.target;
                if !visited.insert(next) {
                    continue;
                }
                parents.insert(next, current.id);
                let node = store.node(next)?.ok_or(GraphError::TraversalFailed)?;
                frontier.push_back(node);
            }
        }

        tracing::debug!(explored, "route search exhausted");
        Err(GraphError::NoRoute {
            from: self.from.clone(),
            to: self.to.clone(),
        })
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}

/// Find one shortest route from `from` to `to` following outgoing edges.
pub fn find_route<G: GraphStore + ?Sized>(
    store: &G,
    from: &Selector,
    to: &Selector,
) -> Result<Route, GraphError> {
    RouteSearch::new(from.clone(), to.clone()).run(store)
}

fn resolve<G: GraphStore + ?Sized>(store: &G, selector: &Selector) -> Result<Node, GraphError> {
    store
        .find_node(&selector.label, &selector.attribute, &selector.value)?
        .ok_or_else(|| GraphError::NodeNotFound(selector.clone()))
}

/// Load the nodes of `path`; the goal is already in hand.
fn materialize<G: GraphStore + ?Sized>(
    store: &G,
    path: &[NodeId],
    goal: Node,
) -> Result<Vec<Node>, GraphError> {
    let mut nodes = Vec::with_capacity(path.len());
    for &id in &path[..path.len().saturating_sub(1)] {
        nodes.push(store.node(id)?.ok_or(GraphError::TraversalFailed)?);
    }
    nodes.push(goal);
    Ok(nodes)
}

// =============================================================================
// TESTS
// =============================================================================
