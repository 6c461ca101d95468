//! # Path Reporter
//!
//! Reconstructs a route from traversal bookkeeping and renders it to a sink.
//!
//! The traversal engine records `parent[child] = parent` for every node it
//! discovers. The start node never receives an entry, so walking the map
//! backwards from the goal terminates exactly at the start.

use crate::traversal::Route;
use crate::{GraphError, Node, NodeId};
use std::collections::BTreeMap;
use std::io::Write;

/// Child -> parent bookkeeping produced by a breadth-first search.
pub type ParentMap = BTreeMap<NodeId, NodeId>;

/// Walk `parents` from `goal` back to the node without a parent entry and
/// return the ids in start-to-goal order.
///
/// A goal without a parent entry is the start itself (single-element path).
/// The walk is bounded by the map size; a cycle in the bookkeeping yields
/// `GraphError::TraversalFailed` instead of looping.
pub fn reconstruct_path(parents: &ParentMap, goal: NodeId) -> Result<Vec<NodeId>, GraphError> {
    let mut path = vec![goal];
    let mut current = goal;

    while let Some(&parent) = parents.get(&current) {
        if path.len() > parents.len() {
            return Err(GraphError::TraversalFailed);
        }
        path.push(parent);
        current = parent;
    }

    path.reverse();
    Ok(path)
}

// =============================================================================
// SINKS
// =============================================================================

/// Destination for rendered route steps.
pub trait PathSink {
    /// Receive the rendered step at `index` (0 = start).
    fn emit_step(&mut self, index: usize, rendered: &str) -> Result<(), GraphError>;

    /// Called once after the last step.
    fn finish(&mut self, _hops: usize) -> Result<(), GraphError> {
        Ok(())
    }
}

/// Collects rendered steps in memory.
impl PathSink for Vec<String> {
    fn emit_step(&mut self, _index: usize, rendered: &str) -> Result<(), GraphError> {
        self.push(rendered.to_string());
        Ok(())
    }
}

/// Writes one line per step to any `io::Write`.
#[derive(Debug)]
pub struct LineWriter<W: Write> {
    inner: W,
}

impl<W: Write> LineWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> PathSink for LineWriter<W> {
    fn emit_step(&mut self, _index: usize, rendered: &str) -> Result<(), GraphError> {
        writeln!(self.inner, "{}", rendered).map_err(|e| GraphError::IoError(e.to_string()))
    }

    fn finish(&mut self, _hops: usize) -> Result<(), GraphError> {
        self.inner
            .flush()
            .map_err(|e| GraphError::IoError(e.to_string()))
    }
}

// =============================================================================
// REPORTER
// =============================================================================

/// Renders route nodes by their key attribute.
#[derive(Debug, Clone)]
pub struct PathReporter {
    key_attribute: String,
    with_labels: bool,
}

impl PathReporter {
    /// Render steps by the value of `key_attribute`.
    #[must_use]
    pub fn new(key_attribute: impl Into<String>) -> Self {
        Self {
            key_attribute: key_attribute.into(),
            with_labels: false,
        }
    }

    /// Prefix every step with its label, e.g. `(A) 1`.
    #[must_use]
    pub fn with_labels(mut self, with_labels: bool) -> Self {
        self.with_labels = with_labels;
        self
    }

    /// Render one node. Nodes without the key attribute fall back to their id.
    #[must_use]
    pub fn render_step(&self, node: &Node) -> String {
        let key = node
            .attribute(&self.key_attribute)
            .map(ToString::to_string)
            .unwrap_or_else(|| node.id.to_string());
        if self.with_labels {
            format!("({}) {}", node.label, key)
        } else {
            key
        }
    }

    /// Render the whole route in start-to-goal order.
    #[must_use]
    pub fn render(&self, route: &Route) -> Vec<String> {
        route.nodes.iter().map(|n| self.render_step(n)).collect()
    }

    /// Emit every step of `route` to `sink`.
    pub fn report<S: PathSink + ?Sized>(&self, route: &Route, sink: &mut S) -> Result<(), GraphError> {
        for (index, node) in route.nodes.iter().enumerate() {
            sink.emit_step(index, &self.render_step(node))?;
        }
        sink.finish(route.hops())
    }
}

impl Default for PathReporter {
    fn default() -> Self {
        Self::new(crate::primitives::KEY_ATTRIBUTE)
    }
}

// =============================================================================
// TESTS
// =============================================================================
