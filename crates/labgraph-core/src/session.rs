//! # Session Module
//!
//! The caller-facing facade over a storage backend.
//!
//! Callers address nodes by `(label, key)` pairs, where the key is the value
//! of the session's key attribute (`"name"` unless configured otherwise).
//! Every operation propagates backend errors to the caller.
//!
//! ## Storage Backends
//!
//! Session supports two storage backends:
//! - `InMemory`: Uses in-memory `Graph` (fast, volatile unless explicitly saved)
//! - `Persistent`: Uses `RedbGraph` for disk-backed ACID storage

use crate::graph::{Graph, GraphStore};
use crate::primitives::KEY_ATTRIBUTE;
use crate::storage::RedbGraph;
use crate::traversal::{CancellationToken, Route, RouteSearch};
use crate::{
    AttributeValue, Attributes, Direction, GraphError, Label, Node, NodeId, Relationship,
    RelationshipType, Selector,
};
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Storage backend for a Session.
#[derive(Debug)]
pub enum StorageBackend {
    /// In-memory graph (fast, volatile).
    InMemory(Graph),
    /// Disk-backed graph using redb (ACID, persistent).
    Persistent(RedbGraph),
}

impl Default for StorageBackend {
    fn default() -> Self {
        Self::InMemory(Graph::new())
    }
}

// NOTE: StorageBackend does NOT implement Clone.
// RedbGraph (database handle) cannot be safely cloned.

/// One relationship rendered with both endpoints resolved to `(label, key)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipView {
    pub rel_type: String,
    pub source_label: String,
    pub source_key: String,
    pub target_label: String,
    pub target_key: String,
}

impl fmt::Display for RelationshipView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}) {} -[{}]-> ({}) {}",
            self.source_label, self.source_key, self.rel_type, self.target_label, self.target_key
        )
    }
}

/// A labeled graph plus the attribute that identifies its nodes.
#[derive(Debug)]
pub struct Session {
    /// The storage backend (in-memory or persistent).
    backend: StorageBackend,
    /// Attribute used to resolve `(label, key)` pairs.
    key_attribute: String,
}

impl Default for Session {
    fn default() -> Self {
        Self::with_graph(Graph::new())
    }
}

impl Session {
    /// Create a new empty session with in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session with an existing in-memory graph.
    #[must_use]
    pub fn with_graph(graph: Graph) -> Self {
        Self {
            backend: StorageBackend::InMemory(graph),
            key_attribute: KEY_ATTRIBUTE.to_string(),
        }
    }

    /// Create a session with persistent redb storage.
    ///
    /// Opens or creates a redb database at the given path.
    /// All changes are automatically persisted to disk.
    pub fn with_redb(path: impl AsRef<Path>) -> Result<Self, GraphError> {
        Ok(Self::with_redb_graph(RedbGraph::open(path)?))
    }

    /// Create a session with an existing RedbGraph.
    #[must_use]
    pub fn with_redb_graph(redb: RedbGraph) -> Self {
        Self {
            backend: StorageBackend::Persistent(redb),
            key_attribute: KEY_ATTRIBUTE.to_string(),
        }
    }

    /// Resolve `(label, key)` pairs through `attribute` instead of `"name"`.
    #[must_use]
    pub fn with_key_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.key_attribute = attribute.into();
        self
    }

    /// Check if using persistent storage.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(self.backend, StorageBackend::Persistent(_))
    }

    /// Returns `Some(&Graph)` for in-memory backends, `None` for persistent ones.
    #[must_use]
    pub fn graph_opt(&self) -> Option<&Graph> {
        match &self.backend {
            StorageBackend::InMemory(g) => Some(g),
            StorageBackend::Persistent(_) => None,
        }
    }

    /// The backend as a trait object.
    pub fn store(&self) -> &dyn GraphStore {
        match &self.backend {
            StorageBackend::InMemory(graph) => graph,
            StorageBackend::Persistent(redb) => redb,
        }
    }

    pub fn store_mut(&mut self) -> &mut dyn GraphStore {
        match &mut self.backend {
            StorageBackend::InMemory(graph) => graph,
            StorageBackend::Persistent(redb) => redb,
        }
    }

    /// Selector on the session key attribute. Keys are compared as text.
    #[must_use]
    pub fn selector(&self, label: &str, key: &str) -> Selector {
        Selector::new(label, self.key_attribute.as_str(), key)
    }

    // =========================================================================
    // MUTATION
    // =========================================================================

    pub fn create_node(&mut self, label: &str, attributes: Attributes) -> Result<Node, GraphError> {
        let node = self.store_mut().create_node(Label::new(label), attributes)?;
        tracing::debug!(id = %node.id, label = %node.label, "node created");
        Ok(node)
    }

    /// Create a node identified only by its key attribute.
    pub fn create_keyed_node(&mut self, label: &str, key: &str) -> Result<Node, GraphError> {
        let mut attributes = Attributes::new();
        attributes.insert(self.key_attribute.clone(), AttributeValue::from(key));
        self.create_node(label, attributes)
    }

    pub fn create_relationship(
        &mut self,
        source: NodeId,
        target: NodeId,
        rel_type: &str,
    ) -> Result<Relationship, GraphError> {
        let relationship =
            self.store_mut()
                .create_relationship(source, target, RelationshipType::new(rel_type))?;
        tracing::debug!(
            id = %relationship.id,
            source = %source,
            target = %target,
            rel_type,
            "relationship created"
        );
        Ok(relationship)
    }

    pub fn set_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        value: AttributeValue,
    ) -> Result<(), GraphError> {
        self.store_mut().set_attribute(node, name, value)
    }

    /// Resolve both selectors, then link them.
    pub fn relate(
        &mut self,
        from: &Selector,
        to: &Selector,
        rel_type: &str,
    ) -> Result<Relationship, GraphError> {
        let source = self.resolve(from)?;
        let target = self.resolve(to)?;
        self.create_relationship(source.id, target.id, rel_type)
    }

    // =========================================================================
    // LOOKUP
    // =========================================================================

    pub fn find_node(&self, label: &str, key: &str) -> Result<Option<Node>, GraphError> {
        let selector = self.selector(label, key);
        self.store()
            .find_node(&selector.label, &selector.attribute, &selector.value)
    }

    fn resolve(&self, selector: &Selector) -> Result<Node, GraphError> {
        self.store()
            .find_node(&selector.label, &selector.attribute, &selector.value)?
            .ok_or_else(|| GraphError::NodeNotFound(selector.clone()))
    }

    // =========================================================================
    // ROUTES
    // =========================================================================

    /// Shortest route from `(label1, key1)` to `(label2, key2)`.
    pub fn find_route(
        &self,
        label1: &str,
        key1: &str,
        label2: &str,
        key2: &str,
    ) -> Result<Route, GraphError> {
        RouteSearch::new(self.selector(label1, key1), self.selector(label2, key2))
            .run(self.store())
    }

    /// Like `find_route`, aborting with `GraphError::Cancelled` once `token` fires.
    pub fn find_route_with_cancellation(
        &self,
        label1: &str,
        key1: &str,
        label2: &str,
        key2: &str,
        token: CancellationToken,
    ) -> Result<Route, GraphError> {
        RouteSearch::new(self.selector(label1, key1), self.selector(label2, key2))
            .with_cancellation(token)
            .run(self.store())
    }

    // =========================================================================
    // INSPECTION
    // =========================================================================

    /// Outgoing relationships of `(label, key)` in creation order.
    pub fn list_outgoing_relationships(
        &self,
        label: &str,
        key: &str,
    ) -> Result<Vec<RelationshipView>, GraphError> {
        self.list_relationships(label, key, Direction::Outgoing)
    }

    pub fn list_relationships(
        &self,
        label: &str,
        key: &str,
        direction: Direction,
    ) -> Result<Vec<RelationshipView>, GraphError> {
        let node = self.resolve(&self.selector(label, key))?;
        let store = self.store();

        store
            .relationships(node.id, direction)?
            .into_iter()
            .map(|relationship| -> Result<RelationshipView, GraphError> {
                let source = store
                    .node(relationship.source)?
                    .ok_or(GraphError::UnknownNode(relationship.source))?;
                let target = store
                    .node(relationship.target)?
                    .ok_or(GraphError::UnknownNode(relationship.target))?;
                Ok(RelationshipView {
                    rel_type: relationship.rel_type.to_string(),
                    source_label: source.label.to_string(),
                    source_key: self.key_of(&source),
                    target_label: target.label.to_string(),
                    target_key: self.key_of(&target),
                })
            })
            .collect()
    }

    fn key_of(&self, node: &Node) -> String {
        node.attribute(&self.key_attribute)
            .map(ToString::to_string)
            .unwrap_or_else(|| node.id.to_string())
    }

    // =========================================================================
    // METRICS
    // =========================================================================

    pub fn node_count(&self) -> Result<usize, GraphError> {
        self.store().node_count()
    }

    pub fn relationship_count(&self) -> Result<usize, GraphError> {
        self.store().relationship_count()
    }

    // =========================================================================
    // EXPORT SUPPORT
    // =========================================================================

    /// Build an in-memory Graph snapshot for export purposes.
    ///
    /// - For in-memory: clones the existing graph
    /// - For persistent: reads all nodes and relationships into a new Graph,
    ///   keeping original ids
    pub fn snapshot(&self) -> Result<Graph, GraphError> {
        match &self.backend {
            StorageBackend::InMemory(graph) => Ok(graph.clone()),
            StorageBackend::Persistent(redb) => {
                let mut graph = Graph::new();
                for node in redb.nodes()? {
                    graph.import_node(node)?;
                }
                for relationship in redb.relationships_in_order()? {
                    graph.import_relationship(relationship)?;
                }
                Ok(graph)
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn create_and_find_keyed_node() {
        let mut session = Session::new();
        let node = session.create_keyed_node("A", "1").expect("create");

        let found = session.find_node("A", "1").expect("find");
        assert_eq!(found.map(|n| n.id), Some(node.id));
        assert!(session.find_node("B", "1").expect("find").is_none());
    }

    #[test]
    fn relate_resolves_selectors() {
        let mut session = Session::new();
        session.create_keyed_node("A", "1").expect("a");
        session.create_keyed_node("B", "11").expect("b");

        let from = session.selector("A", "1");
        let to = session.selector("B", "11");
        session.relate(&from, &to, "X").expect("relate");

        let views = session.list_outgoing_relationships("A", "1").expect("list");
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].to_string(), "(A) 1 -[X]-> (B) 11");
    }

    #[test]
    fn set_attribute_visible_on_both_backends() {
        let temp = tempdir().expect("temp dir");
        let sessions = [
            Session::new(),
            Session::with_redb(temp.path().join("set.redb")).expect("redb"),
        ];

        for mut session in sessions {
            let node = session.create_keyed_node("A", "1").expect("a");
            session
                .set_attribute(node.id, "rank", AttributeValue::Integer(3))
                .expect("set");

            let found = session.find_node("A", "1").expect("find").expect("node");
            assert_eq!(found.attribute("rank"), Some(&AttributeValue::Integer(3)));

            // Rewriting the key moves the node to its new address.
            session
                .set_attribute(node.id, "name", AttributeValue::from("9"))
                .expect("rekey");
            assert!(session.find_node("A", "1").expect("find").is_none());
            assert_eq!(
                session.find_node("A", "9").expect("find").map(|n| n.id),
                Some(node.id)
            );
        }
    }

    #[test]
    fn relate_missing_node_is_not_found() {
        let mut session = Session::new();
        session.create_keyed_node("A", "1").expect("a");

        let from = session.selector("A", "1");
        let to = session.selector("B", "99");
        let result = session.relate(&from, &to, "X");
        assert!(matches!(result, Err(GraphError::NodeNotFound(_))));
        assert_eq!(session.relationship_count().expect("count"), 0);
    }

    #[test]
    fn list_both_directions() {
        let mut session = Session::new();
        let a = session.create_keyed_node("A", "1").expect("a");
        let b = session.create_keyed_node("B", "11").expect("b");
        session.create_relationship(a.id, b.id, "X").expect("x");

        let outgoing = session
            .list_relationships("B", "11", Direction::Outgoing)
            .expect("out");
        assert!(outgoing.is_empty());

        let both = session
            .list_relationships("B", "11", Direction::Both)
            .expect("both");
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].source_key, "1");
    }

    #[test]
    fn custom_key_attribute() {
        let mut session = Session::new().with_key_attribute("code");
        session.create_keyed_node("A", "k1").expect("a");

        let node = session.find_node("A", "k1").expect("find").expect("present");
        assert_eq!(node.attribute("code"), Some(&AttributeValue::from("k1")));
        assert!(node.attribute("name").is_none());
    }

    #[test]
    fn cancelled_route_search() {
        let mut session = Session::new();
        let a = session.create_keyed_node("A", "1").expect("a");
        let b = session.create_keyed_node("B", "11").expect("b");
        session.create_relationship(a.id, b.id, "X").expect("x");

        let token = CancellationToken::new();
        token.cancel();
        let result = session.find_route_with_cancellation("A", "1", "B", "11", token);
        assert!(matches!(result, Err(GraphError::Cancelled)));
    }

    #[test]
    fn persistent_snapshot_matches_store() {
        let temp = tempdir().expect("temp dir");
        let mut session = Session::with_redb(temp.path().join("s.redb")).expect("open");
        assert!(session.is_persistent());
        assert!(session.graph_opt().is_none());

        let a = session.create_keyed_node("A", "1").expect("a");
        let b = session.create_keyed_node("B", "11").expect("b");
        session.create_relationship(a.id, b.id, "X").expect("x");

        let snapshot = session.snapshot().expect("snapshot");
        assert_eq!(snapshot.node_count().expect("count"), 2);
        assert_eq!(snapshot.relationship_count().expect("count"), 1);
        assert_eq!(snapshot.next_node_id(), 2);
    }
}
