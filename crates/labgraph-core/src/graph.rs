//! # Graph Engine
//!
//! The in-memory labeled graph store.
//!
//! This module defines the `GraphStore` trait and implements it for `Graph`.
//! All data structures use `BTreeMap` for deterministic ordering.

use crate::validation::Validator;
use crate::{
    AttributeValue, Attributes, Direction, GraphError, Label, Node, NodeId, Relationship,
    RelationshipId, RelationshipType,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// GRAPHSTORE TRAIT
// =============================================================================

/// The GraphStore trait defines the storage operations the traversal engine
/// and the session rely on.
///
/// All fallible operations return `Result<T, GraphError>` to support both
/// in-memory and persistent storage backends uniformly.
///
/// Relationship enumeration is in creation order (ascending
/// `RelationshipId`) and stable for the lifetime of the store.
pub trait GraphStore {
    /// Create a node with a label and initial attributes.
    ///
    /// Rejects empty labels with `GraphError::InvalidLabel`.
    fn create_node(&mut self, label: Label, attributes: Attributes) -> Result<Node, GraphError>;

    /// Create a directed relationship from `source` to `target`.
    ///
    /// Fails with `GraphError::InvalidEndpoint` if either endpoint is not in
    /// this store; the store is left unmodified in that case.
    fn create_relationship(
        &mut self,
        source: NodeId,
        target: NodeId,
        rel_type: RelationshipType,
    ) -> Result<Relationship, GraphError>;

    /// Set (insert or overwrite) one attribute on an existing node.
    fn set_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        value: AttributeValue,
    ) -> Result<(), GraphError>;

    /// Lookup a node by id. Returns owned Node for storage compatibility.
    fn node(&self, id: NodeId) -> Result<Option<Node>, GraphError>;

    /// Check if a node exists in the graph.
    fn contains_node(&self, id: NodeId) -> Result<bool, GraphError>;

    /// Find the node with the lowest id carrying `label` whose `attribute`
    /// equals `value`. A miss is `Ok(None)`.
    fn find_node(
        &self,
        label: &Label,
        attribute: &str,
        value: &AttributeValue,
    ) -> Result<Option<Node>, GraphError>;

    /// All relationships whose source is `node`.
    fn outgoing(&self, node: NodeId) -> Result<Vec<Relationship>, GraphError>;

    /// All relationships whose target is `node`.
    fn incoming(&self, node: NodeId) -> Result<Vec<Relationship>, GraphError>;

    /// Relationships of `node` filtered by direction.
    ///
    /// `Direction::Both` yields outgoing first, then incoming. A self-loop
    /// appears once per direction.
    fn relationships(
        &self,
        node: NodeId,
        direction: Direction,
    ) -> Result<Vec<Relationship>, GraphError> {
        match direction {
            Direction::Outgoing => self.outgoing(node),
            Direction::Incoming => self.incoming(node),
            Direction::Both => {
                let mut all = self.outgoing(node)?;
                all.extend(self.incoming(node)?);
                Ok(all)
            }
        }
    }

    /// Get the total number of nodes.
    fn node_count(&self) -> Result<usize, GraphError>;

    /// Get the total number of relationships.
    fn relationship_count(&self) -> Result<usize, GraphError>;
}

/// The id after `current`. Ids are never reused, so the last value is never handed out.
pub(crate) fn advance(current: u64) -> Result<u64, GraphError> {
    current.checked_add(1).ok_or(GraphError::IdExhausted)
}

// =============================================================================
// GRAPH IMPLEMENTATION
// =============================================================================

/// The in-memory graph.
///
/// Uses `BTreeMap` exclusively for deterministic ordering.
/// No `HashMap` allowed.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// Node storage: NodeId -> Node
    nodes: BTreeMap<NodeId, Node>,

    /// Relationship storage: RelationshipId -> Relationship
    relationships: BTreeMap<RelationshipId, Relationship>,

    /// Adjacency: source -> relationship ids (ascending = creation order)
    outgoing: BTreeMap<NodeId, BTreeSet<RelationshipId>>,

    /// Reverse adjacency: target -> relationship ids
    incoming: BTreeMap<NodeId, BTreeSet<RelationshipId>>,

    /// Label index: Label -> node ids
    label_index: BTreeMap<Label, BTreeSet<NodeId>>,

    /// Next available NodeId
    next_node_id: u64,

    /// Next available RelationshipId
    next_relationship_id: u64,
}

impl Graph {
    /// Create a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get the next node ID that would be assigned.
    #[must_use]
    pub fn next_node_id(&self) -> u64 {
        self.next_node_id
    }

    /// Get the next relationship ID that would be assigned.
    #[must_use]
    pub fn next_relationship_id(&self) -> u64 {
        self.next_relationship_id
    }

    /// Lazy outgoing enumeration. Calling it again restarts the sequence.
    pub fn outgoing_iter(&self, node: NodeId) -> impl Iterator<Item = &Relationship> + '_ {
        self.outgoing
            .get(&node)
            .into_iter()
            .flat_map(|ids| ids.iter().filter_map(|id| self.relationships.get(id)))
    }

    /// Lazy incoming enumeration.
    pub fn incoming_iter(&self, node: NodeId) -> impl Iterator<Item = &Relationship> + '_ {
        self.incoming
            .get(&node)
            .into_iter()
            .flat_map(|ids| ids.iter().filter_map(|id| self.relationships.get(id)))
    }

    /// Import a node with its original NodeId (snapshot restore).
    ///
    /// Keeps `next_node_id` past every imported id so ids are never reused.
    /// A repeated id is rejected.
    pub fn import_node(&mut self, node: Node) -> Result<(), GraphError> {
        if self.nodes.contains_key(&node.id) {
            return Err(GraphError::SerializationError(format!(
                "duplicate node id {}",
                node.id
            )));
        }
        if node.id.0 >= self.next_node_id {
            self.next_node_id = advance(node.id.0)?;
        }
        self.label_index
            .entry(node.label.clone())
            .or_default()
            .insert(node.id);
        self.nodes.insert(node.id, node);
        Ok(())
    }

    /// Import a relationship with its original id (snapshot restore).
    ///
    /// Relationships with a dangling endpoint or a repeated id are rejected.
    pub fn import_relationship(&mut self, relationship: Relationship) -> Result<(), GraphError> {
        if self.relationships.contains_key(&relationship.id) {
            return Err(GraphError::SerializationError(format!(
                "duplicate relationship id {}",
                relationship.id
            )));
        }
        for endpoint in [relationship.source, relationship.target] {
            if !self.nodes.contains_key(&endpoint) {
                return Err(GraphError::InvalidEndpoint(endpoint));
            }
        }
        if relationship.id.0 >= self.next_relationship_id {
            self.next_relationship_id = advance(relationship.id.0)?;
        }
        self.link(relationship);
        Ok(())
    }

    fn link(&mut self, relationship: Relationship) {
        self.outgoing
            .entry(relationship.source)
            .or_default()
            .insert(relationship.id);
        self.incoming
            .entry(relationship.target)
            .or_default()
            .insert(relationship.id);
        self.relationships.insert(relationship.id, relationship);
    }
}

impl GraphStore for Graph {
    fn create_node(&mut self, label: Label, attributes: Attributes) -> Result<Node, GraphError> {
        Validator::validate_label(&label)?;
        Validator::validate_attributes(&attributes)?;

        let node_id = NodeId(self.next_node_id);
        self.next_node_id = advance(self.next_node_id)?;

        let node = Node::new(node_id, label, attributes);
        self.label_index
            .entry(node.label.clone())
            .or_default()
            .insert(node_id);
        self.nodes.insert(node_id, node.clone());

        Ok(node)
    }

    fn create_relationship(
        &mut self,
        source: NodeId,
        target: NodeId,
        rel_type: RelationshipType,
    ) -> Result<Relationship, GraphError> {
        Validator::validate_relationship_type(&rel_type)?;
        for endpoint in [source, target] {
            if !self.nodes.contains_key(&endpoint) {
                return Err(GraphError::InvalidEndpoint(endpoint));
            }
        }

        let id = RelationshipId(self.next_relationship_id);
        self.next_relationship_id = advance(self.next_relationship_id)?;

        let relationship = Relationship::new(id, rel_type, source, target);
        self.link(relationship.clone());
        Ok(relationship)
    }

    fn set_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        value: AttributeValue,
    ) -> Result<(), GraphError> {
        Validator::validate_attribute(name, &value)?;
        let entry = self
            .nodes
            .get_mut(&node)
            .ok_or(GraphError::UnknownNode(node))?;
        entry.attributes.insert(name.to_string(), value);
        Ok(())
    }

    fn node(&self, id: NodeId) -> Result<Option<Node>, GraphError> {
        Ok(self.nodes.get(&id).cloned())
    }

    fn contains_node(&self, id: NodeId) -> Result<bool, GraphError> {
        Ok(self.nodes.contains_key(&id))
    }

    fn find_node(
        &self,
        label: &Label,
        attribute: &str,
        value: &AttributeValue,
    ) -> Result<Option<Node>, GraphError> {
        let Some(candidates) = self.label_index.get(label) else {
            return Ok(None);
        };
        Ok(candidates
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .find(|node| node.attribute(attribute) == Some(value))
            .cloned())
    }

    fn outgoing(&self, node: NodeId) -> Result<Vec<Relationship>, GraphError> {
        Ok(self.outgoing_iter(node).cloned().collect())
    }

    fn incoming(&self, node: NodeId) -> Result<Vec<Relationship>, GraphError> {
        Ok(self.incoming_iter(node).cloned().collect())
    }

    fn node_count(&self) -> Result<usize, GraphError> {
        Ok(self.nodes.len())
    }

    fn relationship_count(&self) -> Result<usize, GraphError> {
        Ok(self.relationships.len())
    }
}

// =============================================================================
// SERIALIZATION SUPPORT
// =============================================================================

/// Serializable representation of the graph for snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializableGraph {
    pub nodes: Vec<Node>,
    pub relationships: Vec<Relationship>,
    pub next_node_id: u64,
    pub next_relationship_id: u64,
}

impl From<&Graph> for SerializableGraph {
    fn from(graph: &Graph) -> Self {
        Self {
            nodes: graph.nodes.values().cloned().collect(),
            relationships: graph.relationships.values().cloned().collect(),
            next_node_id: graph.next_node_id,
            next_relationship_id: graph.next_relationship_id,
        }
    }
}

impl TryFrom<SerializableGraph> for Graph {
    type Error = GraphError;

    fn try_from(sg: SerializableGraph) -> Result<Self, Self::Error> {
        let mut graph = Graph::new();
        for node in sg.nodes {
            graph.import_node(node)?;
        }
        for relationship in sg.relationships {
            graph.import_relationship(relationship)?;
        }
        // Counters may be ahead of the highest surviving id.
        graph.next_node_id = graph.next_node_id.max(sg.next_node_id);
        graph.next_relationship_id = graph.next_relationship_id.max(sg.next_relationship_id);
        Ok(graph)
    }
}

// =============================================================================
// TESTS
// =============================================================================
