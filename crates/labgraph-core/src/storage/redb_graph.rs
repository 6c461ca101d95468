//! # redb-backed Graph Storage
//!
//! A disk-backed graph store using the redb embedded database.
//!
//! redb provides:
//! - ACID transactions (one write transaction per mutating operation)
//! - Crash safety (copy-on-write B-trees)
//! - MVCC: every read operation runs in its own read transaction and sees a
//!   consistent snapshot, so concurrent searches never observe half-written
//!   relationships
//!
//! ## Layout
//!
//! Adjacency tables are keyed by `(endpoint, relationship_id)`, so a range
//! scan over one endpoint yields its relationships in creation order, the
//! same order the in-memory `Graph` produces.

use crate::graph::{GraphStore, advance};
use crate::validation::Validator;
use crate::{
    AttributeValue, Attributes, GraphError, Label, Node, NodeId, Relationship, RelationshipId,
    RelationshipType,
};
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::fmt::Display;
use std::path::Path;

/// Table for nodes: NodeId(u64) -> serialized Node bytes
const NODES: TableDefinition<u64, &[u8]> = TableDefinition::new("nodes");

/// Table for relationships: RelationshipId(u64) -> serialized Relationship bytes
const RELATIONSHIPS: TableDefinition<u64, &[u8]> = TableDefinition::new("relationships");

/// Outgoing adjacency: (source, relationship_id) -> target
const OUTGOING: TableDefinition<(u64, u64), u64> = TableDefinition::new("outgoing");

/// Incoming adjacency: (target, relationship_id) -> source
const INCOMING: TableDefinition<(u64, u64), u64> = TableDefinition::new("incoming");

/// Label index: (label, node_id) -> ()
const LABEL_INDEX: TableDefinition<(&str, u64), ()> = TableDefinition::new("label_index");

/// Table for metadata: key string -> value u64
const METADATA: TableDefinition<&str, u64> = TableDefinition::new("metadata");

const NEXT_NODE_ID: &str = "next_node_id";
const NEXT_RELATIONSHIP_ID: &str = "next_relationship_id";

fn storage_err(e: impl Display) -> GraphError {
    GraphError::IoError(e.to_string())
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, GraphError> {
    postcard::to_allocvec(value).map_err(|e| GraphError::SerializationError(e.to_string()))
}

fn decode<'a, T: serde::Deserialize<'a>>(bytes: &'a [u8]) -> Result<T, GraphError> {
    postcard::from_bytes(bytes).map_err(|e| GraphError::SerializationError(e.to_string()))
}

/// A disk-backed graph store using redb.
///
/// The id counters are cached in memory and written through to the
/// metadata table in the same transaction that consumes them, so ids are
/// never reused across reopen.
pub struct RedbGraph {
    /// The redb database handle. Dropping it closes the store.
    db: Database,
    /// Next available node ID.
    next_node_id: u64,
    /// Next available relationship ID.
    next_relationship_id: u64,
}

impl std::fmt::Debug for RedbGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbGraph")
            .field("next_node_id", &self.next_node_id)
            .field("next_relationship_id", &self.next_relationship_id)
            .finish_non_exhaustive()
    }
}

impl RedbGraph {
    /// Open or create a graph database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GraphError> {
        let db = Database::create(path.as_ref()).map_err(storage_err)?;

        // Initialize tables if they don't exist
        {
            let write_txn = db.begin_write().map_err(storage_err)?;
            write_txn.open_table(NODES).map_err(storage_err)?;
            write_txn.open_table(RELATIONSHIPS).map_err(storage_err)?;
            write_txn.open_table(OUTGOING).map_err(storage_err)?;
            write_txn.open_table(INCOMING).map_err(storage_err)?;
            write_txn.open_table(LABEL_INDEX).map_err(storage_err)?;
            write_txn.open_table(METADATA).map_err(storage_err)?;
            write_txn.commit().map_err(storage_err)?;
        }

        let (next_node_id, next_relationship_id) = {
            let read_txn = db.begin_read().map_err(storage_err)?;
            let table = read_txn.open_table(METADATA).map_err(storage_err)?;
            let read = |key: &str| -> Result<u64, GraphError> {
                Ok(table
                    .get(key)
                    .map_err(storage_err)?
                    .map(|v| v.value())
                    .unwrap_or(0))
            };
            (read(NEXT_NODE_ID)?, read(NEXT_RELATIONSHIP_ID)?)
        };

        tracing::debug!(
            path = %path.as_ref().display(),
            next_node_id,
            next_relationship_id,
            "opened redb graph"
        );

        Ok(Self {
            db,
            next_node_id,
            next_relationship_id,
        })
    }

    /// Compact the database file.
    pub fn compact(&mut self) -> Result<(), GraphError> {
        self.db.compact().map_err(storage_err)?;
        Ok(())
    }

    /// Get all nodes in id order.
    pub fn nodes(&self) -> Result<Vec<Node>, GraphError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn.open_table(NODES).map_err(storage_err)?;

        let mut nodes = Vec::new();
        for entry in table.iter().map_err(storage_err)? {
            let (_, value) = entry.map_err(storage_err)?;
            nodes.push(decode::<Node>(value.value())?);
        }
        Ok(nodes)
    }

    /// Get all relationships in creation order.
    pub fn relationships_in_order(&self) -> Result<Vec<Relationship>, GraphError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn.open_table(RELATIONSHIPS).map_err(storage_err)?;

        let mut relationships = Vec::new();
        for entry in table.iter().map_err(storage_err)? {
            let (_, value) = entry.map_err(storage_err)?;
            relationships.push(decode::<Relationship>(value.value())?);
        }
        Ok(relationships)
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

    /// Load relationships listed in an adjacency table for one endpoint.
    fn adjacent(
        &self,
        adjacency: TableDefinition<(u64, u64), u64>,
        node: NodeId,
    ) -> Result<Vec<Relationship>, GraphError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let adjacency_table = read_txn.open_table(adjacency).map_err(storage_err)?;
        let relationships_table = read_txn.open_table(RELATIONSHIPS).map_err(storage_err)?;

        let mut relationships = Vec::new();
        for entry in adjacency_table
            .range((node.0, 0u64)..=(node.0, u64::MAX))
            .map_err(storage_err)?
        {
            let (key, _) = entry.map_err(storage_err)?;
            let (_, rel_id) = key.value();
            let data = relationships_table
                .get(rel_id)
                .map_err(storage_err)?
                .ok_or(GraphError::TraversalFailed)?;
            relationships.push(decode::<Relationship>(data.value())?);
        }
        Ok(relationships)
    }
}

// =============================================================================
// GRAPHSTORE TRAIT IMPLEMENTATION
// =============================================================================

impl GraphStore for RedbGraph {
    fn create_node(&mut self, label: Label, attributes: Attributes) -> Result<Node, GraphError> {
        Validator::validate_label(&label)?;
        Validator::validate_attributes(&attributes)?;

        let node_id = NodeId(self.next_node_id);
        let next_node_id = advance(self.next_node_id)?;
        let node = Node::new(node_id, label, attributes);
        let node_bytes = encode(&node)?;

        let write_txn = self.db.begin_write().map_err(storage_err)?;
        {
            let mut nodes_table = write_txn.open_table(NODES).map_err(storage_err)?;
            nodes_table
                .insert(node_id.0, node_bytes.as_slice())
                .map_err(storage_err)?;

            let mut label_table = write_txn.open_table(LABEL_INDEX).map_err(storage_err)?;
            label_table
                .insert((node.label.as_str(), node_id.0), ())
                .map_err(storage_err)?;

            let mut meta_table = write_txn.open_table(METADATA).map_err(storage_err)?;
            meta_table
                .insert(NEXT_NODE_ID, next_node_id)
                .map_err(storage_err)?;
        }
        write_txn.commit().map_err(storage_err)?;

        // Update cached counter only after successful commit.
        self.next_node_id = next_node_id;
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
            if !self.contains_node(endpoint)? {
                return Err(GraphError::InvalidEndpoint(endpoint));
            }
        }

        let id = RelationshipId(self.next_relationship_id);
        let next_relationship_id = advance(self.next_relationship_id)?;
        let relationship = Relationship::new(id, rel_type, source, target);
        let bytes = encode(&relationship)?;

        let write_txn = self.db.begin_write().map_err(storage_err)?;
        {
            let mut rel_table = write_txn.open_table(RELATIONSHIPS).map_err(storage_err)?;
            rel_table
                .insert(id.0, bytes.as_slice())
                .map_err(storage_err)?;

            let mut out_table = write_txn.open_table(OUTGOING).map_err(storage_err)?;
            out_table
                .insert((source.0, id.0), target.0)
                .map_err(storage_err)?;

            let mut in_table = write_txn.open_table(INCOMING).map_err(storage_err)?;
            in_table
                .insert((target.0, id.0), source.0)
                .map_err(storage_err)?;

            let mut meta_table = write_txn.open_table(METADATA).map_err(storage_err)?;
            meta_table
                .insert(NEXT_RELATIONSHIP_ID, next_relationship_id)
                .map_err(storage_err)?;
        }
        write_txn.commit().map_err(storage_err)?;

        self.next_relationship_id = next_relationship_id;
        Ok(relationship)
    }

    fn set_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        value: AttributeValue,
    ) -> Result<(), GraphError> {
        Validator::validate_attribute(name, &value)?;

        let write_txn = self.db.begin_write().map_err(storage_err)?;
        {
            let mut nodes_table = write_txn.open_table(NODES).map_err(storage_err)?;
            let mut stored: Node = {
                let data = nodes_table
                    .get(node.0)
                    .map_err(storage_err)?
                    .ok_or(GraphError::UnknownNode(node))?;
                decode(data.value())?
            };
            stored.attributes.insert(name.to_string(), value);
            let bytes = encode(&stored)?;
            nodes_table
                .insert(node.0, bytes.as_slice())
                .map_err(storage_err)?;
        }
        write_txn.commit().map_err(storage_err)?;
        Ok(())
    }

    fn node(&self, id: NodeId) -> Result<Option<Node>, GraphError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let nodes_table = read_txn.open_table(NODES).map_err(storage_err)?;

        match nodes_table.get(id.0).map_err(storage_err)? {
            Some(data) => Ok(Some(decode(data.value())?)),
            None => Ok(None),
        }
    }

    fn contains_node(&self, id: NodeId) -> Result<bool, GraphError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let nodes_table = read_txn.open_table(NODES).map_err(storage_err)?;
        Ok(nodes_table.get(id.0).map_err(storage_err)?.is_some())
    }

    fn find_node(
        &self,
        label: &Label,
        attribute: &str,
        value: &AttributeValue,
    ) -> Result<Option<Node>, GraphError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let label_table = read_txn.open_table(LABEL_INDEX).map_err(storage_err)?;
        let nodes_table = read_txn.open_table(NODES).map_err(storage_err)?;

        let raw = label.as_str();
        for entry in label_table
            .range((raw, 0u64)..=(raw, u64::MAX))
            .map_err(storage_err)?
        {
            let (key, _) = entry.map_err(storage_err)?;
            let (_, node_id) = key.value();
            let Some(data) = nodes_table.get(node_id).map_err(storage_err)? else {
                continue;
            };
            let node: Node = decode(data.value())?;
            if node.attribute(attribute) == Some(value) {
                return Ok(Some(node));
            }
        }
        Ok(None)
    }

    fn outgoing(&self, node: NodeId) -> Result<Vec<Relationship>, GraphError> {
        self.adjacent(OUTGOING, node)
    }

    fn incoming(&self, node: NodeId) -> Result<Vec<Relationship>, GraphError> {
        self.adjacent(INCOMING, node)
    }

    fn node_count(&self) -> Result<usize, GraphError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn.open_table(NODES).map_err(storage_err)?;
        Ok(table.len().map_err(storage_err)? as usize)
    }

    fn relationship_count(&self) -> Result<usize, GraphError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn.open_table(RELATIONSHIPS).map_err(storage_err)?;
        Ok(table.len().map_err(storage_err)? as usize)
    }
}

// =============================================================================
// TESTS
// =============================================================================
