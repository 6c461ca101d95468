//! # Core Type Definitions
//!
//! This module contains the data model shared by every store and by the
//! traversal engine:
//! - Identifiers (`NodeId`, `RelationshipId`)
//! - Classification tags (`Label`, `RelationshipType`)
//! - Attribute values (`AttributeValue`, `Attributes`)
//! - Graph records (`Node`, `Relationship`)
//! - Endpoint resolution (`Selector`, `Direction`)
//! - Error types (`GraphError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Use integer values only (no floating-point)
//! - Implement `Ord` for deterministic ordering in `BTreeMap`/`BTreeSet`

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Store-assigned identifier of a node.
///
/// Identifiers grow monotonically and are never reused while the store lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

/// Store-assigned identifier of a relationship.
///
/// Ascending `RelationshipId` order is creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RelationshipId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for RelationshipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

// =============================================================================
// LABELS & TYPES
// =============================================================================

/// Classification tag of a node (e.g. "A", "Person").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Label(pub String);

impl Label {
    /// Create a new label from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the label as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Type tag of a relationship (e.g. "X", "KNOWS").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RelationshipType(pub String);

impl RelationshipType {
    /// Create a new relationship type from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the type as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// ATTRIBUTES
// =============================================================================

/// A scalar attribute value.
///
/// Equality is structural: two values are equal when their variants and
/// contents are equal, never by identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AttributeValue {
    Text(String),
    Integer(i64),
    Boolean(bool),
}

impl AttributeValue {
    /// Get the text content, if this is a `Text` value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Parse a command-line literal.
    ///
    /// `true`/`false` become `Boolean`, anything `i64` accepts becomes
    /// `Integer`, everything else is kept as `Text`.
    #[must_use]
    pub fn parse_literal(raw: &str) -> Self {
        match raw {
            "true" => Self::Boolean(true),
            "false" => Self::Boolean(false),
            _ => raw
                .parse::<i64>()
                .map(Self::Integer)
                .unwrap_or_else(|_| Self::Text(raw.to_string())),
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for AttributeValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

/// Attribute mapping of a node. Keys are unique; iteration order is sorted.
pub type Attributes = BTreeMap<String, AttributeValue>;

// =============================================================================
// NODE & RELATIONSHIP
// =============================================================================

/// A labeled, attributed vertex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// The store-assigned identifier.
    pub id: NodeId,
    /// The primary label, fixed at creation.
    pub label: Label,
    /// Attribute mapping.
    pub attributes: Attributes,
}

impl Node {
    /// Create a new node.
    #[must_use]
    pub fn new(id: NodeId, label: Label, attributes: Attributes) -> Self {
        Self {
            id,
            label,
            attributes,
        }
    }

    /// Get an attribute value by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Check whether this node satisfies a selector (label and attribute value).
    #[must_use]
    pub fn matches(&self, selector: &Selector) -> bool {
        self.label == selector.label
            && self.attribute(&selector.attribute) == Some(&selector.value)
    }
}

/// A typed, directed edge from `source` to `target`.
///
/// Endpoints and type are immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: RelationshipId,
    pub rel_type: RelationshipType,
    pub source: NodeId,
    pub target: NodeId,
}

impl Relationship {
    /// Create a new relationship.
    #[must_use]
    pub fn new(
        id: RelationshipId,
        rel_type: RelationshipType,
        source: NodeId,
        target: NodeId,
    ) -> Self {
        Self {
            id,
            rel_type,
            source,
            target,
        }
    }
}

// =============================================================================
// SELECTOR & DIRECTION
// =============================================================================

/// Resolves a node by label and exact attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selector {
    pub label: Label,
    pub attribute: String,
    pub value: AttributeValue,
}

impl Selector {
    /// Create a selector on an arbitrary attribute.
    #[must_use]
    pub fn new(
        label: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        Self {
            label: Label::new(label),
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Create a selector on the default key attribute (`"name"`).
    #[must_use]
    pub fn by_key(label: impl Into<String>, key: impl Into<AttributeValue>) -> Self {
        Self::new(label, crate::primitives::KEY_ATTRIBUTE, key)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) {}={}", self.label, self.attribute, self.value)
    }
}

/// Direction filter for relationship enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Outgoing,
    Incoming,
    Both,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in labgraph.
///
/// - No silent failures
/// - Use `Result<T, GraphError>` for fallible operations
/// - The core never panics; `NoRoute` is an ordinary negative outcome
#[derive(Debug, PartialEq, Error)]
pub enum GraphError {
    /// A label is empty or exceeds the length limit.
    #[error("Invalid label: {0:?}")]
    InvalidLabel(String),

    /// A relationship type is empty or exceeds the length limit.
    #[error("Invalid relationship type: {0:?}")]
    InvalidRelationshipType(String),

    /// An attribute name or value violates the input limits.
    #[error("Invalid attribute: {0}")]
    InvalidAttribute(String),

    /// A relationship endpoint does not belong to this store.
    #[error("Invalid relationship endpoint: {0}")]
    InvalidEndpoint(NodeId),

    /// A node id does not belong to this store.
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    /// A selector did not resolve to any node.
    #[error("Node not found: {0}")]
    NodeNotFound(Selector),

    /// The search exhausted the graph without reaching the goal.
    #[error("No route from {from} to {to}")]
    NoRoute { from: Selector, to: Selector },

    /// The search was cancelled through its cancellation token.
    #[error("Traversal cancelled")]
    Cancelled,

    /// Traversal bookkeeping was inconsistent.
    #[error("Traversal failed")]
    TraversalFailed,

    /// An id counter has no values left.
    #[error("Identifier space exhausted")]
    IdExhausted,

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O or storage engine error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

impl GraphError {
    /// True for `NoRoute`, the non-exceptional negative search result.
    #[must_use]
    pub fn is_no_route(&self) -> bool {
        matches!(self, Self::NoRoute { .. })
    }
}

// =============================================================================
// TESTS
// =============================================================================
