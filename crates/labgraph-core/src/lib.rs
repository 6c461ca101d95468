//! # labgraph-core
//!
//! A labeled, typed-relationship graph store with a deterministic
//! breadth-first route engine.
//!
//! ## Layers
//!
//! - `types` and `graph`: the data model and the `GraphStore` trait, with an
//!   in-memory `Graph` and a redb-backed `RedbGraph`
//! - `traversal`: BFS route search over outgoing relationships
//! - `reporter`: path reconstruction from parent bookkeeping and rendering
//!   to pluggable sinks
//! - `session`: the `(label, key)` addressed facade used by the CLI
//!
//! ## Architectural Constraints
//!
//! - No async, no network dependencies (pure Rust)
//! - `BTreeMap`/`BTreeSet` only, so enumeration order is stable
//! - Every fallible operation returns `Result<_, GraphError>`

// =============================================================================
// MODULES
// =============================================================================

pub mod demo;
pub mod formats;
pub mod graph;
pub mod primitives;
pub mod reporter;
pub mod session;
pub mod storage;
pub mod traversal;
pub mod types;
pub mod validation;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    AttributeValue, Attributes, Direction, GraphError, Label, Node, NodeId, Relationship,
    RelationshipId, RelationshipType, Selector,
};

// =============================================================================
// RE-EXPORTS: Graph Engine
// =============================================================================

pub use graph::{Graph, GraphStore, SerializableGraph};
pub use reporter::{LineWriter, ParentMap, PathReporter, PathSink, reconstruct_path};
pub use session::{RelationshipView, Session, StorageBackend};
pub use storage::RedbGraph;
pub use traversal::{CancellationToken, Route, RouteSearch, find_route};
pub use validation::Validator;

// =============================================================================
// RE-EXPORTS: Formats (from formats module)
// =============================================================================

pub use formats::{PersistenceHeader, graph_from_bytes, graph_to_bytes};
