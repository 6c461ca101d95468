//! # Formats
//!
//! Snapshot encodings for the in-memory graph. File I/O stays in the app.

mod persistence;

pub use persistence::{
    MAX_PERSISTENCE_PAYLOAD_SIZE, PersistenceHeader, graph_from_bytes, graph_to_bytes,
};
