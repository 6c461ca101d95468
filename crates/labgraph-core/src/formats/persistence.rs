//! # Snapshot Format
//!
//! Binary snapshots of an in-memory `Graph`.
//!
//! Binary layout: header (5 bytes) + postcard-serialized `SerializableGraph`.
//! - 4 bytes: magic (`"LGPH"`)
//! - 1 byte: format version
//!
//! Size and header are checked before the payload is decoded, and restoring
//! goes through `Graph::try_from`, so a snapshot with dangling relationship
//! endpoints is rejected instead of producing a broken graph.

use crate::{Graph, GraphError, SerializableGraph, primitives};

/// Maximum accepted snapshot size (500 MB), checked before decoding.
pub const MAX_PERSISTENCE_PAYLOAD_SIZE: usize = 500 * 1024 * 1024;

const HEADER_SIZE: usize = 5;

// =============================================================================
// FILE HEADER
// =============================================================================

/// The header that precedes every binary snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistenceHeader {
    pub magic: [u8; 4],
    pub version: u8,
}

impl PersistenceHeader {
    /// Header for the current format version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            magic: *primitives::MAGIC_BYTES,
            version: primitives::FORMAT_VERSION,
        }
    }

    pub fn validate(&self) -> Result<(), GraphError> {
        if &self.magic != primitives::MAGIC_BYTES {
            return Err(GraphError::SerializationError(
                "Invalid magic bytes".to_string(),
            ));
        }
        if self.version != primitives::FORMAT_VERSION {
            return Err(GraphError::SerializationError(format!(
                "Unsupported version: {} (expected {})",
                self.version,
                primitives::FORMAT_VERSION
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let [m0, m1, m2, m3] = self.magic;
        [m0, m1, m2, m3, self.version]
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, GraphError> {
        match bytes {
            [m0, m1, m2, m3, version, ..] => Ok(Self {
                magic: [*m0, *m1, *m2, *m3],
                version: *version,
            }),
            _ => Err(GraphError::SerializationError(
                "Header too short".to_string(),
            )),
        }
    }
}

impl Default for PersistenceHeader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// BINARY
// =============================================================================

/// Serialize a graph to bytes (header + payload).
pub fn graph_to_bytes(graph: &Graph) -> Result<Vec<u8>, GraphError> {
    let serializable = SerializableGraph::from(graph);
    let payload = postcard::to_stdvec(&serializable)
        .map_err(|e| GraphError::SerializationError(e.to_string()))?;

    let mut result = Vec::with_capacity(HEADER_SIZE + payload.len());
    result.extend_from_slice(&PersistenceHeader::new().to_bytes());
    result.extend_from_slice(&payload);
    Ok(result)
}

/// Deserialize a graph from bytes produced by `graph_to_bytes`.
pub fn graph_from_bytes(bytes: &[u8]) -> Result<Graph, GraphError> {
    if bytes.len() > MAX_PERSISTENCE_PAYLOAD_SIZE {
        return Err(GraphError::SerializationError(format!(
            "Data size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_PERSISTENCE_PAYLOAD_SIZE
        )));
    }

    let header = PersistenceHeader::from_bytes(bytes)?;
    header.validate()?;

    let payload = bytes.get(HEADER_SIZE..).unwrap_or_default();
    let serializable: SerializableGraph = postcard::from_bytes(payload).map_err(|e| {
        GraphError::SerializationError(format!("Failed to deserialize graph data: {}", e))
    })?;

    Graph::try_from(serializable)
}

// =============================================================================
// TESTS
// =============================================================================
