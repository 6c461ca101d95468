//! # Primitives
//!
//! Compile-time constants for the labgraph core.
//!
//! These values are fixed in the binary and immutable at runtime.

/// Attribute used as the identifying key of a node unless configured otherwise.
///
/// Selectors built with `Selector::by_key` and the relationship listing
/// resolve nodes through this attribute.
pub const KEY_ATTRIBUTE: &str = "name";

/// Magic bytes for the labgraph snapshot header.
///
/// - File Header = Magic Bytes ("LGPH") + Version (u8) before payload.
pub const MAGIC_BYTES: &[u8; 4] = b"LGPH";

/// Current snapshot format version.
///
/// Increment this when making breaking changes to the serialization format.
pub const FORMAT_VERSION: u8 = 1;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length for node labels and relationship types.
pub const MAX_LABEL_LENGTH: usize = 256;

/// Maximum length for attribute names.
pub const MAX_ATTRIBUTE_NAME_LENGTH: usize = 256;

/// Maximum length for text attribute values (64KB).
pub const MAX_VALUE_LENGTH: usize = 65536;

/// Maximum number of attributes on a single node.
pub const MAX_ATTRIBUTES_PER_NODE: usize = 1024;
