//! # Validation Module
//!
//! Input validation for graph mutations.
//!
//! - Validate labels, relationship types and attributes before any write
//! - Reject malformed input; never truncate or coerce it
//! - Shared by every `GraphStore` backend so both reject identical input

use crate::primitives::{
    MAX_ATTRIBUTE_NAME_LENGTH, MAX_ATTRIBUTES_PER_NODE, MAX_LABEL_LENGTH, MAX_VALUE_LENGTH,
};
use crate::{AttributeValue, Attributes, GraphError, Label, RelationshipType};

/// Stateless validator applied by the stores before mutating anything.
pub struct Validator;

impl Validator {
    /// A label must be non-empty and at most `MAX_LABEL_LENGTH` bytes.
    pub fn validate_label(label: &Label) -> Result<(), GraphError> {
        let raw = label.as_str();
        if raw.is_empty() || raw.len() > MAX_LABEL_LENGTH {
            return Err(GraphError::InvalidLabel(raw.to_string()));
        }
        Ok(())
    }

    /// Same limits as labels.
    pub fn validate_relationship_type(rel_type: &RelationshipType) -> Result<(), GraphError> {
        let raw = rel_type.as_str();
        if raw.is_empty() || raw.len() > MAX_LABEL_LENGTH {
            return Err(GraphError::InvalidRelationshipType(raw.to_string()));
        }
        Ok(())
    }

    /// Validate a single attribute name/value pair.
    pub fn validate_attribute(name: &str, value: &AttributeValue) -> Result<(), GraphError> {
        if name.is_empty() {
            return Err(GraphError::InvalidAttribute(
                "attribute name is empty".to_string(),
            ));
        }
        if name.len() > MAX_ATTRIBUTE_NAME_LENGTH {
            return Err(GraphError::InvalidAttribute(format!(
                "attribute name exceeds {} bytes",
                MAX_ATTRIBUTE_NAME_LENGTH
            )));
        }
        match value {
            AttributeValue::Text(text) if text.len() > MAX_VALUE_LENGTH => {
                Err(GraphError::InvalidAttribute(format!(
                    "value of '{}' exceeds {} bytes",
                    name, MAX_VALUE_LENGTH
                )))
            }
            _ => Ok(()),
        }
    }

    /// Validate a full attribute mapping as supplied at node creation.
    pub fn validate_attributes(attributes: &Attributes) -> Result<(), GraphError> {
        if attributes.len() > MAX_ATTRIBUTES_PER_NODE {
            return Err(GraphError::InvalidAttribute(format!(
                "{} attributes exceed the limit of {}",
                attributes.len(),
                MAX_ATTRIBUTES_PER_NODE
            )));
        }
        for (name, value) in attributes {
            Self::validate_attribute(name, value)?;
        }
        Ok(())
    }
}
