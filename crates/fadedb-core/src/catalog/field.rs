//! Field definitions for entities.

use super::types::{FieldType, ScalarType};
use serde::{Deserialize, Serialize};

/// A field definition within an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name.
    pub name: String,
    /// Field data type.
    pub field_type: FieldType,
    /// Whether the field is required (non-nullable at the application level).
    pub required: bool,
}

impl FieldDef {
    /// Create a new required field.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: true,
        }
    }

    /// Create an optional field (required = false).
    pub fn optional(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
        }
    }

    /// Create a required scalar field.
    pub fn scalar(name: impl Into<String>, scalar: ScalarType) -> Self {
        Self::new(name, FieldType::Scalar(scalar))
    }

    /// Create an optional scalar field.
    pub fn optional_scalar(name: impl Into<String>, scalar: ScalarType) -> Self {
        Self::optional(name, FieldType::OptionalScalar(scalar))
    }

    /// Check if this field accepts null values.
    pub fn is_nullable(&self) -> bool {
        !self.required || self.field_type.is_nullable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_def_builder() {
        let field = FieldDef::new("id", FieldType::scalar(ScalarType::Uuid));

        assert_eq!(field.name, "id");
        assert!(field.required);
        assert!(!field.is_nullable());
    }

    #[test]
    fn test_optional_field() {
        let field = FieldDef::optional("description", FieldType::scalar(ScalarType::String));

        assert!(!field.required);
        assert!(field.is_nullable());
    }

    #[test]
    fn test_optional_scalar() {
        let field = FieldDef::optional_scalar("deleted_at", ScalarType::Timestamp);

        assert!(field.is_nullable());
        assert_eq!(field.field_type, FieldType::OptionalScalar(ScalarType::Timestamp));
    }
}
