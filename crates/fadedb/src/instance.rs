//! In-memory entity instances.

use fadedb_core::Value;

/// An in-memory instance of a schema entity.
///
/// An instance pairs an entity type name with its field values. Instances
/// are created by callers before staging writes, or materialized from rows
/// by query results.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    entity: String,
    values: Vec<(String, Value)>,
}

impl Instance {
    /// Create an empty instance of an entity type.
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            values: Vec::new(),
        }
    }

    /// Create an instance from existing field values.
    pub fn from_fields(entity: impl Into<String>, values: Vec<(String, Value)>) -> Self {
        Self {
            entity: entity.into(),
            values,
        }
    }

    /// Set a field value, builder style.
    pub fn with_value(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    /// Get the entity type name.
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Get a field value by name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, v)| v)
    }

    /// Set a field value, replacing any existing value for the field.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        let field = field.into();
        let value = value.into();
        match self.values.iter_mut().find(|(name, _)| name == &field) {
            Some(entry) => entry.1 = value,
            None => self.values.push((field, value)),
        }
    }

    /// Get all field values in insertion order.
    pub fn values(&self) -> &[(String, Value)] {
        &self.values
    }
}
