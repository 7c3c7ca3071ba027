//! Entity definitions.

use super::field::FieldDef;
use serde::{Deserialize, Serialize};

/// Conventional name of the deletion timestamp column.
pub const DEFAULT_SOFT_DELETE_COLUMN: &str = "deleted_at";

/// An entity definition (table mapping).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDef {
    /// Entity name (unique within schema).
    pub name: String,
    /// Mapped table name. Defaults to the entity name.
    pub table: String,
    /// Name of the primary identity field.
    pub identity_field: String,
    /// Field definitions.
    pub fields: Vec<FieldDef>,
    /// Lifecycle rules.
    pub lifecycle: LifecycleRules,
}

/// Lifecycle rules for an entity.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LifecycleRules {
    /// Mark this entity as soft-deletable (deletes assign a timestamp
    /// instead of removing the row).
    pub soft_delete: bool,
    /// Deletion timestamp column, when it differs from the convention.
    pub soft_delete_column: Option<String>,
}

impl EntityDef {
    /// Create a new entity definition mapped to a table of the same name.
    pub fn new(name: impl Into<String>, identity_field: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            table: name.clone(),
            name,
            identity_field: identity_field.into(),
            fields: Vec::new(),
            lifecycle: LifecycleRules::default(),
        }
    }

    /// Set the mapped table name.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Add a field to the entity.
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Add multiple fields.
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = FieldDef>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Enable soft delete using the conventional `deleted_at` column.
    pub fn with_soft_delete(mut self) -> Self {
        self.lifecycle.soft_delete = true;
        self
    }

    /// Enable soft delete with a custom deletion timestamp column.
    pub fn with_soft_delete_column(mut self, column: impl Into<String>) -> Self {
        self.lifecycle.soft_delete = true;
        self.lifecycle.soft_delete_column = Some(column.into());
        self
    }

    /// Get a field by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Get the identity field definition.
    pub fn get_identity_field(&self) -> Option<&FieldDef> {
        self.get_field(&self.identity_field)
    }

    /// Check if this entity carries the soft delete marker.
    pub fn has_soft_delete(&self) -> bool {
        self.lifecycle.soft_delete
    }

    /// The deletion timestamp column for this entity.
    pub fn soft_delete_column(&self) -> &str {
        self.lifecycle
            .soft_delete_column
            .as_deref()
            .unwrap_or(DEFAULT_SOFT_DELETE_COLUMN)
    }
}
