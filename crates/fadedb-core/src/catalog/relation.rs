//! Relationship definitions between entities.

use serde::{Deserialize, Serialize};

/// Cardinality of a relationship, seen from the owning entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cardinality {
    /// Single-valued: at most one related row.
    One,
    /// Collection-valued: any number of related rows.
    Many,
}

/// Cascade policy flags for a relationship.
///
/// Only `delete` is interpreted by the delete orchestrator; the struct leaves
/// room for further lifecycle flags without changing the relation shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CascadePolicy {
    /// Deleting the owner also deletes related rows.
    pub delete: bool,
}

impl CascadePolicy {
    /// Policy that cascades deletes to related rows.
    pub fn delete() -> Self {
        Self { delete: true }
    }
}

/// A relationship definition, owned by one entity and pointing at another.
///
/// Related rows are the target rows whose `target_field` equals the owner
/// row's `owner_field` value. For a `One` relationship the owner typically
/// carries the foreign key; for a `Many` relationship the target does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationDef {
    /// Relationship name (unique within schema, the key on the owner).
    pub name: String,
    /// Owning entity name.
    pub entity: String,
    /// Target entity name.
    pub target: String,
    /// Field on the owner whose value joins the two sides.
    pub owner_field: String,
    /// Field on the target that matches the owner field value.
    pub target_field: String,
    /// Relationship cardinality.
    pub cardinality: Cardinality,
    /// Cascade policy.
    pub cascade: CascadePolicy,
}

impl RelationDef {
    /// Create a single-valued relationship.
    pub fn has_one(
        name: impl Into<String>,
        entity: impl Into<String>,
        owner_field: impl Into<String>,
        target: impl Into<String>,
        target_field: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            entity: entity.into(),
            target: target.into(),
            owner_field: owner_field.into(),
            target_field: target_field.into(),
            cardinality: Cardinality::One,
            cascade: CascadePolicy::default(),
        }
    }

    /// Create a collection-valued relationship.
    pub fn has_many(
        name: impl Into<String>,
        entity: impl Into<String>,
        owner_field: impl Into<String>,
        target: impl Into<String>,
        target_field: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            entity: entity.into(),
            target: target.into(),
            owner_field: owner_field.into(),
            target_field: target_field.into(),
            cardinality: Cardinality::Many,
            cascade: CascadePolicy::default(),
        }
    }

    /// Set the cascade policy.
    pub fn with_cascade(mut self, cascade: CascadePolicy) -> Self {
        self.cascade = cascade;
        self
    }

    /// Enable delete cascading for this relationship.
    pub fn with_delete_cascade(mut self) -> Self {
        self.cascade.delete = true;
        self
    }

    /// Check if deletes cascade across this relationship.
    pub fn cascades_delete(&self) -> bool {
        self.cascade.delete
    }
}
