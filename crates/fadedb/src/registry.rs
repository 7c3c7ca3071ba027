//! Soft delete capability registry.
//!
//! The registry is built once from the schema when an engine opens. All
//! later capability checks are constant-time map lookups; nothing in the
//! read or delete path re-walks entity definitions.

use std::collections::HashMap;

use fadedb_core::{ScalarType, Schema};
use tracing::warn;

/// Deletion metadata for one soft-delete capable entity.
#[derive(Debug, Clone, PartialEq)]
pub struct SoftDeleteEntry {
    /// Entity type name.
    pub entity: String,
    /// Mapped table name.
    pub table: String,
    /// Deletion timestamp column.
    pub column: String,
}

/// Registry of entities that support soft deletion.
///
/// Lookups are infallible: an entity or table the registry does not know
/// is simply not capable, and deletes against it fall back to physical
/// removal.
#[derive(Debug, Default)]
pub struct SoftDeleteRegistry {
    by_entity: HashMap<String, SoftDeleteEntry>,
    by_table: HashMap<String, SoftDeleteEntry>,
}

impl SoftDeleteRegistry {
    /// Build the registry from a schema.
    ///
    /// An entity is registered when it carries the soft delete marker and
    /// its deletion timestamp column exists as a field. A marked entity
    /// whose column is missing is skipped with a warning rather than
    /// rejected.
    pub fn from_schema(schema: &Schema) -> Self {
        let mut by_entity = HashMap::new();
        let mut by_table = HashMap::new();

        for entity in schema.entities.values() {
            if !entity.has_soft_delete() {
                continue;
            }

            let column = entity.soft_delete_column();
            match entity.get_field(column) {
                None => {
                    warn!(
                        entity = %entity.name,
                        column = %column,
                        "deletion timestamp column not defined; entity will be hard-deleted"
                    );
                    continue;
                }
                Some(field) if field.field_type.scalar_type() != &ScalarType::Timestamp => {
                    // Presence is what gates capability. A mistyped column
                    // still gets the timestamp written into it.
                    warn!(
                        entity = %entity.name,
                        column = %column,
                        "deletion timestamp column is not a timestamp field"
                    );
                }
                Some(_) => {}
            }

            let entry = SoftDeleteEntry {
                entity: entity.name.clone(),
                table: entity.table.clone(),
                column: column.to_string(),
            };
            by_table.insert(entity.table.clone(), entry.clone());
            by_entity.insert(entity.name.clone(), entry);
        }

        Self {
            by_entity,
            by_table,
        }
    }

    /// Check whether an entity type supports soft deletion.
    pub fn is_capable(&self, entity: &str) -> bool {
        self.by_entity.contains_key(entity)
    }

    /// Get deletion metadata for an entity type.
    pub fn entry_for_entity(&self, entity: &str) -> Option<&SoftDeleteEntry> {
        self.by_entity.get(entity)
    }

    /// Get deletion metadata for a table.
    pub fn entry_for_table(&self, table: &str) -> Option<&SoftDeleteEntry> {
        self.by_table.get(table)
    }

    /// Get the number of registered entities.
    pub fn len(&self) -> usize {
        self.by_entity.len()
    }

    /// Check whether no entity is registered.
    pub fn is_empty(&self) -> bool {
        self.by_entity.is_empty()
    }
}
