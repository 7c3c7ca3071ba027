//! Catalog manager serving mapping metadata lookups.

use super::{EntityDef, RelationDef, Schema};
use parking_lot::RwLock;
use std::sync::Arc;

/// The catalog serving the currently applied schema.
///
/// Mapping metadata is defined in code at startup and applied once; the lock
/// exists so the catalog can be shared across sessions.
pub struct Catalog {
    current: RwLock<Arc<Schema>>,
}

impl Catalog {
    /// Create a catalog with an empty schema.
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(Schema::new())),
        }
    }

    /// Apply a schema, replacing the current one.
    pub fn apply_schema(&self, schema: Schema) {
        *self.current.write() = Arc::new(schema);
    }

    /// Get the current schema.
    pub fn schema(&self) -> Arc<Schema> {
        self.current.read().clone()
    }

    /// Get an entity definition by name.
    pub fn get_entity(&self, name: &str) -> Option<EntityDef> {
        self.current.read().get_entity(name).cloned()
    }

    /// Get an entity definition by its mapped table name.
    pub fn entity_by_table(&self, table: &str) -> Option<EntityDef> {
        self.current.read().entity_by_table(table).cloned()
    }

    /// Get a relationship definition by name.
    pub fn get_relation(&self, name: &str) -> Option<RelationDef> {
        self.current.read().get_relation(name).cloned()
    }

    /// Get all relationships owned by an entity, sorted by name.
    pub fn relations_of(&self, entity: &str) -> Vec<RelationDef> {
        self.current
            .read()
            .relations_of(entity)
            .into_iter()
            .cloned()
            .collect()
    }

    /// List all entity names.
    pub fn list_entities(&self) -> Vec<String> {
        self.current
            .read()
            .entity_names()
            .into_iter()
            .map(String::from)
            .collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FieldDef, FieldType, ScalarType};

    fn sample_schema() -> Schema {
        let user = EntityDef::new("User", "id")
            .with_field(FieldDef::new("id", FieldType::scalar(ScalarType::Uuid)))
            .with_field(FieldDef::new("name", FieldType::scalar(ScalarType::String)));

        let post = EntityDef::new("Post", "id")
            .with_field(FieldDef::new("id", FieldType::scalar(ScalarType::Uuid)))
            .with_field(FieldDef::new("author_id", FieldType::scalar(ScalarType::Uuid)));

        Schema::new()
            .with_entity(user)
            .with_entity(post)
            .with_relation(RelationDef::has_many("posts", "User", "id", "Post", "author_id"))
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = Catalog::new();

        assert!(catalog.get_entity("User").is_none());
        assert!(catalog.list_entities().is_empty());
    }

    #[test]
    fn test_apply_schema() {
        let catalog = Catalog::new();
        catalog.apply_schema(sample_schema());

        let user = catalog.get_entity("User");
        assert!(user.is_some());
        assert_eq!(user.unwrap().name, "User");
        assert!(catalog.get_entity("NonExistent").is_none());

        let entities = catalog.list_entities();
        assert_eq!(entities.len(), 2);
    }

    #[test]
    fn test_relation_lookups() {
        let catalog = Catalog::new();
        catalog.apply_schema(sample_schema());

        assert!(catalog.get_relation("posts").is_some());
        assert_eq!(catalog.relations_of("User").len(), 1);
        assert!(catalog.relations_of("Post").is_empty());
    }

    #[test]
    fn test_shared_schema_snapshot() {
        let catalog = Catalog::new();
        catalog.apply_schema(sample_schema());

        let snapshot = catalog.schema();
        assert_eq!(snapshot.entities.len(), 2);
    }
}
