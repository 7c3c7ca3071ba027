//! Schema - the full set of entity and relationship definitions.

use super::{EntityDef, RelationDef};
use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The complete mapping metadata applied to an engine.
///
/// Built once at startup with the fluent builder and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schema {
    /// Entity definitions keyed by name.
    pub entities: HashMap<String, EntityDef>,
    /// Relationship definitions keyed by name.
    pub relations: HashMap<String, RelationDef>,
}

impl Schema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity to the schema.
    pub fn with_entity(mut self, entity: EntityDef) -> Self {
        self.entities.insert(entity.name.clone(), entity);
        self
    }

    /// Add a relationship to the schema.
    pub fn with_relation(mut self, relation: RelationDef) -> Self {
        self.relations.insert(relation.name.clone(), relation);
        self
    }

    /// Get an entity by name.
    pub fn get_entity(&self, name: &str) -> Option<&EntityDef> {
        self.entities.get(name)
    }

    /// Get an entity by its mapped table name.
    pub fn entity_by_table(&self, table: &str) -> Option<&EntityDef> {
        self.entities.values().find(|e| e.table == table)
    }

    /// Get a relationship by name.
    pub fn get_relation(&self, name: &str) -> Option<&RelationDef> {
        self.relations.get(name)
    }

    /// Get all relationships owned by an entity, sorted by name.
    ///
    /// The sort keeps cascade traversal order stable across runs.
    pub fn relations_of(&self, entity: &str) -> Vec<&RelationDef> {
        let mut relations: Vec<&RelationDef> = self
            .relations
            .values()
            .filter(|r| r.entity == entity)
            .collect();
        relations.sort_by(|a, b| a.name.cmp(&b.name));
        relations
    }

    /// List all entity names.
    pub fn entity_names(&self) -> Vec<&str> {
        self.entities.keys().map(|s| s.as_str()).collect()
    }

    /// Serialize the schema to JSON bytes.
    ///
    /// The schema holds maps of structured definitions, so it is persisted
    /// as JSON rather than through the row codec.
    pub fn to_json(&self) -> Result<Vec<u8>, Error> {
        serde_json::to_vec(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize a schema from JSON bytes.
    pub fn from_json(bytes: &[u8]) -> Result<Self, Error> {
        serde_json::from_slice(bytes).map_err(|e| Error::Deserialization(e.to_string()))
    }
}
