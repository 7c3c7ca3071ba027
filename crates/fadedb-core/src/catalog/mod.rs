//! Mapping catalog for FadeDB.
//!
//! The catalog holds the entity and relationship definitions a session layer
//! needs to map rows to instances, including per-entity lifecycle rules such
//! as the soft delete marker.

mod catalog;
mod entity;
mod field;
mod relation;
mod schema;
mod types;

pub use catalog::Catalog;
pub use entity::{EntityDef, LifecycleRules, DEFAULT_SOFT_DELETE_COLUMN};
pub use field::FieldDef;
pub use relation::{Cardinality, CascadePolicy, RelationDef};
pub use schema::Schema;
pub use types::{FieldType, ScalarType};
