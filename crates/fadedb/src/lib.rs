//! FadeDB - an object mapping layer with transparent soft deletion.
//!
//! Entities marked soft-deletable in the schema keep their rows on delete:
//! the deletion timestamp column is assigned and reads issued through the
//! engine filter the row out. [`QueryBuilder::with_deleted_at`] opts a query
//! back in. Deletes cascade through schema relationships flagged for it,
//! honoring each entity's own capability.
//!
//! The crate sits on top of `fadedb-core`, which provides the mapping
//! catalog, storage engine, and query execution; the common core types are
//! re-exported here.

pub mod engine;
pub mod error;
pub mod instance;
pub mod query;
pub mod registry;
pub mod rewriter;
pub mod session;

pub use engine::{Engine, EngineBuilder};
pub use error::Error;
pub use instance::Instance;
pub use query::QueryBuilder;
pub use registry::{SoftDeleteEntry, SoftDeleteRegistry};
pub use rewriter::SoftDeleteRewriter;
pub use session::Session;

pub use fadedb_core::{
    decode_row, encode_row, Cardinality, CascadePolicy, Catalog, ColumnRef, EntityDef,
    ExecutionPipeline, FieldDef, FieldType, FilterExpr, OrderDirection, OrderSpec, Predicate,
    ReadInterceptor, RelationDef, Row, RowRecord, ScalarType, Schema, SelectQuery, SourceRef,
    StorageConfig, StorageEngine, Value, DEFAULT_SOFT_DELETE_COLUMN,
};
