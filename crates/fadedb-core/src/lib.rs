//! FadeDB Core - Mapping catalog, storage engine, and query execution.
//!
//! This crate provides the storage and query foundations for FadeDB.

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod catalog;
pub mod error;
pub mod query;
pub mod storage;
pub mod value;

pub use catalog::{
    Cardinality, CascadePolicy, Catalog, EntityDef, FieldDef, FieldType, LifecycleRules,
    RelationDef, ScalarType, Schema, DEFAULT_SOFT_DELETE_COLUMN,
};
pub use error::Error;
pub use query::{
    ColumnRef, ExecutionPipeline, FilterEvaluator, FilterExpr, OrderDirection, OrderSpec,
    Predicate, QueryExecutor, ReadInterceptor, Row, SelectQuery, SourceRef,
};
pub use storage::{decode_row, encode_row, RowRecord, StorageConfig, StorageEngine, WriteBatch};
pub use value::Value;
