//! Query engine for FadeDB.
//!
//! This module implements the select query IR, the read interception
//! pipeline that rewrites queries before execution, and the executor that
//! runs them against storage.

mod eval;
mod executor;
mod expr;
mod pipeline;
mod select;

pub use eval::FilterEvaluator;
pub use executor::{QueryExecutor, Row};
pub use expr::{ColumnRef, FilterExpr};
pub use pipeline::{ExecutionPipeline, ReadInterceptor};
pub use select::{OrderDirection, OrderSpec, Predicate, SelectQuery, SourceRef};
