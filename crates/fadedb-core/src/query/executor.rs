//! Query executor for running select queries.
//!
//! The executor resolves a query's source tree against the storage engine,
//! applies predicates, and returns rows of qualified field values.

use std::cmp::Ordering;

use crate::catalog::Catalog;
use crate::error::Error;
use crate::storage::{decode_row, StorageEngine};
use crate::value::Value;

use super::eval::FilterEvaluator;
use super::select::{OrderDirection, OrderSpec, SelectQuery, SourceRef};

/// A result row of qualified field values (`qualifier.column`).
pub type Row = Vec<(String, Value)>;

/// Query executor that runs queries against storage.
pub struct QueryExecutor<'a> {
    storage: &'a StorageEngine,
    catalog: &'a Catalog,
}

impl<'a> QueryExecutor<'a> {
    /// Create a new executor with storage and catalog references.
    pub fn new(storage: &'a StorageEngine, catalog: &'a Catalog) -> Self {
        Self { storage, catalog }
    }

    /// Execute a select query and return matching rows.
    pub fn execute(&self, query: &SelectQuery) -> Result<Vec<Row>, Error> {
        let source = match query.sources.as_slice() {
            [source] => source,
            [] => return Err(Error::InvalidQuery("query has no source".to_string())),
            _ => {
                return Err(Error::InvalidQuery(
                    "query has multiple sources; nest joins in a single source".to_string(),
                ))
            }
        };

        let candidates = self.resolve_source(source)?;

        let mut rows = Vec::with_capacity(candidates.len());
        for row in candidates {
            if FilterEvaluator::evaluate_predicates(&query.predicates, &row)? {
                rows.push(row);
            }
        }

        self.sort_rows(&mut rows, &query.order_by);
        Self::apply_window(&mut rows, query.offset, query.limit);

        Ok(rows)
    }

    /// Materialize the rows of a source.
    fn resolve_source(&self, source: &SourceRef) -> Result<Vec<Row>, Error> {
        match source {
            SourceRef::Table { table } => self.scan_qualified(table, table),
            SourceRef::TableAlias { table, alias } => self.scan_qualified(table, alias),
            SourceRef::Join { left, right, on } => {
                let left_rows = self.resolve_source(left)?;
                let right_rows = self.resolve_source(right)?;

                let mut rows = Vec::new();
                for left_row in &left_rows {
                    for right_row in &right_rows {
                        let mut combined =
                            Vec::with_capacity(left_row.len() + right_row.len());
                        combined.extend(left_row.iter().cloned());
                        combined.extend(right_row.iter().cloned());
                        if FilterEvaluator::evaluate(on, &combined)? {
                            rows.push(combined);
                        }
                    }
                }
                Ok(rows)
            }
            SourceRef::Derived { query, alias } => {
                let inner_rows = self.execute(query)?;
                Ok(inner_rows
                    .into_iter()
                    .map(|row| Self::requalify(row, alias))
                    .collect())
            }
        }
    }

    /// Scan a table, qualifying each field name with the given qualifier.
    fn scan_qualified(&self, table: &str, qualifier: &str) -> Result<Vec<Row>, Error> {
        if self.catalog.entity_by_table(table).is_none() {
            return Err(Error::InvalidQuery(format!("unknown table: {}", table)));
        }

        let mut rows = Vec::new();
        for result in self.storage.scan_table(table) {
            let (_row_id, record) = result?;
            let fields = decode_row(&record.data)?;
            let row = fields
                .into_iter()
                .map(|(name, value)| (format!("{}.{}", qualifier, name), value))
                .collect();
            rows.push(row);
        }
        Ok(rows)
    }

    /// Replace the qualifier of every field with a derived source's alias.
    fn requalify(row: Row, alias: &str) -> Row {
        row.into_iter()
            .map(|(name, value)| {
                let column = match name.split_once('.') {
                    Some((_, rest)) => rest,
                    None => name.as_str(),
                };
                (format!("{}.{}", alias, column), value)
            })
            .collect()
    }

    /// Sort rows according to order specifications.
    fn sort_rows(&self, rows: &mut [Row], order_by: &[OrderSpec]) {
        if order_by.is_empty() {
            return;
        }

        rows.sort_by(|a, b| {
            for spec in order_by {
                let a_val = FilterEvaluator::resolve_column(a, &spec.column);
                let b_val = FilterEvaluator::resolve_column(b, &spec.column);

                let cmp = Self::compare_values_opt(a_val, b_val);

                let cmp = match spec.direction {
                    OrderDirection::Asc => cmp,
                    OrderDirection::Desc => cmp.reverse(),
                };

                if cmp != Ordering::Equal {
                    return cmp;
                }
            }
            Ordering::Equal
        });
    }

    /// Compare two optional values for sorting.
    fn compare_values_opt(a: Option<&Value>, b: Option<&Value>) -> Ordering {
        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less, // NULLs first
            (Some(_), None) => Ordering::Greater,
            (Some(av), Some(bv)) => Self::compare_values(av, bv),
        }
    }

    /// Compare two values for sorting.
    fn compare_values(a: &Value, b: &Value) -> Ordering {
        match (a, b) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int32(a), Value::Int32(b)) => a.cmp(b),
            (Value::Int64(a), Value::Int64(b)) => a.cmp(b),
            (Value::Int32(a), Value::Int64(b)) => (*a as i64).cmp(b),
            (Value::Int64(a), Value::Int32(b)) => a.cmp(&(*b as i64)),
            (Value::Float64(a), Value::Float64(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
            (Value::Uuid(a), Value::Uuid(b)) => a.cmp(b),
            (Value::Bytes(a), Value::Bytes(b)) => a.cmp(b),
            _ => Ordering::Equal, // Incompatible types are considered equal
        }
    }

    /// Apply offset and limit to sorted rows.
    fn apply_window(rows: &mut Vec<Row>, offset: Option<usize>, limit: Option<usize>) {
        if let Some(offset) = offset {
            if offset >= rows.len() {
                rows.clear();
            } else if offset > 0 {
                rows.drain(0..offset);
            }
        }

        if let Some(limit) = limit {
            if limit < rows.len() {
                rows.truncate(limit);
            }
        }
    }
}
