//! Filter evaluation for query execution.
//!
//! This module provides the `FilterEvaluator` that evaluates filter
//! expressions and query predicates against rows of qualified field values.

use std::cmp::Ordering;

use super::expr::{ColumnRef, FilterExpr};
use super::select::Predicate;
use crate::error::Error;
use crate::value::Value;

/// Evaluates filter expressions against row data.
pub struct FilterEvaluator;

impl FilterEvaluator {
    /// Evaluate a filter expression against a row of qualified field values.
    ///
    /// Returns `true` if the row matches the filter, `false` otherwise.
    pub fn evaluate(filter: &FilterExpr, row: &[(String, Value)]) -> Result<bool, Error> {
        match filter {
            FilterExpr::Eq { column, value } => {
                Self::compare_column(row, column, value, Self::values_equal)
            }
            FilterExpr::Ne { column, value } => {
                Self::compare_column(row, column, value, |a, b| !Self::values_equal(a, b))
            }
            FilterExpr::Lt { column, value } => Self::compare_column(row, column, value, |a, b| {
                Self::compare_values(a, b)
                    .map(|ord| ord.is_lt())
                    .unwrap_or(false)
            }),
            FilterExpr::Le { column, value } => Self::compare_column(row, column, value, |a, b| {
                Self::compare_values(a, b)
                    .map(|ord| ord.is_le())
                    .unwrap_or(false)
            }),
            FilterExpr::Gt { column, value } => Self::compare_column(row, column, value, |a, b| {
                Self::compare_values(a, b)
                    .map(|ord| ord.is_gt())
                    .unwrap_or(false)
            }),
            FilterExpr::Ge { column, value } => Self::compare_column(row, column, value, |a, b| {
                Self::compare_values(a, b)
                    .map(|ord| ord.is_ge())
                    .unwrap_or(false)
            }),
            FilterExpr::In { column, values } => {
                let column_value = Self::resolve_column(row, column);
                match column_value {
                    Some(cv) => Ok(values.iter().any(|v| Self::values_equal(cv, v))),
                    None => Ok(false),
                }
            }
            FilterExpr::NotIn { column, values } => {
                let column_value = Self::resolve_column(row, column);
                match column_value {
                    Some(cv) => Ok(!values.iter().any(|v| Self::values_equal(cv, v))),
                    None => Ok(true), // NULL is not in any set
                }
            }
            FilterExpr::IsNull { column } => {
                let column_value = Self::resolve_column(row, column);
                Ok(matches!(column_value, None | Some(Value::Null)))
            }
            FilterExpr::IsNotNull { column } => {
                let column_value = Self::resolve_column(row, column);
                Ok(!matches!(column_value, None | Some(Value::Null)))
            }
            FilterExpr::ColumnEq { left, right } => {
                let left_value = Self::resolve_column(row, left);
                let right_value = Self::resolve_column(row, right);
                match (left_value, right_value) {
                    (Some(a), Some(b)) => Ok(Self::values_equal(a, b)),
                    _ => Ok(false),
                }
            }
            FilterExpr::And(filters) => {
                for f in filters {
                    if !Self::evaluate(f, row)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            FilterExpr::Or(filters) => {
                for f in filters {
                    if Self::evaluate(f, row)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }

    /// Evaluate a query predicate against a row.
    ///
    /// Injected deletion-state predicates hold when the guarded column is
    /// null or absent from the row.
    pub fn evaluate_predicate(predicate: &Predicate, row: &[(String, Value)]) -> Result<bool, Error> {
        match predicate {
            Predicate::Expr(expr) => Self::evaluate(expr, row),
            Predicate::SoftDelete { table, column } => {
                let column = ColumnRef::new(table.as_str(), column.as_str());
                let column_value = Self::resolve_column(row, &column);
                Ok(matches!(column_value, None | Some(Value::Null)))
            }
        }
    }

    /// Evaluate all predicates, which must all hold.
    pub fn evaluate_predicates(
        predicates: &[Predicate],
        row: &[(String, Value)],
    ) -> Result<bool, Error> {
        for predicate in predicates {
            if !Self::evaluate_predicate(predicate, row)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Resolve a column reference against a row of qualified field values.
    ///
    /// Row fields are named `qualifier.column`. A qualified reference must
    /// match exactly. An unqualified reference matches a bare field name
    /// first, then the first field whose name ends in `.column`.
    pub fn resolve_column<'a>(
        row: &'a [(String, Value)],
        column: &ColumnRef,
    ) -> Option<&'a Value> {
        match &column.qualifier {
            Some(qualifier) => {
                let needle_len = qualifier.len() + 1 + column.column.len();
                row.iter()
                    .find(|(name, _)| {
                        name.len() == needle_len
                            && name.starts_with(qualifier.as_str())
                            && name.as_bytes()[qualifier.len()] == b'.'
                            && name.ends_with(column.column.as_str())
                    })
                    .map(|(_, v)| v)
            }
            None => row
                .iter()
                .find(|(name, _)| name == &column.column)
                .or_else(|| {
                    row.iter().find(|(name, _)| {
                        name.len() > column.column.len() + 1
                            && name.ends_with(column.column.as_str())
                            && name.as_bytes()[name.len() - column.column.len() - 1] == b'.'
                    })
                })
                .map(|(_, v)| v),
        }
    }

    /// Compare a column value with a comparator function.
    fn compare_column<F>(
        row: &[(String, Value)],
        column: &ColumnRef,
        value: &Value,
        comparator: F,
    ) -> Result<bool, Error>
    where
        F: FnOnce(&Value, &Value) -> bool,
    {
        let column_value = Self::resolve_column(row, column);
        match column_value {
            Some(cv) => Ok(comparator(cv, value)),
            None => Ok(false), // Missing column doesn't match
        }
    }

    /// Check if two values are equal.
    fn values_equal(a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int32(a), Value::Int32(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::Int32(a), Value::Int64(b)) => (*a as i64) == *b,
            (Value::Int64(a), Value::Int32(b)) => *a == (*b as i64),
            (Value::Float64(a), Value::Float64(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::Uuid(a), Value::Uuid(b)) => a == b,
            _ => false,
        }
    }

    /// Compare two values, returning their ordering if comparable.
    fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
        match (a, b) {
            (Value::Int32(a), Value::Int32(b)) => Some(a.cmp(b)),
            (Value::Int64(a), Value::Int64(b)) => Some(a.cmp(b)),
            (Value::Int32(a), Value::Int64(b)) => Some((*a as i64).cmp(b)),
            (Value::Int64(a), Value::Int32(b)) => Some(a.cmp(&(*b as i64))),
            (Value::Float64(a), Value::Float64(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            (Value::Bytes(a), Value::Bytes(b)) => Some(a.cmp(b)),
            (Value::Uuid(a), Value::Uuid(b)) => Some(a.cmp(b)),
            _ => None, // Incompatible types
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_row(fields: Vec<(&str, Value)>) -> Vec<(String, Value)> {
        fields
            .into_iter()
            .map(|(n, v)| (n.to_string(), v))
            .collect()
    }

    #[test]
    fn test_eq_filter() {
        let row = make_row(vec![
            ("users.name", Value::String("Alice".into())),
            ("users.age", Value::Int32(30)),
        ]);

        let filter = FilterExpr::eq("users.name", "Alice");
        assert!(FilterEvaluator::evaluate(&filter, &row).unwrap());

        let filter = FilterExpr::eq("users.name", "Bob");
        assert!(!FilterEvaluator::evaluate(&filter, &row).unwrap());
    }

    #[test]
    fn test_unqualified_column_resolution() {
        let row = make_row(vec![
            ("users.name", Value::String("Alice".into())),
            ("posts.title", Value::String("Hello".into())),
        ]);

        // Unqualified reference matches the qualified field by suffix.
        let filter = FilterExpr::eq("name", "Alice");
        assert!(FilterEvaluator::evaluate(&filter, &row).unwrap());

        let filter = FilterExpr::eq("title", "Hello");
        assert!(FilterEvaluator::evaluate(&filter, &row).unwrap());
    }

    #[test]
    fn test_qualifier_must_match_exactly() {
        let row = make_row(vec![("users.name", Value::String("Alice".into()))]);

        let filter = FilterExpr::eq("posts.name", "Alice");
        assert!(!FilterEvaluator::evaluate(&filter, &row).unwrap());
    }

    #[test]
    fn test_suffix_does_not_match_partial_names() {
        let row = make_row(vec![("users.surname", Value::String("Smith".into()))]);

        // "name" must not resolve against "surname".
        let filter = FilterExpr::eq("name", "Smith");
        assert!(!FilterEvaluator::evaluate(&filter, &row).unwrap());
    }

    #[test]
    fn test_comparison_filters() {
        let row = make_row(vec![("t.score", Value::Int32(75))]);

        assert!(FilterEvaluator::evaluate(&FilterExpr::gt("t.score", 50i32), &row).unwrap());
        assert!(!FilterEvaluator::evaluate(&FilterExpr::gt("t.score", 75i32), &row).unwrap());
        assert!(FilterEvaluator::evaluate(&FilterExpr::ge("t.score", 75i32), &row).unwrap());
        assert!(FilterEvaluator::evaluate(&FilterExpr::lt("t.score", 100i32), &row).unwrap());
        assert!(FilterEvaluator::evaluate(&FilterExpr::le("t.score", 75i32), &row).unwrap());
    }

    #[test]
    fn test_in_filters() {
        let row = make_row(vec![("t.status", Value::String("active".into()))]);

        let filter = FilterExpr::in_values(
            "t.status",
            vec![Value::from("active"), Value::from("pending")],
        );
        assert!(FilterEvaluator::evaluate(&filter, &row).unwrap());

        let filter = FilterExpr::not_in_values(
            "t.status",
            vec![Value::from("archived"), Value::from("pending")],
        );
        assert!(FilterEvaluator::evaluate(&filter, &row).unwrap());

        // Missing column: IN is false, NOT IN is true.
        let filter = FilterExpr::in_values("t.missing", vec![Value::from("x")]);
        assert!(!FilterEvaluator::evaluate(&filter, &row).unwrap());
        let filter = FilterExpr::not_in_values("t.missing", vec![Value::from("x")]);
        assert!(FilterEvaluator::evaluate(&filter, &row).unwrap());
    }

    #[test]
    fn test_is_null_filters() {
        let row_with_null = make_row(vec![("t.value", Value::Null)]);
        let row_with_value = make_row(vec![("t.value", Value::Int32(42))]);
        let row_missing = make_row(vec![("t.other", Value::Int32(1))]);

        let filter = FilterExpr::is_null("t.value");
        assert!(FilterEvaluator::evaluate(&filter, &row_with_null).unwrap());
        assert!(!FilterEvaluator::evaluate(&filter, &row_with_value).unwrap());
        assert!(FilterEvaluator::evaluate(&filter, &row_missing).unwrap());

        let filter = FilterExpr::is_not_null("t.value");
        assert!(!FilterEvaluator::evaluate(&filter, &row_with_null).unwrap());
        assert!(FilterEvaluator::evaluate(&filter, &row_with_value).unwrap());
        assert!(!FilterEvaluator::evaluate(&filter, &row_missing).unwrap());
    }

    #[test]
    fn test_column_eq() {
        let row = make_row(vec![
            ("users.id", Value::Uuid([1u8; 16])),
            ("posts.author_id", Value::Uuid([1u8; 16])),
            ("comments.author_id", Value::Uuid([2u8; 16])),
        ]);

        let filter = FilterExpr::column_eq("users.id", "posts.author_id");
        assert!(FilterEvaluator::evaluate(&filter, &row).unwrap());

        let filter = FilterExpr::column_eq("users.id", "comments.author_id");
        assert!(!FilterEvaluator::evaluate(&filter, &row).unwrap());

        // Missing side doesn't match.
        let filter = FilterExpr::column_eq("users.id", "tags.owner_id");
        assert!(!FilterEvaluator::evaluate(&filter, &row).unwrap());
    }

    #[test]
    fn test_and_or_nesting() {
        let row = make_row(vec![
            ("t.age", Value::Int32(25)),
            ("t.active", Value::Bool(true)),
        ]);

        let filter = FilterExpr::and(vec![
            FilterExpr::gt("t.age", 18i32),
            FilterExpr::or(vec![
                FilterExpr::eq("t.active", true),
                FilterExpr::eq("t.age", 99i32),
            ]),
        ]);
        assert!(FilterEvaluator::evaluate(&filter, &row).unwrap());

        let filter = FilterExpr::and(vec![
            FilterExpr::gt("t.age", 30i32),
            FilterExpr::eq("t.active", true),
        ]);
        assert!(!FilterEvaluator::evaluate(&filter, &row).unwrap());
    }

    #[test]
    fn test_empty_and_or() {
        let row = make_row(vec![("t.x", Value::Int32(1))]);

        assert!(FilterEvaluator::evaluate(&FilterExpr::And(vec![]), &row).unwrap());
        assert!(!FilterEvaluator::evaluate(&FilterExpr::Or(vec![]), &row).unwrap());
    }

    #[test]
    fn test_numeric_type_coercion() {
        let row = make_row(vec![("t.value", Value::Int64(100))]);

        assert!(FilterEvaluator::evaluate(&FilterExpr::eq("t.value", 100i32), &row).unwrap());
        assert!(FilterEvaluator::evaluate(&FilterExpr::gt("t.value", 50i32), &row).unwrap());
    }

    #[test]
    fn test_soft_delete_predicate() {
        let live = make_row(vec![
            ("users.name", Value::String("Alice".into())),
            ("users.deleted_at", Value::Null),
        ]);
        let deleted = make_row(vec![
            ("users.name", Value::String("Bob".into())),
            ("users.deleted_at", Value::Timestamp(1_700_000_000_000_000)),
        ]);
        let missing_column = make_row(vec![("users.name", Value::String("Carol".into()))]);

        let predicate = Predicate::SoftDelete {
            table: "users".to_string(),
            column: "deleted_at".to_string(),
        };

        assert!(FilterEvaluator::evaluate_predicate(&predicate, &live).unwrap());
        assert!(!FilterEvaluator::evaluate_predicate(&predicate, &deleted).unwrap());
        // Absent column means the row is visible.
        assert!(FilterEvaluator::evaluate_predicate(&predicate, &missing_column).unwrap());
    }

    #[test]
    fn test_evaluate_predicates_all_must_hold() {
        let row = make_row(vec![
            ("users.age", Value::Int32(30)),
            ("users.deleted_at", Value::Null),
        ]);

        let predicates = vec![
            Predicate::Expr(FilterExpr::gt("users.age", 18i32)),
            Predicate::SoftDelete {
                table: "users".to_string(),
                column: "deleted_at".to_string(),
            },
        ];
        assert!(FilterEvaluator::evaluate_predicates(&predicates, &row).unwrap());

        let predicates = vec![
            Predicate::Expr(FilterExpr::gt("users.age", 40i32)),
            Predicate::SoftDelete {
                table: "users".to_string(),
                column: "deleted_at".to_string(),
            },
        ];
        assert!(!FilterEvaluator::evaluate_predicates(&predicates, &row).unwrap());
    }
}
