//! Filter expressions over query rows.

use crate::value::Value;
use std::fmt;

/// A reference to a column, optionally qualified by a table or alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    /// Table name or alias the column belongs to, if qualified.
    pub qualifier: Option<String>,
    /// Column name.
    pub column: String,
}

impl ColumnRef {
    /// Create a qualified column reference.
    pub fn new(qualifier: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            qualifier: Some(qualifier.into()),
            column: column.into(),
        }
    }

    /// Create an unqualified column reference.
    pub fn plain(column: impl Into<String>) -> Self {
        Self {
            qualifier: None,
            column: column.into(),
        }
    }
}

impl From<&str> for ColumnRef {
    /// Parse a column reference, splitting on the first dot.
    ///
    /// `"users.name"` becomes a qualified reference, `"name"` an
    /// unqualified one.
    fn from(s: &str) -> Self {
        match s.split_once('.') {
            Some((qualifier, column)) => ColumnRef::new(qualifier, column),
            None => ColumnRef::plain(s),
        }
    }
}

impl From<String> for ColumnRef {
    fn from(s: String) -> Self {
        ColumnRef::from(s.as_str())
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(qualifier) => write!(f, "{}.{}", qualifier, self.column),
            None => write!(f, "{}", self.column),
        }
    }
}

/// Filter expression for querying rows.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    /// Column equals value.
    Eq { column: ColumnRef, value: Value },
    /// Column not equals value.
    Ne { column: ColumnRef, value: Value },
    /// Column less than value.
    Lt { column: ColumnRef, value: Value },
    /// Column less than or equal to value.
    Le { column: ColumnRef, value: Value },
    /// Column greater than value.
    Gt { column: ColumnRef, value: Value },
    /// Column greater than or equal to value.
    Ge { column: ColumnRef, value: Value },
    /// Column is in a set of values.
    In {
        column: ColumnRef,
        values: Vec<Value>,
    },
    /// Column is not in a set of values.
    NotIn {
        column: ColumnRef,
        values: Vec<Value>,
    },
    /// Column is null.
    IsNull { column: ColumnRef },
    /// Column is not null.
    IsNotNull { column: ColumnRef },
    /// Two columns are equal (join conditions).
    ColumnEq { left: ColumnRef, right: ColumnRef },
    /// All conditions must be true.
    And(Vec<FilterExpr>),
    /// At least one condition must be true.
    Or(Vec<FilterExpr>),
}

impl FilterExpr {
    /// Create an equality filter.
    pub fn eq(column: impl Into<ColumnRef>, value: impl Into<Value>) -> Self {
        FilterExpr::Eq {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Create a not-equal filter.
    pub fn ne(column: impl Into<ColumnRef>, value: impl Into<Value>) -> Self {
        FilterExpr::Ne {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Create a less-than filter.
    pub fn lt(column: impl Into<ColumnRef>, value: impl Into<Value>) -> Self {
        FilterExpr::Lt {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Create a less-than-or-equal filter.
    pub fn le(column: impl Into<ColumnRef>, value: impl Into<Value>) -> Self {
        FilterExpr::Le {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Create a greater-than filter.
    pub fn gt(column: impl Into<ColumnRef>, value: impl Into<Value>) -> Self {
        FilterExpr::Gt {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Create a greater-than-or-equal filter.
    pub fn ge(column: impl Into<ColumnRef>, value: impl Into<Value>) -> Self {
        FilterExpr::Ge {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Create an IN filter.
    pub fn in_values(column: impl Into<ColumnRef>, values: Vec<Value>) -> Self {
        FilterExpr::In {
            column: column.into(),
            values,
        }
    }

    /// Create a NOT IN filter.
    pub fn not_in_values(column: impl Into<ColumnRef>, values: Vec<Value>) -> Self {
        FilterExpr::NotIn {
            column: column.into(),
            values,
        }
    }

    /// Create an IS NULL filter.
    pub fn is_null(column: impl Into<ColumnRef>) -> Self {
        FilterExpr::IsNull {
            column: column.into(),
        }
    }

    /// Create an IS NOT NULL filter.
    pub fn is_not_null(column: impl Into<ColumnRef>) -> Self {
        FilterExpr::IsNotNull {
            column: column.into(),
        }
    }

    /// Create a column equality filter.
    pub fn column_eq(left: impl Into<ColumnRef>, right: impl Into<ColumnRef>) -> Self {
        FilterExpr::ColumnEq {
            left: left.into(),
            right: right.into(),
        }
    }

    /// Create an AND filter combining multiple expressions.
    pub fn and(exprs: Vec<FilterExpr>) -> Self {
        FilterExpr::And(exprs)
    }

    /// Create an OR filter combining multiple expressions.
    pub fn or(exprs: Vec<FilterExpr>) -> Self {
        FilterExpr::Or(exprs)
    }
}
