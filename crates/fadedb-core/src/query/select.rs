//! Select query IR.
//!
//! A [`SelectQuery`] is built by callers (directly or through higher-level
//! builders), rewritten by the execution pipeline, and then executed. The IR
//! keeps rewriter-injected deletion predicates distinct from caller filters
//! so they can be recognized and stripped without inspecting expression
//! shapes.

use super::expr::{ColumnRef, FilterExpr};

/// A row source in a select query.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceRef {
    /// A plain table reference.
    Table {
        /// Table name.
        table: String,
    },
    /// A table referenced under an alias.
    TableAlias {
        /// Table name.
        table: String,
        /// Alias the table's columns are qualified with.
        alias: String,
    },
    /// A join of two sources.
    Join {
        /// Left input.
        left: Box<SourceRef>,
        /// Right input.
        right: Box<SourceRef>,
        /// Join condition evaluated against the combined row.
        on: FilterExpr,
    },
    /// A derived source (subquery) referenced under an alias.
    Derived {
        /// The inner query.
        query: Box<SelectQuery>,
        /// Alias the derived columns are qualified with.
        alias: String,
    },
}

impl SourceRef {
    /// Create a plain table source.
    pub fn table(table: impl Into<String>) -> Self {
        SourceRef::Table {
            table: table.into(),
        }
    }

    /// Create an aliased table source.
    pub fn table_alias(table: impl Into<String>, alias: impl Into<String>) -> Self {
        SourceRef::TableAlias {
            table: table.into(),
            alias: alias.into(),
        }
    }

    /// Create a join source.
    pub fn join(left: SourceRef, right: SourceRef, on: FilterExpr) -> Self {
        SourceRef::Join {
            left: Box::new(left),
            right: Box::new(right),
            on,
        }
    }

    /// Create a derived (subquery) source.
    pub fn derived(query: SelectQuery, alias: impl Into<String>) -> Self {
        SourceRef::Derived {
            query: Box::new(query),
            alias: alias.into(),
        }
    }

    /// Get the table name if this is a plain table source.
    pub fn plain_table(&self) -> Option<&str> {
        match self {
            SourceRef::Table { table } => Some(table),
            _ => None,
        }
    }
}

/// A predicate attached to a select query.
///
/// Caller filters are `Expr`. Deletion-state predicates injected by the
/// execution pipeline are `SoftDelete`, carrying the table and column they
/// guard so they can be deduplicated and stripped by provenance.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// A caller-supplied filter expression.
    Expr(FilterExpr),
    /// An injected deletion-state predicate: `table.column IS NULL`.
    SoftDelete {
        /// Table the predicate guards.
        table: String,
        /// Deletion timestamp column.
        column: String,
    },
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

/// Order specification for sorting results.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSpec {
    /// Column to order by.
    pub column: ColumnRef,
    /// Sort direction.
    pub direction: OrderDirection,
}

impl OrderSpec {
    /// Create an ascending order spec.
    pub fn asc(column: impl Into<ColumnRef>) -> Self {
        Self {
            column: column.into(),
            direction: OrderDirection::Asc,
        }
    }

    /// Create a descending order spec.
    pub fn desc(column: impl Into<ColumnRef>) -> Self {
        Self {
            column: column.into(),
            direction: OrderDirection::Desc,
        }
    }
}

/// A select query over one source.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    /// Row sources. Execution requires exactly one; joins nest inside it.
    pub sources: Vec<SourceRef>,
    /// Predicates, all of which must hold.
    pub predicates: Vec<Predicate>,
    /// Ordering specification.
    pub order_by: Vec<OrderSpec>,
    /// Maximum number of rows to return.
    pub limit: Option<usize>,
    /// Number of rows to skip.
    pub offset: Option<usize>,
    /// When set, the pipeline leaves deleted rows visible.
    pub include_deleted: bool,
}

impl SelectQuery {
    /// Create a query over a plain table.
    pub fn from_table(table: impl Into<String>) -> Self {
        Self::from_source(SourceRef::table(table))
    }

    /// Create a query over an arbitrary source.
    pub fn from_source(source: SourceRef) -> Self {
        Self {
            sources: vec![source],
            predicates: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
            include_deleted: false,
        }
    }

    /// Add a caller filter.
    pub fn filter(mut self, expr: FilterExpr) -> Self {
        self.predicates.push(Predicate::Expr(expr));
        self
    }

    /// Add a raw predicate.
    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Add an order spec.
    pub fn with_order(mut self, order: OrderSpec) -> Self {
        self.order_by.push(order);
        self
    }

    /// Set the row limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the row offset.
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Mark the query as including deleted rows.
    pub fn including_deleted(mut self) -> Self {
        self.include_deleted = true;
        self
    }

    /// Check whether a deletion-state predicate for a table is present.
    pub fn has_soft_delete_tag(&self, table: &str) -> bool {
        self.predicates
            .iter()
            .any(|p| matches!(p, Predicate::SoftDelete { table: t, .. } if t == table))
    }

    /// Remove all injected deletion-state predicates, keeping caller filters.
    pub fn strip_soft_delete_tags(&mut self) {
        self.predicates
            .retain(|p| matches!(p, Predicate::Expr(_)));
    }
}
