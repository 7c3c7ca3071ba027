//! Fluent entity query surface.

use tracing::warn;

use fadedb_core::{
    ColumnRef, EntityDef, FilterExpr, OrderSpec, Predicate, Row, SelectQuery, SourceRef,
};

use crate::engine::Engine;
use crate::error::Error;
use crate::instance::Instance;

/// Fluent query builder rooted at one entity type.
///
/// Created by [`Session::query`](crate::Session::query). The builder
/// pre-applies the root entity's deletion filter when the entity is capable;
/// the execution-time rewriter injects the same predicate for plain table
/// scans built outside the builder, and tag deduplication keeps the two
/// from stacking.
///
/// An unknown root entity is tolerated until a terminal call, which
/// returns [`Error::UnknownEntity`].
pub struct QueryBuilder<'a> {
    engine: &'a Engine,
    entity: String,
    table: Option<String>,
    query: SelectQuery,
}

impl<'a> QueryBuilder<'a> {
    pub(crate) fn new(engine: &'a Engine, entity: impl Into<String>) -> Self {
        let entity = entity.into();
        match engine.catalog().get_entity(&entity) {
            Some(def) => {
                let mut query = SelectQuery::from_table(def.table.clone());
                if let Some(entry) = engine.registry().entry_for_entity(&entity) {
                    query = query.with_predicate(Predicate::SoftDelete {
                        table: entry.table.clone(),
                        column: entry.column.clone(),
                    });
                }
                Self {
                    engine,
                    entity,
                    table: Some(def.table),
                    query,
                }
            }
            None => {
                warn!(entity = %entity, "query built for unknown entity");
                Self {
                    engine,
                    entity,
                    table: None,
                    query: SelectQuery {
                        sources: Vec::new(),
                        predicates: Vec::new(),
                        order_by: Vec::new(),
                        limit: None,
                        offset: None,
                        include_deleted: false,
                    },
                }
            }
        }
    }

    /// Add a filter on the results.
    pub fn filter(mut self, expr: FilterExpr) -> Self {
        self.query = self.query.filter(expr);
        self
    }

    /// Join a related entity, resolving the relationship from the schema.
    ///
    /// The relationship may be declared in either direction. When the joined
    /// entity is soft-delete capable its deletion filter is added alongside
    /// the root's. An unknown entity or unresolvable relationship drops the
    /// join with a warning and the query still runs against the root alone.
    pub fn join(mut self, entity: &str) -> Self {
        let root_table = match &self.table {
            Some(table) => table.clone(),
            None => return self,
        };

        let joined = match self.engine.catalog().get_entity(entity) {
            Some(def) => def,
            None => {
                warn!(entity = %entity, "join target not in schema; join dropped");
                return self;
            }
        };

        let on = match self.resolve_join_condition(&root_table, &joined) {
            Some(on) => on,
            None => {
                warn!(
                    root = %self.entity,
                    joined = %joined.name,
                    "no relationship connects the entities; join dropped"
                );
                return self;
            }
        };

        self.attach_join(joined.table.clone(), on);
        self.tag_joined_table(&joined.table);
        self
    }

    /// Join a related entity with an explicit join condition.
    pub fn join_on(
        mut self,
        entity: &str,
        left: impl Into<ColumnRef>,
        right: impl Into<ColumnRef>,
    ) -> Self {
        if self.table.is_none() {
            return self;
        }

        let joined = match self.engine.catalog().get_entity(entity) {
            Some(def) => def,
            None => {
                warn!(entity = %entity, "join target not in schema; join dropped");
                return self;
            }
        };

        let on = FilterExpr::column_eq(left, right);
        self.attach_join(joined.table.clone(), on);
        self.tag_joined_table(&joined.table);
        self
    }

    /// Include soft-deleted rows in the results.
    ///
    /// Strips every injected deletion filter currently on the query and
    /// marks it so execution-time interception leaves it alone. Caller
    /// filters are kept, even ones structurally resembling a deletion
    /// filter. Calling this twice is the same as calling it once, and it
    /// is a no-op for entities that are not capable.
    pub fn with_deleted_at(mut self) -> Self {
        self.query.strip_soft_delete_tags();
        self.query.include_deleted = true;
        self
    }

    /// Order results by a column, ascending.
    pub fn order_by(mut self, column: impl Into<ColumnRef>) -> Self {
        self.query = self.query.with_order(OrderSpec::asc(column));
        self
    }

    /// Order results by a column, descending.
    pub fn order_by_desc(mut self, column: impl Into<ColumnRef>) -> Self {
        self.query = self.query.with_order(OrderSpec::desc(column));
        self
    }

    /// Limit the number of results.
    pub fn limit(mut self, limit: usize) -> Self {
        self.query.limit = Some(limit);
        self
    }

    /// Skip the first rows of the result.
    pub fn offset(mut self, offset: usize) -> Self {
        self.query.offset = Some(offset);
        self
    }

    /// Build the underlying select query without executing it.
    pub fn build(self) -> Result<SelectQuery, Error> {
        match self.table {
            Some(_) => Ok(self.query),
            None => Err(Error::UnknownEntity(self.entity)),
        }
    }

    /// Execute and return all matching instances of the root entity.
    ///
    /// On joined queries the root instance repeats once per combined row.
    pub fn all(self) -> Result<Vec<Instance>, Error> {
        let table = match &self.table {
            Some(table) => table.clone(),
            None => return Err(Error::UnknownEntity(self.entity)),
        };

        let entity = self.entity;
        let rows = self.engine.execute(self.query)?;
        Ok(Self::materialize(&entity, &table, rows))
    }

    /// Execute and return the first matching instance.
    pub fn first(mut self) -> Result<Option<Instance>, Error> {
        self.query.limit = Some(1);
        Ok(self.all()?.into_iter().next())
    }

    /// Execute and return the number of matching rows.
    pub fn count(self) -> Result<usize, Error> {
        if self.table.is_none() {
            return Err(Error::UnknownEntity(self.entity));
        }

        let rows = self.engine.execute(self.query)?;
        Ok(rows.len())
    }

    /// Resolve the join condition between the root and a joined entity.
    fn resolve_join_condition(&self, root_table: &str, joined: &EntityDef) -> Option<FilterExpr> {
        for relation in self.engine.catalog().relations_of(&self.entity) {
            if relation.target == joined.name {
                return Some(FilterExpr::column_eq(
                    ColumnRef::new(root_table, relation.owner_field),
                    ColumnRef::new(joined.table.clone(), relation.target_field),
                ));
            }
        }

        for relation in self.engine.catalog().relations_of(&joined.name) {
            if relation.target == self.entity {
                return Some(FilterExpr::column_eq(
                    ColumnRef::new(joined.table.clone(), relation.owner_field),
                    ColumnRef::new(root_table, relation.target_field),
                ));
            }
        }

        None
    }

    /// Wrap the current source and a new table into a join composite.
    fn attach_join(&mut self, right_table: String, on: FilterExpr) {
        if let Some(left) = self.query.sources.pop() {
            self.query
                .sources
                .push(SourceRef::join(left, SourceRef::table(right_table), on));
        }
    }

    /// Add the deletion filter for a joined capable table.
    fn tag_joined_table(&mut self, table: &str) {
        if self.query.include_deleted {
            return;
        }
        if self.query.has_soft_delete_tag(table) {
            return;
        }
        if let Some(entry) = self.engine.registry().entry_for_table(table) {
            self.query.predicates.push(Predicate::SoftDelete {
                table: entry.table.clone(),
                column: entry.column.clone(),
            });
        }
    }

    /// Turn result rows into instances of the root entity.
    fn materialize(entity: &str, table: &str, rows: Vec<Row>) -> Vec<Instance> {
        let prefix = format!("{}.", table);
        rows.into_iter()
            .map(|row| {
                let fields = row
                    .into_iter()
                    .filter_map(|(name, value)| {
                        name.strip_prefix(&prefix)
                            .map(|column| (column.to_string(), value))
                    })
                    .collect();
                Instance::from_fields(entity, fields)
            })
            .collect()
    }
}
