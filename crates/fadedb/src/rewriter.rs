//! Read-path deletion filtering.

use std::sync::Arc;

use fadedb_core::{Predicate, ReadInterceptor, SelectQuery};
use tracing::debug;

use crate::registry::SoftDeleteRegistry;

/// Interceptor that hides soft-deleted rows from reads.
///
/// For every plain table source whose table is registered as soft-delete
/// capable, the rewriter appends a tagged deletion-state predicate unless
/// one is already present. Aliased tables, join composites, and derived
/// subqueries are left alone; only direct table references are filtered.
/// Queries marked `include_deleted` pass through unchanged.
///
/// Rewriting is total: no query shape makes it fail.
pub struct SoftDeleteRewriter {
    registry: Arc<SoftDeleteRegistry>,
}

impl SoftDeleteRewriter {
    /// Create a rewriter over a capability registry.
    pub fn new(registry: Arc<SoftDeleteRegistry>) -> Self {
        Self { registry }
    }
}

impl ReadInterceptor for SoftDeleteRewriter {
    fn name(&self) -> &str {
        "soft_delete"
    }

    fn rewrite(&self, query: &mut SelectQuery) {
        if query.include_deleted {
            return;
        }

        // Collect before pushing: appending while iterating the sources
        // would hold two borrows of the query.
        let mut pending: Vec<Predicate> = Vec::new();
        for source in &query.sources {
            let table = match source.plain_table() {
                Some(table) => table,
                None => continue,
            };
            let entry = match self.registry.entry_for_table(table) {
                Some(entry) => entry,
                None => continue,
            };
            if query.has_soft_delete_tag(table) {
                continue;
            }
            if pending
                .iter()
                .any(|p| matches!(p, Predicate::SoftDelete { table: t, .. } if t == table))
            {
                continue;
            }

            debug!(table = %table, column = %entry.column, "injecting deletion filter");
            pending.push(Predicate::SoftDelete {
                table: table.to_string(),
                column: entry.column.clone(),
            });
        }

        query.predicates.extend(pending);
    }
}
