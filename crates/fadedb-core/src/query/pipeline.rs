//! Read interception pipeline.
//!
//! Interceptors rewrite queries before execution. They are registered
//! explicitly when the pipeline is constructed; there is no ambient or
//! per-call hook registration. Rewrites must not fail: an interceptor that
//! cannot apply leaves the query unchanged.

use std::sync::Arc;

use tracing::debug;

use super::select::SelectQuery;

/// A query rewriter applied before execution.
pub trait ReadInterceptor: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Rewrite the query in place.
    fn rewrite(&self, query: &mut SelectQuery);
}

/// An ordered set of read interceptors.
#[derive(Clone, Default)]
pub struct ExecutionPipeline {
    interceptors: Vec<Arc<dyn ReadInterceptor>>,
}

impl ExecutionPipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self {
            interceptors: Vec::new(),
        }
    }

    /// Register an interceptor. Interceptors run in registration order.
    pub fn register(&mut self, interceptor: Arc<dyn ReadInterceptor>) {
        self.interceptors.push(interceptor);
    }

    /// Get the number of registered interceptors.
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    /// Check whether the pipeline has no interceptors.
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Apply all interceptors to a query in order.
    pub fn apply(&self, query: &mut SelectQuery) {
        for interceptor in &self.interceptors {
            debug!(interceptor = interceptor.name(), "rewriting query");
            interceptor.rewrite(query);
        }
    }
}
