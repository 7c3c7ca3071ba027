//! Engine wiring for the mapping layer.

use std::sync::Arc;

use tracing::info;

use fadedb_core::{
    Catalog, ExecutionPipeline, QueryExecutor, ReadInterceptor, Row, Schema, SelectQuery,
    StorageConfig, StorageEngine,
};

use crate::error::Error;
use crate::registry::SoftDeleteRegistry;
use crate::rewriter::SoftDeleteRewriter;
use crate::session::Session;

/// Meta key the applied schema is persisted under.
const SCHEMA_META_KEY: &[u8] = b"schema";

/// Builder for an [`Engine`].
///
/// The interception pipeline is assembled here, at construction time. The
/// deletion-filter rewriter is always registered first; additional
/// interceptors run after it in registration order. An opened engine's
/// pipeline is fixed.
pub struct EngineBuilder {
    config: StorageConfig,
    schema: Schema,
    interceptors: Vec<Arc<dyn ReadInterceptor>>,
}

impl EngineBuilder {
    /// Create a builder for a storage config and schema.
    pub fn new(config: StorageConfig, schema: Schema) -> Self {
        Self {
            config,
            schema,
            interceptors: Vec::new(),
        }
    }

    /// Register an additional read interceptor.
    pub fn register_interceptor(mut self, interceptor: Arc<dyn ReadInterceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Open the engine.
    pub fn open(self) -> Result<Engine, Error> {
        let storage = Arc::new(StorageEngine::open(self.config)?);

        let catalog = Arc::new(Catalog::new());
        catalog.apply_schema(self.schema.clone());

        let registry = Arc::new(SoftDeleteRegistry::from_schema(&self.schema));

        let mut pipeline = ExecutionPipeline::new();
        pipeline.register(Arc::new(SoftDeleteRewriter::new(registry.clone())));
        for interceptor in self.interceptors {
            pipeline.register(interceptor);
        }

        storage.put_meta(SCHEMA_META_KEY, &self.schema.to_json()?)?;

        info!(
            entities = self.schema.entities.len(),
            soft_deletable = registry.len(),
            "engine opened"
        );

        Ok(Engine {
            storage,
            catalog,
            registry,
            pipeline: Arc::new(pipeline),
        })
    }
}

/// The FadeDB mapping engine.
///
/// Owns the storage engine, the mapping catalog, the soft delete registry,
/// and the read interception pipeline. Sessions borrow the engine.
pub struct Engine {
    storage: Arc<StorageEngine>,
    catalog: Arc<Catalog>,
    registry: Arc<SoftDeleteRegistry>,
    pipeline: Arc<ExecutionPipeline>,
}

impl Engine {
    /// Open an engine with the default pipeline.
    pub fn open(config: StorageConfig, schema: Schema) -> Result<Self, Error> {
        EngineBuilder::new(config, schema).open()
    }

    /// Create a builder to customize the pipeline before opening.
    pub fn builder(config: StorageConfig, schema: Schema) -> EngineBuilder {
        EngineBuilder::new(config, schema)
    }

    /// Start a new session.
    pub fn session(&self) -> Session<'_> {
        Session::new(self)
    }

    /// Execute a select query through the interception pipeline.
    ///
    /// Every query executed through the engine passes the pipeline,
    /// regardless of which API built it.
    pub fn execute(&self, mut query: SelectQuery) -> Result<Vec<Row>, Error> {
        self.pipeline.apply(&mut query);
        let executor = QueryExecutor::new(&self.storage, &self.catalog);
        Ok(executor.execute(&query)?)
    }

    /// Get a reference to the storage engine.
    pub fn storage(&self) -> &StorageEngine {
        &self.storage
    }

    /// Get a reference to the mapping catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Get a reference to the soft delete registry.
    pub fn registry(&self) -> &SoftDeleteRegistry {
        &self.registry
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> Result<(), Error> {
        self.storage.flush()?;
        Ok(())
    }
}
