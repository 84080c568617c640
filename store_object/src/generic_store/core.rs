use crate::schema::TableSchema;
use crate::DbPool;
use cache_system::{CacheManager, CacheParams};
use signal_system::{DatabaseEvent, SignalManager};
use std::sync::Arc;

/// Generic database store over one table described by `S`
pub struct GenericStore<S: TableSchema> {
    pub(crate) db_pool: DbPool,
    pub(crate) schema: Arc<S>,
    pub(crate) signal_manager: Option<Arc<SignalManager>>,
    pub(crate) cache_manager: Option<Arc<CacheManager>>,
    pub(crate) cache_ttl: Option<u64>,       // Custom TTL for this store
    pub(crate) cache_prefix: Option<String>, // Custom prefix for cache keys
}

impl<S: TableSchema> Clone for GenericStore<S> {
    fn clone(&self) -> Self {
        Self {
            db_pool: self.db_pool.clone(),
            schema: Arc::clone(&self.schema),
            signal_manager: self.signal_manager.clone(),
            cache_manager: self.cache_manager.clone(),
            cache_ttl: self.cache_ttl,
            cache_prefix: self.cache_prefix.clone(),
        }
    }
}

impl<S: TableSchema> std::fmt::Debug for GenericStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenericStore")
            .field("table", &self.schema.table_name())
            .field("has_signals", &self.has_signals())
            .field("has_cache", &self.has_cache())
            .field("cache_ttl", &self.cache_ttl)
            .field("cache_prefix", &self.cache_prefix)
            .finish()
    }
}

impl<S: TableSchema> GenericStore<S> {
    pub fn new(
        db_pool: DbPool,
        schema: S,
        signal_manager: Option<Arc<SignalManager>>,
        cache_params: Option<CacheParams>,
    ) -> Self {
        let mut store = Self {
            db_pool,
            schema: Arc::new(schema),
            signal_manager,
            cache_manager: None,
            cache_ttl: None,
            cache_prefix: None,
        };
        if let Some(params) = cache_params {
            store.set_cache(params);
        }
        store
    }

    pub fn schema(&self) -> &S {
        &self.schema
    }

    pub fn pool(&self) -> &DbPool {
        &self.db_pool
    }

    pub fn table_name(&self) -> &str {
        self.schema.table_name()
    }

    /// Check if signal manager is set
    pub fn has_signals(&self) -> bool {
        self.signal_manager.is_some()
    }

    /// Route cached reads through `params.manager`
    pub fn set_cache(&mut self, params: CacheParams) {
        self.cache_manager = Some(params.manager);
        self.cache_ttl = Some(params.ttl);
        self.cache_prefix = Some(params.prefix);
    }

    /// Check if cache manager is set
    pub fn has_cache(&self) -> bool {
        self.cache_manager.is_some()
    }

    /// Get effective cache TTL (custom or from cache manager config)
    pub(crate) fn get_cache_ttl(&self) -> u64 {
        self.cache_ttl
            .or_else(|| self.cache_manager.as_ref().map(|cm| cm.config().default_ttl))
            .unwrap_or(3600)
    }

    /// Get effective cache prefix (custom or table name)
    pub(crate) fn get_cache_prefix(&self) -> &str {
        self.cache_prefix
            .as_deref()
            .unwrap_or_else(|| self.schema.table_name())
    }

    /// Deliver `event` to the registered listeners, if any
    pub fn emit_signal(&self, event: DatabaseEvent) {
        if let Some(signal_manager) = &self.signal_manager {
            signal_manager.emit(event);
        }
    }
}
