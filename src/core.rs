//! Core listhaus functionality
//!
//! This module contains the main [`ListHaus`] struct, which owns the
//! connection pool, the signal bus and the query cache, and hands them to
//! the stores it builds.

use cache_system::{CacheManager, CacheParams};
use config::AppConfig;
use signal_system::SignalManager;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::ListHausError;
use crate::subscribers::{AddressResolver, SqlMetaStore, SubscriberStore};

/// Cache prefix for subscriber listings
pub const SUBSCRIBER_CACHE_PREFIX: &str = "subscribers";

/// Main listhaus coordinator
pub struct ListHaus {
    pool: SqlitePool,
    config: AppConfig,
    signals: Arc<SignalManager>,
    cache: Option<Arc<CacheManager>>,
}

impl std::fmt::Debug for ListHaus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListHaus")
            .field("url", &self.config.database.url)
            .field("table_prefix", &self.config.database.table_prefix)
            .field("signals", &self.signals)
            .field("cache", &self.cache.is_some())
            .finish()
    }
}

impl ListHaus {
    /// Connect to the configured database and set up signals and caching
    pub async fn new(config: AppConfig) -> Result<Self, ListHausError> {
        config.validate()?;
        let database = &config.database;

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(database.max_connections)
            .min_connections(database.min_connections)
            .acquire_timeout(Duration::from_secs(database.connection_timeout_seconds));

        if database.is_in_memory() {
            // Each connection to `:memory:` is its own database
            pool_options = pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        } else {
            if database.idle_timeout_seconds > 0 {
                pool_options =
                    pool_options.idle_timeout(Duration::from_secs(database.idle_timeout_seconds));
            }
            if database.max_lifetime_seconds > 0 {
                pool_options =
                    pool_options.max_lifetime(Duration::from_secs(database.max_lifetime_seconds));
            }
        }

        let connect_options =
            SqliteConnectOptions::from_str(database.connection_string())?.create_if_missing(true);
        let pool = pool_options.connect_with(connect_options).await?;

        let signals = Arc::new(SignalManager::with_config(&config.signal));
        let cache = if config.cache.enabled {
            Some(Arc::new(CacheManager::new(config.cache.clone())?))
        } else {
            None
        };

        debug_log!(
            url = database.url.as_str(),
            cache = cache.is_some(),
            "listhaus connected"
        );

        Ok(Self {
            pool,
            config,
            signals,
            cache,
        })
    }

    /// Private in-memory installation with default settings
    pub async fn in_memory() -> Result<Self, ListHausError> {
        Self::new(AppConfig::in_memory()).await
    }

    /// Get database pool reference
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn table_prefix(&self) -> &str {
        &self.config.database.table_prefix
    }

    /// Shared signal bus; register listeners here
    pub fn signals(&self) -> &Arc<SignalManager> {
        &self.signals
    }

    pub fn cache(&self) -> Option<&Arc<CacheManager>> {
        self.cache.as_ref()
    }

    /// Subscriber store wired to this installation's pool, signals and cache
    pub fn subscriber_store(
        &self,
        resolver: Arc<dyn AddressResolver>,
    ) -> Result<SubscriberStore, ListHausError> {
        let cache_params = self.cache.as_ref().map(|cache| {
            CacheParams::new(
                Arc::clone(cache),
                self.config.cache.default_ttl,
                SUBSCRIBER_CACHE_PREFIX,
            )
        });

        SubscriberStore::new(
            self.pool.clone(),
            self.table_prefix(),
            resolver,
            Some(Arc::clone(&self.signals)),
            cache_params,
        )
    }

    /// Subscriber meta store; meta reads are never cached
    pub fn meta_store(&self) -> Result<SqlMetaStore, ListHausError> {
        SqlMetaStore::new(
            self.pool.clone(),
            self.table_prefix(),
            Some(Arc::clone(&self.signals)),
        )
    }

    /// Check database connection health
    pub async fn health_check(&self) -> Result<(), ListHausError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
