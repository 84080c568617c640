//! Cache manager implementation
//!
//! This module provides the main CacheManager struct: an in-process
//! query cache where every entry carries its own time-to-live.

use crate::errors::CacheError;
use config::CacheConfig;
use moka::Expiry;
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::fmt::Debug;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Clone)]
struct CachedEntry {
    json: Arc<str>,
    ttl: Duration,
}

/// Expiry policy reading the TTL stored alongside each entry
struct EntryTtl;

impl Expiry<String, CachedEntry> for EntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// TTL cache manager.
///
/// Entries are invalidated by time only, so reads may trail writes by up
/// to the entry TTL.
#[derive(Clone)]
pub struct CacheManager {
    cache: Cache<String, CachedEntry>,
    config: Arc<CacheConfig>,
}

impl Debug for CacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheManager")
            .field("config", &self.config)
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

impl CacheManager {
    /// Create a new cache manager
    pub fn new(config: CacheConfig) -> Result<Self, CacheError> {
        if !config.enabled {
            return Err(CacheError::Disabled);
        }
        if config.default_ttl == 0 {
            return Err(CacheError::InvalidTtl(config.default_ttl));
        }

        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(EntryTtl)
            .build();

        debug!(
            max_capacity = config.max_capacity,
            default_ttl = config.default_ttl,
            "cache manager created"
        );

        Ok(Self {
            cache,
            config: Arc::new(config),
        })
    }

    /// Generate cache key for query results
    fn build_query_key(&self, prefix: &str, table_name: &str, query_hash: &str) -> String {
        format!("{}:{}:query:{}", prefix, table_name, query_hash)
    }

    /// Generate hash for query parameters
    pub fn hash_query<T: Hash + ?Sized>(&self, query: &T) -> String {
        let mut hasher = DefaultHasher::new();
        query.hash(&mut hasher);
        format!("{:x}", hasher.finish())
    }

    async fn get_json<T>(&self, cache_key: &str) -> Result<Option<T>, CacheError>
    where
        T: for<'de> Deserialize<'de>,
    {
        match self.cache.get(cache_key).await {
            Some(entry) => {
                debug!(key = cache_key, "cache hit");
                Ok(Some(serde_json::from_str(&entry.json)?))
            }
            None => {
                debug!(key = cache_key, "cache miss");
                Ok(None)
            }
        }
    }

    async fn set_json<T>(&self, cache_key: String, value: &T, ttl: u64) -> Result<(), CacheError>
    where
        T: Serialize + ?Sized,
    {
        if ttl == 0 {
            return Err(CacheError::InvalidTtl(ttl));
        }

        let json = serde_json::to_string(value)?;
        self.cache
            .insert(
                cache_key,
                CachedEntry {
                    json: Arc::from(json),
                    ttl: Duration::from_secs(ttl),
                },
            )
            .await;
        Ok(())
    }

    /// Get query results from cache
    pub async fn get_query<T>(
        &self,
        prefix: &str,
        table_name: &str,
        query_hash: &str,
    ) -> Result<Option<Vec<T>>, CacheError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let cache_key = self.build_query_key(prefix, table_name, query_hash);
        self.get_json(&cache_key).await
    }

    /// Set query results in cache with custom TTL
    pub async fn set_query_with_ttl<T>(
        &self,
        prefix: &str,
        table_name: &str,
        query_hash: &str,
        results: &[T],
        ttl: u64,
    ) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let cache_key = self.build_query_key(prefix, table_name, query_hash);
        self.set_json(cache_key, results, ttl).await
    }

    /// Get current configuration
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Row {
        id: i64,
        email: String,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { id: 2, email: "b@example.com".to_string() },
            Row { id: 1, email: "a@example.com".to_string() },
        ]
    }

    fn manager() -> CacheManager {
        CacheManager::new(CacheConfig::new(60, 100)).unwrap()
    }

    #[tokio::test]
    async fn query_round_trip() {
        let cache = manager();
        let hash = cache.hash_query("status=pending");

        assert_eq!(cache.get_query::<Row>("subscribers", "t", &hash).await.unwrap(), None);

        cache
            .set_query_with_ttl("subscribers", "t", &hash, &rows(), 60)
            .await
            .unwrap();
        assert_eq!(
            cache.get_query::<Row>("subscribers", "t", &hash).await.unwrap(),
            Some(rows())
        );
    }

    #[tokio::test]
    async fn entries_expire_after_their_ttl() {
        let cache = manager();
        cache
            .set_query_with_ttl("subscribers", "t", "h", &rows(), 1)
            .await
            .unwrap();
        assert!(cache.get_query::<Row>("subscribers", "t", "h").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(1300)).await;

        assert_eq!(cache.get_query::<Row>("subscribers", "t", "h").await.unwrap(), None);
    }

    #[tokio::test]
    async fn keys_are_scoped_by_prefix_and_table() {
        let cache = manager();
        cache
            .set_query_with_ttl("subscribers", "t", "h", &rows(), 60)
            .await
            .unwrap();

        assert_eq!(cache.get_query::<Row>("subscribers", "other", "h").await.unwrap(), None);
        assert_eq!(cache.get_query::<Row>("meta", "t", "h").await.unwrap(), None);
        assert!(cache.get_query::<Row>("subscribers", "t", "h").await.unwrap().is_some());
    }

    #[test]
    fn rejects_disabled_and_zero_ttl_configs() {
        assert!(matches!(
            CacheManager::new(CacheConfig::disabled()),
            Err(CacheError::Disabled)
        ));
        assert!(matches!(
            CacheManager::new(CacheConfig::new(0, 10)),
            Err(CacheError::InvalidTtl(0))
        ));
    }

    #[tokio::test]
    async fn zero_ttl_writes_are_rejected() {
        let cache = manager();
        assert!(matches!(
            cache.set_query_with_ttl("p", "t", "h", &rows(), 0).await,
            Err(CacheError::InvalidTtl(0))
        ));
    }

    #[test]
    fn query_hash_is_stable() {
        let cache = manager();
        assert_eq!(cache.hash_query("a=1"), cache.hash_query("a=1"));
        assert_ne!(cache.hash_query("a=1"), cache.hash_query("a=2"));
    }
}
