//! Query-builder reads, optionally served from the TTL cache

use super::core::GenericStore;
use crate::errors::StoreError;
use crate::query_builder::QueryBuilder;
use crate::schema::TableSchema;
use crate::validation::ValidationError;
use serde::Serialize;
use tracing::debug;

impl<S: TableSchema> GenericStore<S> {
    /// Every field a query references must be a column of this table
    fn validate_query(&self, query: &QueryBuilder) -> Result<(), StoreError> {
        for field in query.fields() {
            if self.schema.column(field).is_none() {
                return Err(ValidationError::UnknownColumn {
                    table: self.schema.table_name().to_string(),
                    column: field.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }

    fn select_sql(&self, query: &QueryBuilder, projection: &str) -> (String, Vec<type_mapping::FieldValue>) {
        let (where_clause, order_clause, limit_clause, params) = query.build();

        let mut sql = format!("SELECT {} FROM {}", projection, self.schema.table_name());
        for clause in [where_clause, order_clause, limit_clause] {
            if !clause.is_empty() {
                sql.push(' ');
                sql.push_str(&clause);
            }
        }
        (sql, params)
    }

    /// Rows matching `query`
    pub async fn find(&self, query: QueryBuilder) -> Result<Vec<S::Row>, StoreError> {
        self.validate_query(&query)?;
        let table = self.schema.table_name();
        let (sql, params) = self.select_sql(&query, "*");
        debug!(table, sql = %sql, "find");

        let mut sqlx_query = sqlx::query_as::<_, S::Row>(&sql);
        for param in params {
            sqlx_query = bind_value!(sqlx_query, param);
        }

        sqlx_query
            .fetch_all(&self.db_pool)
            .await
            .map_err(|e| StoreError::database_operation(table, "find", e))
    }

    pub async fn find_one(&self, query: QueryBuilder) -> Result<Option<S::Row>, StoreError> {
        let mut results = self.find(query.limit(1)).await?;
        Ok(results.pop())
    }

    /// Number of rows matching the query predicate; ordering and pagination are ignored
    pub async fn count_where(&self, query: &QueryBuilder) -> Result<i64, StoreError> {
        let query = query.without_pagination();
        self.validate_query(&query)?;
        let table = self.schema.table_name();
        let (sql, params) = self.select_sql(&query, "COUNT(*)");
        debug!(table, sql = %sql, "count");

        let mut sqlx_query = sqlx::query_scalar::<_, i64>(&sql);
        for param in params {
            sqlx_query = bind_value!(sqlx_query, param);
        }

        sqlx_query
            .fetch_one(&self.db_pool)
            .await
            .map_err(|e| StoreError::database_operation(table, "count", e))
    }

    /// [`find`](Self::find) through the TTL cache.
    ///
    /// The cache key is a hash of the serialized `key_source`, which must
    /// describe everything that shapes the result. Entries are only dropped
    /// by time, so results may lag writes by up to the store's TTL.
    pub async fn find_cached<K: Serialize>(
        &self,
        key_source: &K,
        query: QueryBuilder,
    ) -> Result<Vec<S::Row>, StoreError> {
        let Some(cache_manager) = &self.cache_manager else {
            return self.find(query).await;
        };

        let table = self.schema.table_name();
        let prefix = self.get_cache_prefix();
        let key = serde_json::to_string(key_source)?;
        let query_hash = cache_manager.hash_query(&key);

        if let Some(cached) = cache_manager
            .get_query::<S::Row>(prefix, table, &query_hash)
            .await
            .map_err(|e| StoreError::cache_operation("find_cached", e))?
        {
            return Ok(cached);
        }

        let results = self.find(query).await?;

        cache_manager
            .set_query_with_ttl(prefix, table, &query_hash, &results, self.get_cache_ttl())
            .await
            .map_err(|e| StoreError::cache_operation("find_cached_set", e))?;

        Ok(results)
    }
}
