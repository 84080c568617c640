//! Subscriber meta data
//!
//! Free-form key/value pairs attached to a subscriber id. Keys may repeat
//! unless written with `unique`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use signal_system::SignalManager;
use sqlx::{FromRow, SqlitePool};
use std::sync::Arc;
use store_object::{
    Column, GenericStore, Index, QueryBuilder, QueryFilter, SortOrder, TableSchema,
    ValidatedTableName,
};
use type_mapping::{FieldKind, Record, record};

use crate::errors::ListHausError;

pub const META_TABLE: &str = "nml_subscriber_meta";
const META_TAG: &str = "subscriber_meta";

/// Meta storage keyed by subscriber id
#[async_trait]
pub trait MetaStore: Send + Sync {
    /// Every value stored under `key`, oldest first
    async fn get(&self, subscriber_id: i64, key: &str) -> Result<Vec<String>, ListHausError>;

    async fn get_single(
        &self,
        subscriber_id: i64,
        key: &str,
    ) -> Result<Option<String>, ListHausError>;

    /// Add a value. With `unique`, fails when the key is already present.
    async fn add(
        &self,
        subscriber_id: i64,
        key: &str,
        value: &str,
        unique: bool,
    ) -> Result<bool, ListHausError>;

    /// Overwrite the values under `key` (only those equal to `prev_value`
    /// when given). Adds the key when the subscriber has none.
    async fn update(
        &self,
        subscriber_id: i64,
        key: &str,
        value: &str,
        prev_value: Option<&str>,
    ) -> Result<bool, ListHausError>;

    /// Remove the values under `key`, or only those equal to `value`
    async fn delete(
        &self,
        subscriber_id: i64,
        key: &str,
        value: Option<&str>,
    ) -> Result<bool, ListHausError>;

    /// Remove everything stored for the subscriber
    async fn delete_all(&self, subscriber_id: i64) -> Result<u64, ListHausError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MetaRow {
    pub meta_id: i64,
    pub nml_subscriber_id: i64,
    pub meta_key: Option<String>,
    pub meta_value: Option<String>,
}

const META_COLUMNS: &[Column] = &[
    Column::new("meta_id", FieldKind::Integer, "INTEGER PRIMARY KEY AUTOINCREMENT"),
    Column::new("nml_subscriber_id", FieldKind::Integer, "INTEGER NOT NULL DEFAULT 0"),
    Column::new("meta_key", FieldKind::Text, "VARCHAR(255)").nullable(),
    Column::new("meta_value", FieldKind::Text, "TEXT").nullable(),
];

const META_INDEXES: &[Index] = &[
    Index {
        name: "nml_subscriber_id",
        columns: &["nml_subscriber_id"],
    },
    Index {
        name: "meta_key",
        columns: &["meta_key"],
    },
];

#[derive(Debug, Clone)]
pub struct MetaSchema {
    prefix: String,
    table: ValidatedTableName,
}

impl MetaSchema {
    pub fn new(prefix: &str) -> Result<Self, ListHausError> {
        Ok(Self {
            prefix: prefix.to_string(),
            table: ValidatedTableName::prefixed(prefix, META_TABLE)?,
        })
    }
}

impl TableSchema for MetaSchema {
    type Row = MetaRow;

    fn table_prefix(&self) -> &str {
        &self.prefix
    }

    fn table_name(&self) -> &str {
        self.table.as_str()
    }

    fn primary_key(&self) -> &'static str {
        "meta_id"
    }

    fn version(&self) -> &'static str {
        "1.0"
    }

    fn columns(&self) -> &'static [Column] {
        META_COLUMNS
    }

    fn column_defaults(&self) -> Record {
        record! {
            "nml_subscriber_id" => 0,
            "meta_key" => None::<String>,
            "meta_value" => None::<String>,
        }
    }

    fn indexes(&self) -> &'static [Index] {
        META_INDEXES
    }
}

/// [`MetaStore`] backed by the `{prefix}nml_subscriber_meta` table
#[derive(Debug, Clone)]
pub struct SqlMetaStore {
    records: GenericStore<MetaSchema>,
}

impl SqlMetaStore {
    pub fn new(
        pool: SqlitePool,
        prefix: &str,
        signal_manager: Option<Arc<SignalManager>>,
    ) -> Result<Self, ListHausError> {
        Ok(Self {
            records: GenericStore::new(pool, MetaSchema::new(prefix)?, signal_manager, None),
        })
    }

    pub fn table_name(&self) -> &str {
        self.records.table_name()
    }

    pub async fn create_table(&self) -> Result<(), ListHausError> {
        Ok(self.records.create_table().await?)
    }

    fn key_query(subscriber_id: i64, key: &str, value: Option<&str>) -> QueryBuilder {
        let mut query = QueryBuilder::new()
            .filter(QueryFilter::eq("nml_subscriber_id", subscriber_id))
            .filter(QueryFilter::eq("meta_key", key))
            .order_by("meta_id", SortOrder::Asc);
        if let Some(value) = value {
            query = query.filter(QueryFilter::eq("meta_value", value));
        }
        query
    }

    async fn rows(
        &self,
        subscriber_id: i64,
        key: &str,
        value: Option<&str>,
    ) -> Result<Vec<MetaRow>, ListHausError> {
        Ok(self
            .records
            .find(Self::key_query(subscriber_id, key, value))
            .await?)
    }
}

#[async_trait]
impl MetaStore for SqlMetaStore {
    async fn get(&self, subscriber_id: i64, key: &str) -> Result<Vec<String>, ListHausError> {
        if subscriber_id <= 0 {
            return Ok(Vec::new());
        }
        Ok(self
            .rows(subscriber_id, key, None)
            .await?
            .into_iter()
            .filter_map(|row| row.meta_value)
            .collect())
    }

    async fn get_single(
        &self,
        subscriber_id: i64,
        key: &str,
    ) -> Result<Option<String>, ListHausError> {
        Ok(self.get(subscriber_id, key).await?.into_iter().next())
    }

    async fn add(
        &self,
        subscriber_id: i64,
        key: &str,
        value: &str,
        unique: bool,
    ) -> Result<bool, ListHausError> {
        if subscriber_id <= 0 || key.is_empty() {
            return Ok(false);
        }
        if unique
            && self
                .records
                .count_where(&Self::key_query(subscriber_id, key, None))
                .await?
                > 0
        {
            return Ok(false);
        }

        let data = record! {
            "nml_subscriber_id" => subscriber_id,
            "meta_key" => key,
            "meta_value" => value,
        };
        Ok(self.records.insert(&data, META_TAG).await?.is_some())
    }

    async fn update(
        &self,
        subscriber_id: i64,
        key: &str,
        value: &str,
        prev_value: Option<&str>,
    ) -> Result<bool, ListHausError> {
        if subscriber_id <= 0 || key.is_empty() {
            return Ok(false);
        }
        let existing = self
            .records
            .count_where(&Self::key_query(subscriber_id, key, None))
            .await?;
        if existing == 0 {
            return self.add(subscriber_id, key, value, false).await;
        }

        let mut updated = false;
        for row in self.rows(subscriber_id, key, prev_value).await? {
            updated |= self
                .records
                .update(row.meta_id, &record! { "meta_value" => value }, None)
                .await?;
        }
        Ok(updated)
    }

    async fn delete(
        &self,
        subscriber_id: i64,
        key: &str,
        value: Option<&str>,
    ) -> Result<bool, ListHausError> {
        if subscriber_id <= 0 {
            return Ok(false);
        }
        let ids: Vec<i64> = self
            .rows(subscriber_id, key, value)
            .await?
            .into_iter()
            .map(|row| row.meta_id)
            .collect();
        Ok(self.records.delete_by_ids(ids).await? > 0)
    }

    async fn delete_all(&self, subscriber_id: i64) -> Result<u64, ListHausError> {
        if subscriber_id <= 0 {
            return Ok(0);
        }
        let ids: Vec<i64> = self
            .records
            .find(QueryBuilder::new().filter(QueryFilter::eq("nml_subscriber_id", subscriber_id)))
            .await?
            .into_iter()
            .map(|row| row.meta_id)
            .collect();
        Ok(self.records.delete_by_ids(ids).await?)
    }
}
