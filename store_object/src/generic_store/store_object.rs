//! Whitelisted CRUD by primary key or arbitrary column

use super::core::GenericStore;
use crate::errors::StoreError;
use crate::schema::TableSchema;
use signal_system::{record_to_payload, DatabaseEvent, EventType};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::{debug, warn};
use type_mapping::{FieldKind, FieldValue, Record};

/// One id or a collection of ids for bulk deletes
#[derive(Debug, Clone, PartialEq)]
pub enum IdSet {
    One(FieldValue),
    Many(Vec<FieldValue>),
}

impl IdSet {
    /// Ids as integers; anything non-numeric becomes 0 and matches nothing
    pub fn to_ids(&self) -> Vec<i64> {
        let as_id = |value: &FieldValue| value.as_i64().unwrap_or(0);
        match self {
            IdSet::One(value) => vec![as_id(value)],
            IdSet::Many(values) => values.iter().map(as_id).collect(),
        }
    }
}

impl From<i64> for IdSet {
    fn from(id: i64) -> Self {
        IdSet::One(FieldValue::Integer(id))
    }
}

impl From<FieldValue> for IdSet {
    fn from(value: FieldValue) -> Self {
        IdSet::One(value)
    }
}

impl From<Vec<i64>> for IdSet {
    fn from(ids: Vec<i64>) -> Self {
        IdSet::Many(ids.into_iter().map(FieldValue::Integer).collect())
    }
}

impl From<&[i64]> for IdSet {
    fn from(ids: &[i64]) -> Self {
        IdSet::Many(ids.iter().copied().map(FieldValue::Integer).collect())
    }
}

impl From<Vec<FieldValue>> for IdSet {
    fn from(values: Vec<FieldValue>) -> Self {
        IdSet::Many(values)
    }
}

fn decode_scalar(row: &SqliteRow, kind: FieldKind) -> Result<FieldValue, sqlx::Error> {
    let value = match kind {
        FieldKind::Integer => row.try_get::<Option<i64>, _>(0)?.map(FieldValue::Integer),
        FieldKind::Float => row.try_get::<Option<f64>, _>(0)?.map(FieldValue::Float),
        FieldKind::Text => row.try_get::<Option<String>, _>(0)?.map(FieldValue::Text),
    };
    Ok(value.unwrap_or(FieldValue::Null))
}

impl<S: TableSchema> GenericStore<S> {
    /// Fetch one row by primary key
    pub async fn get(&self, id: i64) -> Result<Option<S::Row>, StoreError> {
        let table = self.schema.table_name();
        let sql = format!(
            "SELECT * FROM {} WHERE {} = ? LIMIT 1",
            table,
            self.schema.primary_key()
        );

        sqlx::query_as::<_, S::Row>(&sql)
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await
            .map_err(|e| StoreError::database_operation(table, "get", e))
    }

    /// Fetch one row where `column = value`. Unknown columns match nothing.
    pub async fn get_by(
        &self,
        column: &str,
        value: impl Into<FieldValue>,
    ) -> Result<Option<S::Row>, StoreError> {
        let table = self.schema.table_name();
        let Some(column) = self.schema.column(column) else {
            warn!(table, column, "get_by on unknown column");
            return Ok(None);
        };

        let sql = format!("SELECT * FROM {} WHERE {} = ? LIMIT 1", table, column.name);
        let query = sqlx::query_as::<_, S::Row>(&sql);
        bind_value!(query, value.into())
            .fetch_optional(&self.db_pool)
            .await
            .map_err(|e| StoreError::database_operation(table, "get_by", e))
    }

    /// Read a single column of the row with primary key `id`
    pub async fn get_column(&self, column: &str, id: i64) -> Result<Option<FieldValue>, StoreError> {
        self.get_column_by(column, self.schema.primary_key(), id).await
    }

    /// Read `column` from the first row where `where_column = value`
    pub async fn get_column_by(
        &self,
        column: &str,
        where_column: &str,
        value: impl Into<FieldValue>,
    ) -> Result<Option<FieldValue>, StoreError> {
        let table = self.schema.table_name();
        let (Some(column), Some(where_column)) =
            (self.schema.column(column), self.schema.column(where_column))
        else {
            warn!(table, column, where_column, "get_column_by on unknown column");
            return Ok(None);
        };

        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ? LIMIT 1",
            column.name, table, where_column.name
        );
        let query = sqlx::query(&sql);
        let row = bind_value!(query, value.into())
            .fetch_optional(&self.db_pool)
            .await
            .map_err(|e| StoreError::database_operation(table, "get_column_by", e))?;

        row.map(|row| decode_scalar(&row, column.kind))
            .transpose()
            .map_err(|e| StoreError::database_operation(table, "get_column_by", e))
    }

    /// Insert a row built from `data` over the column defaults.
    ///
    /// Fires `PreInsert` / `PostInsert` tagged with `type_tag`. Returns the
    /// generated id, or `None` when a UNIQUE constraint rejected the row.
    pub async fn insert(&self, data: &Record, type_tag: &str) -> Result<Option<i64>, StoreError> {
        let table = self.schema.table_name();

        let mut merged = self.schema.column_defaults();
        merged.extend(data.iter().map(|(key, value)| {
            let key = self
                .schema
                .column(key)
                .map_or_else(|| key.clone(), |column| column.name.to_string());
            (key, value.clone())
        }));

        self.emit_signal(
            self.tagged_event(EventType::PreInsert, type_tag)
                .with_payload_fields(record_to_payload(&merged)),
        );

        let columns = self.schema.coerce(&merged);
        let sql = if columns.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", table)
        } else {
            let names: Vec<&str> = columns.iter().map(|(column, _)| column.name).collect();
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                table,
                names.join(", "),
                vec!["?"; names.len()].join(", ")
            )
        };
        debug!(table, sql = %sql, "insert");

        let mut query = sqlx::query(&sql);
        for (_, value) in &columns {
            query = bind_value!(query, value.clone());
        }

        let new_id = match query.execute(&self.db_pool).await {
            Ok(result) => result.last_insert_rowid(),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                warn!(table, error = %db_err, "insert rejected by unique constraint");
                return Ok(None);
            }
            Err(e) => return Err(StoreError::database_operation(table, "insert", e)),
        };

        let written: Record = columns
            .into_iter()
            .map(|(column, value)| (column.name.to_string(), value))
            .collect();
        self.emit_signal(
            self.tagged_event(EventType::PostInsert, type_tag)
                .with_record_id(new_id)
                .with_payload_fields(record_to_payload(&written)),
        );

        Ok(Some(new_id))
    }

    /// Update whitelisted columns of the row where `where_column` (default:
    /// primary key) equals `id`.
    ///
    /// Returns `false` for a non-positive id, an unknown `where_column`, an
    /// empty payload or a UNIQUE violation. Touching zero rows is still success.
    pub async fn update(
        &self,
        id: i64,
        data: &Record,
        where_column: Option<&str>,
    ) -> Result<bool, StoreError> {
        let table = self.schema.table_name();
        if id <= 0 {
            return Ok(false);
        }

        let where_column = match where_column {
            None => self.schema.primary_key(),
            Some(name) => match self.schema.column(name) {
                Some(column) => column.name,
                None => {
                    warn!(table, where_column = name, "update on unknown column");
                    return Ok(false);
                }
            },
        };

        let columns = self.schema.coerce(data);
        if columns.is_empty() {
            return Ok(false);
        }

        let assignments: Vec<String> = columns
            .iter()
            .map(|(column, _)| format!("{} = ?", column.name))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?",
            table,
            assignments.join(", "),
            where_column
        );
        debug!(table, sql = %sql, "update");

        let mut query = sqlx::query(&sql);
        for (_, value) in &columns {
            query = bind_value!(query, value.clone());
        }

        match query.bind(id).execute(&self.db_pool).await {
            Ok(_) => Ok(true),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                warn!(table, id, error = %db_err, "update rejected by unique constraint");
                Ok(false)
            }
            Err(e) => Err(StoreError::database_operation(table, "update", e)),
        }
    }

    /// Delete the row with primary key `id`.
    ///
    /// Related rows in other tables are left alone.
    pub async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let table = self.schema.table_name();
        if id <= 0 {
            return Ok(false);
        }

        let sql = format!("DELETE FROM {} WHERE {} = ?", table, self.schema.primary_key());
        sqlx::query(&sql)
            .bind(id)
            .execute(&self.db_pool)
            .await
            .map_err(|e| StoreError::database_operation(table, "delete", e))?;

        Ok(true)
    }

    /// Delete every row whose primary key is in `ids`, returning the number removed
    pub async fn delete_by_ids(&self, ids: impl Into<IdSet>) -> Result<u64, StoreError> {
        let table = self.schema.table_name();
        let ids = ids.into().to_ids();
        if ids.is_empty() {
            return Ok(0);
        }

        // Integers only, so the list can be embedded directly
        let id_list = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let sql = format!(
            "DELETE FROM {} WHERE {} IN ({})",
            table,
            self.schema.primary_key(),
            id_list
        );
        debug!(table, sql = %sql, "delete_by_ids");

        let result = sqlx::query(&sql)
            .execute(&self.db_pool)
            .await
            .map_err(|e| StoreError::database_operation(table, "delete_by_ids", e))?;

        Ok(result.rows_affected())
    }

    /// Whether a table called `name` exists
    pub async fn table_exists(&self, name: &str) -> Result<bool, StoreError> {
        let found: Option<String> =
            sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?")
                .bind(name)
                .fetch_optional(&self.db_pool)
                .await
                .map_err(|e| StoreError::database_operation(name, "table_exists", e))?;

        Ok(found.is_some())
    }

    /// Whether this store's table has been created
    pub async fn is_installed(&self) -> Result<bool, StoreError> {
        self.table_exists(self.schema.table_name()).await
    }

    fn tagged_event(&self, event_type: EventType, type_tag: &str) -> DatabaseEvent {
        let event = DatabaseEvent::new(event_type, self.schema.table_name());
        if type_tag.is_empty() {
            event
        } else {
            event.with_tag(type_tag)
        }
    }
}
