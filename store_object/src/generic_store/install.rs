//! Idempotent schema installation and version markers

use super::core::GenericStore;
use crate::errors::StoreError;
use crate::schema::TableSchema;
use crate::validation::ValidatedTableName;
use sqlx::Row;
use tracing::debug;

impl<S: TableSchema> GenericStore<S> {
    /// Options table shared by every store of an installation
    fn options_table(&self) -> Result<ValidatedTableName, StoreError> {
        Ok(ValidatedTableName::prefixed(
            self.schema.table_prefix(),
            "listhaus_options",
        )?)
    }

    fn version_option_name(&self) -> String {
        format!("{}_db_version", self.schema.table_name())
    }

    async fn execute_ddl(&self, sql: &str, operation: &'static str) -> Result<(), StoreError> {
        debug!(table = self.schema.table_name(), sql, "ddl");
        sqlx::query(sql)
            .execute(&self.db_pool)
            .await
            .map_err(|e| StoreError::database_operation(self.schema.table_name(), operation, e))?;
        Ok(())
    }

    /// Create the table, add missing columns and indexes, and record the
    /// schema version. Safe to run against an existing installation.
    pub async fn create_table(&self) -> Result<(), StoreError> {
        let table = self.schema.table_name();
        ValidatedTableName::new(table)?;

        self.execute_ddl(&self.schema.create_table_sql(), "create_table")
            .await?;

        let existing: Vec<String> = sqlx::query(&format!("PRAGMA table_info({})", table))
            .fetch_all(&self.db_pool)
            .await
            .map_err(|e| StoreError::database_operation(table, "table_info", e))?
            .iter()
            .map(|row| row.try_get::<String, _>("name"))
            .collect::<Result<_, _>>()
            .map_err(|e| StoreError::database_operation(table, "table_info", e))?;

        for column in self.schema.columns() {
            if existing.iter().any(|name| name.eq_ignore_ascii_case(column.name)) {
                continue;
            }
            let sql = format!(
                "ALTER TABLE {} ADD COLUMN {} {}",
                table,
                column.name,
                column.kind.sql_type()
            );
            self.execute_ddl(&sql, "add_column").await?;
        }

        for index in self.schema.indexes() {
            let sql = format!(
                "CREATE INDEX IF NOT EXISTS {}_{} ON {} ({})",
                table,
                index.name,
                table,
                index.columns.join(", ")
            );
            self.execute_ddl(&sql, "create_index").await?;
        }

        let options = self.options_table()?;
        self.execute_ddl(
            &format!(
                "CREATE TABLE IF NOT EXISTS {} (option_name TEXT PRIMARY KEY, option_value TEXT NOT NULL)",
                options
            ),
            "create_options",
        )
        .await?;

        sqlx::query(&format!(
            "INSERT INTO {} (option_name, option_value) VALUES (?, ?) \
             ON CONFLICT(option_name) DO UPDATE SET option_value = excluded.option_value",
            options
        ))
        .bind(self.version_option_name())
        .bind(self.schema.version())
        .execute(&self.db_pool)
        .await
        .map_err(|e| StoreError::database_operation(options.as_str(), "set_version", e))?;

        Ok(())
    }

    /// Schema version recorded by the last `create_table`, if any
    pub async fn schema_version(&self) -> Result<Option<String>, StoreError> {
        let options = self.options_table()?;
        if !self.table_exists(options.as_str()).await? {
            return Ok(None);
        }

        sqlx::query_scalar::<_, String>(&format!(
            "SELECT option_value FROM {} WHERE option_name = ?",
            options
        ))
        .bind(self.version_option_name())
        .fetch_optional(&self.db_pool)
        .await
        .map_err(|e| StoreError::database_operation(options.as_str(), "schema_version", e))
    }
}
