//! Error types for store operations

use crate::validation::ValidationError;
use cache_system::CacheError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error on '{table}' during {operation}: {source}")]
    Database {
        table: String,
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("Cache error during {operation}: {source}")]
    Cache {
        operation: &'static str,
        #[source]
        source: CacheError,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn database_operation(table: &str, operation: &'static str, source: sqlx::Error) -> Self {
        Self::Database {
            table: table.to_string(),
            operation,
            source,
        }
    }

    pub fn cache_operation(operation: &'static str, source: CacheError) -> Self {
        Self::Cache { operation, source }
    }

    /// True when the engine rejected a write through a UNIQUE constraint
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Database {
                source: sqlx::Error::Database(db_err),
                ..
            } => db_err.is_unique_violation(),
            _ => false,
        }
    }
}
