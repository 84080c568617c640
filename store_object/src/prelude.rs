//! Convenience re-exports for common store-object usage

pub use crate::errors::StoreError;
pub use crate::generic_store::{GenericStore, IdSet};
pub use crate::query_builder::{QueryBuilder, QueryFilter, QueryOperator, SortOrder};
pub use crate::schema::{Column, Index, TableSchema};
pub use crate::validation::{ValidatedTableName, ValidationError};
pub use crate::{CacheParams, DbPool};

pub use type_mapping::{FieldKind, FieldValue, Record};

pub use serde::{Deserialize, Serialize};
pub use sqlx::{FromRow, SqlitePool};
