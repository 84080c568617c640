//! Store Object - Core database abstraction layer for listhaus
//!
//! This crate provides the generic record store: a table schema descriptor,
//! whitelisted CRUD over one table, a small query builder, identifier
//! validation and idempotent schema installation.

pub mod errors;
pub mod generic_store;
pub mod prelude;
pub mod query_builder;
pub mod schema;
pub mod validation;

pub use cache_system::CacheParams;
pub use errors::StoreError;
pub use generic_store::{GenericStore, IdSet};
pub use query_builder::{QueryBuilder, QueryFilter, QueryOperator, SortOrder};
pub use schema::{Column, Index, TableSchema};
pub use validation::{ValidatedTableName, ValidationError};

use sqlx::SqlitePool;

pub type DbPool = SqlitePool;
