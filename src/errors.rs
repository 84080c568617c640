//! Error types for the listhaus crate
//!
//! Expected conditions (bad email, unknown id, empty payload) are reported as
//! `Ok(None)` / `Ok(false)` by the stores. The variants below are for
//! everything that should actually stop the caller.

use cache_system::CacheError;
use config::ConfigError;
use signal_system::SignalError;
use store_object::{StoreError, ValidationError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ListHausError {
    #[error("Database connection error: {0}")]
    DatabaseConnection(#[from] sqlx::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Signal(#[from] SignalError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Can't get property {0}")]
    UnknownProperty(String),

    #[error("An error occurred while inserting the subscriber.")]
    InsertFailed,
}
