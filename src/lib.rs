//! # listhaus
//!
//! A mailing-list subscriber store for SQLite, built on a generic record
//! store with column whitelisting, upsert by natural key, lifecycle signals
//! and a TTL query cache.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use listhaus::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let listhaus = ListHaus::new(config).await?;
//!     listhaus.auto_migrate(false).await?;
//!
//!     let store = listhaus.subscriber_store(Arc::new(FixedAddress::new("203.0.113.9")))?;
//!     let services = SubscriberServices::with_in_memory_terms(Arc::new(listhaus.meta_store()?));
//!
//!     let mut subscriber = Subscriber::new(store, services);
//!     if let Some(id) = subscriber.create(&record! { "email" => "jane@example.com" }).await? {
//!         println!("Created subscriber {}", id);
//!     }
//!
//!     Ok(())
//! }
//! ```

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod core;
pub mod errors;
pub mod migration;
pub mod prelude;
pub mod subscribers;

// Re-export the main public types for convenience
pub use core::ListHaus;
pub use errors::ListHausError;

// Re-export centralized config
pub use config::{AppConfig, CacheConfig, DatabaseConfig, SignalConfig};

// Re-export internal crates used by the public API
pub use cache_system;
pub use signal_system;
pub use store_object;
pub use type_mapping;
pub use type_mapping::record;

// Re-export external dependencies used in public API
pub use async_trait;
pub use sqlx;
