//! Convenience re-exports for common listhaus usage
//!
//! # Example
//!
//! ```rust
//! use listhaus::prelude::*;
//!
//! let query = SubscriberQuery::new().status(["pending", "subscribed"]).number(50);
//! assert_eq!(query.order, SortOrder::Desc);
//! ```

// Core listhaus components
pub use crate::core::ListHaus;
pub use crate::errors::ListHausError;
pub use crate::subscribers::actions::{SubscriberForm, delete_subscriber, insert_subscriber};
pub use crate::subscribers::{
    AddressResolver, FixedAddress, InMemoryTermStore, MetaStore, OneOrMany, Property,
    PropertyValue, SqlMetaStore, Subscriber, SubscriberKey, SubscriberProperties,
    SubscriberQuery, SubscriberRow, SubscriberServices, SubscriberStatus, SubscriberStore, Term,
    TermRef, TermStore,
};

// Re-export centralized config
pub use config::{AppConfig, CacheConfig, DatabaseConfig, SignalConfig};

// Re-export commonly used store-object types for convenience
pub use store_object::prelude::*;

// Re-export signal system for event handling
pub use signal_system::prelude::*;

// Re-export cache system
pub use cache_system::prelude::*;

pub use type_mapping::record;

// Common external dependencies
pub use async_trait;
pub use sqlx;
pub use tokio;
