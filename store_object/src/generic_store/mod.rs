//! Generic store implementations
//!
//! This module provides the generic record store: whitelisted CRUD,
//! typed queries with an optional TTL cache, and schema installation.

/// Bind a [`type_mapping::FieldValue`] to a sqlx query
macro_rules! bind_value {
    ($query:expr, $value:expr) => {
        match $value {
            type_mapping::FieldValue::Integer(i) => $query.bind(i),
            type_mapping::FieldValue::Float(f) => $query.bind(f),
            type_mapping::FieldValue::Text(s) => $query.bind(s),
            type_mapping::FieldValue::Null => $query.bind(Option::<String>::None),
        }
    };
}

pub mod core;
pub mod install;
pub mod query;
pub mod store_object;

pub use core::GenericStore;
pub use store_object::IdSet;
