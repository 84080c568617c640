//! Unified type mapping between Rust values and table columns
//! This crate provides the column descriptors, coercion and sanitization rules used across the listhaus ecosystem

pub mod coerce;
pub mod serialize;
pub mod types;
pub mod validate;

pub use coerce::{coerce_value, sanitize_value};
pub use serialize::{record_to_payload, serialize_to_payload};
pub use types::{FieldKind, FieldValue, Record, ToPayload};
pub use validate::{is_email, is_numeric, sanitize_email, sanitize_text_field};
