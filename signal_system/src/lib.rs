//! Signal system for database lifecycle events
//!
//! This crate provides the notification bus fired before and after
//! inserts, creates, updates and counter changes in the listhaus ecosystem.

pub mod event;
pub mod manager;
pub mod prelude;
pub mod types;

pub use event::{DatabaseEvent, EventType};
pub use manager::{CallbackId, SignalManager};
pub use types::{record_to_payload, serialize_to_payload, EventCallback, FieldValue, SignalError};
