//! Type definitions for signal system
//!
//! This module contains the callback type, payload helpers and
//! errors for the signal system.

use crate::event::DatabaseEvent;
use std::sync::Arc;
use thiserror::Error;

// Re-export from type-mapping for convenience
pub use type_mapping::{record_to_payload, serialize_to_payload, FieldValue};

/// Event listener. Listeners observe events and cannot veto them.
pub type EventCallback = Arc<dyn Fn(&DatabaseEvent) + Send + Sync>;

/// Signal registration errors
#[derive(Debug, Error, PartialEq)]
pub enum SignalError {
    #[error("Callback limit reached: {0}")]
    TooManyCallbacks(usize),

    #[error("Callback not registered: {0}")]
    UnknownCallback(u64),
}
