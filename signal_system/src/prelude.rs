//! Convenience re-exports for common signal-system usage

// Core signal system components
pub use crate::event::{DatabaseEvent, EventType};
pub use crate::manager::{CallbackId, SignalManager};
pub use crate::types::{record_to_payload, serialize_to_payload, EventCallback, FieldValue, SignalError};

// Re-export centralized config
pub use config::SignalConfig;
