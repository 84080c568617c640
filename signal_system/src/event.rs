//! Database event types and definitions
//!
//! This module defines the structure of lifecycle events
//! that flow through the signal system.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::types::FieldValue;

/// Lifecycle point an event was fired at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    PreInsert,
    PostInsert,
    PreCreate,
    PostCreate,
    PreUpdate,
    PostUpdate,
    PreIncreaseEmailCount,
    PostIncreaseEmailCount,
    Delete,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::PreInsert => "pre_insert",
            EventType::PostInsert => "post_insert",
            EventType::PreCreate => "pre_create",
            EventType::PostCreate => "post_create",
            EventType::PreUpdate => "pre_update",
            EventType::PostUpdate => "post_update",
            EventType::PreIncreaseEmailCount => "pre_increase_email_count",
            EventType::PostIncreaseEmailCount => "post_increase_email_count",
            EventType::Delete => "delete",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Database lifecycle event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseEvent {
    /// Event type
    pub event_type: EventType,
    /// Table name
    pub table_name: String,
    /// Record type tag, e.g. `subscriber`
    pub tag: Option<String>,
    /// Record ID (if available)
    pub record_id: Option<i64>,
    /// Additional data
    pub payload: HashMap<String, FieldValue>,
    /// Event timestamp (UTC)
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl DatabaseEvent {
    pub fn new(event_type: EventType, table_name: impl Into<String>) -> Self {
        Self {
            event_type,
            table_name: table_name.into(),
            tag: None,
            record_id: None,
            payload: HashMap::new(),
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_record_id(mut self, record_id: i64) -> Self {
        self.record_id = Some(record_id);
        self
    }

    pub fn with_payload(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    pub fn with_payload_fields(mut self, fields: HashMap<String, FieldValue>) -> Self {
        self.payload.extend(fields);
        self
    }

    pub fn add_payload(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.payload.insert(key.into(), value.into());
    }

    /// Hook name listeners match on: `pre_insert_subscriber`, `post_update_subscriber`, ...
    pub fn hook_name(&self) -> String {
        match &self.tag {
            Some(tag) => format!("{}_{}", self.event_type.as_str(), tag),
            None => self.event_type.as_str().to_string(),
        }
    }

    pub fn payload_value(&self, key: &str) -> Option<&FieldValue> {
        self.payload.get(key)
    }
}
