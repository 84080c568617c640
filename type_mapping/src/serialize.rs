//! Serialization utilities
//!
//! This module provides functions for turning Rust data into
//! event payload fields.

use crate::types::{FieldValue, Record};
use serde::Serialize;
use std::collections::HashMap;

/// Flatten any serializable struct into payload fields.
///
/// Booleans become 0/1 integers and nested values are kept as JSON text.
pub fn serialize_to_payload<T: Serialize>(data: &T) -> HashMap<String, FieldValue> {
    let mut payload = HashMap::new();

    // Serialize to JSON first, then extract fields
    if let Ok(serde_json::Value::Object(map)) = serde_json::to_value(data) {
        for (key, value) in map {
            let field_value = match value {
                serde_json::Value::String(s) => FieldValue::Text(s),
                serde_json::Value::Number(n) => {
                    if let Some(i) = n.as_i64() {
                        FieldValue::Integer(i)
                    } else if let Some(f) = n.as_f64() {
                        FieldValue::Float(f)
                    } else {
                        FieldValue::Text(n.to_string())
                    }
                }
                serde_json::Value::Bool(b) => FieldValue::Integer(i64::from(b)),
                serde_json::Value::Null => FieldValue::Null,
                other => FieldValue::Text(other.to_string()),
            };
            payload.insert(key, field_value);
        }
    }

    payload
}

/// Copy a [`Record`] into payload fields
pub fn record_to_payload(record: &Record) -> HashMap<String, FieldValue> {
    record
        .iter()
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        id: i64,
        email: String,
        confirmed: bool,
        confirm_date: Option<String>,
    }

    #[test]
    fn flattens_struct_fields() {
        let payload = serialize_to_payload(&Row {
            id: 9,
            email: "jane@example.com".to_string(),
            confirmed: true,
            confirm_date: None,
        });

        assert_eq!(payload["id"], FieldValue::Integer(9));
        assert_eq!(payload["email"], FieldValue::from("jane@example.com"));
        assert_eq!(payload["confirmed"], FieldValue::Integer(1));
        assert_eq!(payload["confirm_date"], FieldValue::Null);
    }
}
