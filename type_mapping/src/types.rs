//! Type mapping definitions
//!
//! This module provides the typed column descriptor and the runtime value
//! carried through writes, filters and event payloads.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Declared kind of a table column.
///
/// Every write coerces its value to the column's kind before binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    Text,
    Integer,
    Float,
}

impl FieldKind {
    /// SQLite storage class used when generating DDL
    pub fn sql_type(&self) -> &'static str {
        match self {
            FieldKind::Text => "TEXT",
            FieldKind::Integer => "INTEGER",
            FieldKind::Float => "REAL",
        }
    }
}

/// Runtime column value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Null,
}

/// Dynamic row data keyed by column name.
///
/// Keys are not trusted: stores whitelist them against the table schema.
pub type Record = BTreeMap<String, FieldValue>;

/// Trait for converting a model into event payload fields
pub trait ToPayload {
    fn to_payload(&self) -> HashMap<String, FieldValue>;
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Loose emptiness: null, empty text, "0" and numeric zero count as empty
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.is_empty() || s == "0",
            FieldValue::Integer(i) => *i == 0,
            FieldValue::Float(f) => *f == 0.0,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Integer view of the value, parsing numeric text. Fractional numbers are rejected.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            FieldValue::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(*f as i64),
            FieldValue::Text(s) => {
                let trimmed = s.trim();
                trimmed.parse::<i64>().ok().or_else(|| {
                    trimmed
                        .parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite() && f.fract() == 0.0)
                        .map(|f| f as i64)
                })
            }
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Float(f) if f.is_finite() => Some(*f),
            FieldValue::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            _ => None,
        }
    }

    /// Text rendering of the value, `None` for null
    pub fn to_text(&self) -> Option<String> {
        match self {
            FieldValue::Null => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Null => Ok(()),
        }
    }
}

impl From<String> for FieldValue {
    fn from(val: String) -> Self {
        FieldValue::Text(val)
    }
}

impl From<&str> for FieldValue {
    fn from(val: &str) -> Self {
        FieldValue::Text(val.to_string())
    }
}

impl From<&String> for FieldValue {
    fn from(val: &String) -> Self {
        FieldValue::Text(val.clone())
    }
}

impl From<i64> for FieldValue {
    fn from(val: i64) -> Self {
        FieldValue::Integer(val)
    }
}

impl From<i32> for FieldValue {
    fn from(val: i32) -> Self {
        FieldValue::Integer(val as i64)
    }
}

impl From<u32> for FieldValue {
    fn from(val: u32) -> Self {
        FieldValue::Integer(val as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(val: f64) -> Self {
        FieldValue::Float(val)
    }
}

impl From<&FieldValue> for FieldValue {
    fn from(val: &FieldValue) -> Self {
        val.clone()
    }
}

impl<T> From<Option<T>> for FieldValue
where
    T: Into<FieldValue>,
{
    fn from(val: Option<T>) -> Self {
        match val {
            Some(v) => v.into(),
            None => FieldValue::Null,
        }
    }
}

/// Build a [`Record`] from `key => value` pairs.
///
/// ```
/// use type_mapping::{record, FieldValue};
///
/// let data = record! { "email" => "jane@example.com", "email_count" => 3 };
/// assert_eq!(data["email_count"], FieldValue::Integer(3));
/// ```
#[macro_export]
macro_rules! record {
    () => {
        $crate::Record::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut record = $crate::Record::new();
        $(
            record.insert(($key).to_string(), $crate::FieldValue::from($value));
        )+
        record
    }};
}
