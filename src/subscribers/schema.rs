//! Subscriber table layout

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use store_object::{Column, Index, TableSchema, ValidatedTableName};
use type_mapping::{FieldKind, Record, record};

use super::collaborators::AddressResolver;
use crate::errors::ListHausError;

pub const SUBSCRIBER_TABLE: &str = "nml_subscribers";
pub const SUBSCRIBER_SCHEMA_VERSION: &str = "1.0";

/// Timestamp layout of `signup_date` and `confirm_date`
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One subscriber row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SubscriberRow {
    #[sqlx(rename = "ID")]
    #[serde(rename = "ID")]
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub status: String,
    pub signup_date: String,
    pub confirm_date: Option<String>,
    pub ip: String,
    pub email_count: i64,
}

/// Known subscriber states. The column itself accepts any text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriberStatus {
    #[default]
    Pending,
    Subscribed,
    Unsubscribed,
}

impl SubscriberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriberStatus::Pending => "pending",
            SubscriberStatus::Subscribed => "subscribed",
            SubscriberStatus::Unsubscribed => "unsubscribed",
        }
    }
}

impl fmt::Display for SubscriberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriberStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(SubscriberStatus::Pending),
            "subscribed" => Ok(SubscriberStatus::Subscribed),
            "unsubscribed" => Ok(SubscriberStatus::Unsubscribed),
            _ => Err(()),
        }
    }
}

impl From<SubscriberStatus> for type_mapping::FieldValue {
    fn from(status: SubscriberStatus) -> Self {
        type_mapping::FieldValue::from(status.as_str())
    }
}

const SUBSCRIBER_COLUMNS: &[Column] = &[
    Column::new("ID", FieldKind::Integer, "INTEGER PRIMARY KEY AUTOINCREMENT"),
    Column::new("email", FieldKind::Text, "VARCHAR(50) NOT NULL COLLATE NOCASE"),
    Column::new("first_name", FieldKind::Text, "TEXT NOT NULL DEFAULT ''"),
    Column::new("last_name", FieldKind::Text, "TEXT NOT NULL DEFAULT ''"),
    Column::new("status", FieldKind::Text, "VARCHAR(50) NOT NULL DEFAULT 'pending'"),
    Column::new("signup_date", FieldKind::Text, "TEXT NOT NULL"),
    Column::new("confirm_date", FieldKind::Text, "TEXT").nullable(),
    Column::new("ip", FieldKind::Text, "VARCHAR(100) NOT NULL DEFAULT ''"),
    Column::new("email_count", FieldKind::Integer, "INTEGER NOT NULL DEFAULT 0"),
];

const SUBSCRIBER_INDEXES: &[Index] = &[
    Index {
        name: "status",
        columns: &["status"],
    },
    Index {
        name: "confirm_date",
        columns: &["confirm_date"],
    },
];

/// Schema of `{prefix}nml_subscribers`
#[derive(Clone)]
pub struct SubscriberSchema {
    prefix: String,
    table: ValidatedTableName,
    resolver: Arc<dyn AddressResolver>,
}

impl SubscriberSchema {
    pub fn new(prefix: &str, resolver: Arc<dyn AddressResolver>) -> Result<Self, ListHausError> {
        Ok(Self {
            prefix: prefix.to_string(),
            table: ValidatedTableName::prefixed(prefix, SUBSCRIBER_TABLE)?,
            resolver,
        })
    }
}

impl fmt::Debug for SubscriberSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriberSchema")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

impl TableSchema for SubscriberSchema {
    type Row = SubscriberRow;

    fn table_prefix(&self) -> &str {
        &self.prefix
    }

    fn table_name(&self) -> &str {
        self.table.as_str()
    }

    fn version(&self) -> &'static str {
        SUBSCRIBER_SCHEMA_VERSION
    }

    fn columns(&self) -> &'static [Column] {
        SUBSCRIBER_COLUMNS
    }

    fn column_defaults(&self) -> Record {
        record! {
            "email" => "",
            "first_name" => "",
            "last_name" => "",
            "status" => SubscriberStatus::Pending,
            "signup_date" => chrono::Utc::now().format(DATE_FORMAT).to_string(),
            "confirm_date" => None::<String>,
            "ip" => self.resolver.client_address(),
            "email_count" => 0,
        }
    }

    fn constraints(&self) -> &'static [&'static str] {
        &["UNIQUE (email)"]
    }

    fn indexes(&self) -> &'static [Index] {
        SUBSCRIBER_INDEXES
    }
}
