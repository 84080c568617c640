//! Table schema descriptors
//!
//! A [`TableSchema`] is the single source of truth for what a store may
//! write: every insert and update is whitelisted against [`TableSchema::columns`]
//! and coerced to each column's [`FieldKind`].

use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::FromRow;
use std::fmt::Debug;
use type_mapping::{coerce_value, FieldKind, FieldValue, Record};

/// One column of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Type and constraint text used in `CREATE TABLE`, e.g. `VARCHAR(50) NOT NULL`
    pub definition: &'static str,
    /// Whether the column may be written as NULL
    pub nullable: bool,
}

impl Column {
    pub const fn new(name: &'static str, kind: FieldKind, definition: &'static str) -> Self {
        Self {
            name,
            kind,
            definition,
            nullable: false,
        }
    }

    pub const fn nullable(self) -> Self {
        Self {
            nullable: true,
            ..self
        }
    }
}

/// Secondary index, created as `{table}_{name}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Index {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

/// Schema of one table
pub trait TableSchema: Send + Sync + 'static {
    /// Row type read back from the table
    type Row: for<'r> FromRow<'r, SqliteRow>
        + Serialize
        + DeserializeOwned
        + Clone
        + Debug
        + Send
        + Sync
        + Unpin
        + 'static;

    /// Installation-wide table prefix
    fn table_prefix(&self) -> &str;

    /// Full, validated table name including the prefix
    fn table_name(&self) -> &str;

    fn primary_key(&self) -> &'static str {
        "ID"
    }

    /// Schema version recorded by `create_table`
    fn version(&self) -> &'static str;

    /// All columns, primary key included, in table order
    fn columns(&self) -> &'static [Column];

    /// Values merged under caller data on insert and used as coercion fallbacks
    fn column_defaults(&self) -> Record;

    /// Table constraints appended after the column definitions
    fn constraints(&self) -> &'static [&'static str] {
        &[]
    }

    fn indexes(&self) -> &'static [Index] {
        &[]
    }

    /// Look a column up by name, ignoring ASCII case
    fn column(&self, name: &str) -> Option<&'static Column> {
        self.columns()
            .iter()
            .find(|column| column.name.eq_ignore_ascii_case(name))
    }

    fn create_table_sql(&self) -> String {
        let mut parts: Vec<String> = self
            .columns()
            .iter()
            .map(|column| format!("{} {}", column.name, column.definition))
            .collect();
        parts.extend(self.constraints().iter().map(|c| c.to_string()));

        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            self.table_name(),
            parts.join(", ")
        )
    }

    /// Keep only known, writable columns, keyed by their canonical names.
    ///
    /// The primary key is engine-generated and never written.
    fn whitelist(&self, data: &Record) -> Record {
        let primary_key = self.primary_key();
        data.iter()
            .filter_map(|(key, value)| {
                self.column(key)
                    .filter(|column| column.name != primary_key)
                    .map(|column| (column.name.to_string(), value.clone()))
            })
            .collect()
    }

    /// Whitelist `data` and coerce each value to its column kind, in table order
    fn coerce(&self, data: &Record) -> Vec<(&'static Column, FieldValue)> {
        let data = self.whitelist(data);
        let defaults = self.column_defaults();

        self.columns()
            .iter()
            .filter_map(|column| {
                let value = data.get(column.name)?;
                let default = defaults.get(column.name).cloned().unwrap_or(FieldValue::Null);
                let coerced = if value.is_null() && !column.nullable {
                    default
                } else {
                    coerce_value(column.kind, value, &default)
                };
                Some((column, coerced))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use type_mapping::record;

    #[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
    struct Row {
        #[sqlx(rename = "ID")]
        #[serde(rename = "ID")]
        id: i64,
    }

    struct Widgets;

    const COLUMNS: &[Column] = &[
        Column::new("ID", FieldKind::Integer, "INTEGER PRIMARY KEY AUTOINCREMENT"),
        Column::new("name", FieldKind::Text, "TEXT NOT NULL DEFAULT ''"),
        Column::new("weight", FieldKind::Float, "REAL NOT NULL DEFAULT 0"),
        Column::new("stock", FieldKind::Integer, "INTEGER NOT NULL DEFAULT 0"),
        Column::new("note", FieldKind::Text, "TEXT").nullable(),
    ];

    impl TableSchema for Widgets {
        type Row = Row;

        fn table_prefix(&self) -> &str {
            "wp_"
        }

        fn table_name(&self) -> &str {
            "wp_widgets"
        }

        fn version(&self) -> &'static str {
            "1.0"
        }

        fn columns(&self) -> &'static [Column] {
            COLUMNS
        }

        fn column_defaults(&self) -> Record {
            record! {
                "name" => "",
                "weight" => 0.0,
                "stock" => 5,
            }
        }

        fn constraints(&self) -> &'static [&'static str] {
            &["UNIQUE (name)"]
        }
    }

    #[test]
    fn column_lookup_ignores_case() {
        assert_eq!(Widgets.column("NAME").map(|c| c.name), Some("name"));
        assert!(Widgets.column("missing").is_none());
    }

    #[test]
    fn whitelist_drops_unknown_keys_and_primary_key() {
        let data = record! {
            "ID" => 99,
            "Name" => "bolt",
            "colour" => "red",
        };

        assert_eq!(Widgets.whitelist(&data), record! { "name" => "bolt" });
    }

    #[test]
    fn coerce_orders_by_table_and_falls_back_to_defaults() {
        let data = record! {
            "stock" => "lots",
            "note" => FieldValue::Null,
            "weight" => "2.5",
            "name" => FieldValue::Null,
        };

        let coerced: Vec<(&str, FieldValue)> = Widgets
            .coerce(&data)
            .into_iter()
            .map(|(column, value)| (column.name, value))
            .collect();

        assert_eq!(
            coerced,
            vec![
                ("name", FieldValue::from("")),
                ("weight", FieldValue::Float(2.5)),
                ("stock", FieldValue::Integer(5)),
                ("note", FieldValue::Null),
            ]
        );
    }

    #[test]
    fn create_table_sql_lists_columns_then_constraints() {
        assert_eq!(
            Widgets.create_table_sql(),
            "CREATE TABLE IF NOT EXISTS wp_widgets (ID INTEGER PRIMARY KEY AUTOINCREMENT, \
             name TEXT NOT NULL DEFAULT '', weight REAL NOT NULL DEFAULT 0, \
             stock INTEGER NOT NULL DEFAULT 0, note TEXT, UNIQUE (name))"
        );
    }
}
