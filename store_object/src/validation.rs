//! Validation module
//!
//! Identifiers cannot be bound as parameters, so every table and column name
//! that reaches SQL text goes through these checks first.

use std::fmt;

/// Validation errors for database identifiers
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Name contains invalid characters (only alphanumeric and underscore allowed)
    InvalidCharacters(String),
    /// Name is too long
    TooLong {
        name: String,
        length: usize,
        max_length: usize,
    },
    /// Name is empty
    Empty,
    /// Name starts with invalid character (must start with letter or underscore)
    InvalidStartCharacter(String),
    /// Name is a reserved SQL keyword
    ReservedKeyword(String),
    /// Name is a valid identifier but not a column of the table
    UnknownColumn { table: String, column: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidCharacters(name) => {
                write!(f, "Invalid characters in name '{}': only alphanumeric characters and underscores are allowed", name)
            }
            ValidationError::TooLong {
                name,
                length,
                max_length,
            } => {
                write!(
                    f,
                    "Name '{}' is too long: {} characters (max {})",
                    name, length, max_length
                )
            }
            ValidationError::Empty => {
                write!(f, "Name cannot be empty")
            }
            ValidationError::InvalidStartCharacter(name) => {
                write!(f, "Name '{}' must start with a letter or underscore", name)
            }
            ValidationError::ReservedKeyword(name) => {
                write!(f, "Name '{}' is a reserved SQL keyword", name)
            }
            ValidationError::UnknownColumn { table, column } => {
                write!(f, "Table '{}' has no column '{}'", table, column)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// A validated table name that is safe to use in SQL queries
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatedTableName(String);

impl ValidatedTableName {
    /// Upper bound kept well inside what SQLite and MySQL both accept
    const MAX_LENGTH: usize = 64;

    /// Create a new validated table name
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        Self::validate_identifier(name)?;
        Ok(Self(name.to_string()))
    }

    /// Validate `prefix + base`, the way every table of an installation is named
    pub fn prefixed(prefix: &str, base: &str) -> Result<Self, ValidationError> {
        Self::new(&format!("{}{}", prefix, base))
    }

    /// Get the validated name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the validated name as a String
    pub fn into_string(self) -> String {
        self.0
    }

    /// Common validation logic for SQL identifiers
    fn validate_identifier(name: &str) -> Result<(), ValidationError> {
        let first_char = name.chars().next().ok_or(ValidationError::Empty)?;

        if name.len() > Self::MAX_LENGTH {
            return Err(ValidationError::TooLong {
                name: name.to_string(),
                length: name.len(),
                max_length: Self::MAX_LENGTH,
            });
        }

        if !first_char.is_ascii_alphabetic() && first_char != '_' {
            return Err(ValidationError::InvalidStartCharacter(name.to_string()));
        }

        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ValidationError::InvalidCharacters(name.to_string()));
        }

        if Self::is_reserved_keyword(name) {
            return Err(ValidationError::ReservedKeyword(name.to_string()));
        }

        Ok(())
    }

    /// Check if a name is a reserved SQL keyword
    fn is_reserved_keyword(name: &str) -> bool {
        const RESERVED_KEYWORDS: &[&str] = &[
            "SELECT",
            "INSERT",
            "UPDATE",
            "DELETE",
            "REPLACE",
            "FROM",
            "WHERE",
            "JOIN",
            "INNER",
            "LEFT",
            "RIGHT",
            "FULL",
            "OUTER",
            "CROSS",
            "NATURAL",
            "ON",
            "USING",
            "AS",
            "AND",
            "OR",
            "NOT",
            "NULL",
            "IS",
            "ISNULL",
            "NOTNULL",
            "TRUE",
            "FALSE",
            "CASE",
            "WHEN",
            "THEN",
            "ELSE",
            "END",
            "IF",
            "EXISTS",
            "IN",
            "LIKE",
            "GLOB",
            "REGEXP",
            "MATCH",
            "ESCAPE",
            "BETWEEN",
            "ORDER",
            "BY",
            "GROUP",
            "HAVING",
            "LIMIT",
            "OFFSET",
            "UNION",
            "INTERSECT",
            "EXCEPT",
            "ALL",
            "DISTINCT",
            "CREATE",
            "DROP",
            "ALTER",
            "TABLE",
            "INDEX",
            "VIEW",
            "TRIGGER",
            "PRIMARY",
            "KEY",
            "FOREIGN",
            "REFERENCES",
            "UNIQUE",
            "CHECK",
            "DEFAULT",
            "CONSTRAINT",
            "COLLATE",
            "COLUMN",
            "ADD",
            "RENAME",
            "TO",
            "INTO",
            "VALUES",
            "SET",
            "ATTACH",
            "DETACH",
            "PRAGMA",
            "VACUUM",
            "TRANSACTION",
            "BEGIN",
            "COMMIT",
            "ROLLBACK",
            "RETURNING",
            "AUTOINCREMENT",
        ];

        RESERVED_KEYWORDS.contains(&name.to_ascii_uppercase().as_str())
    }
}

impl fmt::Display for ValidatedTableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
