//! Query filter definitions
//!
//! Filters carry column names and [`FieldValue`] parameters. Names are checked
//! against the table schema by the store before any SQL is generated.

use type_mapping::FieldValue;

/// Query condition operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOperator {
    Eq,        // =
    Ne,        // !=
    Gt,        // >
    Gte,       // >=
    Lt,        // <
    Lte,       // <=
    Like,      // LIKE (ASCII case insensitive in SQLite)
    In,        // IN
    NotIn,     // NOT IN
    IsNull,    // IS NULL
    IsNotNull, // IS NOT NULL
}

/// Single condition in WHERE clause
#[derive(Debug, Clone, PartialEq)]
pub struct QueryCondition {
    pub field: String,
    pub operator: QueryOperator,
    /// One value for comparisons, any number for IN / NOT IN, none for null checks
    pub values: Vec<FieldValue>,
}

/// Logical operators for combining conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

/// Query filter that can be nested
#[derive(Debug, Clone, PartialEq)]
pub enum QueryFilter {
    Condition(QueryCondition),
    Group {
        operator: LogicalOperator,
        filters: Vec<QueryFilter>,
    },
}

impl QueryFilter {
    /// Create a simple condition
    pub fn condition(field: &str, operator: QueryOperator, values: Vec<FieldValue>) -> Self {
        Self::Condition(QueryCondition {
            field: field.to_string(),
            operator,
            values,
        })
    }

    /// Create AND group
    pub fn and(filters: Vec<QueryFilter>) -> Self {
        Self::Group {
            operator: LogicalOperator::And,
            filters,
        }
    }

    /// Create OR group
    pub fn or(filters: Vec<QueryFilter>) -> Self {
        Self::Group {
            operator: LogicalOperator::Or,
            filters,
        }
    }

    pub fn eq(field: &str, value: impl Into<FieldValue>) -> Self {
        Self::condition(field, QueryOperator::Eq, vec![value.into()])
    }

    pub fn ne(field: &str, value: impl Into<FieldValue>) -> Self {
        Self::condition(field, QueryOperator::Ne, vec![value.into()])
    }

    pub fn gt(field: &str, value: impl Into<FieldValue>) -> Self {
        Self::condition(field, QueryOperator::Gt, vec![value.into()])
    }

    pub fn gte(field: &str, value: impl Into<FieldValue>) -> Self {
        Self::condition(field, QueryOperator::Gte, vec![value.into()])
    }

    pub fn lt(field: &str, value: impl Into<FieldValue>) -> Self {
        Self::condition(field, QueryOperator::Lt, vec![value.into()])
    }

    pub fn lte(field: &str, value: impl Into<FieldValue>) -> Self {
        Self::condition(field, QueryOperator::Lte, vec![value.into()])
    }

    /// LIKE condition with a caller-supplied pattern
    pub fn like(field: &str, pattern: &str) -> Self {
        Self::condition(field, QueryOperator::Like, vec![FieldValue::from(pattern)])
    }

    /// Substring match, `LIKE %term%`
    pub fn contains(field: &str, term: &str) -> Self {
        Self::like(field, &format!("%{}%", term))
    }

    /// IN condition
    pub fn in_values<I, V>(field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FieldValue>,
    {
        Self::condition(
            field,
            QueryOperator::In,
            values.into_iter().map(Into::into).collect(),
        )
    }

    /// NOT IN condition
    pub fn not_in_values<I, V>(field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FieldValue>,
    {
        Self::condition(
            field,
            QueryOperator::NotIn,
            values.into_iter().map(Into::into).collect(),
        )
    }

    pub fn is_null(field: &str) -> Self {
        Self::condition(field, QueryOperator::IsNull, Vec::new())
    }

    pub fn is_not_null(field: &str) -> Self {
        Self::condition(field, QueryOperator::IsNotNull, Vec::new())
    }

    /// Every column name this filter references, nested groups included
    pub fn fields(&self) -> Vec<&str> {
        match self {
            QueryFilter::Condition(condition) => vec![condition.field.as_str()],
            QueryFilter::Group { filters, .. } => {
                filters.iter().flat_map(|filter| filter.fields()).collect()
            }
        }
    }
}
