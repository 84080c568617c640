//! SQL text generation for the query builder
//!
//! Values never appear in the generated text: every value is a `?`
//! placeholder, returned alongside the SQL in binding order.

use crate::query_builder::filter::{LogicalOperator, QueryCondition, QueryFilter, QueryOperator};
use crate::query_builder::ordering::SortOrder;
use type_mapping::FieldValue;

pub struct SqlGenerator;

impl SqlGenerator {
    /// Build WHERE clause from conditions
    pub fn build_where_clause(conditions: &[QueryFilter]) -> (String, Vec<FieldValue>) {
        if conditions.is_empty() {
            return (String::new(), Vec::new());
        }

        let mut values = Vec::new();

        let conditions_sql = conditions
            .iter()
            .map(|condition| Self::build_condition_sql(condition, &mut values))
            .collect::<Vec<_>>()
            .join(" AND ");

        (format!("WHERE {}", conditions_sql), values)
    }

    fn build_condition_sql(filter: &QueryFilter, values: &mut Vec<FieldValue>) -> String {
        match filter {
            QueryFilter::Condition(condition) => Self::build_single_condition_sql(condition, values),
            QueryFilter::Group { operator, filters } => {
                if filters.is_empty() {
                    // Neutral element of the group
                    return match operator {
                        LogicalOperator::And => "1=1".to_string(),
                        LogicalOperator::Or => "1=0".to_string(),
                    };
                }

                let operator_str = match operator {
                    LogicalOperator::And => " AND ",
                    LogicalOperator::Or => " OR ",
                };

                let group_conditions = filters
                    .iter()
                    .map(|f| Self::build_condition_sql(f, values))
                    .collect::<Vec<_>>()
                    .join(operator_str);

                format!("({})", group_conditions)
            }
        }
    }

    fn build_single_condition_sql(condition: &QueryCondition, values: &mut Vec<FieldValue>) -> String {
        let field = &condition.field;

        let comparison = match condition.operator {
            QueryOperator::Eq => "=",
            QueryOperator::Ne => "!=",
            QueryOperator::Gt => ">",
            QueryOperator::Gte => ">=",
            QueryOperator::Lt => "<",
            QueryOperator::Lte => "<=",
            QueryOperator::Like => "LIKE",
            QueryOperator::In => return Self::build_in_sql(field, "IN", "1=0", condition, values),
            QueryOperator::NotIn => {
                return Self::build_in_sql(field, "NOT IN", "1=1", condition, values)
            }
            QueryOperator::IsNull => return format!("{} IS NULL", field),
            QueryOperator::IsNotNull => return format!("{} IS NOT NULL", field),
        };

        match condition.values.first() {
            // `= NULL` never matches, compare nulls the SQL way
            Some(FieldValue::Null) | None if condition.operator == QueryOperator::Eq => {
                format!("{} IS NULL", field)
            }
            Some(FieldValue::Null) | None if condition.operator == QueryOperator::Ne => {
                format!("{} IS NOT NULL", field)
            }
            Some(value) => {
                values.push(value.clone());
                format!("{} {} ?", field, comparison)
            }
            None => "1=0".to_string(),
        }
    }

    fn build_in_sql(
        field: &str,
        keyword: &str,
        when_empty: &str,
        condition: &QueryCondition,
        values: &mut Vec<FieldValue>,
    ) -> String {
        if condition.values.is_empty() {
            return when_empty.to_string();
        }

        let placeholders = vec!["?"; condition.values.len()].join(", ");
        values.extend(condition.values.iter().cloned());
        format!("{} {} ({})", field, keyword, placeholders)
    }

    /// Build ORDER BY clause
    pub fn build_order_clause(order_by: &[(String, SortOrder)]) -> String {
        if order_by.is_empty() {
            return String::new();
        }

        let order_items: Vec<String> = order_by
            .iter()
            .map(|(field, order)| format!("{} {}", field, order.to_sql()))
            .collect();

        format!("ORDER BY {}", order_items.join(", "))
    }

    /// Build LIMIT/OFFSET clause.
    ///
    /// SQLite only accepts OFFSET after LIMIT, so an offset without a limit
    /// uses `LIMIT -1` (no upper bound).
    pub fn build_limit_clause(limit: Option<i64>, offset: Option<i64>) -> String {
        match (limit, offset) {
            (None, None) => String::new(),
            (Some(limit), None) => format!("LIMIT {}", limit),
            (limit, Some(offset)) => format!("LIMIT {} OFFSET {}", limit.unwrap_or(-1), offset),
        }
    }
}
