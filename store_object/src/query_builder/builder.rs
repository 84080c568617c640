//! Query builder for filtered, ordered and paginated reads

use crate::query_builder::filter::QueryFilter;
use crate::query_builder::ordering::SortOrder;
use crate::query_builder::sql_generation::SqlGenerator;
use type_mapping::FieldValue;

/// Query builder for constructing database queries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryBuilder {
    pub(crate) conditions: Vec<QueryFilter>,
    pub(crate) order_by: Vec<(String, SortOrder)>,
    pub(crate) limit: Option<i64>,
    pub(crate) offset: Option<i64>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter condition
    pub fn filter(mut self, filter: QueryFilter) -> Self {
        self.conditions.push(filter);
        self
    }

    /// Add multiple filters (combined with AND)
    pub fn filters(mut self, filters: Vec<QueryFilter>) -> Self {
        self.conditions.extend(filters);
        self
    }

    /// Add ordering
    pub fn order_by(mut self, field: &str, order: SortOrder) -> Self {
        self.order_by.push((field.to_string(), order));
        self
    }

    /// Add limit
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Add offset
    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// The same predicate without ordering or pagination
    pub fn without_pagination(&self) -> Self {
        Self {
            conditions: self.conditions.clone(),
            ..Self::default()
        }
    }

    /// Column names referenced by filters and ordering
    pub fn fields(&self) -> Vec<&str> {
        self.conditions
            .iter()
            .flat_map(|filter| filter.fields())
            .chain(self.order_by.iter().map(|(field, _)| field.as_str()))
            .collect()
    }

    /// Build WHERE clause
    pub fn build_where_clause(&self) -> (String, Vec<FieldValue>) {
        SqlGenerator::build_where_clause(&self.conditions)
    }

    /// Build ORDER BY clause
    pub fn build_order_clause(&self) -> String {
        SqlGenerator::build_order_clause(&self.order_by)
    }

    /// Build LIMIT/OFFSET clause
    pub fn build_limit_clause(&self) -> String {
        SqlGenerator::build_limit_clause(self.limit, self.offset)
    }

    /// Build complete query parts (WHERE, ORDER BY, LIMIT, Values)
    pub fn build(&self) -> (String, String, String, Vec<FieldValue>) {
        let (where_clause, values) = self.build_where_clause();
        let order_clause = self.build_order_clause();
        let limit_clause = self.build_limit_clause();

        (where_clause, order_clause, limit_clause, values)
    }
}
