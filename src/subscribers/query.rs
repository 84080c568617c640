//! Subscriber listing arguments

use serde::{Deserialize, Serialize};
use store_object::{QueryBuilder, QueryFilter, SortOrder, TableSchema};

/// A single value or a set of values to match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

impl From<i64> for OneOrMany<i64> {
    fn from(id: i64) -> Self {
        OneOrMany::One(id)
    }
}

impl From<Vec<i64>> for OneOrMany<i64> {
    fn from(ids: Vec<i64>) -> Self {
        OneOrMany::Many(ids)
    }
}

impl<const N: usize> From<[i64; N]> for OneOrMany<i64> {
    fn from(ids: [i64; N]) -> Self {
        OneOrMany::Many(ids.to_vec())
    }
}

impl From<&str> for OneOrMany<String> {
    fn from(value: &str) -> Self {
        OneOrMany::One(value.to_string())
    }
}

impl From<String> for OneOrMany<String> {
    fn from(value: String) -> Self {
        OneOrMany::One(value)
    }
}

impl From<Vec<String>> for OneOrMany<String> {
    fn from(values: Vec<String>) -> Self {
        OneOrMany::Many(values)
    }
}

impl From<Vec<&str>> for OneOrMany<String> {
    fn from(values: Vec<&str>) -> Self {
        OneOrMany::Many(values.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for OneOrMany<String> {
    fn from(values: [&str; N]) -> Self {
        OneOrMany::Many(values.iter().map(|v| v.to_string()).collect())
    }
}

/// Arguments for [`SubscriberStore::get_subscribers`](super::SubscriberStore::get_subscribers)
/// and [`SubscriberStore::count`](super::SubscriberStore::count).
///
/// Empty filters are ignored. `number` below 1 lists everything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriberQuery {
    pub number: i64,
    pub offset: i64,
    pub orderby: String,
    pub order: SortOrder,
    #[serde(rename = "ID")]
    pub id: Option<OneOrMany<i64>>,
    pub email: Option<OneOrMany<String>>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub status: Option<OneOrMany<String>>,
}

impl Default for SubscriberQuery {
    fn default() -> Self {
        Self {
            number: 20,
            offset: 0,
            orderby: "ID".to_string(),
            order: SortOrder::Desc,
            id: None,
            email: None,
            first_name: None,
            last_name: None,
            status: None,
        }
    }
}

impl SubscriberQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn number(mut self, number: i64) -> Self {
        self.number = number;
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    pub fn orderby(mut self, column: &str) -> Self {
        self.orderby = column.to_string();
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn id(mut self, id: impl Into<OneOrMany<i64>>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn email(mut self, email: impl Into<OneOrMany<String>>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn first_name(mut self, first_name: &str) -> Self {
        self.first_name = Some(first_name.to_string());
        self
    }

    pub fn last_name(mut self, last_name: &str) -> Self {
        self.last_name = Some(last_name.to_string());
        self
    }

    pub fn status(mut self, status: impl Into<OneOrMany<String>>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Canonical form: empty filters dropped, unknown ordering replaced by
    /// `ID`, unbounded listings spelled as `number = 0`. Two queries that
    /// select the same rows normalize to the same value.
    pub fn normalized<S: TableSchema>(&self, schema: &S) -> Self {
        let orderby = schema
            .column(&self.orderby)
            .map_or(schema.primary_key(), |column| column.name);

        let strings = |values: &Option<OneOrMany<String>>| {
            let values: Vec<String> = values
                .clone()
                .map(OneOrMany::into_vec)
                .unwrap_or_default()
                .into_iter()
                .filter(|v| !v.is_empty())
                .collect();
            (!values.is_empty()).then_some(OneOrMany::Many(values))
        };
        let text = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());

        let id = match &self.id {
            Some(OneOrMany::One(id)) if *id != 0 => Some(OneOrMany::Many(vec![*id])),
            Some(OneOrMany::Many(ids)) if !ids.is_empty() => Some(OneOrMany::Many(ids.clone())),
            _ => None,
        };

        Self {
            number: self.number.max(0),
            offset: self.offset.max(0),
            orderby: orderby.to_string(),
            order: self.order,
            id,
            email: strings(&self.email),
            first_name: text(&self.first_name),
            last_name: text(&self.last_name),
            status: strings(&self.status),
        }
    }

    /// Query builder selecting the rows this (normalized) query describes
    pub fn to_query_builder(&self) -> QueryBuilder {
        let mut filters = Vec::new();

        if let Some(ids) = &self.id {
            filters.push(QueryFilter::in_values("ID", ids.clone().into_vec()));
        }
        if let Some(emails) = &self.email {
            filters.push(QueryFilter::in_values("email", emails.clone().into_vec()));
        }
        if let Some(first_name) = &self.first_name {
            filters.push(QueryFilter::contains("first_name", first_name));
        }
        if let Some(last_name) = &self.last_name {
            filters.push(QueryFilter::contains("last_name", last_name));
        }
        if let Some(statuses) = &self.status {
            filters.push(QueryFilter::in_values("status", statuses.clone().into_vec()));
        }

        let mut builder = QueryBuilder::new()
            .filters(filters)
            .order_by(&self.orderby, self.order);
        if self.number > 0 {
            builder = builder.limit(self.number);
        }
        if self.offset > 0 {
            builder = builder.offset(self.offset);
        }
        builder
    }
}
