//! Subscriber table access
//!
//! Wraps a [`GenericStore`] over [`SubscriberSchema`] and adds the
//! subscriber-specific rules: email as natural key, id/email lookups,
//! and cached listings.

use signal_system::SignalManager;
use sqlx::SqlitePool;
use std::sync::Arc;
use store_object::{CacheParams, GenericStore, IdSet, TableSchema};
use tracing::{debug, warn};
use type_mapping::{FieldValue, Record, is_email, is_numeric, sanitize_text_field};

use super::collaborators::AddressResolver;
use super::query::SubscriberQuery;
use super::schema::{SubscriberRow, SubscriberSchema};
use super::SUBSCRIBER_TAG;
use crate::errors::ListHausError;

/// A subscriber addressed by id or by email
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriberKey {
    Id(i64),
    Email(String),
}

impl SubscriberKey {
    /// Read user input as an email when it looks like one, otherwise as an id.
    /// Input that is neither becomes id 0, which never resolves.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if is_email(input) {
            SubscriberKey::Email(input.to_string())
        } else {
            SubscriberKey::Id(FieldValue::from(input).as_i64().unwrap_or(0))
        }
    }

    fn lookup(&self) -> (&'static str, FieldValue) {
        match self {
            SubscriberKey::Id(id) => ("ID", FieldValue::Integer(*id)),
            SubscriberKey::Email(email) => ("email", FieldValue::from(email)),
        }
    }
}

impl From<i64> for SubscriberKey {
    fn from(id: i64) -> Self {
        SubscriberKey::Id(id)
    }
}

impl From<&str> for SubscriberKey {
    fn from(input: &str) -> Self {
        SubscriberKey::parse(input)
    }
}

/// Store for `{prefix}nml_subscribers`
#[derive(Debug, Clone)]
pub struct SubscriberStore {
    records: GenericStore<SubscriberSchema>,
}

impl SubscriberStore {
    pub fn new(
        pool: SqlitePool,
        prefix: &str,
        resolver: Arc<dyn AddressResolver>,
        signal_manager: Option<Arc<SignalManager>>,
        cache_params: Option<CacheParams>,
    ) -> Result<Self, ListHausError> {
        let schema = SubscriberSchema::new(prefix, resolver)?;
        Ok(Self {
            records: GenericStore::new(pool, schema, signal_manager, cache_params),
        })
    }

    /// The underlying record store
    pub fn records(&self) -> &GenericStore<SubscriberSchema> {
        &self.records
    }

    pub fn schema(&self) -> &SubscriberSchema {
        self.records.schema()
    }

    pub fn table_name(&self) -> &str {
        self.records.table_name()
    }

    /// Insert a subscriber, or update the one that already has this email.
    ///
    /// Returns the subscriber id, or `None` when the email is missing or
    /// invalid, or the write was rejected.
    pub async fn add(&self, data: &Record) -> Result<Option<i64>, ListHausError> {
        let email = data
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case("email"))
            .and_then(|(_, value)| value.to_text())
            .unwrap_or_default();

        if email.is_empty() || !is_email(&email) {
            warn!(table = self.table_name(), "add without a valid email");
            return Ok(None);
        }

        if let Some(existing) = self.get_subscriber_by("email", email.as_str()).await? {
            debug!(table = self.table_name(), id = existing.id, "add updates existing subscriber");
            let updated = self.records.update(existing.id, data, None).await?;
            return Ok(updated.then_some(existing.id));
        }

        Ok(self.records.insert(data, SUBSCRIBER_TAG).await?)
    }

    /// Update whitelisted columns of subscriber `id`
    pub async fn update(&self, id: i64, data: &Record) -> Result<bool, ListHausError> {
        Ok(self.records.update(id, data, None).await?)
    }

    /// Delete one subscriber by id or email.
    ///
    /// Only the subscriber row is removed; see
    /// [`delete_subscriber`](super::actions::delete_subscriber) for the
    /// cascading version.
    pub async fn delete(&self, key: impl Into<SubscriberKey>) -> Result<bool, ListHausError> {
        let key = key.into();
        let (field, value) = key.lookup();
        let Some(subscriber) = self.get_subscriber_by(field, value).await? else {
            return Ok(false);
        };

        Ok(self.records.delete(subscriber.id).await?)
    }

    /// Delete every subscriber in `ids`, returning the number removed
    pub async fn delete_by_ids(&self, ids: impl Into<IdSet>) -> Result<u64, ListHausError> {
        Ok(self.records.delete_by_ids(ids).await?)
    }

    /// Whether a subscriber with `field = value` exists.
    /// Pass `"email"` for the usual natural-key check.
    pub async fn exists(
        &self,
        value: impl Into<FieldValue>,
        field: &str,
    ) -> Result<bool, ListHausError> {
        if self.schema().column(field).is_none() {
            return Ok(false);
        }

        let id = self
            .records
            .get_column_by(self.schema().primary_key(), field, value)
            .await?;
        Ok(id.is_some_and(|id| !id.is_null()))
    }

    /// Look a subscriber up by `ID` or `email`. Any other field, a
    /// non-positive id or a malformed email finds nothing.
    pub async fn get_subscriber_by(
        &self,
        field: &str,
        value: impl Into<FieldValue>,
    ) -> Result<Option<SubscriberRow>, ListHausError> {
        let value = value.into();
        if value.is_empty() {
            return Ok(None);
        }

        match field {
            "ID" => {
                let text = value.to_text().unwrap_or_default();
                if !is_numeric(&text) {
                    return Ok(None);
                }
                let id = value
                    .as_i64()
                    .or_else(|| value.as_f64().map(|id| id.trunc() as i64))
                    .unwrap_or(0);
                if id < 1 {
                    return Ok(None);
                }
                Ok(self.records.get(id).await?)
            }
            "email" => {
                let text = value.to_text().unwrap_or_default();
                if !is_email(&text) {
                    return Ok(None);
                }
                let email = sanitize_text_field(text.trim());
                Ok(self.records.get_by("email", email).await?)
            }
            _ => Ok(None),
        }
    }

    /// List subscribers.
    ///
    /// Results are cached per normalized query for the configured TTL and
    /// are not refreshed by writes, so a listing may be stale until then.
    pub async fn get_subscribers(
        &self,
        query: &SubscriberQuery,
    ) -> Result<Vec<SubscriberRow>, ListHausError> {
        let query = query.normalized(self.schema());
        Ok(self
            .records
            .find_cached(&query, query.to_query_builder())
            .await?)
    }

    /// Number of subscribers matching `query`, ignoring pagination. Never cached.
    pub async fn count(&self, query: &SubscriberQuery) -> Result<i64, ListHausError> {
        let query = query.normalized(self.schema());
        Ok(self.records.count_where(&query.to_query_builder()).await?)
    }

    /// Create or upgrade the subscriber table
    pub async fn create_table(&self) -> Result<(), ListHausError> {
        Ok(self.records.create_table().await?)
    }

    pub async fn is_installed(&self) -> Result<bool, ListHausError> {
        Ok(self.records.is_installed().await?)
    }

    pub async fn schema_version(&self) -> Result<Option<String>, ListHausError> {
        Ok(self.records.schema_version().await?)
    }
}
