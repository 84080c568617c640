//! Hydrated subscriber entity
//!
//! A [`Subscriber`] starts unhydrated (id 0). Loading or creating it fills
//! in the row; every successful write re-reads the row so the entity never
//! drifts from storage.

use async_trait::async_trait;
use signal_system::{DatabaseEvent, EventType, record_to_payload};
use std::fmt;
use std::str::FromStr;
use store_object::TableSchema;
use type_mapping::{FieldValue, Record, is_email, is_numeric, record, sanitize_value};

use super::SUBSCRIBER_TAG;
use super::collaborators::{SubscriberServices, Term, TermRef};
use super::schema::SubscriberRow;
use super::store::SubscriberStore;
use crate::errors::ListHausError;

const NOTES_META_KEY: &str = "notes";

/// Derived subscriber data that lives outside the subscriber table
#[async_trait]
pub trait SubscriberProperties {
    async fn lists(&self) -> Result<Vec<Term>, ListHausError>;

    async fn tags(&self) -> Result<Vec<Term>, ListHausError>;

    async fn notes(&self) -> Result<String, ListHausError>;
}

/// Names of the derived properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Lists,
    Tags,
    Notes,
}

impl FromStr for Property {
    type Err = ListHausError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lists" => Ok(Property::Lists),
            "tags" => Ok(Property::Tags),
            "notes" => Ok(Property::Notes),
            other => Err(ListHausError::UnknownProperty(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Terms(Vec<Term>),
    Text(String),
}

pub struct Subscriber {
    id: i64,
    email: String,
    first_name: String,
    last_name: String,
    status: String,
    signup_date: String,
    confirm_date: Option<String>,
    ip: String,
    email_count: i64,
    store: SubscriberStore,
    services: SubscriberServices,
}

impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("status", &self.status)
            .field("email_count", &self.email_count)
            .finish_non_exhaustive()
    }
}

impl Subscriber {
    /// An unhydrated subscriber, ready for [`create`](Self::create)
    pub fn new(store: SubscriberStore, services: SubscriberServices) -> Self {
        Self {
            id: 0,
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            status: String::new(),
            signup_date: String::new(),
            confirm_date: None,
            ip: String::new(),
            email_count: 0,
            store,
            services,
        }
    }

    /// Load by id (all-digit input) or email. A miss leaves the subscriber
    /// unhydrated.
    pub async fn load(
        store: SubscriberStore,
        services: SubscriberServices,
        id_or_email: &str,
    ) -> Result<Self, ListHausError> {
        let field = if is_numeric(id_or_email) { "ID" } else { "email" };
        let row = store.get_subscriber_by(field, id_or_email).await?;

        let mut subscriber = Self::new(store, services);
        if let Some(row) = row {
            subscriber.hydrate(row);
        }
        Ok(subscriber)
    }

    fn hydrate(&mut self, row: SubscriberRow) {
        self.id = row.id;
        self.email = row.email;
        self.first_name = row.first_name;
        self.last_name = row.last_name;
        self.status = row.status;
        self.signup_date = row.signup_date;
        self.confirm_date = row.confirm_date;
        self.ip = row.ip;
        self.email_count = row.email_count;
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn is_hydrated(&self) -> bool {
        self.id > 0
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn signup_date(&self) -> &str {
        &self.signup_date
    }

    pub fn confirm_date(&self) -> Option<&str> {
        self.confirm_date.as_deref()
    }

    pub fn ip(&self) -> &str {
        &self.ip
    }

    pub fn email_count(&self) -> i64 {
        self.email_count
    }

    fn event(&self, event_type: EventType) -> DatabaseEvent {
        DatabaseEvent::new(event_type, self.store.table_name()).with_tag(SUBSCRIBER_TAG)
    }

    fn emit(&self, event: DatabaseEvent) {
        self.store.records().emit_signal(event);
    }

    /// Whitelist `data` and scrub every value for its column
    pub fn sanitize_columns(&self, data: &Record) -> Record {
        let schema = self.store.schema();
        let defaults = schema.column_defaults();

        schema
            .whitelist(data)
            .into_iter()
            .filter_map(|(key, value)| {
                let column = schema.column(&key)?;
                let default = defaults.get(column.name).cloned().unwrap_or(FieldValue::Null);
                Some((key, sanitize_value(column.name, column.kind, &value, &default)))
            })
            .collect()
    }

    /// Persist a new subscriber, or update the one that already has this
    /// email, and hydrate from the stored row.
    ///
    /// Returns `None` when already hydrated, when `data` is empty or its
    /// email is invalid, or when the write failed.
    pub async fn create(&mut self, data: &Record) -> Result<Option<i64>, ListHausError> {
        if self.id != 0 || data.is_empty() {
            return Ok(None);
        }

        let args = self.sanitize_columns(data);
        let email = args
            .get("email")
            .and_then(FieldValue::to_text)
            .unwrap_or_default();
        if email.is_empty() || !is_email(&email) {
            return Ok(None);
        }

        self.emit(self.event(EventType::PreCreate).with_payload_fields(record_to_payload(&args)));

        let mut created = None;
        if self.store.add(&args).await?.is_some() {
            if let Some(row) = self.store.get_subscriber_by("email", email.as_str()).await? {
                self.hydrate(row);
                created = Some(self.id);
            }
        }

        let mut event = self
            .event(EventType::PostCreate)
            .with_payload_fields(record_to_payload(&args))
            .with_payload("created", created.unwrap_or(0));
        if let Some(id) = created {
            event = event.with_record_id(id);
        }
        self.emit(event);

        Ok(created)
    }

    /// Write `data` to this subscriber's row and re-hydrate on success
    pub async fn update(&mut self, data: &Record) -> Result<bool, ListHausError> {
        if data.is_empty() {
            return Ok(false);
        }

        let args = self.sanitize_columns(data);

        self.emit(
            self.event(EventType::PreUpdate)
                .with_record_id(self.id)
                .with_payload_fields(record_to_payload(&args)),
        );

        let updated = self.store.update(self.id, &args).await?;
        if updated {
            if let Some(row) = self.store.get_subscriber_by("ID", self.id).await? {
                self.hydrate(row);
            }
        }

        self.emit(
            self.event(EventType::PostUpdate)
                .with_record_id(self.id)
                .with_payload_fields(record_to_payload(&args))
                .with_payload("updated", i64::from(updated)),
        );

        Ok(updated)
    }

    /// Add `amount` to the sent-email counter.
    ///
    /// `amount` must be a non-negative whole number that keeps the counter
    /// within `i64`. Returns the counter afterwards, or `None` for an
    /// unusable amount.
    pub async fn increase_email_count(
        &mut self,
        amount: impl Into<FieldValue>,
    ) -> Result<Option<i64>, ListHausError> {
        let Some(count) = amount.into().as_i64().filter(|count| *count >= 0) else {
            return Ok(None);
        };
        let Some(new_total) = self.email_count.checked_add(count) else {
            return Ok(None);
        };

        self.emit(
            self.event(EventType::PreIncreaseEmailCount)
                .with_record_id(self.id)
                .with_payload("count", count),
        );

        if self.update(&record! { "email_count" => new_total }).await? {
            self.email_count = new_total;
        }

        self.emit(
            self.event(EventType::PostIncreaseEmailCount)
                .with_record_id(self.id)
                .with_payload("email_count", self.email_count)
                .with_payload("count", count),
        );

        Ok(Some(self.email_count))
    }

    /// Read a derived property by name
    pub async fn property(&self, property: Property) -> Result<PropertyValue, ListHausError> {
        Ok(match property {
            Property::Lists => PropertyValue::Terms(self.lists().await?),
            Property::Tags => PropertyValue::Terms(self.tags().await?),
            Property::Notes => PropertyValue::Text(self.notes().await?),
        })
    }

    pub async fn is_on_list(&self, list: impl Into<TermRef>) -> Result<bool, ListHausError> {
        self.services.lists.contains(self.id, &list.into()).await
    }

    pub async fn add_to_list(&self, list: impl Into<TermRef>) -> Result<bool, ListHausError> {
        self.services.lists.add(self.id, list.into()).await
    }

    pub async fn has_tag(&self, tag: impl Into<TermRef>) -> Result<bool, ListHausError> {
        self.services.tags.contains(self.id, &tag.into()).await
    }

    pub async fn tag(&self, tag: impl Into<TermRef>) -> Result<bool, ListHausError> {
        self.services.tags.add(self.id, tag.into()).await
    }

    pub async fn get_meta(&self, key: &str) -> Result<Vec<String>, ListHausError> {
        self.services.meta.get(self.id, key).await
    }

    pub async fn get_single_meta(&self, key: &str) -> Result<Option<String>, ListHausError> {
        self.services.meta.get_single(self.id, key).await
    }

    pub async fn add_meta(
        &self,
        key: &str,
        value: &str,
        unique: bool,
    ) -> Result<bool, ListHausError> {
        self.services.meta.add(self.id, key, value, unique).await
    }

    pub async fn update_meta(
        &self,
        key: &str,
        value: &str,
        prev_value: Option<&str>,
    ) -> Result<bool, ListHausError> {
        self.services.meta.update(self.id, key, value, prev_value).await
    }

    pub async fn delete_meta(&self, key: &str, value: Option<&str>) -> Result<bool, ListHausError> {
        self.services.meta.delete(self.id, key, value).await
    }
}

#[async_trait]
impl SubscriberProperties for Subscriber {
    async fn lists(&self) -> Result<Vec<Term>, ListHausError> {
        self.services.lists.terms_for(self.id).await
    }

    async fn tags(&self) -> Result<Vec<Term>, ListHausError> {
        self.services.tags.terms_for(self.id).await
    }

    async fn notes(&self) -> Result<String, ListHausError> {
        Ok(self
            .get_single_meta(NOTES_META_KEY)
            .await?
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_names_parse() {
        assert_eq!("lists".parse::<Property>().unwrap(), Property::Lists);
        assert_eq!("notes".parse::<Property>().unwrap(), Property::Notes);
        assert!(matches!(
            "password".parse::<Property>(),
            Err(ListHausError::UnknownProperty(name)) if name == "password"
        ));
    }
}
