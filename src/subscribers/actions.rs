//! Operations spanning the subscriber table and its collaborators

use signal_system::{DatabaseEvent, EventType};
use tracing::warn;
use type_mapping::{FieldValue, Record};

use super::SUBSCRIBER_TAG;
use super::collaborators::SubscriberServices;
use super::store::{SubscriberKey, SubscriberStore};
use super::subscriber::Subscriber;
use crate::errors::ListHausError;

/// Submitted subscriber edit form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriberForm {
    /// Existing subscriber to edit; 0 creates a new one
    pub id: i64,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub lists: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
}

impl SubscriberForm {
    /// Split a comma-separated field into trimmed, non-empty names
    pub fn split_names(input: &str) -> Vec<String> {
        clean_names(input.split(','))
    }

    /// Column data for the subscriber row. Manually created subscribers get
    /// no IP address.
    pub fn to_record(&self) -> Record {
        let mut data = Record::new();
        for (column, value) in [
            ("email", &self.email),
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("status", &self.status),
        ] {
            if let Some(value) = value {
                data.insert(column.to_string(), FieldValue::from(value));
            }
        }
        if self.id <= 0 {
            data.insert("ip".to_string(), FieldValue::from(""));
        }
        data
    }
}

fn clean_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    names
        .into_iter()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Save a subscriber form: create or update the row, then write notes and
/// replace list and tag membership.
///
/// Returns the subscriber id; a failed write is [`ListHausError::InsertFailed`].
pub async fn insert_subscriber(
    store: &SubscriberStore,
    services: &SubscriberServices,
    form: &SubscriberForm,
) -> Result<i64, ListHausError> {
    let data = form.to_record();

    let subscriber = if form.id > 0 {
        let mut subscriber =
            Subscriber::load(store.clone(), services.clone(), &form.id.to_string()).await?;
        if !subscriber.is_hydrated() {
            warn!(id = form.id, "edit of unknown subscriber");
            return Err(ListHausError::InsertFailed);
        }
        if !data.is_empty() && !subscriber.update(&data).await? {
            return Err(ListHausError::InsertFailed);
        }
        subscriber
    } else {
        let mut subscriber = Subscriber::new(store.clone(), services.clone());
        if subscriber.create(&data).await?.is_none() {
            return Err(ListHausError::InsertFailed);
        }
        subscriber
    };
    let id = subscriber.id();

    if let Some(notes) = &form.notes {
        subscriber.update_meta("notes", notes, None).await?;
    }
    if let Some(lists) = &form.lists {
        let names = clean_names(lists.iter().map(String::as_str));
        services.lists.replace(id, &names).await?;
    }
    if let Some(tags) = &form.tags {
        let names = clean_names(tags.iter().map(String::as_str));
        services.tags.replace(id, &names).await?;
    }

    Ok(id)
}

/// Delete a subscriber together with its meta data and list and tag
/// membership. Returns `false` when the subscriber does not exist.
pub async fn delete_subscriber(
    store: &SubscriberStore,
    services: &SubscriberServices,
    key: impl Into<SubscriberKey>,
) -> Result<bool, ListHausError> {
    let row = match key.into() {
        SubscriberKey::Id(id) => store.get_subscriber_by("ID", id).await?,
        SubscriberKey::Email(email) => store.get_subscriber_by("email", email).await?,
    };
    let Some(row) = row else {
        return Ok(false);
    };

    services.meta.delete_all(row.id).await?;
    services.lists.remove_all(row.id).await?;
    services.tags.remove_all(row.id).await?;

    let deleted = store.delete(row.id).await?;
    if deleted {
        store.records().emit_signal(
            DatabaseEvent::new(EventType::Delete, store.table_name())
                .with_tag(SUBSCRIBER_TAG)
                .with_record_id(row.id),
        );
    }
    Ok(deleted)
}
