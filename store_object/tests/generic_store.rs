use cache_system::{CacheConfig, CacheManager, CacheParams};
use serde::{Deserialize, Serialize};
use signal_system::{DatabaseEvent, SignalManager};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{FromRow, SqlitePool};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use store_object::{
    Column, GenericStore, Index, QueryBuilder, QueryFilter, SortOrder, StoreError, TableSchema,
    ValidationError,
};
use type_mapping::{record, FieldKind, FieldValue, Record};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
struct Contact {
    #[sqlx(rename = "ID")]
    #[serde(rename = "ID")]
    id: i64,
    email: String,
    name: String,
    score: f64,
    visits: i64,
    note: Option<String>,
}

struct ContactSchema;

const CONTACT_COLUMNS: &[Column] = &[
    Column::new("ID", FieldKind::Integer, "INTEGER PRIMARY KEY AUTOINCREMENT"),
    Column::new("email", FieldKind::Text, "TEXT NOT NULL"),
    Column::new("name", FieldKind::Text, "TEXT NOT NULL DEFAULT ''"),
    Column::new("score", FieldKind::Float, "REAL NOT NULL DEFAULT 0"),
    Column::new("visits", FieldKind::Integer, "INTEGER NOT NULL DEFAULT 0"),
    Column::new("note", FieldKind::Text, "TEXT").nullable(),
];

const CONTACT_INDEXES: &[Index] = &[Index {
    name: "visits",
    columns: &["visits"],
}];

impl TableSchema for ContactSchema {
    type Row = Contact;

    fn table_prefix(&self) -> &str {
        "wp_"
    }

    fn table_name(&self) -> &str {
        "wp_contacts"
    }

    fn version(&self) -> &'static str {
        "1.2"
    }

    fn columns(&self) -> &'static [Column] {
        CONTACT_COLUMNS
    }

    fn column_defaults(&self) -> Record {
        record! {
            "email" => "",
            "name" => "",
            "score" => 0.0,
            "visits" => 0,
        }
    }

    fn constraints(&self) -> &'static [&'static str] {
        &["UNIQUE (email)"]
    }

    fn indexes(&self) -> &'static [Index] {
        CONTACT_INDEXES
    }
}

async fn memory_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory database")
}

async fn installed_store() -> GenericStore<ContactSchema> {
    let store = GenericStore::new(memory_pool().await, ContactSchema, None, None);
    store.create_table().await.expect("create table");
    store
}

#[tokio::test]
async fn insert_applies_defaults_and_drops_unknown_keys() {
    let store = installed_store().await;

    let id = store
        .insert(
            &record! { "EMAIL" => "jane@example.com", "favourite_colour" => "green", "ID" => 500 },
            "contact",
        )
        .await
        .unwrap()
        .expect("new id");

    assert_eq!(id, 1);
    let contact = store.get(id).await.unwrap().expect("row");
    assert_eq!(contact.email, "jane@example.com");
    assert_eq!(contact.name, "");
    assert_eq!(contact.visits, 0);
    assert_eq!(contact.note, None);
}

#[tokio::test]
async fn non_numeric_integer_input_falls_back_to_default() {
    let store = installed_store().await;

    let id = store
        .insert(&record! { "email" => "a@example.com", "visits" => "many", "score" => "high" }, "")
        .await
        .unwrap()
        .unwrap();
    let contact = store.get(id).await.unwrap().unwrap();
    assert_eq!(contact.visits, 0);
    assert_eq!(contact.score, 0.0);

    assert!(store.update(id, &record! { "visits" => "7" }, None).await.unwrap());
    assert_eq!(store.get(id).await.unwrap().unwrap().visits, 7);

    assert!(store.update(id, &record! { "visits" => -3 }, None).await.unwrap());
    assert_eq!(store.get(id).await.unwrap().unwrap().visits, 0);
}

#[tokio::test]
async fn duplicate_natural_key_is_rejected_without_error() {
    let store = installed_store().await;

    let first = store.insert(&record! { "email" => "dup@example.com" }, "contact").await.unwrap();
    let second = store.insert(&record! { "email" => "dup@example.com" }, "contact").await.unwrap();

    assert!(first.is_some());
    assert_eq!(second, None);

    let other = store
        .insert(&record! { "email" => "other@example.com" }, "contact")
        .await
        .unwrap()
        .unwrap();
    assert!(!store
        .update(other, &record! { "email" => "dup@example.com" }, None)
        .await
        .unwrap());
}

#[tokio::test]
async fn update_fails_closed() {
    let store = installed_store().await;
    let id = store.insert(&record! { "email" => "u@example.com" }, "").await.unwrap().unwrap();

    assert!(!store.update(0, &record! { "name" => "X" }, None).await.unwrap());
    assert!(!store.update(-1, &record! { "name" => "X" }, None).await.unwrap());
    assert!(!store.update(id, &Record::new(), None).await.unwrap());
    assert!(!store.update(id, &record! { "unknown" => "X" }, None).await.unwrap());
    assert!(!store.update(id, &record! { "ID" => 9 }, None).await.unwrap());
    assert!(!store.update(id, &record! { "name" => "X" }, Some("bogus")).await.unwrap());

    // No matching row is still a successful statement
    assert!(store.update(999, &record! { "name" => "X" }, None).await.unwrap());

    assert!(store.update(id, &record! { "Name" => "Jane", "note" => "vip" }, None).await.unwrap());
    let contact = store.get(id).await.unwrap().unwrap();
    assert_eq!(contact.name, "Jane");
    assert_eq!(contact.note.as_deref(), Some("vip"));
}

#[tokio::test]
async fn lookups_by_column() {
    let store = installed_store().await;
    let id = store
        .insert(&record! { "email" => "look@example.com", "name" => "Look", "visits" => 3 }, "")
        .await
        .unwrap()
        .unwrap();

    let by_email = store.get_by("email", "look@example.com").await.unwrap();
    assert_eq!(by_email.map(|c| c.id), Some(id));
    assert_eq!(store.get_by("email", "nobody@example.com").await.unwrap(), None);
    assert_eq!(store.get_by("email; DROP TABLE wp_contacts", "x").await.unwrap(), None);

    assert_eq!(
        store.get_column("name", id).await.unwrap(),
        Some(FieldValue::from("Look"))
    );
    assert_eq!(
        store.get_column_by("visits", "email", "look@example.com").await.unwrap(),
        Some(FieldValue::Integer(3))
    );
    assert_eq!(
        store.get_column_by("ID", "email", "look@example.com").await.unwrap(),
        Some(FieldValue::Integer(id))
    );
    assert_eq!(store.get_column("note", id).await.unwrap(), Some(FieldValue::Null));
    assert_eq!(store.get_column("name", id + 1).await.unwrap(), None);
    assert_eq!(store.get_column("missing", id).await.unwrap(), None);
}

#[tokio::test]
async fn delete_single_and_bulk() {
    let store = installed_store().await;
    let mut ids = Vec::new();
    for n in 0..4 {
        let email = format!("d{}@example.com", n);
        ids.push(store.insert(&record! { "email" => email }, "").await.unwrap().unwrap());
    }

    assert!(!store.delete(0).await.unwrap());
    assert!(store.delete(ids[0]).await.unwrap());
    assert_eq!(store.get(ids[0]).await.unwrap(), None);

    assert_eq!(store.delete_by_ids(ids[1]).await.unwrap(), 1);
    assert_eq!(store.delete_by_ids(vec![ids[2], ids[3], 9_999]).await.unwrap(), 2);
    assert_eq!(store.delete_by_ids(Vec::<i64>::new()).await.unwrap(), 0);
    assert_eq!(
        store.delete_by_ids(FieldValue::from("not a number")).await.unwrap(),
        0
    );

    assert_eq!(store.count_where(&QueryBuilder::new()).await.unwrap(), 0);
}

#[tokio::test]
async fn create_table_is_idempotent_and_records_version() {
    let store = GenericStore::new(memory_pool().await, ContactSchema, None, None);

    assert!(!store.is_installed().await.unwrap());
    assert_eq!(store.schema_version().await.unwrap(), None);

    store.create_table().await.unwrap();
    store.create_table().await.unwrap();

    assert!(store.is_installed().await.unwrap());
    assert!(store.table_exists("wp_listhaus_options").await.unwrap());
    assert_eq!(store.schema_version().await.unwrap().as_deref(), Some("1.2"));
}

#[tokio::test]
async fn create_table_adds_missing_columns() {
    let pool = memory_pool().await;
    sqlx::query("CREATE TABLE wp_contacts (ID INTEGER PRIMARY KEY AUTOINCREMENT, email TEXT NOT NULL)")
        .execute(&pool)
        .await
        .unwrap();

    let store = GenericStore::new(pool.clone(), ContactSchema, None, None);
    store.create_table().await.unwrap();

    let columns: Vec<String> = sqlx::query_scalar("SELECT name FROM pragma_table_info('wp_contacts')")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(columns, vec!["ID", "email", "name", "score", "visits", "note"]);

    let id = store.insert(&record! { "email" => "late@example.com" }, "").await.unwrap().unwrap();
    assert_eq!(store.get(id).await.unwrap().unwrap().visits, 0);
}

#[tokio::test]
async fn find_and_count_share_a_predicate() {
    let store = installed_store().await;
    for (email, visits) in [("a@example.com", 1), ("b@example.com", 5), ("c@example.com", 9)] {
        store
            .insert(&record! { "email" => email, "visits" => visits }, "")
            .await
            .unwrap();
    }

    let query = QueryBuilder::new()
        .filter(QueryFilter::gte("visits", 5))
        .order_by("ID", SortOrder::Desc)
        .limit(1);

    let found = store.find(query.clone()).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].email, "c@example.com");
    assert_eq!(store.count_where(&query).await.unwrap(), 2);

    let first = store
        .find_one(QueryBuilder::new().order_by("ID", SortOrder::Asc))
        .await
        .unwrap();
    assert_eq!(first.map(|c| c.email), Some("a@example.com".to_string()));

    let err = store
        .find(QueryBuilder::new().filter(QueryFilter::eq("password", "x")))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::UnknownColumn { .. })
    ));
}

#[tokio::test]
async fn cached_reads_lag_writes_until_the_ttl_expires() {
    let cache = Arc::new(CacheManager::new(CacheConfig::new(1, 100)).unwrap());
    let store = GenericStore::new(
        memory_pool().await,
        ContactSchema,
        None,
        Some(CacheParams::new(cache, 1, "contacts")),
    );
    store.create_table().await.unwrap();
    store.insert(&record! { "email" => "first@example.com" }, "").await.unwrap();

    let query = || QueryBuilder::new().order_by("ID", SortOrder::Desc);
    let before = store.find_cached(&"all", query()).await.unwrap();

    store.insert(&record! { "email" => "second@example.com" }, "").await.unwrap();
    let within_ttl = store.find_cached(&"all", query()).await.unwrap();
    assert_eq!(
        serde_json::to_string(&within_ttl).unwrap(),
        serde_json::to_string(&before).unwrap()
    );

    tokio::time::sleep(Duration::from_millis(1300)).await;

    let after_ttl = store.find_cached(&"all", query()).await.unwrap();
    assert_eq!(after_ttl.len(), 2);
    assert_eq!(after_ttl[0].email, "second@example.com");
}

#[tokio::test]
async fn insert_emits_tagged_pre_and_post_events() {
    let signals = Arc::new(SignalManager::new());
    let seen: Arc<Mutex<Vec<(String, Option<i64>)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    signals
        .add_callback(move |event: &DatabaseEvent| {
            sink.lock()
                .unwrap()
                .push((event.hook_name(), event.record_id));
        })
        .unwrap();

    let store = GenericStore::new(memory_pool().await, ContactSchema, Some(signals), None);
    store.create_table().await.unwrap();
    let id = store
        .insert(&record! { "email" => "hooks@example.com" }, "contact")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            ("pre_insert_contact".to_string(), None),
            ("post_insert_contact".to_string(), Some(id)),
        ]
    );
}
