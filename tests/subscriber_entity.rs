//! Integration tests for the hydrated subscriber entity

use listhaus::prelude::*;
use std::sync::{Arc, Mutex};

struct Fixture {
    listhaus: ListHaus,
    store: SubscriberStore,
    services: SubscriberServices,
}

impl Fixture {
    fn subscriber(&self) -> Subscriber {
        Subscriber::new(self.store.clone(), self.services.clone())
    }

    async fn load(&self, id_or_email: &str) -> Subscriber {
        Subscriber::load(self.store.clone(), self.services.clone(), id_or_email)
            .await
            .unwrap()
    }

    /// Capture every emitted event
    fn capture_events(&self) -> Arc<Mutex<Vec<DatabaseEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&events);
        self.listhaus
            .signals()
            .add_callback(move |event: &DatabaseEvent| seen.lock().unwrap().push(event.clone()))
            .unwrap();
        events
    }
}

async fn setup() -> Fixture {
    let listhaus = ListHaus::in_memory().await.expect("in-memory database");
    listhaus.auto_migrate(false).await.expect("install tables");
    let store = listhaus
        .subscriber_store(Arc::new(FixedAddress::new("192.0.2.1")))
        .unwrap();
    let services = SubscriberServices::with_in_memory_terms(Arc::new(listhaus.meta_store().unwrap()));
    Fixture {
        listhaus,
        store,
        services,
    }
}

fn hook_names(events: &Arc<Mutex<Vec<DatabaseEvent>>>) -> Vec<String> {
    events.lock().unwrap().iter().map(DatabaseEvent::hook_name).collect()
}

#[tokio::test]
async fn create_hydrates_from_the_stored_row() {
    let fixture = setup().await;
    let mut subscriber = fixture.subscriber();
    assert!(!subscriber.is_hydrated());

    let id = subscriber
        .create(&record! {
            "email" => " jane@example.com ",
            "first_name" => "<b>Jane</b>",
            "nickname" => "JJ",
        })
        .await
        .unwrap()
        .expect("created");

    assert_eq!(subscriber.id(), id);
    assert_eq!(subscriber.email(), "jane@example.com");
    assert_eq!(subscriber.first_name(), "Jane");
    assert_eq!(subscriber.status(), "pending");
    assert_eq!(subscriber.ip(), "192.0.2.1");
    assert!(!subscriber.signup_date().is_empty());
}

#[tokio::test]
async fn create_is_rejected_when_hydrated_or_invalid() {
    let fixture = setup().await;

    let mut empty = fixture.subscriber();
    assert_eq!(empty.create(&Record::new()).await.unwrap(), None);

    let mut invalid = fixture.subscriber();
    assert_eq!(
        invalid.create(&record! { "email" => "nope" }).await.unwrap(),
        None
    );
    assert_eq!(invalid.id(), 0);

    let mut subscriber = fixture.subscriber();
    subscriber
        .create(&record! { "email" => "jane@example.com" })
        .await
        .unwrap()
        .expect("created");
    assert_eq!(
        subscriber
            .create(&record! { "email" => "john@example.com" })
            .await
            .unwrap(),
        None
    );
    assert!(
        fixture
            .store
            .get_subscriber_by("email", "john@example.com")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn create_with_existing_email_reuses_the_row() {
    let fixture = setup().await;
    let existing = fixture
        .store
        .add(&record! { "email" => "jane@example.com", "status" => "subscribed" })
        .await
        .unwrap()
        .unwrap();

    let mut subscriber = fixture.subscriber();
    let id = subscriber
        .create(&record! { "email" => "jane@example.com", "last_name" => "Doe" })
        .await
        .unwrap();

    assert_eq!(id, Some(existing));
    assert_eq!(subscriber.last_name(), "Doe");
    assert_eq!(subscriber.status(), "subscribed");
}

#[tokio::test]
async fn load_by_id_or_email() {
    let fixture = setup().await;
    let id = fixture
        .store
        .add(&record! { "email" => "jane@example.com" })
        .await
        .unwrap()
        .unwrap();

    assert_eq!(fixture.load(&id.to_string()).await.email(), "jane@example.com");
    assert_eq!(fixture.load("jane@example.com").await.id(), id);

    let missing = fixture.load("nobody@example.com").await;
    assert!(!missing.is_hydrated());
    assert_eq!(fixture.load("0").await.id(), 0);
}

#[tokio::test]
async fn update_rehydrates_and_rejects_empty_data() {
    let fixture = setup().await;
    let mut subscriber = fixture.subscriber();
    subscriber
        .create(&record! { "email" => "jane@example.com" })
        .await
        .unwrap();

    assert!(!subscriber.update(&Record::new()).await.unwrap());
    assert!(
        subscriber
            .update(&record! { "status" => "subscribed", "confirm_date" => "2024-05-01 10:00:00" })
            .await
            .unwrap()
    );
    assert_eq!(subscriber.status(), "subscribed");
    assert_eq!(subscriber.confirm_date(), Some("2024-05-01 10:00:00"));

    let mut unsaved = fixture.subscriber();
    assert!(!unsaved.update(&record! { "status" => "subscribed" }).await.unwrap());
}

#[tokio::test]
async fn email_count_only_accepts_whole_non_negative_amounts() {
    let fixture = setup().await;
    let mut subscriber = fixture.subscriber();
    let id = subscriber
        .create(&record! { "email" => "jane@example.com" })
        .await
        .unwrap()
        .unwrap();

    assert_eq!(subscriber.increase_email_count(2).await.unwrap(), Some(2));
    assert_eq!(subscriber.increase_email_count("3").await.unwrap(), Some(5));
    assert_eq!(subscriber.increase_email_count(-1).await.unwrap(), None);
    assert_eq!(subscriber.increase_email_count(1.5).await.unwrap(), None);
    assert_eq!(subscriber.increase_email_count("many").await.unwrap(), None);

    let stored = fixture.store.get_subscriber_by("ID", id).await.unwrap().unwrap();
    assert_eq!(stored.email_count, 5);
    assert_eq!(subscriber.email_count(), 5);
}

#[tokio::test]
async fn email_count_rejects_amounts_that_would_overflow() {
    let fixture = setup().await;
    let mut subscriber = fixture.subscriber();
    let id = subscriber
        .create(&record! { "email" => "jane@example.com" })
        .await
        .unwrap()
        .unwrap();
    let events = fixture.capture_events();

    assert_eq!(subscriber.increase_email_count(1).await.unwrap(), Some(1));
    events.lock().unwrap().clear();

    assert_eq!(subscriber.increase_email_count(i64::MAX).await.unwrap(), None);
    assert!(hook_names(&events).is_empty());
    assert_eq!(subscriber.email_count(), 1);

    let stored = fixture.store.get_subscriber_by("ID", id).await.unwrap().unwrap();
    assert_eq!(stored.email_count, 1);
}

#[tokio::test]
async fn email_count_of_unsaved_subscriber_stays_put() {
    let fixture = setup().await;
    let mut subscriber = fixture.subscriber();
    assert_eq!(subscriber.increase_email_count(4).await.unwrap(), Some(0));
}

#[tokio::test]
async fn lifecycle_events_fire_in_order() {
    let fixture = setup().await;
    let events = fixture.capture_events();

    let mut subscriber = fixture.subscriber();
    let id = subscriber
        .create(&record! { "email" => "jane@example.com" })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        hook_names(&events),
        vec![
            "pre_create_subscriber",
            "pre_insert_subscriber",
            "post_insert_subscriber",
            "post_create_subscriber",
        ]
    );
    {
        let events = events.lock().unwrap();
        let post_create = events.last().unwrap();
        assert_eq!(post_create.record_id, Some(id));
        assert_eq!(post_create.payload_value("created"), Some(&FieldValue::Integer(id)));
    }

    events.lock().unwrap().clear();
    subscriber.increase_email_count(1).await.unwrap();
    assert_eq!(
        hook_names(&events),
        vec![
            "pre_increase_email_count_subscriber",
            "pre_update_subscriber",
            "post_update_subscriber",
            "post_increase_email_count_subscriber",
        ]
    );

    let events = events.lock().unwrap();
    let post = events.last().unwrap();
    assert_eq!(post.payload_value("email_count"), Some(&FieldValue::Integer(1)));
    assert_eq!(post.payload_value("count"), Some(&FieldValue::Integer(1)));
    assert_eq!(post.record_id, Some(id));
}

#[tokio::test]
async fn update_to_taken_email_keeps_the_old_row() {
    let fixture = setup().await;
    fixture
        .store
        .add(&record! { "email" => "jane@example.com" })
        .await
        .unwrap();
    let john = fixture
        .store
        .add(&record! { "email" => "john@example.com" })
        .await
        .unwrap()
        .unwrap();

    let mut subscriber = fixture.load(&john.to_string()).await;
    assert!(
        !subscriber
            .update(&record! { "email" => "jane@example.com" })
            .await
            .unwrap()
    );
    assert_eq!(subscriber.email(), "john@example.com");
}

#[tokio::test]
async fn properties_delegate_to_collaborators() {
    let fixture = setup().await;
    let mut subscriber = fixture.subscriber();
    subscriber
        .create(&record! { "email" => "jane@example.com" })
        .await
        .unwrap();

    assert!(subscriber.add_to_list("Weekly").await.unwrap());
    assert!(subscriber.is_on_list("Weekly").await.unwrap());
    assert!(!subscriber.is_on_list("Monthly").await.unwrap());
    assert!(subscriber.tag("vip").await.unwrap());
    assert!(subscriber.has_tag("vip").await.unwrap());

    assert!(subscriber.update_meta("notes", "met at the fair", None).await.unwrap());
    assert_eq!(subscriber.notes().await.unwrap(), "met at the fair");

    let lists = subscriber.lists().await.unwrap();
    assert_eq!(lists.len(), 1);
    assert_eq!(lists[0].name, "Weekly");

    let tags = subscriber.property("tags".parse().unwrap()).await.unwrap();
    assert!(matches!(tags, PropertyValue::Terms(terms) if terms[0].name == "vip"));
    assert_eq!(
        subscriber.property(Property::Notes).await.unwrap(),
        PropertyValue::Text("met at the fair".to_string())
    );
    assert!(matches!(
        "secret".parse::<Property>(),
        Err(ListHausError::UnknownProperty(_))
    ));
}

#[tokio::test]
async fn meta_round_trip_through_the_entity() {
    let fixture = setup().await;
    let mut subscriber = fixture.subscriber();
    subscriber
        .create(&record! { "email" => "jane@example.com" })
        .await
        .unwrap();

    assert!(subscriber.add_meta("source", "form", true).await.unwrap());
    assert!(!subscriber.add_meta("source", "api", true).await.unwrap());
    assert!(subscriber.add_meta("visit", "1", false).await.unwrap());
    assert!(subscriber.add_meta("visit", "2", false).await.unwrap());

    assert_eq!(
        subscriber.get_meta("visit").await.unwrap(),
        vec!["1".to_string(), "2".to_string()]
    );
    assert_eq!(
        subscriber.get_single_meta("source").await.unwrap(),
        Some("form".to_string())
    );
    assert!(subscriber.delete_meta("visit", Some("1")).await.unwrap());
    assert!(subscriber.delete_meta("source", None).await.unwrap());
    assert_eq!(subscriber.get_single_meta("source").await.unwrap(), None);
    assert_eq!(subscriber.notes().await.unwrap(), "");
}
