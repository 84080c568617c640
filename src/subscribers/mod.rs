//! Mailing-list subscribers
//!
//! [`SubscriberStore`] specializes the generic record store for the
//! subscriber table, [`Subscriber`] is the hydrated entity, and [`actions`]
//! holds the operations that span several stores.

pub mod actions;
pub mod collaborators;
pub mod meta;
pub mod query;
pub mod schema;
pub mod store;
pub mod subscriber;

pub use collaborators::{
    AddressResolver, FixedAddress, InMemoryTermStore, SubscriberServices, Term, TermRef, TermStore,
};
pub use meta::{MetaRow, MetaSchema, MetaStore, SqlMetaStore};
pub use query::{OneOrMany, SubscriberQuery};
pub use schema::{SubscriberRow, SubscriberSchema, SubscriberStatus};
pub use store::{SubscriberKey, SubscriberStore};
pub use subscriber::{Property, PropertyValue, Subscriber, SubscriberProperties};

/// Type tag carried by subscriber lifecycle events
pub const SUBSCRIBER_TAG: &str = "subscriber";
