//! Contracts for the services a subscriber delegates to
//!
//! Client address lookup, list and tag membership, and meta storage live
//! outside the subscriber table. The entity only talks to them through the
//! traits here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

use super::meta::MetaStore;
use crate::errors::ListHausError;

/// Source of the requesting client's address, recorded on new subscribers
pub trait AddressResolver: Send + Sync {
    fn client_address(&self) -> String;
}

/// Resolver that always reports the same address
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedAddress(String);

impl FixedAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }
}

impl AddressResolver for FixedAddress {
    fn client_address(&self) -> String {
        self.0.clone()
    }
}

/// A list or tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Term {
    pub id: i64,
    pub name: String,
}

/// Reference to a term by id or by name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TermRef {
    Id(i64),
    Name(String),
}

impl From<i64> for TermRef {
    fn from(id: i64) -> Self {
        TermRef::Id(id)
    }
}

impl From<&str> for TermRef {
    fn from(name: &str) -> Self {
        TermRef::Name(name.to_string())
    }
}

impl From<String> for TermRef {
    fn from(name: String) -> Self {
        TermRef::Name(name)
    }
}

impl From<&Term> for TermRef {
    fn from(term: &Term) -> Self {
        TermRef::Id(term.id)
    }
}

/// Membership of subscribers in a family of terms (lists, or tags)
#[async_trait]
pub trait TermStore: Send + Sync {
    /// Terms the subscriber belongs to, ordered by id
    async fn terms_for(&self, subscriber_id: i64) -> Result<Vec<Term>, ListHausError>;

    async fn contains(&self, subscriber_id: i64, term: &TermRef) -> Result<bool, ListHausError>;

    /// Attach a term. Names that don't exist yet are created; unknown ids
    /// are rejected with `false`.
    async fn add(&self, subscriber_id: i64, term: TermRef) -> Result<bool, ListHausError>;

    /// Make `names` the subscriber's complete set of terms
    async fn replace(&self, subscriber_id: i64, names: &[String]) -> Result<(), ListHausError>;

    /// Detach every term, returning how many were removed
    async fn remove_all(&self, subscriber_id: i64) -> Result<u64, ListHausError>;
}

#[derive(Debug, Default)]
struct TermState {
    terms: Vec<Term>,
    next_id: i64,
    memberships: HashMap<i64, BTreeSet<i64>>,
}

impl TermState {
    fn find(&self, term: &TermRef) -> Option<&Term> {
        match term {
            TermRef::Id(id) => self.terms.iter().find(|t| t.id == *id),
            TermRef::Name(name) => self.terms.iter().find(|t| t.name == *name),
        }
    }

    fn find_or_create(&mut self, name: &str) -> Term {
        if let Some(term) = self.terms.iter().find(|t| t.name == name) {
            return term.clone();
        }
        self.next_id += 1;
        let term = Term {
            id: self.next_id,
            name: name.to_string(),
        };
        self.terms.push(term.clone());
        term
    }
}

/// Process-local term store
#[derive(Debug, Default)]
pub struct InMemoryTermStore {
    state: RwLock<TermState>,
}

impl InMemoryTermStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look a term up by name, creating it if needed
    pub fn create_term(&self, name: &str) -> Term {
        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .find_or_create(name)
    }

    pub fn terms(&self) -> Vec<Term> {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .terms
            .clone()
    }
}

#[async_trait]
impl TermStore for InMemoryTermStore {
    async fn terms_for(&self, subscriber_id: i64) -> Result<Vec<Term>, ListHausError> {
        let state = self
            .state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let Some(ids) = state.memberships.get(&subscriber_id) else {
            return Ok(Vec::new());
        };
        Ok(ids
            .iter()
            .filter_map(|id| state.find(&TermRef::Id(*id)).cloned())
            .collect())
    }

    async fn contains(&self, subscriber_id: i64, term: &TermRef) -> Result<bool, ListHausError> {
        let state = self
            .state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let Some(term) = state.find(term) else {
            return Ok(false);
        };
        Ok(state
            .memberships
            .get(&subscriber_id)
            .is_some_and(|ids| ids.contains(&term.id)))
    }

    async fn add(&self, subscriber_id: i64, term: TermRef) -> Result<bool, ListHausError> {
        if subscriber_id <= 0 {
            return Ok(false);
        }
        let mut state = self
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let term_id = match &term {
            TermRef::Id(id) => match state.find(&term) {
                Some(_) => *id,
                None => return Ok(false),
            },
            TermRef::Name(name) => state.find_or_create(name).id,
        };
        state
            .memberships
            .entry(subscriber_id)
            .or_default()
            .insert(term_id);
        Ok(true)
    }

    async fn replace(&self, subscriber_id: i64, names: &[String]) -> Result<(), ListHausError> {
        if subscriber_id <= 0 {
            return Ok(());
        }
        let mut state = self
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let ids: BTreeSet<i64> = names
            .iter()
            .map(|name| state.find_or_create(name).id)
            .collect();
        state.memberships.insert(subscriber_id, ids);
        Ok(())
    }

    async fn remove_all(&self, subscriber_id: i64) -> Result<u64, ListHausError> {
        let mut state = self
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(state
            .memberships
            .remove(&subscriber_id)
            .map_or(0, |ids| ids.len() as u64))
    }
}

/// Everything a [`Subscriber`](super::Subscriber) delegates to
#[derive(Clone)]
pub struct SubscriberServices {
    pub meta: Arc<dyn MetaStore>,
    pub lists: Arc<dyn TermStore>,
    pub tags: Arc<dyn TermStore>,
}

impl SubscriberServices {
    pub fn new(
        meta: Arc<dyn MetaStore>,
        lists: Arc<dyn TermStore>,
        tags: Arc<dyn TermStore>,
    ) -> Self {
        Self { meta, lists, tags }
    }

    /// Use `meta` for meta data and fresh in-memory stores for lists and tags
    pub fn with_in_memory_terms(meta: Arc<dyn MetaStore>) -> Self {
        Self::new(
            meta,
            Arc::new(InMemoryTermStore::new()),
            Arc::new(InMemoryTermStore::new()),
        )
    }
}

impl std::fmt::Debug for SubscriberServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberServices").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn names_are_created_on_demand_but_ids_must_exist() {
        let lists = InMemoryTermStore::new();

        assert!(lists.add(7, TermRef::from("Weekly")).await.unwrap());
        assert!(!lists.add(7, TermRef::Id(99)).await.unwrap());

        let weekly = lists.create_term("Weekly");
        assert!(lists.contains(7, &TermRef::Id(weekly.id)).await.unwrap());
        assert!(lists.contains(7, &"Weekly".into()).await.unwrap());
        assert!(!lists.contains(8, &"Weekly".into()).await.unwrap());
    }

    #[tokio::test]
    async fn replace_overwrites_membership() {
        let tags = InMemoryTermStore::new();
        tags.replace(3, &["vip".to_string(), "beta".to_string()])
            .await
            .unwrap();
        tags.replace(3, &["beta".to_string()]).await.unwrap();

        let names: Vec<String> = tags
            .terms_for(3)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["beta".to_string()]);
        assert_eq!(tags.terms().len(), 2);

        assert_eq!(tags.remove_all(3).await.unwrap(), 1);
        assert!(tags.terms_for(3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unsaved_subscribers_cannot_join() {
        let lists = InMemoryTermStore::new();
        assert!(!lists.add(0, "Weekly".into()).await.unwrap());
        assert!(lists.terms_for(0).await.unwrap().is_empty());
    }
}
