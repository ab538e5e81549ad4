//! # Token Store
//!
//! Revoked session tokens are remembered until they would have expired anyway.
//! [`MemoryStore`] is an in-process key/expiry map standing in for a cache
//! server. Other components depend on it through the [`TokenStore`] capability,
//! so tests can register a different backend under the same name.

use crate::error::StoreError;
use async_trait::async_trait;
use component_graph::{Component, ConstructError, Views};
use std::cell::RefCell;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// Key/expiry storage for revoked tokens.
#[async_trait(?Send)]
pub trait TokenStore {
    /// Stores `key` for `ttl`. A zero `ttl` is a no-op.
    async fn set(&self, key: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Whether `key` is present and not yet expired.
    async fn contains(&self, key: &str) -> Result<bool, StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, Instant>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries. Drops expired ones first.
    pub fn len(&self) -> usize {
        self.purge(Instant::now());
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn purge(&self, now: Instant) {
        self.entries.borrow_mut().retain(|_, expires| *expires > now);
    }
}

#[async_trait(?Send)]
impl TokenStore for MemoryStore {
    async fn set(&self, key: &str, ttl: Duration) -> Result<(), StoreError> {
        if ttl.is_zero() {
            return Ok(());
        }
        let now = Instant::now();
        self.purge(now);
        self.entries.borrow_mut().insert(key.to_string(), now + ttl);
        debug!(ttl_secs = ttl.as_secs(), "Stored key");
        Ok(())
    }

    async fn contains(&self, key: &str) -> Result<bool, StoreError> {
        let now = Instant::now();
        Ok(self
            .entries
            .borrow()
            .get(key)
            .is_some_and(|expires| *expires > now))
    }
}

impl Component for MemoryStore {
    type Instance = MemoryStore;

    fn expose(views: &mut Views<MemoryStore>) {
        views.provide::<dyn TokenStore>(|store| store);
    }

    fn construct(&self) -> Result<MemoryStore, ConstructError> {
        Ok(MemoryStore::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn keys_are_present_until_they_expire() {
        let store = MemoryStore::new();
        store.set("a", Duration::from_secs(60)).await.unwrap();
        store.set("b", Duration::from_millis(1)).await.unwrap();
        assert!(store.contains("a").await.unwrap());

        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(!store.contains("b").await.unwrap());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn zero_ttl_is_not_stored() {
        let store = MemoryStore::new();
        store.set("gone", Duration::ZERO).await.unwrap();
        assert!(!store.contains("gone").await.unwrap());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn the_trait_view_shares_the_instance() {
        let mut resolver = component_graph::Resolver::new();
        resolver.register(MemoryStore::new()).unwrap();

        let view = resolver.get_as::<dyn TokenStore>("MemoryStore").unwrap();
        view.set("k", Duration::from_secs(1)).await.unwrap();
        let store = resolver.get_as::<MemoryStore>("MemoryStore").unwrap();
        assert_eq!(store.len(), 1);
    }
}
