//! Concurrent keyed entity store.

use chat_core::{apply_partial, DomainError};
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::borrow::Borrow;
use std::hash::Hash;

/// Keyed store for one entity kind
///
/// Reads hand out clones so no map guard ever escapes the store.
#[derive(Debug)]
pub struct EntityStore<K, V>
where
    K: Eq + Hash,
{
    name: &'static str,
    entries: DashMap<K, V>,
}

impl<K, V> EntityStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create an empty store; `name` identifies the entity kind in errors and logs
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: DashMap::new(),
        }
    }

    /// Entity kind stored here
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Insert or replace an entity, returning the previous value
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.entries.insert(key, value)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.remove(key).map(|(_, value)| value)
    }

    /// Mutate an entity in place, returning the closure result if it exists
    pub fn update<Q, F, R>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnOnce(&mut V) -> R,
    {
        self.entries.get_mut(key).map(|mut entry| f(entry.value_mut()))
    }

    /// Remove every entity matching the predicate, returning the removed keys
    pub fn remove_where<F>(&self, mut predicate: F) -> Vec<K>
    where
        F: FnMut(&K, &V) -> bool,
    {
        let keys: Vec<K> = self
            .entries
            .iter()
            .filter(|entry| predicate(entry.key(), entry.value()))
            .map(|entry| entry.key().clone())
            .collect();

        for key in &keys {
            self.entries.remove(key);
        }
        keys
    }

    /// Snapshot of every entity matching the predicate
    pub fn filter<F>(&self, mut predicate: F) -> Vec<V>
    where
        F: FnMut(&V) -> bool,
    {
        self.entries
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Snapshot of every entity
    pub fn values(&self) -> Vec<V> {
        self.filter(|_| true)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> EntityStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone + Serialize + DeserializeOwned,
{
    /// Apply a partial update (`data` + `clear`) to a stored entity
    ///
    /// Returns `Ok(None)` when the entity is not cached. A failed update
    /// leaves the stored entity untouched.
    ///
    /// # Errors
    /// Returns a [`DomainError`] if the update does not fit the entity.
    pub fn patch<Q>(&self, key: &Q, data: &Value, clear: &[String]) -> Result<Option<V>, DomainError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(mut entry) = self.entries.get_mut(key) else {
            return Ok(None);
        };

        let updated = apply_partial(entry.value(), self.name, data, clear)?;
        *entry.value_mut() = updated.clone();
        Ok(Some(updated))
    }
}
