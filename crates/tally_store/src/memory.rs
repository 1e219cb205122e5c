//! In-process property store.

use crate::error::Result;
use crate::store::PropertyStore;
use crate::value::PropertyValue;
use hashbrown::HashMap;
use parking_lot::RwLock;

/// Property store kept in process memory.
///
/// Every single-key operation runs under one lock, so the store is
/// trivially per-key serializable. Contents are lost when the store is
/// dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, PropertyValue>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if no key is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns all stored keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.read().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl PropertyStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<PropertyValue>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: PropertyValue) -> Result<()> {
        self.entries.write().insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.entries.write().remove(key).is_some())
    }

    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.entries.read().contains_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_delete() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store.set("a", PropertyValue::Number(1.0)).unwrap();
        store.set("b", PropertyValue::Boolean(true)).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.keys(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(store.get("a").unwrap(), Some(PropertyValue::Number(1.0)));

        assert!(store.delete("a").unwrap());
        assert!(!store.delete("a").unwrap());
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn set_replaces_value_and_type() {
        let store = MemoryStore::new();
        store.set("k", PropertyValue::Number(1.0)).unwrap();
        store.set("k", PropertyValue::Boolean(false)).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(PropertyValue::Boolean(false)));
    }
}
