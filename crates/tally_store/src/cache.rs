//! Write-through read cache.

use crate::error::Result;
use crate::store::PropertyStore;
use crate::value::PropertyValue;
use hashbrown::HashMap;
use parking_lot::RwLock;

/// Read cache in front of a slower [`PropertyStore`].
///
/// Reads are served from memory once a key has been seen holding a value.
/// Absent keys are not cached, so lookups of unknown keys cannot grow the
/// map. Writes go to the inner store first and only update the cache after
/// the inner store acknowledged them; a failed write or delete evicts the
/// key, so the next read goes back to the store.
///
/// Misses and writes are serialized through the cache lock, which keeps a
/// slow miss from re-inserting a value older than a concurrent write.
///
/// The cache is only coherent while it is the sole writer of its keys.
/// Anything else writing to the inner store must be followed by
/// [`invalidate`](Self::invalidate) or [`clear`](Self::clear).
#[derive(Debug)]
pub struct CachedStore<S> {
    inner: S,
    entries: RwLock<HashMap<String, PropertyValue>>,
}

impl<S: PropertyStore> CachedStore<S> {
    /// Wraps `inner` with an empty cache.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Drops the cached entry for `key`.
    pub fn invalidate(&self, key: &str) {
        self.entries.write().remove(key);
    }

    /// Drops every cached entry.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Returns the number of cached keys.
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.entries.read().len()
    }
}

impl<S: PropertyStore> PropertyStore for CachedStore<S> {
    fn get(&self, key: &str) -> Result<Option<PropertyValue>> {
        if let Some(hit) = self.entries.read().get(key) {
            return Ok(Some(hit.clone()));
        }

        let mut entries = self.entries.write();
        // Another thread may have filled it while we waited for the lock.
        if let Some(hit) = entries.get(key) {
            return Ok(Some(hit.clone()));
        }
        let value = self.inner.get(key)?;
        if let Some(value) = &value {
            entries.insert(key.to_string(), value.clone());
        }
        Ok(value)
    }

    fn set(&self, key: &str, value: PropertyValue) -> Result<()> {
        let mut entries = self.entries.write();
        match self.inner.set(key, value.clone()) {
            Ok(()) => {
                entries.insert(key.to_string(), value);
                Ok(())
            }
            Err(err) => {
                entries.remove(key);
                Err(err)
            }
        }
    }

    fn delete(&self, key: &str) -> Result<bool> {
        let mut entries = self.entries.write();
        match self.inner.delete(key) {
            Ok(removed) => {
                entries.remove(key);
                Ok(removed)
            }
            Err(err) => {
                entries.remove(key);
                Err(err)
            }
        }
    }
}
