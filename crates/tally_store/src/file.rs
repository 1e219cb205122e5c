//! JSON file-backed property store.

use crate::error::Result;
use crate::store::PropertyStore;
use crate::value::PropertyValue;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Property store persisted as a single JSON document.
///
/// The whole map is rewritten on every mutation: first to a sibling
/// `*.tmp` file, then renamed over the target, so a crash never leaves a
/// half-written document behind. Suited to small bots and local tooling,
/// not to high write rates.
///
/// # File Format
///
/// ```text
/// {
///   "ResourcesLib_user_42_coins": { "type": "number", "value": 15.0 },
///   "ResourcesLib_user_42_coins_growth": { "type": "structured", "value": { ... } }
/// }
/// ```
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, PropertyValue>>,
}

impl JsonFileStore {
    /// Opens the store at `path`, loading existing contents if the file
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file exists but cannot be read, or a
    /// serialization error if it is not a valid store document.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&raw)?
            }
        } else {
            BTreeMap::new()
        };

        tracing::debug!(path = %path.display(), keys = entries.len(), "opened JSON store");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Returns the path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, PropertyValue>) -> Result<()> {
        let tmp = self.path.with_extension("tmp");
        let encoded = serde_json::to_vec_pretty(entries)?;
        fs::write(&tmp, encoded)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Applies `change` to the map and persists it, restoring the previous
    /// value of `key` if persisting fails.
    fn mutate(
        &self,
        key: &str,
        change: impl FnOnce(&mut BTreeMap<String, PropertyValue>) -> Option<PropertyValue>,
    ) -> Result<Option<PropertyValue>> {
        let mut entries = self.entries.lock();
        let previous = change(&mut *entries);

        if let Err(err) = self.persist(&entries) {
            match previous {
                Some(value) => entries.insert(key.to_string(), value),
                None => entries.remove(key),
            };
            tracing::warn!(key, %err, "failed to persist JSON store, change reverted");
            return Err(err);
        }

        Ok(previous)
    }
}

impl PropertyStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<PropertyValue>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: PropertyValue) -> Result<()> {
        self.mutate(key, |entries| entries.insert(key.to_string(), value))?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        if !self.entries.lock().contains_key(key) {
            return Ok(false);
        }
        let removed = self.mutate(key, |entries| entries.remove(key))?;
        Ok(removed.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn open_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("store.json")).unwrap();
        assert_eq!(store.get("anything").unwrap(), None);
    }

    #[test]
    fn writes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        {
            let store = JsonFileStore::open(&path).unwrap();
            store.set("coins", PropertyValue::Number(12.5)).unwrap();
            store
                .set("coins_growth", PropertyValue::Structured(json!({"enabled": true})))
                .unwrap();
            store.set("gone", PropertyValue::Boolean(true)).unwrap();
            assert!(store.delete("gone").unwrap());
        }

        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get("coins").unwrap(), Some(PropertyValue::Number(12.5)));
        assert_eq!(
            store.get("coins_growth").unwrap(),
            Some(PropertyValue::Structured(json!({"enabled": true})))
        );
        assert_eq!(store.get("gone").unwrap(), None);
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn corrupt_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "{ not json").unwrap();

        let err = JsonFileStore::open(&path).unwrap_err();
        assert!(err.is_data_error());
    }

    #[test]
    fn failed_persist_reverts_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("store.json");
        let store = JsonFileStore::open(&path).unwrap();

        assert!(store.set("k", PropertyValue::Number(1.0)).is_err());
        assert_eq!(store.get("k").unwrap(), None);
    }
}
