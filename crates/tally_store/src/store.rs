//! The property store seam.
//!
//! This module provides:
//!
//! - [`PropertyStore`] - Scoped key/value store with typed values. The ledger
//!   depends on it; deployments bind it to whatever backend the bot platform
//!   offers.
//!
//! - [`Storable`] - Metadata trait for structured records kept next to a
//!   primary key (e.g. a growth record stored under `<key>_growth`).
//!
//! - [`PropertyStoreExt`] - Typed helpers (`get_number`, `set_record`, ...)
//!   available on every store.
//!
//! # Consistency contract
//!
//! Each single-key `get`/`set`/`delete` must be atomic and must observe every
//! write that completed before it started (per-key serializability). Nothing
//! is promised across keys.

use crate::error::{Result, StoreError};
use crate::value::{PropertyValue, TypeHint};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Scoped key/value store with typed values.
pub trait PropertyStore: Send + Sync {
    /// Reads the value stored under `key`, or `None` if the key is absent.
    fn get(&self, key: &str) -> Result<Option<PropertyValue>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// The value's [`TypeHint`] travels with it.
    fn set(&self, key: &str, value: PropertyValue) -> Result<()>;

    /// Removes `key`. Returns `true` if a value was removed.
    fn delete(&self, key: &str) -> Result<bool>;

    /// Returns `true` if a value is stored under `key`.
    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}

impl<S: PropertyStore + ?Sized> PropertyStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<PropertyValue>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: PropertyValue) -> Result<()> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        (**self).delete(key)
    }

    fn contains(&self, key: &str) -> Result<bool> {
        (**self).contains(key)
    }
}

/// Metadata for a structured record eligible for storage.
///
/// A record lives under its owner's key with [`storage_suffix`](Self::storage_suffix)
/// appended, so it never collides with the owner's own value.
pub trait Storable: Send + Sync + 'static {
    /// Suffix appended to the owner key, e.g. `"_growth"`.
    fn storage_suffix() -> &'static str;

    /// Returns the full key for the record attached to `owner_key`.
    fn storage_key(owner_key: &str) -> String {
        format!("{owner_key}{}", Self::storage_suffix())
    }
}

/// Typed helpers on top of [`PropertyStore`].
pub trait PropertyStoreExt: PropertyStore {
    /// Reads a number. Absent keys yield `None`.
    ///
    /// # Errors
    ///
    /// [`StoreError::TypeMismatch`] if the key holds a non-numeric value, or
    /// any error raised by the backend.
    fn get_number(&self, key: &str) -> Result<Option<f64>> {
        let Some(value) = self.get(key)? else {
            return Ok(None);
        };
        value.as_number().map(Some).ok_or_else(|| StoreError::TypeMismatch {
            key: key.to_string(),
            expected: TypeHint::Number,
            found: value.type_hint(),
        })
    }

    /// Writes a number with the [`TypeHint::Number`] hint.
    fn set_number(&self, key: &str, value: f64) -> Result<()> {
        self.set(key, PropertyValue::Number(value))
    }

    /// Reads and decodes the record attached to `owner_key`.
    ///
    /// # Errors
    ///
    /// [`StoreError::Serialization`] if the stored document does not decode
    /// as `R`, [`StoreError::TypeMismatch`] if the key holds a scalar.
    fn get_record<R>(&self, owner_key: &str) -> Result<Option<R>>
    where
        R: Storable + DeserializeOwned,
    {
        let key = R::storage_key(owner_key);
        match self.get(&key)? {
            None => Ok(None),
            Some(PropertyValue::Structured(value)) => Ok(Some(serde_json::from_value(value)?)),
            Some(other) => Err(StoreError::TypeMismatch {
                key,
                expected: TypeHint::Structured,
                found: other.type_hint(),
            }),
        }
    }

    /// Encodes and writes the record attached to `owner_key` with the
    /// [`TypeHint::Structured`] hint.
    fn set_record<R>(&self, owner_key: &str, record: &R) -> Result<()>
    where
        R: Storable + Serialize,
    {
        let value = serde_json::to_value(record)?;
        self.set(&R::storage_key(owner_key), PropertyValue::Structured(value))
    }

    /// Deletes the record attached to `owner_key`.
    fn delete_record<R: Storable>(&self, owner_key: &str) -> Result<bool> {
        self.delete(&R::storage_key(owner_key))
    }
}

impl<S: PropertyStore + ?Sized> PropertyStoreExt for S {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Note {
        text: String,
    }

    impl Storable for Note {
        fn storage_suffix() -> &'static str {
            "_note"
        }
    }

    #[test]
    fn storage_key_appends_suffix() {
        assert_eq!(Note::storage_key("user_1_coins"), "user_1_coins_note");
    }

    #[test]
    fn number_helpers() {
        let store = MemoryStore::new();
        assert_eq!(store.get_number("n").unwrap(), None);

        store.set_number("n", 4.25).unwrap();
        assert_eq!(store.get_number("n").unwrap(), Some(4.25));
    }

    #[test]
    fn get_number_reports_type_mismatch() {
        let store = MemoryStore::new();
        store.set("flag", PropertyValue::Boolean(true)).unwrap();

        let err = store.get_number("flag").unwrap_err();
        assert!(matches!(
            err,
            StoreError::TypeMismatch {
                expected: TypeHint::Number,
                found: TypeHint::Boolean,
                ..
            }
        ));
        assert!(err.is_data_error());
    }

    #[test]
    fn record_helpers() {
        let store = MemoryStore::new();
        let note = Note {
            text: "hello".into(),
        };

        store.set_record("owner", &note).unwrap();
        assert_eq!(
            store.get("owner_note").unwrap(),
            Some(PropertyValue::Structured(json!({"text": "hello"})))
        );
        assert_eq!(store.get_record::<Note>("owner").unwrap(), Some(note));

        assert!(store.delete_record::<Note>("owner").unwrap());
        assert_eq!(store.get_record::<Note>("owner").unwrap(), None);
    }

    #[test]
    fn malformed_record_is_serialization_error() {
        let store = MemoryStore::new();
        store
            .set("owner_note", PropertyValue::Structured(json!({"text": 5})))
            .unwrap();

        let err = store.get_record::<Note>("owner").unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[test]
    fn arc_store_delegates() {
        let store: Arc<dyn PropertyStore> = Arc::new(MemoryStore::new());
        store.set_number("k", 1.0).unwrap();
        assert!(store.contains("k").unwrap());
        assert!(store.delete("k").unwrap());
        assert!(!store.contains("k").unwrap());
    }
}
