//! Typed key/value property store for Tally.
//!
//! The ledger keeps all durable state in an external store that offers
//! get/set-by-type semantics with per-entity namespacing. This crate defines
//! that seam and ships a few adapters:
//!
//! - [`PropertyStore`] - The store contract (per-key atomic, not transactional)
//! - [`PropertyStoreExt`] - Typed number/record helpers on every store
//! - [`Storable`] - Records stored next to an owner key
//! - [`MemoryStore`] - In-process map, the default for tests and single-process bots
//! - [`JsonFileStore`] - Whole-map JSON file with atomic replace
//! - [`CachedStore`] - Write-through read cache with explicit invalidation
//!
//! # Example
//!
//! ```
//! use tally_store::{MemoryStore, PropertyStore, PropertyStoreExt, PropertyValue};
//!
//! let store = MemoryStore::new();
//! store.set_number("coins", 10.0).unwrap();
//! assert_eq!(store.get("coins").unwrap(), Some(PropertyValue::Number(10.0)));
//! ```

mod cache;
mod error;
mod file;
mod memory;
mod store;
mod value;

pub use cache::CachedStore;
pub use error::{Result, StoreError};
pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use store::{PropertyStore, PropertyStoreExt, Storable};
pub use value::{PropertyValue, TypeHint};
