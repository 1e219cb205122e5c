//! # Tally Internal Library
//!
//! Re-exports the core Tally crates for convenience.

/// Layer 1: clock, tracing setup and configuration.
pub use tally_core;

/// Layer 1: the property store seam and its adapters.
pub use tally_store;

/// Layer 2: resources, growth and the resource factory.
pub use tally_ledger;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use tally_core::{Clock, LedgerConfig, TracingSetup};
    pub use tally_ledger::{
        Accrual, AmountInput, Growth, GrowthOptions, GrowthRecord, LedgerError, Owner, OwnerKind,
        RequestContext, Resource, ResourceFactory, Transfer,
    };
    pub use tally_store::{
        CachedStore, JsonFileStore, MemoryStore, PropertyStore, PropertyStoreExt, PropertyValue,
        StoreError,
    };
}
