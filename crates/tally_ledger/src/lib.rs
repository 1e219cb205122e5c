//! Virtual-resource ledger with lazy, time-based growth.
//!
//! Bots keep per-user, per-chat and global balances ("coins", "gems", ...)
//! in a [`PropertyStore`](tally_store::PropertyStore). On top of plain
//! balances the ledger supports growth policies that accrue on a fixed
//! interval without any background worker: elapsed whole intervals are
//! settled when the balance is next read.
//!
//! - [`ResourceFactory`] - Builds resources for the current request
//! - [`Resource`] - A balance with `set`/`add`/`remove`/transfers
//! - [`Growth`] - The growth policy of a resource
//! - [`AmountInput`] - Numeric coercion for amounts from user input
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tally_core::{Clock, MockClock};
//! use tally_ledger::{GrowthOptions, RequestContext, ResourceFactory};
//! use tally_store::MemoryStore;
//!
//! let clock = Arc::new(MockClock::new(0));
//! let ledger = ResourceFactory::new(Arc::new(MemoryStore::new()))
//!     .with_clock(Clock::with_provider(clock.clone()))
//!     .scoped(RequestContext::new().with_user(1));
//!
//! let wallet = ledger.user("coins");
//! wallet.set(100).unwrap();
//! wallet.growth().add(5, GrowthOptions::new().every(60.0)).unwrap();
//!
//! clock.advance(Duration::from_secs(180));
//! assert_eq!(wallet.value().unwrap(), 115.0);
//! ```

mod amount;
mod error;
mod factory;
mod growth;
mod owner;
mod resource;

pub use amount::AmountInput;
pub use error::{LedgerError, Result};
pub use factory::{DEFAULT_RESOURCE_NAME, RequestContext, ResourceFactory};
pub use growth::{Accrual, Growth, GrowthOptions, GrowthRecord};
pub use owner::{Owner, OwnerKind, ResourceKey};
pub use resource::{Resource, Transfer};
