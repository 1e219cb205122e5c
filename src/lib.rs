//! A virtual-resource ledger for chat bots, with lazy time-based growth.
//!

pub use tally_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use tally_internal::prelude::*;
}
