//! Core infrastructure for Tally.
//!
//! This crate provides the ambient pieces every ledger deployment needs:
//!
//! - [`Clock`] / [`ClockProvider`] - Wall-clock time source, mockable for testing
//! - [`TracingSetup`] - Logging and observability via the `tracing` crate
//! - [`LedgerConfig`] - Storage-key prefix, owner sentinels and growth defaults
//!
//! # Feature Flags
//!
//! - `test-utils` - Enables [`MockClock`] for deterministic time testing
//!
//! # Example
//!
//! ```no_run
//! use tally_core::{Clock, LedgerConfig, TracingSetup};
//!
//! TracingSetup::from_env().init();
//! let config = LedgerConfig::from_env().expect("valid TALLY_* variables");
//! let clock = Clock::system();
//! # let _ = (config, clock);
//! ```

mod clock;
mod config;
mod tracing_setup;

pub use clock::{Clock, ClockProvider};
pub use config::{
    ConfigError, DEFAULT_INTERVAL_ENV, KEY_PREFIX_ENV, LedgerConfig, UNKNOWN_OWNER_ENV,
};
pub use tracing_setup::{
    LOG_FILTER_ENV, LOG_FORMAT_ENV, TracingFormat, TracingSetup, UnknownFormat,
};

// Re-export test utilities
#[cfg(any(test, feature = "test-utils"))]
pub use clock::MockClock;
