//! Shared helpers for `tally_ledger` integration tests.
//!
//! Import via `mod common;` in test files.

#![allow(
    dead_code,
    missing_docs,
    reason = "shared test utilities, not all items used in every test binary"
)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tally_core::{Clock, MockClock};
use tally_ledger::{RequestContext, ResourceFactory};
use tally_store::{MemoryStore, PropertyStore, PropertyValue, StoreError};

/// Epoch the mock clock starts at, ms.
pub const T0: i64 = 1_700_000_000_000;

/// A ledger over an in-memory store with a controllable clock.
pub struct Harness {
    pub clock: Arc<MockClock>,
    pub store: Arc<FlakyStore>,
    pub ledger: ResourceFactory,
}

impl Harness {
    pub fn new() -> Self {
        let clock = Arc::new(MockClock::new(T0));
        let store = Arc::new(FlakyStore::default());
        let ledger = ResourceFactory::new(store.clone())
            .with_clock(Clock::with_provider(clock.clone()))
            .scoped(RequestContext::new().with_user(1).with_chat(10));
        Self {
            clock,
            store,
            ledger,
        }
    }

    pub fn advance_secs(&self, secs: u64) {
        self.clock.advance(Duration::from_secs(secs));
    }

    pub fn advance_millis(&self, millis: u64) {
        self.clock.advance(Duration::from_millis(millis));
    }

    pub fn now(&self) -> i64 {
        self.clock.current()
    }

    /// Writes a raw value, bypassing the ledger.
    pub fn poke(&self, key: &str, value: PropertyValue) {
        self.store.inner.set(key, value).unwrap();
    }

    pub fn peek(&self, key: &str) -> Option<PropertyValue> {
        self.store.inner.get(key).unwrap()
    }
}

/// Memory store that can be told to fail.
///
/// Reads fail while `fail_reads` is set; writes fail for the one configured
/// key.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    fail_reads: AtomicBool,
    fail_writes_to: Mutex<Option<String>>,
}

impl FlakyStore {
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes_to(&self, key: Option<&str>) {
        *self.fail_writes_to.lock() = key.map(str::to_string);
    }

    fn write_blocked(&self, key: &str) -> bool {
        self.fail_writes_to
            .lock()
            .as_deref()
            .is_some_and(|blocked| blocked == key)
    }
}

impl PropertyStore for FlakyStore {
    fn get(&self, key: &str) -> tally_store::Result<Option<PropertyValue>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("read refused"));
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: PropertyValue) -> tally_store::Result<()> {
        if self.write_blocked(key) {
            return Err(StoreError::unavailable(format!("write to {key} refused")));
        }
        self.inner.set(key, value)
    }

    fn delete(&self, key: &str) -> tally_store::Result<bool> {
        if self.write_blocked(key) {
            return Err(StoreError::unavailable(format!("delete of {key} refused")));
        }
        self.inner.delete(key)
    }
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
