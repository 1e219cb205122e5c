//! Wall clock abstraction.
//!
//! Growth accrual is computed lazily from wall-clock timestamps persisted in
//! the property store, so the ledger never reads the system time directly.
//! Instead it asks a [`Clock`], which delegates to a [`ClockProvider`]:
//!
//! - [`Clock::system`] - Real time via [`std::time::SystemTime`]
//! - [`Clock::with_provider`] - Any custom provider
//! - [`MockClock`] - Manually advanced clock for deterministic tests
//!   (requires the `test-utils` feature)
//!
//! All timestamps are milliseconds since the Unix epoch.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tally_core::{Clock, MockClock};
//!
//! let mock = Arc::new(MockClock::new(1_000));
//! let clock = Clock::with_provider(mock.clone());
//!
//! mock.advance(Duration::from_secs(60));
//! assert_eq!(clock.now_millis(), 61_000);
//! ```

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

// ─────────────────────────────────────────────────────────────────────────────
// ClockProvider Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Trait for providing the current wall-clock time.
///
/// Implement this for custom time sources (e.g. a clock synchronized with the
/// bot platform, or a frozen clock for tests).
///
/// # Example
///
/// ```
/// use tally_core::ClockProvider;
///
/// /// A clock that always returns the same timestamp.
/// struct FixedClock(i64);
///
/// impl ClockProvider for FixedClock {
///     fn now_millis(&self) -> i64 {
///         self.0
///     }
/// }
/// ```
pub trait ClockProvider: Send + Sync + 'static {
    /// Returns the current time in milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

/// System clock provider using `std::time::SystemTime`.
#[derive(Debug, Clone, Copy, Default)]
struct SystemClock;

impl ClockProvider for SystemClock {
    fn now_millis(&self) -> i64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(since) => duration_to_millis(since),
            // Host clock set before 1970.
            Err(err) => -duration_to_millis(err.duration()),
        }
    }
}

fn duration_to_millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

// ─────────────────────────────────────────────────────────────────────────────
// Clock
// ─────────────────────────────────────────────────────────────────────────────

/// Shared handle to a time source.
///
/// Cheap to clone; every clone observes the same provider.
#[derive(Clone)]
pub struct Clock {
    provider: Arc<dyn ClockProvider>,
}

impl core::fmt::Debug for Clock {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Clock")
            .field("now_millis", &self.now_millis())
            .finish()
    }
}

impl Clock {
    /// Creates a clock backed by the system time.
    #[must_use]
    pub fn system() -> Self {
        Self {
            provider: Arc::new(SystemClock),
        }
    }

    /// Creates a clock with a custom provider.
    #[must_use]
    pub fn with_provider(provider: Arc<dyn ClockProvider>) -> Self {
        Self { provider }
    }

    /// Returns the current time in milliseconds since the Unix epoch.
    #[must_use]
    pub fn now_millis(&self) -> i64 {
        self.provider.now_millis()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::system()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MockClock for Testing
// ─────────────────────────────────────────────────────────────────────────────

/// Mock clock for testing with controllable time.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use std::time::Duration;
/// use tally_core::{Clock, MockClock};
///
/// let mock = Arc::new(MockClock::new(0));
/// let clock = Clock::with_provider(mock.clone());
///
/// mock.advance(Duration::from_secs(90));
/// assert_eq!(clock.now_millis(), 90_000);
/// ```
#[cfg(any(test, feature = "test-utils"))]
pub struct MockClock {
    current: parking_lot::RwLock<i64>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockClock {
    /// Creates a mock clock set to the given timestamp (ms since epoch).
    #[must_use]
    pub fn new(start_millis: i64) -> Self {
        Self {
            current: parking_lot::RwLock::new(start_millis),
        }
    }

    /// Advances the clock by the given duration.
    pub fn advance(&self, duration: Duration) {
        let mut current = self.current.write();
        *current = current.saturating_add(duration_to_millis(duration));
    }

    /// Moves the clock backwards by the given duration.
    pub fn rewind(&self, duration: Duration) {
        let mut current = self.current.write();
        *current = current.saturating_sub(duration_to_millis(duration));
    }

    /// Sets the clock to a specific timestamp.
    pub fn set(&self, millis: i64) {
        *self.current.write() = millis;
    }

    /// Returns the current timestamp.
    #[must_use]
    pub fn current(&self) -> i64 {
        *self.current.read()
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl ClockProvider for MockClock {
    fn now_millis(&self) -> i64 {
        self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_after_2020() {
        let clock = Clock::default();
        // 2020-01-01T00:00:00Z
        assert!(clock.now_millis() > 1_577_836_800_000);
    }

    #[test]
    fn system_clock_is_monotonic_enough() {
        let clock = Clock::system();
        let before = clock.now_millis();
        std::thread::sleep(Duration::from_millis(5));
        assert!(clock.now_millis() - before >= 5);
    }

    #[test]
    fn mock_clock_advance() {
        let mock = MockClock::new(10);
        mock.advance(Duration::from_secs(60));
        assert_eq!(mock.current(), 60_010);
    }

    #[test]
    fn mock_clock_rewind_and_set() {
        let mock = MockClock::new(5_000);
        mock.rewind(Duration::from_secs(2));
        assert_eq!(mock.current(), 3_000);

        mock.set(42);
        assert_eq!(mock.current(), 42);
    }

    #[test]
    fn clock_shares_mock_provider() {
        let mock = Arc::new(MockClock::new(0));
        let clock = Clock::with_provider(mock.clone());
        let copy = clock.clone();

        mock.advance(Duration::from_millis(1_500));

        assert_eq!(clock.now_millis(), 1_500);
        assert_eq!(copy.now_millis(), 1_500);
    }
}
