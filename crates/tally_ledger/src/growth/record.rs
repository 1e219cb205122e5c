//! Persisted growth configuration and the accrual formula table.

use core::fmt;
use serde::{Deserialize, Serialize};
use tally_store::Storable;

use crate::error::{LedgerError, Result};

/// How one iteration changes the balance.
///
/// Each variant carries only what its formula needs; only percent accrual
/// keeps a base snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Accrual {
    /// Adds `increment` units per iteration.
    Simple {
        /// Units added per iteration.
        increment: f64,
    },
    /// Adds `increment` percent of the snapshot `base_value` per iteration.
    Percent {
        /// Percentage points per iteration.
        increment: f64,
        /// Balance captured when the policy started (or last `set`).
        base_value: f64,
    },
    /// Multiplies the balance by `1 + increment / 100` per iteration.
    CompoundInterest {
        /// Percentage points per iteration.
        increment: f64,
    },
}

impl Accrual {
    /// Returns the configured rate.
    #[must_use]
    pub fn increment(&self) -> f64 {
        match *self {
            Self::Simple { increment }
            | Self::Percent { increment, .. }
            | Self::CompoundInterest { increment } => increment,
        }
    }

    /// Applies `iterations` whole iterations to `current`.
    #[must_use]
    pub fn apply(&self, current: f64, iterations: f64) -> f64 {
        match *self {
            Self::Simple { increment } => current + iterations * increment,
            Self::Percent {
                increment,
                base_value,
            } => current + increment / 100.0 * base_value * iterations,
            Self::CompoundInterest { increment } => {
                current * (1.0 + increment / 100.0).powf(iterations)
            }
        }
    }

    fn is_finite(&self) -> bool {
        match *self {
            Self::Percent {
                increment,
                base_value,
            } => increment.is_finite() && base_value.is_finite(),
            other => other.increment().is_finite(),
        }
    }
}

/// Options shared by every growth-starting operation.
///
/// Unset fields fall back to the ledger defaults: the configured interval,
/// no clamps, and no iteration cap.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GrowthOptions {
    interval_secs: Option<f64>,
    min: Option<f64>,
    max: Option<f64>,
    max_iterations: Option<u64>,
}

impl GrowthOptions {
    /// Creates options with every field unset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the iteration interval in seconds.
    #[must_use]
    pub fn every(mut self, secs: f64) -> Self {
        self.interval_secs = Some(secs);
        self
    }

    /// Clamps accrual results from below.
    #[must_use]
    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Clamps accrual results from above.
    #[must_use]
    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Caps the total number of iterations ever applied.
    #[must_use]
    pub fn with_max_iterations(mut self, count: u64) -> Self {
        self.max_iterations = Some(count);
        self
    }
}

/// Growth state stored under `<resource key>_growth`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthRecord {
    /// Formula and its parameters.
    #[serde(flatten)]
    pub accrual: Accrual,
    /// Seconds per iteration.
    pub interval: f64,
    /// Lower clamp for accrual results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Upper clamp for accrual results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Cap on the total number of iterations ever applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iterations_count: Option<u64>,
    /// Whole iterations applied so far.
    #[serde(default)]
    pub completed_iterations_count: u64,
    /// Origin of the current accrual window, ms since epoch.
    #[serde(default)]
    pub started_at: Option<i64>,
    /// Whether accrual is running.
    #[serde(default)]
    pub enabled: bool,
}

impl Storable for GrowthRecord {
    fn storage_suffix() -> &'static str {
        "_growth"
    }
}

impl GrowthRecord {
    /// Builds a fresh, enabled record whose window starts at `now`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidGrowth`] for a non-positive or non-finite
    /// interval, or non-finite rates and clamps.
    pub fn start(
        accrual: Accrual,
        options: GrowthOptions,
        default_interval: f64,
        now: i64,
    ) -> Result<Self> {
        let interval = options.interval_secs.unwrap_or(default_interval);
        if !interval.is_finite() || interval <= 0.0 {
            return Err(LedgerError::invalid_growth(format!(
                "interval must be a positive number of seconds, got {interval}"
            )));
        }
        if !accrual.is_finite() {
            return Err(LedgerError::invalid_growth("rate must be finite"));
        }
        if options.min.is_some_and(|m| !m.is_finite()) || options.max.is_some_and(|m| !m.is_finite())
        {
            return Err(LedgerError::invalid_growth("clamps must be finite"));
        }

        Ok(Self {
            accrual,
            interval,
            min: options.min,
            max: options.max,
            max_iterations_count: options.max_iterations,
            completed_iterations_count: 0,
            started_at: Some(now),
            enabled: true,
        })
    }

    /// Returns `true` if the record can drive accrual at all.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.interval.is_finite()
            && self.interval > 0.0
            && self.accrual.is_finite()
            && self.min.is_none_or(f64::is_finite)
            && self.max.is_none_or(f64::is_finite)
    }

    /// Returns `true` if both clamps are set and `min > max`.
    #[must_use]
    pub fn has_contradictory_clamps(&self) -> bool {
        matches!((self.min, self.max), (Some(min), Some(max)) if min > max)
    }

    /// Interval in milliseconds.
    #[must_use]
    pub fn interval_millis(&self) -> f64 {
        self.interval * 1000.0
    }

    /// Iterations elapsed between `started_at` and `now`, uncapped and
    /// possibly fractional. Zero when the window has not started or the
    /// elapsed time does not fit in an `i64`.
    #[must_use]
    pub fn iterations_at(&self, now: i64) -> f64 {
        self.started_at
            .and_then(|started_at| now.checked_sub(started_at))
            .map_or(0.0, |elapsed| elapsed as f64 / 1000.0 / self.interval)
    }

    /// Iterations still allowed by the cap, or `None` without a cap.
    #[must_use]
    pub fn remaining_iterations(&self) -> Option<u64> {
        self.max_iterations_count
            .map(|max| max.saturating_sub(self.completed_iterations_count))
    }

    /// Limits `available` iterations to what the cap still allows.
    #[must_use]
    pub fn cap(&self, available: f64) -> f64 {
        match self.remaining_iterations() {
            Some(remaining) => available.min(remaining as f64),
            None => available,
        }
    }

    /// Applies the clamps: `min` first, then `max`; only one ever applies.
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        if let Some(min) = self.min
            && value < min
        {
            return min;
        }
        if let Some(max) = self.max
            && value > max
        {
            return max;
        }
        value
    }
}

impl fmt::Display for GrowthRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let increment = self.accrual.increment();
        let interval = self.interval;
        match self.accrual {
            Accrual::Simple { .. } => write!(f, "add {increment} once at {interval} secs"),
            Accrual::Percent { .. } => write!(f, "add {increment}% once at {interval} secs"),
            Accrual::CompoundInterest { .. } => write!(
                f,
                "add {increment}% once at {interval} secs with reinvesting"
            ),
        }
    }
}
