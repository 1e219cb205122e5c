//! Lazy, time-based growth attached to a resource.
//!
//! A [`Growth`] never runs in the background. Elapsed whole intervals are
//! applied the next time the owning resource is read, and the fractional
//! remainder is carried by moving the window origin (`started_at`) forward
//! only by the time actually consumed. Reading twice with no whole interval
//! in between is a no-op.
//!
//! # Stored state
//!
//! The policy is a [`GrowthRecord`] kept under `<resource key>_growth`.
//! A record that fails to decode, or that decodes into something that cannot
//! drive accrual (zero interval, non-finite rate), is logged and treated as
//! absent: growth failures degrade to "no growth" instead of blocking the
//! base ledger. Store outages still propagate.

mod record;

pub use record::{Accrual, GrowthOptions, GrowthRecord};

use tally_core::Clock;
use tally_store::{PropertyStoreExt, Storable};
use tracing::{debug, info, warn};

use crate::amount::{AmountInput, require};
use crate::error::Result;
use crate::resource::BaseValue;

/// Growth policy of one resource.
///
/// Obtained through [`Resource::growth`](crate::Resource::growth). The policy
/// commits accrual results to the resource's base value itself, so a
/// `Growth` handle is usable on its own.
#[derive(Debug, Clone)]
pub struct Growth {
    base: BaseValue,
    clock: Clock,
    default_interval: f64,
}

impl Growth {
    pub(crate) fn new(base: BaseValue, clock: Clock, default_interval: f64) -> Self {
        Self {
            base,
            clock,
            default_interval,
        }
    }

    /// Storage key of the growth record.
    #[must_use]
    pub fn record_key(&self) -> String {
        GrowthRecord::storage_key(self.base.key().as_str())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Introspection
    // ─────────────────────────────────────────────────────────────────────

    /// Returns the stored record, if a usable one exists.
    ///
    /// # Errors
    ///
    /// [`LedgerError::StorageUnavailable`](crate::LedgerError::StorageUnavailable)
    /// if the store cannot be read.
    pub fn info(&self) -> Result<Option<GrowthRecord>> {
        self.load()
    }

    /// Returns `true` if a usable record exists, enabled or not.
    pub fn exists(&self) -> Result<bool> {
        Ok(self.load()?.is_some())
    }

    /// Returns `true` if growth is currently accruing.
    pub fn is_enabled(&self) -> Result<bool> {
        Ok(self.load()?.is_some_and(|record| record.enabled))
    }

    /// Human-readable description, e.g. `"add 5 once at 60 secs"`.
    ///
    /// `None` unless growth is enabled.
    pub fn title(&self) -> Result<Option<String>> {
        Ok(self
            .load()?
            .filter(|record| record.enabled)
            .as_ref()
            .map(ToString::to_string))
    }

    /// Iterations elapsed in the current window and not yet applied.
    ///
    /// Fractional and uncapped; zero unless growth is enabled.
    pub fn total_iterations(&self) -> Result<f64> {
        let now = self.clock.now_millis();
        Ok(self
            .load()?
            .filter(|record| record.enabled)
            .map_or(0.0, |record| record.iterations_at(now).max(0.0)))
    }

    /// Progress through the current iteration, in percent (`0.0..100.0`).
    ///
    /// `None` unless growth is enabled and the iteration cap leaves room.
    pub fn progress(&self) -> Result<Option<f64>> {
        let now = self.clock.now_millis();
        Ok(self
            .running()?
            .map(|record| record.iterations_at(now).max(0.0).fract() * 100.0))
    }

    /// Seconds until the next whole iteration lands.
    ///
    /// `None` unless growth is enabled and the iteration cap leaves room.
    pub fn will_complete_after(&self) -> Result<Option<f64>> {
        let now = self.clock.now_millis();
        Ok(self.running()?.map(|record| {
            let done = record.iterations_at(now).max(0.0).fract();
            record.interval * (1.0 - done)
        }))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────

    /// Starts simple growth: `increment` units every interval.
    ///
    /// Replaces any prior record; pending iterations of the previous policy
    /// are not applied.
    ///
    /// # Errors
    ///
    /// [`LedgerError::NonNumericInput`](crate::LedgerError::NonNumericInput)
    /// for a non-numeric increment,
    /// [`LedgerError::InvalidGrowth`](crate::LedgerError::InvalidGrowth) for
    /// unusable options.
    pub fn add(&self, increment: impl AmountInput, options: GrowthOptions) -> Result<GrowthRecord> {
        let increment = require(&increment)?;
        self.start(Accrual::Simple { increment }, options)
    }

    /// Starts percent growth: `percent`% of the current base value every
    /// interval. The base is snapshotted now and only moves on `set`.
    pub fn add_percent(&self, percent: impl AmountInput, options: GrowthOptions) -> Result<GrowthRecord> {
        let increment = require(&percent)?;
        let base_value = self.base.read()?;
        self.start(
            Accrual::Percent {
                increment,
                base_value,
            },
            options,
        )
    }

    /// Starts compound growth: the balance is multiplied by
    /// `1 + percent / 100` every interval.
    pub fn add_compound_interest(
        &self,
        percent: impl AmountInput,
        options: GrowthOptions,
    ) -> Result<GrowthRecord> {
        let increment = require(&percent)?;
        self.start(Accrual::CompoundInterest { increment }, options)
    }

    /// Stops growth, keeping the record.
    ///
    /// Whole iterations elapsed so far are applied first. Returns `false` if
    /// there was no record to stop.
    pub fn stop(&self) -> Result<bool> {
        let Some(mut record) = self.load()? else {
            return Ok(false);
        };
        let now = self.clock.now_millis();
        if record.enabled {
            let current = self.base.read()?;
            self.accrue(&mut record, current, now)?;
        }

        record.enabled = false;
        record.started_at = Some(now);
        self.save(&record)?;
        info!(key = %self.base.key(), "growth stopped");
        Ok(true)
    }

    /// Deletes the record without settling pending iterations.
    ///
    /// Returns `false` if nothing was stored.
    pub fn remove(&self) -> Result<bool> {
        let removed = self
            .base
            .store()
            .delete_record::<GrowthRecord>(self.base.key().as_str())?;
        if removed {
            info!(key = %self.base.key(), "growth removed");
        }
        Ok(removed)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accrual
    // ─────────────────────────────────────────────────────────────────────

    /// Applies every whole interval elapsed since the window origin to
    /// `current_base` and returns the logical value.
    ///
    /// When at least one iteration lands, the updated record is persisted
    /// before the new base value is committed. Without an enabled record the
    /// input is returned unchanged.
    ///
    /// # Errors
    ///
    /// [`LedgerError::StorageUnavailable`](crate::LedgerError::StorageUnavailable)
    /// if either write fails. A failed base commit leaves the record ahead of
    /// the base value.
    pub fn get_value(&self, current_base: f64) -> Result<f64> {
        match self.load()? {
            Some(mut record) if record.enabled => {
                self.accrue(&mut record, current_base, self.clock.now_millis())
            }
            _ => Ok(current_base),
        }
    }

    /// Moves the percent snapshot to `amount` while growth is enabled.
    pub(crate) fn rebase(&self, amount: f64) -> Result<()> {
        let Some(mut record) = self.load()? else {
            return Ok(());
        };
        if !record.enabled {
            return Ok(());
        }
        if let Accrual::Percent { base_value, .. } = &mut record.accrual {
            *base_value = amount;
            self.save(&record)?;
            debug!(key = %self.base.key(), snapshot = amount, "percent base moved");
        }
        Ok(())
    }

    fn accrue(&self, record: &mut GrowthRecord, current_base: f64, now: i64) -> Result<f64> {
        if record.started_at.is_none() {
            return Ok(current_base);
        }

        let iterations = record.cap(record.iterations_at(now));
        if iterations < 1.0 {
            return Ok(current_base);
        }
        let whole = iterations.floor();
        let fraction = iterations - whole;

        let result = record.clamp(record.accrual.apply(current_base, whole));
        if !result.is_finite() {
            warn!(
                key = %self.base.key(),
                iterations = whole,
                "accrual produced a non-finite value, keeping current base"
            );
            return Ok(current_base);
        }

        record.completed_iterations_count = record
            .completed_iterations_count
            .saturating_add(whole as u64);
        let carry = (fraction * record.interval_millis()).round() as i64;
        record.started_at = Some(now.saturating_sub(carry));
        self.save(record)?;
        self.base.write(result)?;

        debug!(
            key = %self.base.key(),
            iterations = whole,
            from = current_base,
            to = result,
            "growth accrued"
        );
        Ok(result)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Storage
    // ─────────────────────────────────────────────────────────────────────

    fn start(&self, accrual: Accrual, options: GrowthOptions) -> Result<GrowthRecord> {
        let record =
            GrowthRecord::start(accrual, options, self.default_interval, self.clock.now_millis())?;
        if record.has_contradictory_clamps() {
            warn!(
                key = %self.base.key(),
                min = ?record.min,
                max = ?record.max,
                "growth min exceeds max, results will always clamp"
            );
        }
        self.save(&record)?;
        info!(key = %self.base.key(), policy = %record, "growth started");
        Ok(record)
    }

    fn running(&self) -> Result<Option<GrowthRecord>> {
        Ok(self
            .load()?
            .filter(|record| record.enabled && record.remaining_iterations() != Some(0)))
    }

    fn load(&self) -> Result<Option<GrowthRecord>> {
        let key = self.base.key().as_str();
        match self.base.store().get_record::<GrowthRecord>(key) {
            Ok(Some(record)) if record.is_well_formed() => Ok(Some(record)),
            Ok(Some(record)) => {
                warn!(key, ?record, "ignoring unusable growth record");
                Ok(None)
            }
            Ok(None) => Ok(None),
            Err(err) if err.is_data_error() => {
                warn!(key, error = %err, "ignoring malformed growth record");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, record: &GrowthRecord) -> Result<()> {
        self.base
            .store()
            .set_record(self.base.key().as_str(), record)?;
        Ok(())
    }
}
