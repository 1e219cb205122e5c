//! Named, owner-scoped balances.

use core::fmt;
use std::sync::Arc;

use tally_core::{Clock, LedgerConfig};
use tally_store::{PropertyStore, PropertyStoreExt};
use tracing::{debug, warn};

use crate::amount::{AmountInput, require};
use crate::error::{LedgerError, Result};
use crate::growth::Growth;
use crate::owner::{Owner, ResourceKey};

// ─────────────────────────────────────────────────────────────────────────────
// Base value slot
// ─────────────────────────────────────────────────────────────────────────────

/// The stored number behind a resource.
///
/// Shared by [`Resource`] and its [`Growth`] so that accrual can commit
/// results without a back-reference to the resource.
#[derive(Clone)]
pub(crate) struct BaseValue {
    key: ResourceKey,
    store: Arc<dyn PropertyStore>,
}

impl BaseValue {
    pub(crate) fn new(key: ResourceKey, store: Arc<dyn PropertyStore>) -> Self {
        Self { key, store }
    }

    pub(crate) fn key(&self) -> &ResourceKey {
        &self.key
    }

    pub(crate) fn store(&self) -> &dyn PropertyStore {
        self.store.as_ref()
    }

    /// Reads the raw stored number. Absent keys read as zero, as do values of
    /// the wrong type (with a warning).
    pub(crate) fn read(&self) -> Result<f64> {
        match self.store.get_number(self.key.as_str()) {
            Ok(Some(value)) if value.is_finite() => Ok(value),
            Ok(Some(value)) => {
                warn!(key = %self.key, value, "non-finite base value, reading as 0");
                Ok(0.0)
            }
            Ok(None) => Ok(0.0),
            Err(err) if err.is_data_error() => {
                warn!(key = %self.key, error = %err, "unreadable base value, reading as 0");
                Ok(0.0)
            }
            Err(err) => Err(err.into()),
        }
    }

    pub(crate) fn write(&self, value: f64) -> Result<()> {
        self.store.set_number(self.key.as_str(), value)?;
        debug!(key = %self.key, value, "base value written");
        Ok(())
    }
}

impl fmt::Debug for BaseValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseValue")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Transfer receipts
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of a completed transfer or exchange.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transfer {
    /// Amount removed from the source.
    pub debited: f64,
    /// Amount added to the destination.
    pub credited: f64,
    /// Source balance after the debit.
    pub source_balance: f64,
    /// Destination balance after the credit.
    pub destination_balance: f64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Resource
// ─────────────────────────────────────────────────────────────────────────────

/// A named balance owned by a user, chat, the global namespace or any other
/// entity.
///
/// Resources are cheap handles: nothing is stored until the first write, and
/// an unknown key reads as zero. The logical [`value`](Self::value) includes
/// growth accrued since the last read.
///
/// Multi-step operations (transfers, exchanges) are not atomic. A failure
/// after the source was debited surfaces as
/// [`LedgerError::PartialTransfer`] and is never rolled back.
#[derive(Debug, Clone)]
pub struct Resource {
    owner: Owner,
    name: String,
    base: BaseValue,
    growth: Growth,
}

impl Resource {
    pub(crate) fn new(
        owner: Owner,
        name: impl Into<String>,
        store: Arc<dyn PropertyStore>,
        clock: Clock,
        config: &LedgerConfig,
    ) -> Self {
        let name = name.into();
        let key = ResourceKey::namespace(&config.key_prefix, &owner, &name);
        let base = BaseValue::new(key, store);
        let growth = Growth::new(base.clone(), clock, config.default_interval_secs);
        Self {
            owner,
            name,
            base,
            growth,
        }
    }

    /// Resource name, e.g. `"coins"`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owner of this balance.
    #[must_use]
    pub fn owner(&self) -> &Owner {
        &self.owner
    }

    /// Storage key of the base value.
    #[must_use]
    pub fn key(&self) -> &ResourceKey {
        self.base.key()
    }

    /// The growth policy attached to this resource.
    #[must_use]
    pub fn growth(&self) -> &Growth {
        &self.growth
    }

    // ─────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────

    /// Raw stored value, without growth.
    ///
    /// # Errors
    ///
    /// [`LedgerError::StorageUnavailable`] if the store cannot be read.
    pub fn base_value(&self) -> Result<f64> {
        self.base.read()
    }

    /// Logical value: the base value plus every whole growth interval
    /// elapsed so far. Applying accrual may write to the store.
    ///
    /// # Errors
    ///
    /// [`LedgerError::StorageUnavailable`] if the store fails.
    pub fn value(&self) -> Result<f64> {
        let base = self.base.read()?;
        self.growth.get_value(base)
    }

    /// Returns `true` if the balance covers `amount`.
    ///
    /// Non-numeric and non-positive amounts are never covered.
    ///
    /// # Errors
    ///
    /// [`LedgerError::StorageUnavailable`] if the store fails.
    pub fn have(&self, amount: impl AmountInput) -> Result<bool> {
        match amount.coerce() {
            Some(amount) if amount > 0.0 => Ok(self.value()? >= amount),
            _ => Ok(false),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Writes
    // ─────────────────────────────────────────────────────────────────────

    /// Replaces the base value. While percent growth is enabled the
    /// percentage base moves to `amount` as well.
    ///
    /// # Errors
    ///
    /// [`LedgerError::NonNumericInput`] if `amount` is not numeric.
    pub fn set(&self, amount: impl AmountInput) -> Result<()> {
        let amount = require(&amount)?;
        self.growth.rebase(amount)?;
        self.base.write(amount)
    }

    /// Adds `amount` (possibly negative) and returns the new value.
    ///
    /// # Errors
    ///
    /// [`LedgerError::NonNumericInput`] if `amount` is not numeric, or if the
    /// sum overflows.
    pub fn add(&self, amount: impl AmountInput) -> Result<f64> {
        let amount = require(&amount)?;
        let next = self.value()? + amount;
        self.set(next)?;
        Ok(next)
    }

    /// Removes `amount` and returns the new value.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InsufficientResource`] unless [`have`](Self::have)
    /// holds; nothing is written in that case.
    pub fn remove(&self, amount: impl AmountInput) -> Result<f64> {
        let amount = require(&amount)?;
        let available = self.value()?;
        if amount <= 0.0 || available < amount {
            return Err(self.insufficient(amount, available));
        }
        let next = available - amount;
        self.set(next)?;
        Ok(next)
    }

    /// Removes `amount` even if the balance goes negative.
    ///
    /// # Errors
    ///
    /// [`LedgerError::NonNumericInput`] if `amount` is not numeric.
    pub fn remove_anyway(&self, amount: impl AmountInput) -> Result<f64> {
        let amount = require(&amount)?;
        let next = self.value()? - amount;
        self.set(next)?;
        Ok(next)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Transfers
    // ─────────────────────────────────────────────────────────────────────

    /// Moves `amount` from this resource into `to`, which must carry the
    /// same name.
    ///
    /// # Errors
    ///
    /// [`LedgerError::NameMismatch`] before anything is read,
    /// [`LedgerError::InsufficientResource`] if this resource does not cover
    /// `amount`, [`LedgerError::PartialTransfer`] if crediting `to` failed
    /// after the debit.
    pub fn transfer_to(&self, to: &Resource, amount: impl AmountInput) -> Result<Transfer> {
        self.ensure_same_name(to)?;
        let amount = require(&amount)?;
        move_between(self, to, amount, amount, true)
    }

    /// Moves `amount` from `from` into this resource. Mirror of
    /// [`transfer_to`](Self::transfer_to).
    pub fn take_from_another(&self, from: &Resource, amount: impl AmountInput) -> Result<Transfer> {
        from.transfer_to(self, amount)
    }

    /// Removes `remove_amount` from this resource and adds `add_amount` to
    /// `to`. Names may differ.
    ///
    /// # Errors
    ///
    /// As [`transfer_to`](Self::transfer_to), minus the name check.
    pub fn exchange_to(
        &self,
        to: &Resource,
        remove_amount: impl AmountInput,
        add_amount: impl AmountInput,
    ) -> Result<Transfer> {
        let remove_amount = require(&remove_amount)?;
        let add_amount = require(&add_amount)?;
        move_between(self, to, remove_amount, add_amount, true)
    }

    /// [`transfer_to`](Self::transfer_to) without the balance check; the
    /// source may go negative. Names must still match.
    pub fn transfer_to_anyway(&self, to: &Resource, amount: impl AmountInput) -> Result<Transfer> {
        self.ensure_same_name(to)?;
        let amount = require(&amount)?;
        move_between(self, to, amount, amount, false)
    }

    /// [`take_from_another`](Self::take_from_another) without the balance
    /// check.
    pub fn take_from_another_anyway(
        &self,
        from: &Resource,
        amount: impl AmountInput,
    ) -> Result<Transfer> {
        from.transfer_to_anyway(self, amount)
    }

    /// [`exchange_to`](Self::exchange_to) without the balance check.
    pub fn exchange_to_anyway(
        &self,
        to: &Resource,
        remove_amount: impl AmountInput,
        add_amount: impl AmountInput,
    ) -> Result<Transfer> {
        let remove_amount = require(&remove_amount)?;
        let add_amount = require(&add_amount)?;
        move_between(self, to, remove_amount, add_amount, false)
    }

    fn ensure_same_name(&self, other: &Resource) -> Result<()> {
        if self.name == other.name {
            Ok(())
        } else {
            Err(LedgerError::NameMismatch {
                from: self.name.clone(),
                to: other.name.clone(),
            })
        }
    }

    fn insufficient(&self, requested: f64, available: f64) -> LedgerError {
        LedgerError::InsufficientResource {
            resource: self.key().to_string(),
            requested,
            available,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.owner)
    }
}

fn move_between(
    from: &Resource,
    to: &Resource,
    debit: f64,
    credit: f64,
    checked: bool,
) -> Result<Transfer> {
    let source_balance = if checked {
        from.remove(debit)?
    } else {
        from.remove_anyway(debit)?
    };

    match to.add(credit) {
        Ok(destination_balance) => {
            debug!(from = %from.key(), to = %to.key(), debit, credit, "transfer applied");
            Ok(Transfer {
                debited: debit,
                credited: credit,
                source_balance,
                destination_balance,
            })
        }
        Err(err) => {
            warn!(
                from = %from.key(),
                to = %to.key(),
                debited = debit,
                error = %err,
                "transfer credit failed after debit"
            );
            Err(LedgerError::PartialTransfer {
                from: from.key().to_string(),
                to: to.key().to_string(),
                debited: debit,
                source: Box::new(err),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::MockClock;
    use tally_store::MemoryStore;

    use crate::owner::OwnerKind;

    fn resource(id: &str, name: &str) -> Resource {
        let store: Arc<dyn PropertyStore> = Arc::new(MemoryStore::new());
        Resource::new(
            Owner::new(OwnerKind::User, id),
            name,
            store,
            Clock::with_provider(Arc::new(MockClock::new(0))),
            &LedgerConfig::default(),
        )
    }

    #[test]
    fn unknown_key_reads_zero() {
        let coins = resource("1", "coins");
        assert_eq!(coins.value().unwrap(), 0.0);
        assert_eq!(coins.base_value().unwrap(), 0.0);
    }

    #[test]
    fn key_and_display() {
        let coins = resource("7", "coins");
        assert_eq!(coins.key().as_str(), "ResourcesLib_user_7_coins");
        assert_eq!(coins.to_string(), "coins@user:7");
        assert_eq!(
            coins.growth().record_key(),
            "ResourcesLib_user_7_coins_growth"
        );
    }

    #[test]
    fn wrong_typed_base_reads_zero() {
        let coins = resource("1", "coins");
        coins
            .base
            .store()
            .set(coins.key().as_str(), true.into())
            .unwrap();
        assert_eq!(coins.value().unwrap(), 0.0);
    }

    #[test]
    fn add_returns_new_balance() {
        let coins = resource("1", "coins");
        assert_eq!(coins.add(5).unwrap(), 5.0);
        assert_eq!(coins.add("2.5").unwrap(), 7.5);
        assert_eq!(coins.add(-10).unwrap(), -2.5);
    }

    #[test]
    fn overflowing_add_is_rejected() {
        let coins = resource("1", "coins");
        coins.set(f64::MAX).unwrap();
        let err = coins.add(f64::MAX).unwrap_err();
        assert!(matches!(err, LedgerError::NonNumericInput(_)));
        assert_eq!(coins.value().unwrap(), f64::MAX);
    }
}
