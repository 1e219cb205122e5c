//! Error types for ledger operations.

use tally_store::StoreError;
use thiserror::Error;

/// Errors that can occur while reading or mutating resources.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The amount is neither a finite number nor a numeric string.
    #[error("value must be a number, got {0}")]
    NonNumericInput(String),

    /// The resource holds less than the requested amount.
    #[error("not enough '{resource}': requested {requested}, available {available}")]
    InsufficientResource {
        /// Key of the resource that was short.
        resource: String,
        /// Amount requested.
        requested: f64,
        /// Logical value at the time of the check.
        available: f64,
    },

    /// A same-name transfer was requested between different resources.
    #[error("can not transfer '{from}' into '{to}': resource names differ")]
    NameMismatch {
        /// Name of the source resource.
        from: String,
        /// Name of the destination resource.
        to: String,
    },

    /// Growth options were rejected before any state was written.
    #[error("invalid growth options: {0}")]
    InvalidGrowth(String),

    /// The source of a transfer was debited but crediting the destination
    /// failed. The ledger is left partially applied; nothing is rolled back.
    #[error("transfer from '{from}' to '{to}' only half applied: debited {debited}, credit failed: {source}")]
    PartialTransfer {
        /// Key of the debited resource.
        from: String,
        /// Key of the resource that was not credited.
        to: String,
        /// Amount already removed from `from`.
        debited: f64,
        /// Why the credit failed.
        #[source]
        source: Box<LedgerError>,
    },

    /// The property store could not serve the request.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] StoreError),
}

impl LedgerError {
    /// Creates a [`NonNumericInput`](Self::NonNumericInput), truncating the
    /// offending input to 50 characters.
    pub fn non_numeric(input: impl core::fmt::Display) -> Self {
        let shown: String = input.to_string().chars().take(50).collect();
        Self::NonNumericInput(shown)
    }

    /// Creates an [`InvalidGrowth`](Self::InvalidGrowth).
    pub fn invalid_growth(msg: impl Into<String>) -> Self {
        Self::InvalidGrowth(msg.into())
    }

    /// Returns `true` if the error left some state changed (a partial
    /// transfer).
    #[must_use]
    pub fn is_partial(&self) -> bool {
        matches!(self, Self::PartialTransfer { .. })
    }
}

/// Result alias for ledger operations.
pub type Result<T> = core::result::Result<T, LedgerError>;
