//! Error types raised by property stores.

use crate::value::TypeHint;
use thiserror::Error;

/// Errors surfaced by [`PropertyStore`](crate::PropertyStore) implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing service could not be reached or refused the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Local I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A structured value could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The stored value has a different type than the caller asked for.
    #[error("type mismatch for '{key}': expected {expected}, found {found}")]
    TypeMismatch {
        /// Key that was read.
        key: String,
        /// Type the caller asked for.
        expected: TypeHint,
        /// Type actually stored.
        found: TypeHint,
    },
}

impl StoreError {
    /// Creates an [`Unavailable`](Self::Unavailable) error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Returns `true` if the error describes bad stored data rather than a
    /// failure to reach the store.
    #[must_use]
    pub fn is_data_error(&self) -> bool {
        matches!(self, Self::Serialization(_) | Self::TypeMismatch { .. })
    }
}

/// Result alias for store operations.
pub type Result<T> = core::result::Result<T, StoreError>;
