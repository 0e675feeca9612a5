//! Error types for the mmsrx-store crate.

use std::io;

use thiserror::Error;

use crate::NotificationUri;

/// Errors surfaced by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No stored notification exists for this reference.
    #[error("Notification not found: {0}")]
    NotificationNotFound(NotificationUri),

    /// The stored record is not of the expected kind.
    #[error("Record at {uri} is {found}, expected a notification")]
    WrongKind { uri: NotificationUri, found: String },

    /// The store refused the write because it is full.
    #[error("Store capacity exceeded: {used}/{capacity} messages")]
    CapacityExceeded { used: usize, capacity: usize },

    /// Internal error (lock poisoning, backend failure, etc.).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Returns `true` if the requested record does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotificationNotFound(_))
    }
}

/// Specialized `Result` type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        Self::Internal(format!("Lock poisoned: {e}"))
    }
}
