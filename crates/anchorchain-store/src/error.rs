//! Error types for the store module.

use std::fmt::Display;

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored row could not be decoded (wrong digest length, negative index).
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),
}

impl StoreError {
    /// A lock guarding the backend was poisoned by a panicking writer.
    pub(crate) fn poisoned(e: impl Display) -> Self {
        StoreError::Database(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
            Some(format!("lock poisoned: {}", e)),
        ))
    }

    /// The blocking task running a query panicked or was cancelled.
    pub(crate) fn join(e: impl Display) -> Self {
        StoreError::Database(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
            Some(format!("spawn_blocking failed: {}", e)),
        ))
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
