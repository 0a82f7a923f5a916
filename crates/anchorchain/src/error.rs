//! Error types for the ledger.

use std::time::Duration;

use anchorchain_core::{CoreError, Digest, LinkError, PowError};
use anchorchain_store::StoreError;
use thiserror::Error;

/// Errors that can occur during ledger operations.
///
/// Callers usually only need to ask two questions: should I retry with a
/// fresh candidate ([`LedgerError::is_retryable`]), and was there simply
/// nothing to do ([`LedgerError::is_no_progress`]). Everything else points
/// at misconfiguration or a damaged store.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The store could not be opened, created, or read at initialization.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[source] StoreError),

    /// A sealed candidate does not follow the current head.
    #[error("linkage invalid: {0}")]
    LinkageInvalid(#[from] LinkError),

    /// The store rejected the row: same digest, or the index is taken.
    #[error("rejected by store at index {index}: digest {digest} duplicates or conflicts with an existing row")]
    DuplicateOrConflict { index: u64, digest: Digest },

    /// No blocks were committed since the last anchor.
    #[error("nothing to anchor: no blocks after index {last_anchor_index}")]
    NoRangeToAnchor { last_anchor_index: u64 },

    /// Resume was requested but the store holds no blocks.
    #[error("ledger is empty")]
    Empty,

    /// The reloaded head row does not reproduce its stored digest.
    #[error("head block {index} does not match its stored digest")]
    CorruptHead { index: u64 },

    /// Replaying the stored chain found a broken link.
    #[error("chain broken at block {index}: {reason}")]
    ChainBroken { index: u64, reason: LinkError },

    /// Replaying the anchor chain found a broken checkpoint.
    #[error("anchor chain broken at anchor {index}: {reason}")]
    AnchorBroken { index: u64, reason: LinkError },

    /// Proof-of-work stopped before finding a nonce.
    #[error("proof-of-work: {0}")]
    ProofOfWork(#[from] PowError),

    /// The ledger was shut down.
    #[error("ledger is shut down")]
    Cancelled,

    /// A storage call exceeded the configured timeout.
    #[error("storage operation timed out after {0:?}")]
    Timeout(Duration),

    /// The configuration was rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The proof-of-work worker task panicked.
    #[error("worker task failed: {0}")]
    Worker(String),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Core error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),
}

impl LedgerError {
    /// Whether the caller may retry the operation with a fresh candidate.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LedgerError::LinkageInvalid(_)
                | LedgerError::DuplicateOrConflict { .. }
                | LedgerError::Timeout(_)
                | LedgerError::ProofOfWork(PowError::BudgetExhausted { .. })
        )
    }

    /// Whether the operation had nothing to do.
    pub fn is_no_progress(&self) -> bool {
        matches!(self, LedgerError::NoRangeToAnchor { .. })
    }
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_classification() {
        assert!(LedgerError::DuplicateOrConflict {
            index: 3,
            digest: Digest::hash(b"x")
        }
        .is_retryable());
        assert!(LedgerError::ProofOfWork(PowError::BudgetExhausted {
            next_nonce: 10,
            iterations: 9
        })
        .is_retryable());
        assert!(!LedgerError::ProofOfWork(PowError::Cancelled { next_nonce: 1 }).is_retryable());
        assert!(!LedgerError::Cancelled.is_retryable());
        assert!(!LedgerError::InvalidConfig("bad".into()).is_retryable());
    }

    #[test]
    fn test_no_progress() {
        let e = LedgerError::NoRangeToAnchor {
            last_anchor_index: 4,
        };
        assert!(e.is_no_progress());
        assert!(!e.is_retryable());
        assert!(!LedgerError::Empty.is_no_progress());
    }
}
