//! Error types for anchorchain core.

use thiserror::Error;

/// Core errors that can occur while building or encoding records.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid proof-of-work prefix {0:?}: must be lowercase hex")]
    InvalidPrefix(String),

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("decoding error: {0}")]
    Decoding(String),
}

/// Linkage and integrity failures found while checking blocks and anchors.
///
/// `Block::is_valid` collapses the first three variants to `false`; the
/// rest are only produced when verifying a whole ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("index discontinuity: expected {expected}, got {got}")]
    IndexDiscontinuity { expected: u64, got: u64 },

    #[error("block {index}: previous digest does not match predecessor")]
    PreviousDigestMismatch { index: u64 },

    #[error("block {index}: stored digest does not match its contents")]
    DigestMismatch { index: u64 },

    #[error("block {index} is missing")]
    MissingBlock { index: u64 },

    #[error("malformed genesis block: {0}")]
    GenesisMalformed(String),

    #[error("block {index}: digest does not satisfy proof-of-work prefix {prefix:?}")]
    ProofOfWorkUnsatisfied { index: u64, prefix: String },

    #[error("anchor {index}: covers no blocks")]
    AnchorEmptyRange { index: u64 },

    #[error("anchor {index}: previous anchor digest does not match")]
    AnchorPreviousMismatch { index: u64 },

    #[error("anchor {index}: digest does not match covered blocks")]
    AnchorDigestMismatch { index: u64 },
}

/// Proof-of-work search stopped before finding a solution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PowError {
    /// The search was cancelled; resume from `next_nonce`.
    #[error("proof-of-work search cancelled (next nonce {next_nonce})")]
    Cancelled { next_nonce: u64 },

    /// The iteration budget ran out; resume from `next_nonce`.
    #[error("proof-of-work budget of {iterations} iterations exhausted (next nonce {next_nonce})")]
    BudgetExhausted { next_nonce: u64, iterations: u64 },
}
