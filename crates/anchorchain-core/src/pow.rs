//! Proof-of-work: nonce search until a block digest shows a required prefix.
//!
//! The search is CPU-bound and unbounded by nature, so it checks a
//! [`CancelFlag`] on every attempt and can be capped with an iteration budget.
//! Both stop conditions report the next untried nonce so a caller can resume.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::block::Block;
use crate::crypto::Digest;
use crate::error::{CoreError, PowError};

/// Prefix used when no difficulty is configured explicitly.
pub const DEFAULT_PREFIX: &str = "00";

/// The required hex prefix of a block digest, or none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Difficulty(Option<String>);

impl Difficulty {
    /// No proof-of-work: every digest is accepted.
    pub fn none() -> Self {
        Self(None)
    }

    /// Require digests to start with `prefix` (lowercase hex).
    pub fn prefix(prefix: &str) -> Result<Self, CoreError> {
        let valid = prefix.len() <= 64
            && prefix
                .bytes()
                .all(|c| c.is_ascii_digit() || (b'a'..=b'f').contains(&c));
        if !valid {
            return Err(CoreError::InvalidPrefix(prefix.to_string()));
        }
        Ok(Self(Some(prefix.to_string())))
    }

    /// Re-check a value that may have bypassed [`Difficulty::prefix`]
    /// (e.g. one that was deserialized).
    pub fn validate(&self) -> Result<(), CoreError> {
        match &self.0 {
            Some(p) => Self::prefix(p).map(|_| ()),
            None => Ok(()),
        }
    }

    /// The configured prefix, if any.
    pub fn as_prefix(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Whether mining is disabled.
    pub fn is_disabled(&self) -> bool {
        self.0.is_none()
    }

    /// Whether `digest` meets this difficulty.
    pub fn is_satisfied_by(&self, digest: &Digest) -> bool {
        match &self.0 {
            Some(p) => digest.starts_with_hex(p),
            None => true,
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self(Some(DEFAULT_PREFIX.to_string()))
    }
}

/// Cooperative cancellation handle, shared by cloning.
///
/// A flag made with [`CancelFlag::child`] is also cancelled when its parent
/// is, but cancelling the child leaves the parent untouched.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    flag: Arc<AtomicBool>,
    parent: Option<Box<CancelFlag>>,
}

impl CancelFlag {
    /// Create a flag that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// A new flag that also observes cancellation of `self`.
    pub fn child(&self) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            parent: Some(Box::new(self.clone())),
        }
    }

    /// Request cancellation. Every clone and child observes it.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested here or on any ancestor.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
            || self.parent.as_ref().is_some_and(|p| p.is_cancelled())
    }

    /// Cancel this flag when the returned guard is dropped.
    pub fn drop_guard(&self) -> CancelGuard {
        CancelGuard(self.clone())
    }
}

/// Cancels its flag on drop. See [`CancelFlag::drop_guard`].
#[derive(Debug)]
#[must_use = "the flag is cancelled as soon as the guard is dropped"]
pub struct CancelGuard(CancelFlag);

impl Drop for CancelGuard {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

/// A successful search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowSolution {
    /// The nonce whose digest satisfies the difficulty.
    pub nonce: u64,
    /// How many times the block was resealed.
    pub iterations: u64,
}

/// Nonce search over a sealed block.
#[derive(Debug, Clone)]
pub struct ProofOfWork {
    difficulty: Difficulty,
    max_iterations: Option<u64>,
}

impl ProofOfWork {
    /// Create a search for `difficulty` with no iteration cap.
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            max_iterations: None,
        }
    }

    /// Stop after `max` reseals with [`PowError::BudgetExhausted`].
    pub fn with_max_iterations(mut self, max: Option<u64>) -> Self {
        self.max_iterations = max;
        self
    }

    /// The difficulty being searched for.
    pub fn difficulty(&self) -> &Difficulty {
        &self.difficulty
    }

    /// Increment the nonce and reseal `block` until its digest satisfies the
    /// difficulty.
    ///
    /// Returns immediately if mining is disabled or the current digest already
    /// qualifies. The nonce wraps around at `u64::MAX`.
    pub fn search(&self, block: &mut Block, cancel: &CancelFlag) -> Result<PowSolution, PowError> {
        let Some(prefix) = self.difficulty.as_prefix() else {
            return Ok(PowSolution {
                nonce: block.nonce(),
                iterations: 0,
            });
        };

        let mut iterations = 0u64;
        loop {
            if block.digest().starts_with_hex(prefix) {
                return Ok(PowSolution {
                    nonce: block.nonce(),
                    iterations,
                });
            }

            let next_nonce = block.nonce().wrapping_add(1);
            if cancel.is_cancelled() {
                return Err(PowError::Cancelled { next_nonce });
            }
            if let Some(max) = self.max_iterations {
                if iterations >= max {
                    return Err(PowError::BudgetExhausted {
                        next_nonce,
                        iterations,
                    });
                }
            }

            block.reseal(next_nonce);
            iterations += 1;
        }
    }
}
