//! Anchor: a checkpoint folding a contiguous run of block digests.

use serde::{Deserialize, Serialize};

use crate::canonical::anchor_digest;
use crate::crypto::Digest;

/// One checkpoint in the anchor chain.
///
/// Covers blocks with index in `(previous anchor's index, index]`. The first
/// anchor starts after genesis, so genesis is never folded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    /// Index of the last block folded into this anchor.
    pub index: u64,

    /// Digest over the covered block digests, in index order.
    pub digest: Digest,

    /// Digest of the prior anchor (None for the first).
    pub previous: Option<Digest>,
}

impl Anchor {
    /// Build an anchor over `covered`, linked to `previous`.
    pub fn new(index: u64, covered: &[Digest], previous: Option<Digest>) -> Self {
        Self {
            index,
            digest: anchor_digest(covered),
            previous,
        }
    }

    /// Check whether this anchor's digest matches `covered`.
    pub fn matches(&self, covered: &[Digest]) -> bool {
        self.digest == anchor_digest(covered)
    }

    /// Check if this is the first anchor in its chain.
    pub fn is_first(&self) -> bool {
        self.previous.is_none()
    }
}
