//! Linkage validation for blocks and anchors.
//!
//! Every check recomputes digests from stored fields. A predecessor's stored
//! digest column is never trusted: that is what catches a row rewritten
//! after commit.

use crate::anchor::Anchor;
use crate::block::Block;
use crate::canonical::anchor_digest;
use crate::crypto::Digest;
use crate::error::LinkError;
use crate::pow::Difficulty;

/// Check that `block` correctly follows `previous`.
///
/// This performs, in order:
/// 1. Index continuity (`previous.index + 1`)
/// 2. Previous-digest linkage against a recomputed digest of `previous`
/// 3. Self-consistency of `block`'s stored digest
pub fn check_link(block: &Block, previous: &Block) -> Result<(), LinkError> {
    let expected = previous.index().checked_add(1);
    if expected != Some(block.index()) {
        return Err(LinkError::IndexDiscontinuity {
            expected: expected.unwrap_or(u64::MAX),
            got: block.index(),
        });
    }

    let previous_digest = previous.compute_digest();
    if block.previous() != Some(&previous_digest) {
        return Err(LinkError::PreviousDigestMismatch {
            index: block.index(),
        });
    }

    if block.digest() != block.compute_digest() {
        return Err(LinkError::DigestMismatch {
            index: block.index(),
        });
    }

    Ok(())
}

/// Check the shape of a genesis block.
///
/// Genesis carries index 0, no predecessor, nonce 0, and a self-consistent
/// digest. Proof-of-work does not apply to it.
pub fn check_genesis(block: &Block) -> Result<(), LinkError> {
    if block.index() != 0 {
        return Err(LinkError::GenesisMalformed(format!(
            "index is {}",
            block.index()
        )));
    }
    if block.previous().is_some() {
        return Err(LinkError::GenesisMalformed("has a previous digest".into()));
    }
    if block.nonce() != 0 {
        return Err(LinkError::GenesisMalformed(format!(
            "nonce is {}",
            block.nonce()
        )));
    }
    if !block.is_self_consistent() {
        return Err(LinkError::DigestMismatch { index: 0 });
    }
    Ok(())
}

/// Incremental verifier for a run of blocks starting at genesis.
///
/// Feed blocks in index order; the verifier keeps only the last one, so a
/// ledger can be checked page by page.
#[derive(Debug)]
pub struct ChainVerifier<'a> {
    difficulty: &'a Difficulty,
    last: Option<Block>,
    verified: u64,
}

impl<'a> ChainVerifier<'a> {
    /// Create a verifier that also enforces `difficulty` on non-genesis blocks.
    pub fn new(difficulty: &'a Difficulty) -> Self {
        Self {
            difficulty,
            last: None,
            verified: 0,
        }
    }

    /// Verify the next block.
    pub fn push(&mut self, block: Block) -> Result<(), LinkError> {
        match &self.last {
            None => check_genesis(&block)?,
            Some(previous) => {
                check_link(&block, previous)?;
                if !self.difficulty.is_satisfied_by(&block.digest()) {
                    return Err(LinkError::ProofOfWorkUnsatisfied {
                        index: block.index(),
                        prefix: self.difficulty.as_prefix().unwrap_or_default().to_string(),
                    });
                }
            }
        }
        self.last = Some(block);
        self.verified += 1;
        Ok(())
    }

    /// Number of blocks verified so far.
    pub fn verified(&self) -> u64 {
        self.verified
    }

    /// The last verified block.
    pub fn last(&self) -> Option<&Block> {
        self.last.as_ref()
    }
}

/// Verify a complete slice of blocks from genesis.
pub fn verify_chain(blocks: &[Block], difficulty: &Difficulty) -> Result<u64, LinkError> {
    let mut verifier = ChainVerifier::new(difficulty);
    for block in blocks {
        verifier.push(block.clone())?;
    }
    Ok(verifier.verified())
}

/// Check an anchor against its predecessor and the digests it claims to cover.
///
/// `covered` must be the block digests with index in
/// `(previous.index, anchor.index]` (or `(0, anchor.index]` for the first
/// anchor), in index order.
pub fn check_anchor(
    anchor: &Anchor,
    previous: Option<&Anchor>,
    covered: &[Digest],
) -> Result<(), LinkError> {
    if covered.is_empty() {
        return Err(LinkError::AnchorEmptyRange {
            index: anchor.index,
        });
    }

    let expected_previous = previous.map(|a| a.digest);
    if anchor.previous != expected_previous {
        return Err(LinkError::AnchorPreviousMismatch {
            index: anchor.index,
        });
    }

    if anchor.digest != anchor_digest(covered) {
        return Err(LinkError::AnchorDigestMismatch {
            index: anchor.index,
        });
    }

    Ok(())
}
