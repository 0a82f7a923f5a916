//! Anchor Compactor: folds committed block digests into checkpoints.
//!
//! The compactor owns the anchor table and only ever reads the chain table.
//! Each checkpoint covers the blocks after the previous checkpoint up to the
//! head at the time of the call, so ranges are contiguous and never overlap.

use std::sync::Arc;
use std::time::Duration;

use anchorchain_core::{check_anchor, Anchor, Block, LinkError};
use anchorchain_store::{InsertResult, Store};

use crate::error::{LedgerError, Result};
use crate::ledger::bounded;

/// Writes and verifies anchors over a block store.
pub struct AnchorCompactor<S: Store> {
    store: Arc<S>,
    timeout: Duration,
}

impl<S: Store> AnchorCompactor<S> {
    /// Create a compactor over `store`, bounding each storage call by `timeout`.
    pub fn new(store: Arc<S>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Fold blocks `(last anchor index, head_index]` into a new anchor.
    ///
    /// With no prior anchor the range starts after genesis. Returns
    /// [`LedgerError::NoRangeToAnchor`] when the range is empty and
    /// [`LedgerError::DuplicateOrConflict`] when the anchor table rejects the
    /// row.
    pub async fn compact(&self, head_index: u64) -> Result<Anchor> {
        let latest = bounded(self.timeout, self.store.latest_anchor()).await?;
        let (last_index, last_digest) = match &latest {
            Some(anchor) => (anchor.index, Some(anchor.digest)),
            None => (0, None),
        };

        let covered = bounded(
            self.timeout,
            self.store.block_digests_between(last_index, head_index),
        )
        .await?;
        if covered.is_empty() {
            return Err(LedgerError::NoRangeToAnchor {
                last_anchor_index: last_index,
            });
        }

        let anchor = Anchor::new(head_index, &covered, last_digest);
        match bounded(self.timeout, self.store.insert_anchor(&anchor)).await? {
            InsertResult::Inserted => {
                tracing::info!(
                    index = anchor.index,
                    blocks = covered.len(),
                    digest = %anchor.digest,
                    "anchor committed"
                );
                Ok(anchor)
            }
            rejected => {
                tracing::warn!(index = anchor.index, ?rejected, "anchor rejected by store");
                Err(LedgerError::DuplicateOrConflict {
                    index: anchor.index,
                    digest: anchor.digest,
                })
            }
        }
    }

    /// Replay the anchor chain against the chain table.
    ///
    /// Block digests are recomputed from stored fields, so a rewritten block
    /// row breaks the anchor that covers it even if its digest column was
    /// left alone. Returns the number of anchors verified.
    pub async fn verify(&self) -> Result<u64> {
        let anchors = bounded(self.timeout, self.store.list_anchors()).await?;

        let mut previous: Option<&Anchor> = None;
        for anchor in &anchors {
            let start = previous.map_or(0, |a| a.index) + 1;
            let blocks = bounded(
                self.timeout,
                self.store.get_blocks_range(start, anchor.index),
            )
            .await?;

            if let Some(index) = first_gap(&blocks, start, anchor.index) {
                return Err(broken(anchor, LinkError::MissingBlock { index }));
            }

            let covered: Vec<_> = blocks.iter().map(|b| b.compute_digest()).collect();
            check_anchor(anchor, previous, &covered).map_err(|reason| broken(anchor, reason))?;
            previous = Some(anchor);
        }

        Ok(anchors.len() as u64)
    }

    /// List all anchors, ordered by index.
    pub async fn anchors(&self) -> Result<Vec<Anchor>> {
        bounded(self.timeout, self.store.list_anchors()).await
    }
}

/// First index in `start..=end` with no block in `blocks` (sorted by index).
fn first_gap(blocks: &[Block], start: u64, end: u64) -> Option<u64> {
    if end < start {
        return None;
    }
    blocks
        .iter()
        .zip(start..=end)
        .find(|(block, index)| block.index() != *index)
        .map(|(_, index)| index)
        .or_else(|| {
            let next = start + blocks.len() as u64;
            (next <= end).then_some(next)
        })
}

fn broken(anchor: &Anchor, reason: LinkError) -> LedgerError {
    LedgerError::AnchorBroken {
        index: anchor.index,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchorchain_core::UnsealedBlock;
    use anchorchain_store::MemoryStore;
    use bytes::Bytes;

    async fn store_with_chain(len: u64) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        let mut previous = Block::genesis(UnsealedBlock::with_timestamp(b"g".to_vec(), 1));
        store.insert_block(&previous).await.unwrap();
        for i in 1..len {
            let block = UnsealedBlock::with_timestamp(vec![i as u8], 1 + i as i64)
                .seal(i, Some(previous.digest()), 0);
            store.insert_block(&block).await.unwrap();
            previous = block;
        }
        store
    }

    fn compactor(store: &Arc<MemoryStore>) -> AnchorCompactor<MemoryStore> {
        AnchorCompactor::new(store.clone(), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_first_anchor_skips_genesis() {
        let store = store_with_chain(4).await;
        let anchor = compactor(&store).compact(3).await.unwrap();

        let expected = store.block_digests_between(0, 3).await.unwrap();
        assert_eq!(expected.len(), 3);
        assert_eq!(anchor, Anchor::new(3, &expected, None));
    }

    #[tokio::test]
    async fn test_genesis_only_has_nothing_to_anchor() {
        let store = store_with_chain(1).await;
        let err = compactor(&store).compact(0).await.unwrap_err();
        assert!(matches!(err, LedgerError::NoRangeToAnchor { last_anchor_index: 0 }));
    }

    #[tokio::test]
    async fn test_second_call_without_progress() {
        let store = store_with_chain(3).await;
        let compactor = compactor(&store);
        compactor.compact(2).await.unwrap();

        let err = compactor.compact(2).await.unwrap_err();
        assert!(err.is_no_progress());
        assert_eq!(store.list_anchors().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_chained_ranges_and_verify() {
        let store = store_with_chain(7).await;
        let compactor = compactor(&store);
        let first = compactor.compact(2).await.unwrap();
        let second = compactor.compact(6).await.unwrap();

        assert_eq!(second.previous, Some(first.digest));
        let covered = store.block_digests_between(2, 6).await.unwrap();
        assert!(second.matches(&covered));
        assert_eq!(compactor.verify().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_verify_detects_rewritten_block() {
        let store = store_with_chain(4).await;
        let compactor = compactor(&store);
        compactor.compact(3).await.unwrap();

        let mut edited = store.get_block(2).await.unwrap().unwrap();
        edited.payload = Bytes::from_static(b"forged");
        store.tamper_block(edited).unwrap();

        let err = compactor.verify().await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::AnchorBroken {
                index: 3,
                reason: LinkError::AnchorDigestMismatch { .. }
            }
        ));
    }

    #[test]
    fn test_first_gap() {
        let blocks: Vec<Block> = [1u64, 2, 4]
            .iter()
            .map(|&i| UnsealedBlock::with_timestamp(Vec::<u8>::new(), 0).seal(i, None, 0))
            .collect();
        assert_eq!(first_gap(&blocks, 1, 4), Some(3));
        assert_eq!(first_gap(&blocks[..2], 1, 2), None);
        assert_eq!(first_gap(&blocks[..2], 1, 5), Some(3));
        assert_eq!(first_gap(&[], 3, 2), None);
    }

    #[tokio::test]
    async fn test_verify_detects_relinked_anchor() {
        let store = store_with_chain(5).await;
        let compactor = compactor(&store);
        compactor.compact(2).await.unwrap();

        let covered = store.block_digests_between(2, 4).await.unwrap();
        let forged = Anchor::new(4, &covered, Some(anchorchain_core::Digest::hash(b"elsewhere")));
        store.insert_anchor(&forged).await.unwrap();

        assert!(matches!(
            compactor.verify().await.unwrap_err(),
            LedgerError::AnchorBroken {
                index: 4,
                reason: LinkError::AnchorPreviousMismatch { .. }
            }
        ));
    }
}
