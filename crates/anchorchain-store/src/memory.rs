//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;

use anchorchain_core::{Anchor, Block, Digest};

use crate::error::{Result, StoreError};
use crate::traits::{InsertResult, Store};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Blocks ordered by index.
    chain: BTreeMap<u64, Block>,

    /// Digest index over `chain`.
    block_digests: HashMap<Digest, u64>,

    /// Anchors ordered by index.
    anchors: BTreeMap<u64, Anchor>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a stored block in place, digest column included.
    ///
    /// Only for exercising tamper detection; the [`Store`] trait itself
    /// never rewrites rows.
    pub fn tamper_block(&self, block: Block) -> Result<()> {
        let mut inner = self.inner.write().map_err(StoreError::poisoned)?;
        if let Some(old) = inner.chain.insert(block.index(), block.clone()) {
            inner.block_digests.remove(&old.digest());
        }
        inner.block_digests.insert(block.digest(), block.index());
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_block(&self, block: &Block) -> Result<InsertResult> {
        let mut inner = self.inner.write().map_err(StoreError::poisoned)?;
        let digest = block.digest();

        if inner.block_digests.contains_key(&digest) {
            return Ok(InsertResult::Duplicate);
        }
        if let Some(existing) = inner.chain.get(&block.index()) {
            return Ok(InsertResult::Conflict {
                existing: existing.digest(),
            });
        }

        inner.block_digests.insert(digest, block.index());
        inner.chain.insert(block.index(), block.clone());
        Ok(InsertResult::Inserted)
    }

    async fn latest_block(&self) -> Result<Option<Block>> {
        let inner = self.inner.read().map_err(StoreError::poisoned)?;
        Ok(inner.chain.values().next_back().cloned())
    }

    async fn get_block(&self, index: u64) -> Result<Option<Block>> {
        let inner = self.inner.read().map_err(StoreError::poisoned)?;
        Ok(inner.chain.get(&index).cloned())
    }

    async fn get_block_by_digest(&self, digest: &Digest) -> Result<Option<Block>> {
        let inner = self.inner.read().map_err(StoreError::poisoned)?;
        Ok(inner
            .block_digests
            .get(digest)
            .and_then(|index| inner.chain.get(index))
            .cloned())
    }

    async fn get_blocks_range(&self, start: u64, end: u64) -> Result<Vec<Block>> {
        if start > end {
            return Ok(Vec::new());
        }
        let inner = self.inner.read().map_err(StoreError::poisoned)?;
        Ok(inner.chain.range(start..=end).map(|(_, b)| b.clone()).collect())
    }

    async fn block_digests_between(&self, after: u64, through: u64) -> Result<Vec<Digest>> {
        if after >= through {
            return Ok(Vec::new());
        }
        let inner = self.inner.read().map_err(StoreError::poisoned)?;
        Ok(inner
            .chain
            .range(after + 1..=through)
            .map(|(_, b)| b.digest())
            .collect())
    }

    async fn block_count(&self) -> Result<u64> {
        let inner = self.inner.read().map_err(StoreError::poisoned)?;
        Ok(inner.chain.len() as u64)
    }

    async fn insert_anchor(&self, anchor: &Anchor) -> Result<InsertResult> {
        let mut inner = self.inner.write().map_err(StoreError::poisoned)?;

        if inner.anchors.values().any(|a| a.digest == anchor.digest) {
            return Ok(InsertResult::Duplicate);
        }
        if let Some(existing) = inner.anchors.get(&anchor.index) {
            return Ok(InsertResult::Conflict {
                existing: existing.digest,
            });
        }

        inner.anchors.insert(anchor.index, anchor.clone());
        Ok(InsertResult::Inserted)
    }

    async fn latest_anchor(&self) -> Result<Option<Anchor>> {
        let inner = self.inner.read().map_err(StoreError::poisoned)?;
        Ok(inner.anchors.values().next_back().cloned())
    }

    async fn list_anchors(&self) -> Result<Vec<Anchor>> {
        let inner = self.inner.read().map_err(StoreError::poisoned)?;
        Ok(inner.anchors.values().cloned().collect())
    }
}
