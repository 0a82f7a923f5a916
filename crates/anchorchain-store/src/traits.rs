//! Store trait: the abstract interface for block and anchor persistence.
//!
//! This trait allows the ledger to be storage-agnostic. Implementations
//! include SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;
use anchorchain_core::{Anchor, Block, Digest};

use crate::error::Result;

/// Result of inserting a block or an anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertResult {
    /// The row was inserted.
    Inserted,
    /// A row with the same digest already exists. Nothing was written.
    Duplicate,
    /// A different row already occupies this index. Nothing was written.
    Conflict {
        /// The digest stored at this index.
        existing: Digest,
    },
}

impl InsertResult {
    /// Check if the row was written.
    pub fn is_inserted(&self) -> bool {
        matches!(self, InsertResult::Inserted)
    }
}

/// The Store trait: async interface for the two append-only tables.
///
/// All methods are async to support both sync (SQLite) and async backends.
/// For SQLite, we use `spawn_blocking` internally to avoid blocking the runtime.
///
/// # Design Notes
///
/// - **Append-only**: there is no update or delete.
/// - **Unique keys**: each table is keyed by index and, separately, by digest.
///   A violated key is reported as [`InsertResult::Duplicate`] or
///   [`InsertResult::Conflict`], never as an error, and leaves the table
///   unchanged.
/// - **Raw reads**: blocks are returned exactly as stored, digest column
///   included. Callers re-derive digests themselves when verifying.
#[async_trait]
pub trait Store: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Block Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Append a sealed block to the chain table.
    ///
    /// # Returns
    /// - `Inserted` if the block was new.
    /// - `Duplicate` if a block with the same digest exists.
    /// - `Conflict` if a different block exists at the same index.
    async fn insert_block(&self, block: &Block) -> Result<InsertResult>;

    /// Get the highest-indexed block.
    async fn latest_block(&self) -> Result<Option<Block>>;

    /// Get a block by its index.
    async fn get_block(&self, index: u64) -> Result<Option<Block>>;

    /// Get a block by its stored digest.
    async fn get_block_by_digest(&self, digest: &Digest) -> Result<Option<Block>>;

    /// Get a range of blocks.
    ///
    /// Returns blocks with `start <= index <= end`, ordered by index.
    async fn get_blocks_range(&self, start: u64, end: u64) -> Result<Vec<Block>>;

    /// Get the stored digests of blocks with `after < index <= through`,
    /// ordered by index.
    async fn block_digests_between(&self, after: u64, through: u64) -> Result<Vec<Digest>>;

    /// Count the blocks in the chain table.
    async fn block_count(&self) -> Result<u64>;

    // ─────────────────────────────────────────────────────────────────────────
    // Anchor Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Append an anchor to the anchor table.
    ///
    /// Same result semantics as [`Store::insert_block`].
    async fn insert_anchor(&self, anchor: &Anchor) -> Result<InsertResult>;

    /// Get the highest-indexed anchor.
    async fn latest_anchor(&self) -> Result<Option<Anchor>>;

    /// List all anchors, ordered by index.
    async fn list_anchors(&self) -> Result<Vec<Anchor>>;
}
