//! SQLite implementation of the Store trait.
//!
//! This is the primary storage backend for anchorchain. It uses rusqlite with
//! bundled SQLite, wrapped in async via tokio::spawn_blocking.
//!
//! Index and nonce columns hold the `u64` bit pattern as SQLite's signed
//! INTEGER; reads cast back, so values above `i64::MAX` survive a round trip.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use rusqlite::{params, Connection, OptionalExtension};

use anchorchain_core::{Anchor, Block, BlockHeader, Digest};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{InsertResult, Store};

const BLOCK_COLUMNS: &str = "idx, digest, previous_digest, nonce, timestamp, payload";

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking operation on the connection off the async runtime.
    async fn call<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().map_err(StoreError::poisoned)?;
            f(&mut conn)
        })
        .await
        .map_err(StoreError::join)?
    }
}

fn blob_to_digest(bytes: Vec<u8>, column: usize, name: &str) -> rusqlite::Result<Digest> {
    Digest::try_from(bytes.as_slice()).map_err(|_| {
        rusqlite::Error::InvalidColumnType(column, name.into(), rusqlite::types::Type::Blob)
    })
}

// Helper to convert a row selected with BLOCK_COLUMNS to a Block
fn row_to_block(row: &rusqlite::Row<'_>) -> rusqlite::Result<Block> {
    let index: i64 = row.get(0)?;
    let digest = blob_to_digest(row.get(1)?, 1, "digest")?;
    let previous = row
        .get::<_, Option<Vec<u8>>>(2)?
        .map(|b| blob_to_digest(b, 2, "previous_digest"))
        .transpose()?;
    let nonce: i64 = row.get(3)?;
    let created_at: i64 = row.get(4)?;
    let payload: Vec<u8> = row.get(5)?;

    let header = BlockHeader {
        index: index as u64,
        created_at,
        previous,
        nonce: nonce as u64,
    };
    Ok(Block::from_parts(header, Bytes::from(payload), digest))
}

fn row_to_anchor(row: &rusqlite::Row<'_>) -> rusqlite::Result<Anchor> {
    let index: i64 = row.get(0)?;
    Ok(Anchor {
        index: index as u64,
        digest: blob_to_digest(row.get(1)?, 1, "digest")?,
        previous: row
            .get::<_, Option<Vec<u8>>>(2)?
            .map(|b| blob_to_digest(b, 2, "previous_digest"))
            .transpose()?,
    })
}

/// Classify a would-be insert against an existing table.
///
/// Must run inside the transaction that performs the insert.
fn check_unique(
    conn: &Connection,
    table: &str,
    index: u64,
    digest: &Digest,
) -> Result<Option<InsertResult>> {
    let by_digest: bool = conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {} WHERE digest = ?1)", table),
        params![digest.as_bytes().as_slice()],
        |row| row.get(0),
    )?;
    if by_digest {
        return Ok(Some(InsertResult::Duplicate));
    }

    let at_index: Option<Vec<u8>> = conn
        .query_row(
            &format!("SELECT digest FROM {} WHERE idx = ?1", table),
            params![index as i64],
            |row| row.get(0),
        )
        .optional()?;
    if let Some(existing) = at_index {
        let existing = Digest::try_from(existing.as_slice())
            .map_err(|_| StoreError::InvalidData(format!("{} {}: bad digest length", table, index)))?;
        return Ok(Some(InsertResult::Conflict { existing }));
    }

    Ok(None)
}

#[async_trait]
impl Store for SqliteStore {
    async fn insert_block(&self, block: &Block) -> Result<InsertResult> {
        let block = block.clone();

        self.call(move |conn| {
            let tx = conn.transaction()?;

            if let Some(rejected) = check_unique(&tx, "chain", block.index(), &block.digest())? {
                return Ok(rejected);
            }

            tx.execute(
                "INSERT INTO chain (idx, digest, previous_digest, nonce, timestamp, payload)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    block.index() as i64,
                    block.digest().as_bytes().as_slice(),
                    block.previous().map(|d| d.as_bytes().as_slice()),
                    block.nonce() as i64,
                    block.created_at(),
                    block.payload.as_ref(),
                ],
            )?;
            tx.commit()?;

            Ok(InsertResult::Inserted)
        })
        .await
    }

    async fn latest_block(&self) -> Result<Option<Block>> {
        self.call(|conn| {
            conn.query_row(
                &format!("SELECT {} FROM chain ORDER BY idx DESC LIMIT 1", BLOCK_COLUMNS),
                [],
                row_to_block,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn get_block(&self, index: u64) -> Result<Option<Block>> {
        self.call(move |conn| {
            conn.query_row(
                &format!("SELECT {} FROM chain WHERE idx = ?1", BLOCK_COLUMNS),
                params![index as i64],
                row_to_block,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn get_block_by_digest(&self, digest: &Digest) -> Result<Option<Block>> {
        let digest = *digest;

        self.call(move |conn| {
            conn.query_row(
                &format!("SELECT {} FROM chain WHERE digest = ?1", BLOCK_COLUMNS),
                params![digest.as_bytes().as_slice()],
                row_to_block,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn get_blocks_range(&self, start: u64, end: u64) -> Result<Vec<Block>> {
        if start > end {
            return Ok(Vec::new());
        }

        self.call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM chain WHERE idx >= ?1 AND idx <= ?2 ORDER BY idx",
                BLOCK_COLUMNS
            ))?;

            let blocks = stmt
                .query_map(params![start as i64, end as i64], row_to_block)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(blocks)
        })
        .await
    }

    async fn block_digests_between(&self, after: u64, through: u64) -> Result<Vec<Digest>> {
        if after >= through {
            return Ok(Vec::new());
        }

        self.call(move |conn| {
            let mut stmt =
                conn.prepare("SELECT digest FROM chain WHERE idx > ?1 AND idx <= ?2 ORDER BY idx")?;

            let digests = stmt
                .query_map(params![after as i64, through as i64], |row| {
                    blob_to_digest(row.get(0)?, 0, "digest")
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(digests)
        })
        .await
    }

    async fn block_count(&self) -> Result<u64> {
        self.call(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM chain", [], |row| row.get(0))?;
            Ok(count as u64)
        })
        .await
    }

    async fn insert_anchor(&self, anchor: &Anchor) -> Result<InsertResult> {
        let anchor = anchor.clone();

        self.call(move |conn| {
            let tx = conn.transaction()?;

            if let Some(rejected) = check_unique(&tx, "anchor", anchor.index, &anchor.digest)? {
                return Ok(rejected);
            }

            tx.execute(
                "INSERT INTO anchor (idx, digest, previous_digest) VALUES (?1, ?2, ?3)",
                params![
                    anchor.index as i64,
                    anchor.digest.as_bytes().as_slice(),
                    anchor.previous.as_ref().map(|d| d.as_bytes().as_slice()),
                ],
            )?;
            tx.commit()?;

            Ok(InsertResult::Inserted)
        })
        .await
    }

    async fn latest_anchor(&self) -> Result<Option<Anchor>> {
        self.call(|conn| {
            conn.query_row(
                "SELECT idx, digest, previous_digest FROM anchor ORDER BY idx DESC LIMIT 1",
                [],
                row_to_anchor,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn list_anchors(&self) -> Result<Vec<Anchor>> {
        self.call(|conn| {
            let mut stmt =
                conn.prepare("SELECT idx, digest, previous_digest FROM anchor ORDER BY idx")?;

            let anchors = stmt
                .query_map([], row_to_anchor)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(anchors)
        })
        .await
    }
}
