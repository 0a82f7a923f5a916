//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anchorchain::{Ledger, LedgerConfig, LedgerSeed, Result};
use anchorchain_core::{Block, Difficulty, UnsealedBlock};
use anchorchain_store::{MemoryStore, SqliteStore, Store};
use rand::Rng;
use tempfile::TempDir;

/// Creation time of [`fixed_genesis`].
pub const GENESIS_TIMESTAMP: i64 = 1736870400000;

/// The genesis block every fixed chain starts from.
pub fn fixed_genesis() -> Block {
    Block::genesis(UnsealedBlock::with_timestamp(
        b"genesis".to_vec(),
        GENESIS_TIMESTAMP,
    ))
}

/// A deterministic, correctly linked chain of `len` blocks (genesis included).
///
/// Nonces are zero, so the chain only verifies with mining disabled.
pub fn fixed_chain(len: u64) -> Vec<Block> {
    let mut blocks = Vec::with_capacity(len as usize);
    if len == 0 {
        return blocks;
    }
    blocks.push(fixed_genesis());
    for index in 1..len {
        let previous = blocks[blocks.len() - 1].digest();
        let block = UnsealedBlock::with_timestamp(
            format!("block-{index}").into_bytes(),
            GENESIS_TIMESTAMP + index as i64 * 1000,
        )
        .seal(index, Some(previous), 0);
        blocks.push(block);
    }
    blocks
}

/// Insert `blocks` into `store` in order.
pub async fn seed_store<S: Store>(store: &S, blocks: &[Block]) -> anchorchain_store::Result<()> {
    for block in blocks {
        store.insert_block(block).await?;
    }
    Ok(())
}

/// A configuration that mines a one-character prefix, so tests stay fast
/// while still exercising the search.
pub fn fast_config() -> LedgerConfig {
    LedgerConfig::default()
        .with_difficulty(Difficulty::prefix("0").expect("\"0\" is a valid prefix"))
        .with_storage_timeout(Duration::from_secs(5))
}

/// `count` random payloads of up to `max_len` bytes.
pub fn random_payloads(count: usize, max_len: usize) -> Vec<Vec<u8>> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| {
            let len = rng.gen_range(0..=max_len);
            (0..len).map(|_| rng.gen()).collect()
        })
        .collect()
}

/// A ledger over an in-memory store.
pub struct LedgerFixture {
    pub ledger: Ledger<MemoryStore>,
}

impl LedgerFixture {
    /// A ledger seeded with [`fixed_genesis`] under [`fast_config`].
    pub async fn new() -> Result<Self> {
        Self::with_config(fast_config()).await
    }

    /// A ledger seeded with [`fixed_genesis`] under `config`.
    pub async fn with_config(config: LedgerConfig) -> Result<Self> {
        let seed = LedgerSeed::Genesis(UnsealedBlock::with_timestamp(
            b"genesis".to_vec(),
            GENESIS_TIMESTAMP,
        ));
        let ledger = Ledger::initialize(MemoryStore::new(), config, seed).await?;
        Ok(Self { ledger })
    }

    /// Append `count` blocks with payloads `entry-0`, `entry-1`, ...
    pub async fn append(&self, count: usize) -> Result<Vec<Block>> {
        let mut added = Vec::with_capacity(count);
        for i in 0..count {
            self.ledger
                .add(UnsealedBlock::new(format!("entry-{i}").into_bytes()))
                .await?;
            added.push(self.ledger.head());
        }
        Ok(added)
    }

    /// The underlying store, for tampering.
    pub fn store(&self) -> &MemoryStore {
        self.ledger.store()
    }
}

/// A SQLite ledger file inside a temporary directory.
///
/// The directory is removed when the fixture is dropped.
pub struct SqliteFixture {
    dir: TempDir,
    path: PathBuf,
}

impl SqliteFixture {
    /// Create an empty temporary directory for the database file.
    pub fn new() -> std::io::Result<Self> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("ledger.db");
        Ok(Self { dir, path })
    }

    /// Path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The temporary directory holding the database.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Open a ledger on the database, seeding [`fixed_genesis`] if empty.
    pub async fn open(&self, config: LedgerConfig) -> Result<Ledger<SqliteStore>> {
        let seed = LedgerSeed::Genesis(UnsealedBlock::with_timestamp(
            b"genesis".to_vec(),
            GENESIS_TIMESTAMP,
        ));
        Ledger::open(&self.path, config, seed).await
    }

    /// Reopen an existing ledger without seeding.
    pub async fn reopen(&self, config: LedgerConfig) -> Result<Ledger<SqliteStore>> {
        Ledger::open(&self.path, config, LedgerSeed::Resume).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchorchain_core::verify_chain;

    #[test]
    fn test_fixed_chain_verifies() {
        let chain = fixed_chain(5);
        assert_eq!(chain.len(), 5);
        assert_eq!(chain[0], fixed_genesis());
        assert_eq!(verify_chain(&chain, &Difficulty::none()).unwrap(), 5);
        assert_eq!(fixed_chain(5), chain);
        assert!(fixed_chain(0).is_empty());
    }

    #[test]
    fn test_random_payloads_bounded() {
        let payloads = random_payloads(32, 8);
        assert_eq!(payloads.len(), 32);
        assert!(payloads.iter().all(|p| p.len() <= 8));
    }

    #[tokio::test]
    async fn test_ledger_fixture() {
        let fixture = LedgerFixture::new().await.unwrap();
        assert_eq!(fixture.ledger.head(), fixed_genesis());

        let added = fixture.append(3).await.unwrap();
        assert_eq!(fixture.ledger.length(), 4);
        assert!(added.iter().all(|b| b.digest().to_hex().starts_with('0')));
        assert_eq!(fixture.store().block_count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_seed_store() {
        let store = MemoryStore::new();
        seed_store(&store, &fixed_chain(3)).await.unwrap();
        assert_eq!(store.block_count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_sqlite_fixture_reopen() {
        let fixture = SqliteFixture::new().unwrap();
        let head = {
            let ledger = fixture.open(fast_config()).await.unwrap();
            ledger.add(UnsealedBlock::new(b"persisted".to_vec())).await.unwrap();
            ledger.head()
        };

        let reopened = fixture.reopen(fast_config()).await.unwrap();
        assert_eq!(reopened.head(), head);
        assert!(fixture.path().starts_with(fixture.dir()));
    }
}
