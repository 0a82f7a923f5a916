//! Golden vectors through the public ledger API.
//!
//! Every implementation of anchorchain must produce identical:
//! - genesis digest
//! - mined nonce and digest for a fixed candidate and starting nonce
//! - anchor digest over the mined block

use anchorchain::{Difficulty, Ledger, LedgerConfig, LedgerSeed, UnsealedBlock};
use anchorchain::store::MemoryStore;
use serde::Serialize;

const GENESIS_DIGEST: &str = "81c3fc0834e35db358e8e696f004e60e5b42621c90b9bab90e157ca6d55d16b6";
const MINED_DIGEST: &str = "0082545225465e997a491e632951db86cffdc21eb577b5899ed040f05f07b6d6";
const MINED_NONCE: u64 = 748;
const ANCHOR_DIGEST: &str = "e78983fc74a738de349cb36ba7e4d1ea13f4a85f2a6091e642d0be3b53ff1b83";

/// A ledger-level golden vector.
#[derive(Debug, Serialize)]
struct GoldenRun {
    difficulty: Option<String>,
    genesis_digest: String,
    mined_index: u64,
    mined_nonce: u64,
    mined_digest: String,
    anchor_index: u64,
    anchor_digest: String,
}

async fn golden_run() -> anyhow::Result<GoldenRun> {
    let config = LedgerConfig::default();
    let genesis = UnsealedBlock::with_timestamp(b"genesis".to_vec(), 1736870400000);
    let ledger = Ledger::initialize(MemoryStore::new(), config, LedgerSeed::Genesis(genesis)).await?;
    let genesis_digest = ledger.head().digest();

    let candidate = UnsealedBlock::with_timestamp(b"mined".to_vec(), 1736870402000);
    let mined_digest = ledger.add_from_nonce(candidate, 0).await?;
    let mined = ledger.head();
    let anchor = ledger.anchor().await?;

    Ok(GoldenRun {
        difficulty: ledger.config().difficulty.as_prefix().map(str::to_string),
        genesis_digest: genesis_digest.to_hex(),
        mined_index: mined.index(),
        mined_nonce: mined.nonce(),
        mined_digest: mined_digest.to_hex(),
        anchor_index: anchor.index,
        anchor_digest: anchor.digest.to_hex(),
    })
}

#[tokio::test]
async fn test_golden_run() -> anyhow::Result<()> {
    let run = golden_run().await?;

    assert_eq!(run.difficulty.as_deref(), Some("00"));
    assert_eq!(run.genesis_digest, GENESIS_DIGEST);
    assert_eq!(run.mined_index, 1);
    assert_eq!(run.mined_nonce, MINED_NONCE);
    assert_eq!(run.mined_digest, MINED_DIGEST);
    assert_eq!(run.anchor_index, 1);
    assert_eq!(run.anchor_digest, ANCHOR_DIGEST);
    Ok(())
}

#[tokio::test]
async fn test_golden_run_deterministic() -> anyhow::Result<()> {
    let a = golden_run().await?;
    let b = golden_run().await?;
    assert_eq!(a.mined_digest, b.mined_digest);
    assert_eq!(a.anchor_digest, b.anchor_digest);
    Ok(())
}

#[tokio::test]
async fn test_start_past_solution_finds_later_nonce() -> anyhow::Result<()> {
    let genesis = UnsealedBlock::with_timestamp(b"genesis".to_vec(), 1736870400000);
    let ledger = Ledger::initialize(
        MemoryStore::new(),
        LedgerConfig::default(),
        LedgerSeed::Genesis(genesis),
    )
    .await?;

    let candidate = UnsealedBlock::with_timestamp(b"mined".to_vec(), 1736870402000);
    let digest = ledger.add_from_nonce(candidate, MINED_NONCE + 1).await?;

    assert!(ledger.head().nonce() > MINED_NONCE);
    assert!(digest.to_hex().starts_with("00"));
    assert_ne!(digest.to_hex(), MINED_DIGEST);
    Ok(())
}

#[tokio::test]
async fn test_golden_disabled_difficulty_keeps_start_nonce() -> anyhow::Result<()> {
    let genesis = UnsealedBlock::with_timestamp(b"genesis".to_vec(), 1736870400000);
    let ledger = Ledger::initialize(
        MemoryStore::new(),
        LedgerConfig::default().with_difficulty(Difficulty::none()),
        LedgerSeed::Genesis(genesis),
    )
    .await?;

    // The `linked_hello` block vector.
    let candidate = UnsealedBlock::with_timestamp(b"hello".to_vec(), 1736870401000);
    let digest = ledger.add_from_nonce(candidate, 7).await?;
    assert_eq!(
        digest.to_hex(),
        "cc2504c459a0e5b29c9f6fece57f41bbad5725bd8a624d9c097e39c561a907f1"
    );
    Ok(())
}

#[tokio::test]
async fn print_golden_run_json() -> anyhow::Result<()> {
    let run = golden_run().await?;
    let json = serde_json::to_string_pretty(&run)?;
    println!("{}", json);
    Ok(())
}
