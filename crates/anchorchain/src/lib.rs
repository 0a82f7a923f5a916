//! # anchorchain
//!
//! A tamper-evident, append-only ledger of opaque records. Each block is
//! hash-linked to its predecessor, optionally gated by proof-of-work, and
//! runs of blocks are periodically folded into anchor checkpoints that form
//! a second, shorter hash chain.
//!
//! ## Key Concepts
//!
//! - **Block**: Immutable once appended. Its digest covers index, creation
//!   time, previous digest, payload, and nonce.
//! - **Head**: The most recently committed block. One writer advances it.
//! - **Proof-of-work**: New blocks must show a configured hex prefix.
//! - **Anchor**: A checkpoint over the blocks since the previous anchor.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use anchorchain::{Ledger, LedgerConfig, LedgerSeed};
//! use anchorchain::core::UnsealedBlock;
//!
//! async fn example() {
//!     // Open storage and seed genesis on first run
//!     let ledger = Ledger::open("ledger.db", LedgerConfig::default(), LedgerSeed::genesis(b"genesis".to_vec()))
//!         .await
//!         .unwrap();
//!
//!     // Append a block
//!     let digest = ledger.add(UnsealedBlock::new(b"hello".to_vec())).await.unwrap();
//!     assert_eq!(ledger.head().digest(), digest);
//!
//!     // Checkpoint and verify
//!     let anchor = ledger.anchor().await.unwrap();
//!     ledger.validate().await.unwrap();
//!     ledger.verify_anchors().await.unwrap();
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `anchorchain::core` - Core primitives (Block, Digest, ProofOfWork, etc.)
//! - `anchorchain::store` - Storage abstraction and SQLite

pub mod anchor;
pub mod config;
pub mod error;
pub mod ledger;

// Re-export component crates
pub use anchorchain_core as core;
pub use anchorchain_store as store;

// Re-export main types for convenience
pub use anchor::AnchorCompactor;
pub use config::LedgerConfig;
pub use error::{LedgerError, Result};
pub use ledger::{ChainReport, Ledger, LedgerSeed};

// Re-export commonly used core types
pub use anchorchain_core::{Anchor, Block, CancelFlag, Difficulty, Digest, UnsealedBlock};
