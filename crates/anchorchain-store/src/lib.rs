//! # anchorchain store
//!
//! Storage abstraction for anchorchain. Provides a trait-based interface
//! over the two append-only tables (blocks and anchors) with SQLite and
//! in-memory implementations.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`InsertResult`] - Result of appending a block or anchor
//!
//! ## Usage
//!
//! ```rust,no_run
//! use anchorchain_store::{SqliteStore, Store, InsertResult};
//! use anchorchain_core::{Block, UnsealedBlock};
//!
//! async fn example() {
//!     // Open a SQLite database
//!     let store = SqliteStore::open("ledger.db").unwrap();
//!
//!     // Or use an in-memory database for testing
//!     let store = SqliteStore::open_memory().unwrap();
//!
//!     let genesis = Block::genesis(UnsealedBlock::new(b"genesis".to_vec()));
//!     let result = store.insert_block(&genesis).await.unwrap();
//!     assert_eq!(result, InsertResult::Inserted);
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Unique digests**: inserting a row whose digest exists returns `Duplicate`
//! - **Unique indices**: a different row at an occupied index returns `Conflict`
//! - **No verification**: the store persists what it is given; linkage is
//!   checked by the ledger before insert and on replay

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{InsertResult, Store};
