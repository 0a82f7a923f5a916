//! # anchorchain testkit
//!
//! Testing utilities for anchorchain.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: fixed blocks and anchors with their expected digests,
//!   for checking that canonical encoding never drifts
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: deterministic chains and ready-to-use ledgers
//!
//! ## Golden Vectors
//!
//! ```rust
//! use anchorchain_testkit::vectors::{block_vectors, verify_all_vectors};
//!
//! for vector in block_vectors() {
//!     let block = vector.block();
//!     assert_eq!(block.digest().to_hex(), vector.expected_digest);
//! }
//! assert!(verify_all_vectors().iter().all(|(_, ok, _)| *ok));
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use anchorchain_testkit::generators::{block_from_params, BlockParams};
//!
//! proptest! {
//!     #[test]
//!     fn digest_is_deterministic(params: BlockParams) {
//!         prop_assert_eq!(block_from_params(&params), block_from_params(&params));
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use anchorchain_testkit::fixtures::fixed_chain;
//! use anchorchain_core::{verify_chain, Difficulty};
//!
//! let chain = fixed_chain(4);
//! assert_eq!(verify_chain(&chain, &Difficulty::none()).unwrap(), 4);
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{fast_config, fixed_chain, fixed_genesis, LedgerFixture, SqliteFixture};
pub use generators::{block_from_params, BlockParams};
pub use vectors::{
    anchor_vectors, block_vectors, pow_vector, verify_all_vectors, AnchorVector, BlockVector,
    PowVector,
};
