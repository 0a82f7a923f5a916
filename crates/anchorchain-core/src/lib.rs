//! # anchorchain core
//!
//! Pure primitives for anchorchain: blocks, canonical hashing, proof-of-work,
//! and anchors.
//!
//! This crate contains no I/O and no storage. It is pure computation over
//! hash-linked records.
//!
//! ## Key Types
//!
//! - [`Block`] - A sealed ledger record linked to its predecessor
//! - [`UnsealedBlock`] - Payload and creation time, before placement
//! - [`Digest`] - Blake3 content hash; hex form is matched by proof-of-work
//! - [`ProofOfWork`] - Cancellable nonce search for a [`Difficulty`]
//! - [`Anchor`] - Checkpoint over a contiguous run of block digests
//!
//! ## Canonicalization
//!
//! All hashed records are encoded using deterministic CBOR. See [`canonical`] module.

pub mod anchor;
pub mod block;
pub mod canonical;
pub mod crypto;
pub mod error;
pub mod pow;
pub mod validation;

pub use anchor::Anchor;
pub use block::{Block, BlockHeader, UnsealedBlock};
pub use canonical::{anchor_digest, block_digest, canonical_block_bytes, CanonicalMap};
pub use crypto::Digest;
pub use error::{CoreError, LinkError, PowError};
pub use pow::{CancelFlag, CancelGuard, Difficulty, PowSolution, ProofOfWork};
pub use validation::{check_anchor, check_genesis, check_link, verify_chain, ChainVerifier};
