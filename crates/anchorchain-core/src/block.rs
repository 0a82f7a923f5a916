//! Block: one record in the ledger.
//!
//! A block starts unsealed (payload and creation time only). Sealing assigns
//! its position, its link to the predecessor and a nonce, and computes the
//! digest. Once appended to a store it is never modified.

use bytes::Bytes;
use ciborium::value::Value;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::canonical::{block_digest, encode_value};
use crate::crypto::Digest;
use crate::error::{CoreError, LinkError};
use crate::validation::check_link;

/// A block that has not been placed in a ledger yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsealedBlock {
    /// Creation time (Unix milliseconds), captured at construction.
    pub created_at: i64,

    /// Opaque payload bytes.
    pub payload: Bytes,
}

impl UnsealedBlock {
    /// Create a block stamped with the current time.
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self::with_timestamp(payload, now_millis())
    }

    /// Create a block with an explicit creation time.
    pub fn with_timestamp(payload: impl Into<Bytes>, created_at: i64) -> Self {
        Self {
            created_at,
            payload: payload.into(),
        }
    }

    /// Create a block whose payload is `value` encoded as canonical CBOR.
    ///
    /// Map keys are sorted, so field declaration order never reaches the
    /// payload bytes. Floats are rejected.
    pub fn from_value<T: Serialize>(value: &T) -> Result<Self, CoreError> {
        let value = Value::serialized(value).map_err(|e| CoreError::Encoding(e.to_string()))?;
        Ok(Self::new(encode_value(&value)?))
    }

    /// Assign linkage fields and compute the digest.
    pub fn seal(self, index: u64, previous: Option<Digest>, nonce: u64) -> Block {
        let header = BlockHeader {
            index,
            created_at: self.created_at,
            previous,
            nonce,
        };
        let digest = block_digest(&header, &self.payload);
        Block {
            header,
            payload: self.payload,
            digest,
        }
    }
}

/// The hashed fields of a block, other than the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Position in the ledger (genesis = 0).
    pub index: u64,

    /// Creation time (Unix milliseconds).
    pub created_at: i64,

    /// Digest of the predecessor (None for genesis).
    pub previous: Option<Digest>,

    /// Proof-of-work nonce (0 for genesis).
    pub nonce: u64,
}

/// A sealed block: header + payload + stored digest.
///
/// The stored `digest` is a snapshot. Validation always recomputes it with
/// [`Block::compute_digest`] rather than trusting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// The block header.
    pub header: BlockHeader,

    /// The payload bytes.
    pub payload: Bytes,

    /// Digest computed when the block was (re)sealed.
    pub digest: Digest,
}

impl Block {
    /// Seal a genesis block: index 0, no predecessor, nonce 0.
    pub fn genesis(unsealed: UnsealedBlock) -> Self {
        unsealed.seal(0, None, 0)
    }

    /// Rebuild a block from stored fields without recomputing the digest.
    pub fn from_parts(header: BlockHeader, payload: impl Into<Bytes>, digest: Digest) -> Self {
        Self {
            header,
            payload: payload.into(),
            digest,
        }
    }

    /// Recompute the digest from the current field values.
    pub fn compute_digest(&self) -> Digest {
        block_digest(&self.header, &self.payload)
    }

    /// Replace the nonce and recompute the stored digest in place.
    pub fn reseal(&mut self, nonce: u64) {
        self.header.nonce = nonce;
        self.digest = self.compute_digest();
    }

    /// Get the index.
    pub fn index(&self) -> u64 {
        self.header.index
    }

    /// Get the creation time.
    pub fn created_at(&self) -> i64 {
        self.header.created_at
    }

    /// Get the predecessor digest.
    pub fn previous(&self) -> Option<&Digest> {
        self.header.previous.as_ref()
    }

    /// Get the nonce.
    pub fn nonce(&self) -> u64 {
        self.header.nonce
    }

    /// Get the stored digest.
    pub fn digest(&self) -> Digest {
        self.digest
    }

    /// Check if this block has the genesis position.
    pub fn is_genesis(&self) -> bool {
        self.header.index == 0
    }

    /// Check that the stored digest matches a fresh recomputation.
    pub fn is_self_consistent(&self) -> bool {
        self.digest == self.compute_digest()
    }

    /// Check that this block correctly follows `previous`.
    ///
    /// False if the index is not `previous.index + 1`, if the previous digest
    /// differs from a recomputed digest of `previous`, or if this block's
    /// stored digest differs from its recomputed digest.
    pub fn is_valid(&self, previous: &Block) -> bool {
        self.check_link(previous).is_ok()
    }

    /// Like [`Block::is_valid`], but reports which check failed.
    pub fn check_link(&self, previous: &Block) -> Result<(), LinkError> {
        check_link(self, previous)
    }

    /// Decode a CBOR payload written by [`UnsealedBlock::from_value`].
    pub fn payload_value<T: DeserializeOwned>(&self) -> Result<T, CoreError> {
        ciborium::from_reader(self.payload.as_ref()).map_err(|e| CoreError::Decoding(e.to_string()))
    }
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as i64
}
