//! Canonical CBOR encoding for deterministic hashing.
//!
//! This module implements RFC 8949 Core Deterministic Encoding:
//! - Map keys sorted by encoded byte comparison
//! - Integers use smallest valid encoding
//! - Definite lengths only
//! - No floats (timestamps are i64 milliseconds)
//!
//! Records are built with [`CanonicalMap`], which sorts entries at encode time,
//! so the order in which fields are inserted never changes the bytes. The
//! digest field of a block is not part of the hashed shape at all: only the
//! header fields and the payload are encoded.
//!
//! **CRITICAL**: The block and anchor encodings are FROZEN. Changing them
//! changes every digest and invalidates every stored ledger.

use ciborium::value::Value;

use crate::block::BlockHeader;
use crate::crypto::{Digest, ANCHOR_DOMAIN, BLOCK_DOMAIN};
use crate::error::CoreError;

/// Block record keys.
mod keys {
    pub const INDEX: &str = "index";
    pub const CREATED_AT: &str = "createdAt";
    pub const PREVIOUS_DIGEST: &str = "previousDigest";
    pub const PAYLOAD: &str = "payload";
    pub const NONCE: &str = "nonce";
}

/// A record under construction for canonical encoding.
///
/// Keys and values are encoded as they are inserted; inserting a key twice
/// replaces the earlier value.
#[derive(Debug, Clone, Default)]
pub struct CanonicalMap {
    entries: Vec<(Vec<u8>, Vec<u8>)>,
}

impl CanonicalMap {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an unsigned integer field.
    pub fn uint(mut self, key: &str, n: u64) -> Self {
        let mut buf = Vec::new();
        encode_uint(&mut buf, 0, n);
        self.put(key, buf);
        self
    }

    /// Insert a signed integer field.
    pub fn int(mut self, key: &str, n: i64) -> Self {
        let mut buf = Vec::new();
        encode_int(&mut buf, n);
        self.put(key, buf);
        self
    }

    /// Insert a byte string field.
    pub fn bytes(mut self, key: &str, bytes: &[u8]) -> Self {
        let mut buf = Vec::new();
        encode_bytes(&mut buf, bytes);
        self.put(key, buf);
        self
    }

    /// Insert an optional digest: bytes when present, null for the sentinel.
    pub fn optional_digest(mut self, key: &str, digest: Option<&Digest>) -> Self {
        let mut buf = Vec::new();
        match digest {
            Some(d) => encode_bytes(&mut buf, d.as_bytes()),
            None => buf.push(0xf6),
        }
        self.put(key, buf);
        self
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encode to canonical bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut sorted: Vec<&(Vec<u8>, Vec<u8>)> = self.entries.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));

        let mut buf = Vec::new();
        encode_uint(&mut buf, 5, sorted.len() as u64);
        for (key, value) in sorted {
            buf.extend_from_slice(key);
            buf.extend_from_slice(value);
        }
        buf
    }

    /// Hash the canonical bytes under a domain prefix.
    pub fn digest(&self, domain: &[u8]) -> Digest {
        Digest::hash_with_domain(domain, &self.to_bytes())
    }

    fn put(&mut self, key: &str, value: Vec<u8>) {
        let mut key_buf = Vec::new();
        encode_text(&mut key_buf, key);
        match self.entries.iter_mut().find(|(k, _)| *k == key_buf) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key_buf, value)),
        }
    }
}

/// Encode a block's hashed fields to canonical bytes.
///
/// Format: `{ "index", "createdAt", "previousDigest", "payload", "nonce" }`.
pub fn canonical_block_bytes(header: &BlockHeader, payload: &[u8]) -> Vec<u8> {
    block_record(header, payload).to_bytes()
}

/// Compute a block digest from its header and payload.
pub fn block_digest(header: &BlockHeader, payload: &[u8]) -> Digest {
    block_record(header, payload).digest(BLOCK_DOMAIN)
}

fn block_record(header: &BlockHeader, payload: &[u8]) -> CanonicalMap {
    CanonicalMap::new()
        .uint(keys::INDEX, header.index)
        .int(keys::CREATED_AT, header.created_at)
        .optional_digest(keys::PREVIOUS_DIGEST, header.previous.as_ref())
        .bytes(keys::PAYLOAD, payload)
        .uint(keys::NONCE, header.nonce)
}

/// Encode an ordered list of digests as a CBOR array of byte strings.
pub fn canonical_digest_list(digests: &[Digest]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(2 + digests.len() * 34);
    encode_uint(&mut buf, 4, digests.len() as u64);
    for d in digests {
        encode_bytes(&mut buf, d.as_bytes());
    }
    buf
}

/// Compute an anchor digest over the ordered block digests it covers.
pub fn anchor_digest(digests: &[Digest]) -> Digest {
    Digest::hash_with_domain(ANCHOR_DOMAIN, &canonical_digest_list(digests))
}

/// Encode a CBOR value to canonical bytes.
///
/// Nested maps are sorted by encoded key bytes. Floats, tags and other
/// value kinds without a canonical form are rejected.
pub fn encode_value(value: &Value) -> Result<Vec<u8>, CoreError> {
    let mut buf = Vec::new();
    encode_value_to(&mut buf, value)?;
    Ok(buf)
}

/// Recursively encode a CBOR value.
fn encode_value_to(buf: &mut Vec<u8>, value: &Value) -> Result<(), CoreError> {
    match value {
        Value::Integer(i) => {
            encode_integer(buf, *i)?;
        }
        Value::Bytes(b) => {
            encode_bytes(buf, b);
        }
        Value::Text(s) => {
            encode_text(buf, s);
        }
        Value::Array(arr) => {
            encode_uint(buf, 4, arr.len() as u64);
            for item in arr {
                encode_value_to(buf, item)?;
            }
        }
        Value::Map(entries) => {
            encode_map_canonical(buf, entries)?;
        }
        Value::Bool(b) => {
            buf.push(if *b { 0xf5 } else { 0xf4 });
        }
        Value::Null => {
            buf.push(0xf6);
        }
        Value::Float(_) => {
            return Err(CoreError::Encoding(
                "floats not supported in canonical encoding".into(),
            ));
        }
        _ => {
            return Err(CoreError::Encoding("unsupported CBOR value type".into()));
        }
    }
    Ok(())
}

/// Encode a CBOR integer (major types 0 and 1).
fn encode_integer(buf: &mut Vec<u8>, i: ciborium::value::Integer) -> Result<(), CoreError> {
    let n: i128 = i.into();

    if n >= 0 {
        let n = u64::try_from(n)
            .map_err(|_| CoreError::Encoding(format!("integer out of range: {}", n)))?;
        encode_uint(buf, 0, n);
    } else {
        // CBOR encodes -1 as 0, -2 as 1, etc.
        let abs = u64::try_from(-1 - n)
            .map_err(|_| CoreError::Encoding(format!("integer out of range: {}", n)))?;
        encode_uint(buf, 1, abs);
    }
    Ok(())
}

/// Encode a signed 64-bit integer.
fn encode_int(buf: &mut Vec<u8>, n: i64) {
    if n >= 0 {
        encode_uint(buf, 0, n as u64);
    } else {
        encode_uint(buf, 1, (-1 - n) as u64);
    }
}

/// Encode an unsigned integer with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffffffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

/// Encode a byte string (major type 2).
fn encode_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    encode_uint(buf, 2, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

/// Encode a text string (major type 3).
fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, 3, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

/// Encode a map canonically (major type 5).
fn encode_map_canonical(buf: &mut Vec<u8>, entries: &[(Value, Value)]) -> Result<(), CoreError> {
    let mut pairs: Vec<(Vec<u8>, &Value)> = Vec::with_capacity(entries.len());
    for (k, v) in entries {
        let mut key_buf = Vec::new();
        encode_value_to(&mut key_buf, k)?;
        pairs.push((key_buf, v));
    }

    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    encode_uint(buf, 5, pairs.len() as u64);
    for (key_bytes, value) in pairs {
        buf.extend_from_slice(&key_bytes);
        encode_value_to(buf, value)?;
    }
    Ok(())
}
