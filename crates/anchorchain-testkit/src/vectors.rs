//! Golden test vectors for deterministic verification.
//!
//! These vectors pin the canonical block encoding, the block and anchor
//! digests, and the nonce a proof-of-work search settles on. Any change to
//! the encoding shows up here first.

use anchorchain_core::{
    anchor_digest, canonical_block_bytes, Block, BlockHeader, CancelFlag, Difficulty, Digest,
    ProofOfWork, UnsealedBlock,
};
use serde::Serialize;

/// Digest of the `genesis_text` vector, reused as a predecessor.
pub const GENESIS_TEXT_DIGEST: &str =
    "81c3fc0834e35db358e8e696f004e60e5b42621c90b9bab90e157ca6d55d16b6";

/// A golden block.
#[derive(Debug, Clone)]
pub struct BlockVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    pub index: u64,
    /// Unix milliseconds.
    pub created_at: i64,
    /// Predecessor digest (hex), `None` for the sentinel.
    pub previous: Option<&'static str>,
    pub payload: Vec<u8>,
    pub nonce: u64,
    /// Expected canonical bytes (hex). Empty when not pinned.
    pub expected_bytes: &'static str,
    /// Expected block digest (hex).
    pub expected_digest: &'static str,
}

impl BlockVector {
    /// The header described by this vector.
    pub fn header(&self) -> BlockHeader {
        BlockHeader {
            index: self.index,
            created_at: self.created_at,
            previous: self.previous.map(digest_from_hex),
            nonce: self.nonce,
        }
    }

    /// Seal the vector into a block.
    pub fn block(&self) -> Block {
        let header = self.header();
        UnsealedBlock::with_timestamp(self.payload.clone(), header.created_at).seal(
            header.index,
            header.previous,
            header.nonce,
        )
    }

    /// Canonical bytes of the vector, hex encoded.
    pub fn canonical_hex(&self) -> String {
        hex::encode(canonical_block_bytes(&self.header(), &self.payload))
    }
}

/// A golden anchor digest over a fixed digest list.
#[derive(Debug, Clone)]
pub struct AnchorVector {
    pub name: &'static str,
    /// Covered block digests (hex), in index order.
    pub covered: Vec<&'static str>,
    /// Expected anchor digest (hex).
    pub expected_digest: &'static str,
}

impl AnchorVector {
    /// Compute the anchor digest for this vector.
    pub fn compute(&self) -> Digest {
        let covered: Vec<Digest> = self.covered.iter().map(|h| digest_from_hex(h)).collect();
        anchor_digest(&covered)
    }
}

/// A golden proof-of-work search.
#[derive(Debug, Clone)]
pub struct PowVector {
    pub block: BlockVector,
    pub prefix: &'static str,
    /// Nonce the search settles on when started from `block.nonce`.
    pub expected_nonce: u64,
}

impl PowVector {
    /// Run the search and return the mined block.
    pub fn mine(&self) -> Block {
        let mut block = self.block.block();
        let difficulty = Difficulty::prefix(self.prefix).expect("vector prefix is valid hex");
        ProofOfWork::new(difficulty)
            .search(&mut block, &CancelFlag::new())
            .expect("uncapped search cannot stop early");
        block
    }
}

/// Get all golden block vectors.
pub fn block_vectors() -> Vec<BlockVector> {
    vec![
        BlockVector {
            name: "genesis_text",
            index: 0,
            created_at: 1736870400000, // 2025-01-14T16:00:00Z
            previous: None,
            payload: b"genesis".to_vec(),
            nonce: 0,
            expected_bytes: "a565696e64657800656e6f6e636500677061796c6f61644767656e65736973\
                             696372656174656441741b00000194658b10006e70726576696f7573446967\
                             657374f6",
            expected_digest: GENESIS_TEXT_DIGEST,
        },
        BlockVector {
            name: "linked_hello",
            index: 1,
            created_at: 1736870401000,
            previous: Some(GENESIS_TEXT_DIGEST),
            payload: b"hello".to_vec(),
            nonce: 7,
            expected_bytes: "a565696e64657801656e6f6e636507677061796c6f61644568656c6c6f6963\
                             72656174656441741b00000194658b13e86e70726576696f75734469676573\
                             74582081c3fc0834e35db358e8e696f004e60e5b42621c90b9bab90e157ca6\
                             d55d16b6",
            expected_digest: "cc2504c459a0e5b29c9f6fece57f41bbad5725bd8a624d9c097e39c561a907f1",
        },
        BlockVector {
            name: "empty_genesis",
            index: 0,
            created_at: 0,
            previous: None,
            payload: Vec::new(),
            nonce: 0,
            expected_bytes: "a565696e64657800656e6f6e636500677061796c6f61644069637265617465\
                             644174006e70726576696f7573446967657374f6",
            expected_digest: "07618c3016eb1df145d29f975e4bf34446669db982995a3add1a06c44e6300f4",
        },
        BlockVector {
            name: "integer_extremes",
            index: 2,
            created_at: -1,
            previous: Some("1111111111111111111111111111111111111111111111111111111111111111"),
            payload: vec![0x00, 0xff],
            nonce: u64::MAX,
            expected_bytes: "a565696e64657802656e6f6e63651bffffffffffffffff677061796c6f6164\
                             4200ff69637265617465644174206e70726576696f75734469676573745820\
                             1111111111111111111111111111111111111111111111111111111111111111",
            expected_digest: "2355ec8d7b72f935eb088dfe0a7f425d322acf8d0a9472a11bb142f280f8f6e0",
        },
        BlockVector {
            name: "binary_payload",
            index: 300,
            created_at: 1736870400000,
            previous: Some("2222222222222222222222222222222222222222222222222222222222222222"),
            payload: (0u8..=255).collect(),
            nonce: 1_000_000,
            expected_bytes: "",
            expected_digest: "9803b7f9f44185afefd6801f3538a5e20069f79ec28c6727f9156322c4d09de1",
        },
    ]
}

/// Get all golden anchor vectors.
pub fn anchor_vectors() -> Vec<AnchorVector> {
    vec![
        AnchorVector {
            name: "single_block",
            covered: vec!["cc2504c459a0e5b29c9f6fece57f41bbad5725bd8a624d9c097e39c561a907f1"],
            expected_digest: "632703e117c47985b44c0334779e7ee1bde6e3fc1530a057dcfdb741073b55c9",
        },
        AnchorVector {
            name: "two_blocks",
            covered: vec![
                "1111111111111111111111111111111111111111111111111111111111111111",
                "2222222222222222222222222222222222222222222222222222222222222222",
            ],
            expected_digest: "f2eb1d5c38d7274d3178eac62ead72c73402d5c91e392232da1f6c9dca0dc42f",
        },
        AnchorVector {
            name: "empty_list",
            covered: vec![],
            expected_digest: "6c39838dd1dbfe5afc867e1717b60860b8cc1af227cd165cb3b6ba82d635e0a5",
        },
    ]
}

/// The golden proof-of-work vector: prefix `00` from nonce 0.
pub fn pow_vector() -> PowVector {
    PowVector {
        block: BlockVector {
            name: "mined",
            index: 1,
            created_at: 1736870402000,
            previous: Some(GENESIS_TEXT_DIGEST),
            payload: b"mined".to_vec(),
            nonce: 0,
            expected_bytes: "",
            expected_digest: "0082545225465e997a491e632951db86cffdc21eb577b5899ed040f05f07b6d6",
        },
        prefix: "00",
        expected_nonce: 748,
    }
}

/// Verify every golden vector.
///
/// Returns `(name, matches, computed digest hex)` per vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    let blocks = block_vectors().into_iter().map(|v| {
        let hex = v.block().digest().to_hex();
        let bytes_match = v.expected_bytes.is_empty() || v.canonical_hex() == v.expected_bytes;
        (v.name.to_string(), bytes_match && hex == v.expected_digest, hex)
    });
    let anchors = anchor_vectors().into_iter().map(|v| {
        let hex = v.compute().to_hex();
        (v.name.to_string(), hex == v.expected_digest, hex)
    });
    let pow = {
        let v = pow_vector();
        let mined = v.mine();
        let hex = mined.digest().to_hex();
        let ok = mined.nonce() == v.expected_nonce && hex == v.block.expected_digest;
        (v.block.name.to_string(), ok, hex)
    };

    blocks.chain(anchors).chain(std::iter::once(pow)).collect()
}

/// A vector file for other implementations to check against.
#[derive(Debug, Serialize)]
pub struct VectorFile {
    pub block_domain: String,
    pub anchor_domain: String,
    pub blocks: Vec<BlockEntry>,
    pub anchors: Vec<AnchorEntry>,
}

#[derive(Debug, Serialize)]
pub struct BlockEntry {
    pub name: String,
    pub index: u64,
    pub created_at: i64,
    pub previous: Option<String>,
    pub payload: String,
    pub nonce: u64,
    pub canonical_bytes: String,
    pub digest: String,
}

#[derive(Debug, Serialize)]
pub struct AnchorEntry {
    pub name: String,
    pub covered: Vec<String>,
    pub digest: String,
}

/// Render every vector, with freshly computed outputs, as pretty JSON.
pub fn export_json() -> serde_json::Result<String> {
    let file = VectorFile {
        block_domain: String::from_utf8_lossy(anchorchain_core::crypto::BLOCK_DOMAIN).into_owned(),
        anchor_domain: String::from_utf8_lossy(anchorchain_core::crypto::ANCHOR_DOMAIN)
            .into_owned(),
        blocks: block_vectors()
            .iter()
            .map(|v| BlockEntry {
                name: v.name.to_string(),
                index: v.index,
                created_at: v.created_at,
                previous: v.previous.map(str::to_string),
                payload: hex::encode(&v.payload),
                nonce: v.nonce,
                canonical_bytes: v.canonical_hex(),
                digest: v.block().digest().to_hex(),
            })
            .collect(),
        anchors: anchor_vectors()
            .iter()
            .map(|v| AnchorEntry {
                name: v.name.to_string(),
                covered: v.covered.iter().map(|h| h.to_string()).collect(),
                digest: v.compute().to_hex(),
            })
            .collect(),
    };
    serde_json::to_string_pretty(&file)
}

fn digest_from_hex(hex: &str) -> Digest {
    Digest::from_hex(hex).expect("vector digests are 32-byte hex")
}
