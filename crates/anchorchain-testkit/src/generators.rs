//! Proptest generators for property-based testing.

use proptest::prelude::*;

use anchorchain_core::{Block, Difficulty, Digest, UnsealedBlock};

/// Generate a random Digest.
pub fn digest() -> impl Strategy<Value = Digest> {
    any::<[u8; 32]>().prop_map(Digest::from_bytes)
}

/// Generate a predecessor link, sometimes the sentinel.
pub fn previous() -> impl Strategy<Value = Option<Digest>> {
    prop::option::of(digest())
}

/// Generate a reasonable timestamp.
pub fn timestamp() -> impl Strategy<Value = i64> {
    0i64..=i64::MAX / 2
}

/// Generate payload bytes of specified max length.
pub fn payload(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate a valid hex prefix of at most `max_len` characters.
pub fn hex_prefix(max_len: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(b"0123456789abcdef".to_vec()), 0..=max_len)
        .prop_map(|chars| chars.into_iter().map(char::from).collect())
}

/// Generate a difficulty cheap enough to mine inside a property test.
pub fn cheap_difficulty() -> impl Strategy<Value = Difficulty> {
    prop_oneof![
        Just(Difficulty::none()),
        hex_prefix(1).prop_map(|p| Difficulty::prefix(&p).expect("generated prefix is hex")),
    ]
}

/// Parameters for generating a block.
#[derive(Debug, Clone)]
pub struct BlockParams {
    pub index: u64,
    pub created_at: i64,
    pub previous: Option<Digest>,
    pub payload: Vec<u8>,
    pub nonce: u64,
}

impl Arbitrary for BlockParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            any::<u64>(),
            timestamp(),
            previous(),
            payload(1000),
            any::<u64>(),
        )
            .prop_map(|(index, created_at, previous, payload, nonce)| BlockParams {
                index,
                created_at,
                previous,
                payload,
                nonce,
            })
            .boxed()
    }
}

/// Seal a block from parameters.
pub fn block_from_params(params: &BlockParams) -> Block {
    UnsealedBlock::with_timestamp(params.payload.clone(), params.created_at).seal(
        params.index,
        params.previous,
        params.nonce,
    )
}

/// Link `payloads` into a chain under a genesis carrying `genesis`.
pub fn chain_from_payloads(genesis: &[u8], payloads: &[Vec<u8>]) -> Vec<Block> {
    let mut blocks = vec![Block::genesis(UnsealedBlock::with_timestamp(
        genesis.to_vec(),
        0,
    ))];
    for (i, payload) in payloads.iter().enumerate() {
        let index = i as u64 + 1;
        let previous = blocks[i].digest();
        blocks.push(
            UnsealedBlock::with_timestamp(payload.clone(), index as i64).seal(
                index,
                Some(previous),
                0,
            ),
        );
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchorchain_core::{verify_chain, CancelFlag, LinkError, ProofOfWork};
    use bytes::Bytes;

    proptest! {
        #[test]
        fn test_block_digest_deterministic(params: BlockParams) {
            let b1 = block_from_params(&params);
            let b2 = block_from_params(&params);

            prop_assert_eq!(b1.digest(), b2.digest());
            prop_assert!(b1.is_self_consistent());
        }

        #[test]
        fn test_digest_unique_with_different_payload(
            params: BlockParams,
            other in payload(100),
        ) {
            prop_assume!(params.payload != other);

            let b1 = block_from_params(&params);
            let b2 = block_from_params(&BlockParams { payload: other, ..params.clone() });

            prop_assert_ne!(b1.digest(), b2.digest());
        }

        #[test]
        fn test_generated_chain_verifies(payloads in prop::collection::vec(payload(64), 0..16)) {
            let chain = chain_from_payloads(b"genesis", &payloads);
            prop_assert_eq!(
                verify_chain(&chain, &Difficulty::none()).unwrap(),
                payloads.len() as u64 + 1
            );
        }

        #[test]
        fn test_rewritten_block_is_located(
            payloads in prop::collection::vec(payload(32), 1..12),
            pick in any::<prop::sample::Index>(),
        ) {
            let mut chain = chain_from_payloads(b"genesis", &payloads);
            let target = pick.index(chain.len());
            let mut forged = chain[target].payload.to_vec();
            forged.push(0x5a);
            chain[target].payload = Bytes::from(forged);

            let err = verify_chain(&chain, &Difficulty::none()).unwrap_err();
            prop_assert_eq!(err, LinkError::DigestMismatch { index: target as u64 });
        }

        #[test]
        fn test_mined_block_meets_difficulty(
            params: BlockParams,
            difficulty in cheap_difficulty(),
        ) {
            let mut block = block_from_params(&params);
            let solution = ProofOfWork::new(difficulty.clone())
                .search(&mut block, &CancelFlag::new())
                .unwrap();

            prop_assert!(difficulty.is_satisfied_by(&block.digest()));
            prop_assert!(block.is_self_consistent());
            prop_assert_eq!(block.nonce(), solution.nonce);
        }

        #[test]
        fn test_hex_prefix_accepted(prefix in hex_prefix(64)) {
            prop_assert!(Difficulty::prefix(&prefix).is_ok());
        }
    }
}
