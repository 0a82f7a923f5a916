//! The Ledger: single-writer append over a durable block store.
//!
//! The ledger owns the head block. Every append runs
//! seal → proof-of-work → link check → insert → advance head
//! while holding one writer lock, so concurrent callers are serialized and
//! each successful `add` extends the chain by exactly one block. Anchoring
//! takes the same lock so a checkpoint never races an append.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anchorchain_core::{
    Anchor, Block, CancelFlag, ChainVerifier, Digest, LinkError, ProofOfWork, UnsealedBlock,
};
use anchorchain_store::{InsertResult, SqliteStore, Store};
use bytes::Bytes;
use rand::Rng;
use tokio::sync::{watch, Mutex};

use crate::anchor::AnchorCompactor;
use crate::config::LedgerConfig;
use crate::error::{LedgerError, Result};

/// Blocks fetched per storage call while replaying the chain.
const REPLAY_PAGE: u64 = 256;

/// How [`Ledger::initialize`] treats an empty store.
#[derive(Debug, Clone)]
pub enum LedgerSeed {
    /// Commit this block as genesis if the store is empty, otherwise resume.
    Genesis(UnsealedBlock),
    /// Resume from the stored head. An empty store is an error.
    Resume,
}

impl LedgerSeed {
    /// Seed a genesis block carrying `payload`, stamped now.
    pub fn genesis(payload: impl Into<Bytes>) -> Self {
        LedgerSeed::Genesis(UnsealedBlock::new(payload))
    }
}

/// Outcome of a successful [`Ledger::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainReport {
    /// Blocks verified, genesis included.
    pub length: u64,
    /// Digest of the last verified block.
    pub head: Digest,
}

/// A tamper-evident, append-only ledger.
pub struct Ledger<S: Store> {
    /// The storage backend.
    store: Arc<S>,
    /// Configuration.
    config: LedgerConfig,
    /// Writer lock guarding the authoritative head.
    writer: Mutex<Block>,
    /// Published head for readers that must not wait on a running search.
    head: watch::Sender<Block>,
    /// Owner of the anchor table.
    compactor: AnchorCompactor<S>,
    /// Tripped by [`Ledger::shutdown`].
    cancel: CancelFlag,
}

impl Ledger<SqliteStore> {
    /// Open (or create) a SQLite-backed ledger at `path`.
    pub async fn open(
        path: impl AsRef<Path>,
        config: LedgerConfig,
        seed: LedgerSeed,
    ) -> Result<Self> {
        let store = SqliteStore::open(path).map_err(LedgerError::StorageUnavailable)?;
        Self::initialize(store, config, seed).await
    }
}

impl<S: Store> Ledger<S> {
    /// Load the head from `store`, committing a genesis block first if the
    /// store is empty and `seed` asks for one.
    ///
    /// Genesis is never mined. A reloaded head must reproduce its stored
    /// digest or initialization fails with [`LedgerError::CorruptHead`].
    pub async fn initialize(store: S, config: LedgerConfig, seed: LedgerSeed) -> Result<Self> {
        Self::from_shared(Arc::new(store), config, seed).await
    }

    /// Like [`Ledger::initialize`], over a store shared with other handles.
    pub async fn from_shared(store: Arc<S>, config: LedgerConfig, seed: LedgerSeed) -> Result<Self> {
        config.validate()?;
        let timeout = config.storage_timeout;

        let head = match Self::load_head(&store, timeout).await? {
            Some(head) => {
                tracing::info!(index = head.index(), digest = %head.digest(), "resumed ledger");
                head
            }
            None => match seed {
                LedgerSeed::Resume => return Err(LedgerError::Empty),
                LedgerSeed::Genesis(unsealed) => {
                    let genesis = Block::genesis(unsealed);
                    let inserted = bounded(timeout, store.insert_block(&genesis))
                        .await
                        .map_err(unavailable)?;
                    if inserted.is_inserted() {
                        tracing::info!(digest = %genesis.digest(), "genesis committed");
                        genesis
                    } else {
                        // Another writer seeded the store first.
                        Self::load_head(&store, timeout)
                            .await?
                            .ok_or(LedgerError::Empty)?
                    }
                }
            },
        };

        let (head_tx, _) = watch::channel(head.clone());
        Ok(Self {
            compactor: AnchorCompactor::new(store.clone(), timeout),
            store,
            config,
            writer: Mutex::new(head),
            head: head_tx,
            cancel: CancelFlag::new(),
        })
    }

    async fn load_head(store: &S, timeout: Duration) -> Result<Option<Block>> {
        let head = bounded(timeout, store.latest_block())
            .await
            .map_err(unavailable)?;
        if let Some(head) = &head {
            if !head.is_self_consistent() {
                tracing::warn!(index = head.index(), "stored head fails digest check");
                return Err(LedgerError::CorruptHead { index: head.index() });
            }
        }
        Ok(head)
    }

    /// Get the configuration.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Append
    // ─────────────────────────────────────────────────────────────────────────

    /// Append `candidate` after the current head and return its digest.
    ///
    /// The starting nonce is drawn uniformly from
    /// `0..=config.max_start_nonce`. On any failure the candidate is dropped
    /// and the head is left where it was.
    pub async fn add(&self, candidate: UnsealedBlock) -> Result<Digest> {
        let start_nonce = rand::thread_rng().gen_range(0..=self.config.max_start_nonce);
        self.add_from_nonce(candidate, start_nonce).await
    }

    /// Like [`Ledger::add`], with an explicit starting nonce.
    ///
    /// Pass the `next_nonce` of a [`anchorchain_core::PowError`] to continue
    /// a search that ran out of budget against the same head.
    pub async fn add_from_nonce(&self, candidate: UnsealedBlock, start_nonce: u64) -> Result<Digest> {
        if self.cancel.is_cancelled() {
            return Err(LedgerError::Cancelled);
        }
        let mut head = self.writer.lock().await;
        if self.cancel.is_cancelled() {
            return Err(LedgerError::Cancelled);
        }

        let sealed = candidate.seal(
            head.index().saturating_add(1),
            Some(head.compute_digest()),
            start_nonce,
        );
        let block = self.mine(sealed).await?;

        if let Err(reason) = block.check_link(&head) {
            tracing::warn!(index = block.index(), %reason, "candidate rejected");
            return Err(LedgerError::LinkageInvalid(reason));
        }

        let index = block.index();
        let digest = block.digest();
        let inserted = match bounded(self.config.storage_timeout, self.store.insert_block(&block)).await {
            Ok(inserted) => inserted,
            Err(e) => {
                // The row may have landed before the deadline.
                if self.resync(&mut head).await.is_some_and(|adopted| adopted.digest() == digest) {
                    tracing::info!(index, %digest, "late insert committed");
                    return Ok(digest);
                }
                return Err(e);
            }
        };
        if let InsertResult::Duplicate | InsertResult::Conflict { .. } = inserted {
            tracing::warn!(index, %digest, ?inserted, "block rejected by store");
            self.resync(&mut head).await;
            return Err(LedgerError::DuplicateOrConflict { index, digest });
        }

        tracing::debug!(index, %digest, nonce = block.nonce(), "block committed");
        *head = block.clone();
        self.head.send_replace(block);
        Ok(digest)
    }

    /// Run the nonce search off the async runtime.
    ///
    /// The search stops on [`Ledger::shutdown`] and also when this future is
    /// dropped, so an abandoned `add` does not leave a thread spinning.
    async fn mine(&self, block: Block) -> Result<Block> {
        self.mine_with(block, self.cancel.child()).await
    }

    async fn mine_with(&self, mut block: Block, search: CancelFlag) -> Result<Block> {
        let pow = ProofOfWork::new(self.config.difficulty.clone())
            .with_max_iterations(self.config.max_pow_iterations);
        let _guard = search.drop_guard();

        let (block, solution) = tokio::task::spawn_blocking(move || {
            pow.search(&mut block, &search).map(|solution| (block, solution))
        })
        .await
        .map_err(|e| LedgerError::Worker(e.to_string()))??;

        tracing::debug!(
            index = block.index(),
            nonce = solution.nonce,
            iterations = solution.iterations,
            "proof-of-work found"
        );
        Ok(block)
    }

    /// Adopt a valid successor already stored at `head.index + 1` and
    /// return it.
    ///
    /// Covers an insert that committed but was reported as failed (timeout),
    /// and rows appended by another handle on the same store.
    async fn resync(&self, head: &mut Block) -> Option<Block> {
        let next = head.index().saturating_add(1);
        let stored = match bounded(self.config.storage_timeout, self.store.get_block(next)).await {
            Ok(Some(block)) => block,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "head resync failed");
                return None;
            }
        };

        if stored.check_link(head).is_err() || !self.config.difficulty.is_satisfied_by(&stored.digest()) {
            return None;
        }
        tracing::info!(index = stored.index(), digest = %stored.digest(), "adopted stored successor as head");
        *head = stored.clone();
        self.head.send_replace(stored.clone());
        Some(stored)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Head
    // ─────────────────────────────────────────────────────────────────────────

    /// Number of blocks, genesis included.
    pub fn length(&self) -> u64 {
        self.head.borrow().index() + 1
    }

    /// A copy of the most recently committed block.
    pub fn head(&self) -> Block {
        self.head.borrow().clone()
    }

    /// Watch the head as it advances.
    pub fn subscribe(&self) -> watch::Receiver<Block> {
        self.head.subscribe()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Verification
    // ─────────────────────────────────────────────────────────────────────────

    /// Replay the stored chain from genesis to the current head.
    ///
    /// Checks genesis shape, index continuity, previous-digest linkage against
    /// recomputed predecessor digests, self-consistency, and the configured
    /// proof-of-work prefix on every non-genesis block.
    pub async fn validate(&self) -> Result<ChainReport> {
        let head_index = self.head.borrow().index();
        let timeout = self.config.storage_timeout;
        let mut verifier = ChainVerifier::new(&self.config.difficulty);

        let mut start = 0u64;
        loop {
            let end = start.saturating_add(REPLAY_PAGE - 1).min(head_index);
            let page = bounded(timeout, self.store.get_blocks_range(start, end)).await?;
            for block in page {
                let index = block.index();
                verifier
                    .push(block)
                    .map_err(|reason| LedgerError::ChainBroken { index, reason })?;
            }

            let verified = verifier.verified();
            if verified <= end {
                return Err(LedgerError::ChainBroken {
                    index: verified,
                    reason: LinkError::MissingBlock { index: verified },
                });
            }
            if end == head_index {
                break;
            }
            start = end + 1;
        }

        let head = verifier.last().map(|b| b.digest()).ok_or(LedgerError::Empty)?;
        Ok(ChainReport {
            length: verifier.verified(),
            head,
        })
    }

    /// Replay the anchor chain. Returns the number of anchors verified.
    pub async fn verify_anchors(&self) -> Result<u64> {
        self.compactor.verify().await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Anchors
    // ─────────────────────────────────────────────────────────────────────────

    /// Checkpoint every block committed since the last anchor.
    pub async fn anchor(&self) -> Result<Anchor> {
        let head = self.writer.lock().await;
        self.compactor.compact(head.index()).await
    }

    /// List all anchors, ordered by index.
    pub async fn anchors(&self) -> Result<Vec<Anchor>> {
        self.compactor.anchors().await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────────

    /// Get a committed block by index.
    pub async fn block(&self, index: u64) -> Result<Option<Block>> {
        bounded(self.config.storage_timeout, self.store.get_block(index)).await
    }

    /// Get committed blocks with `start <= index <= end`.
    pub async fn blocks(&self, start: u64, end: u64) -> Result<Vec<Block>> {
        bounded(self.config.storage_timeout, self.store.get_blocks_range(start, end)).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Stop accepting appends and cancel any running proof-of-work search.
    pub fn shutdown(&self) {
        tracing::info!(length = self.length(), "ledger shutting down");
        self.cancel.cancel();
    }

    /// Check if [`Ledger::shutdown`] was called.
    pub fn is_shut_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// The flag tripped by [`Ledger::shutdown`], for wiring into a host's
    /// own shutdown signal.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }
}

/// Run a storage call under `timeout`.
pub(crate) async fn bounded<T>(
    timeout: Duration,
    op: impl Future<Output = anchorchain_store::Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(timeout, op).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(LedgerError::Timeout(timeout)),
    }
}

/// Failures while loading the head mean the store itself is unusable.
fn unavailable(e: LedgerError) -> LedgerError {
    match e {
        LedgerError::Store(e) => LedgerError::StorageUnavailable(e),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchorchain_core::{Difficulty, PowError};
    use anchorchain_store::MemoryStore;
    use async_trait::async_trait;

    /// A [`MemoryStore`] whose block inserts take `delay`, committing either
    /// before or after the wait.
    struct SlowInsertStore {
        inner: MemoryStore,
        delay: Duration,
        commit_first: bool,
    }

    #[async_trait]
    impl Store for SlowInsertStore {
        async fn insert_block(&self, block: &Block) -> anchorchain_store::Result<InsertResult> {
            if self.commit_first {
                let inserted = self.inner.insert_block(block).await?;
                tokio::time::sleep(self.delay).await;
                Ok(inserted)
            } else {
                tokio::time::sleep(self.delay).await;
                self.inner.insert_block(block).await
            }
        }

        async fn latest_block(&self) -> anchorchain_store::Result<Option<Block>> {
            self.inner.latest_block().await
        }

        async fn get_block(&self, index: u64) -> anchorchain_store::Result<Option<Block>> {
            self.inner.get_block(index).await
        }

        async fn get_block_by_digest(&self, digest: &Digest) -> anchorchain_store::Result<Option<Block>> {
            self.inner.get_block_by_digest(digest).await
        }

        async fn get_blocks_range(&self, start: u64, end: u64) -> anchorchain_store::Result<Vec<Block>> {
            self.inner.get_blocks_range(start, end).await
        }

        async fn block_digests_between(&self, after: u64, through: u64) -> anchorchain_store::Result<Vec<Digest>> {
            self.inner.block_digests_between(after, through).await
        }

        async fn block_count(&self) -> anchorchain_store::Result<u64> {
            self.inner.block_count().await
        }

        async fn insert_anchor(&self, anchor: &Anchor) -> anchorchain_store::Result<InsertResult> {
            self.inner.insert_anchor(anchor).await
        }

        async fn latest_anchor(&self) -> anchorchain_store::Result<Option<Anchor>> {
            self.inner.latest_anchor().await
        }

        async fn list_anchors(&self) -> anchorchain_store::Result<Vec<Anchor>> {
            self.inner.list_anchors().await
        }
    }

    async fn slow_ledger(commit_first: bool) -> Ledger<SlowInsertStore> {
        let inner = MemoryStore::new();
        inner
            .insert_block(&Block::genesis(UnsealedBlock::with_timestamp(b"genesis".to_vec(), 1)))
            .await
            .unwrap();
        let store = SlowInsertStore {
            inner,
            delay: Duration::from_millis(300),
            commit_first,
        };
        let config = LedgerConfig::default()
            .without_pow()
            .with_storage_timeout(Duration::from_millis(50));
        Ledger::initialize(store, config, LedgerSeed::Resume).await.unwrap()
    }

    fn fast_config() -> LedgerConfig {
        LedgerConfig::default().with_difficulty(Difficulty::prefix("0").unwrap())
    }

    fn unreachable_config() -> LedgerConfig {
        LedgerConfig::default().with_difficulty(Difficulty::prefix(&"0".repeat(64)).unwrap())
    }

    async fn new_ledger(config: LedgerConfig) -> Ledger<MemoryStore> {
        Ledger::initialize(
            MemoryStore::new(),
            config,
            LedgerSeed::Genesis(UnsealedBlock::with_timestamp(b"genesis".to_vec(), 1)),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_genesis() {
        let ledger = new_ledger(fast_config()).await;
        let genesis = ledger.head();

        assert_eq!(ledger.length(), 1);
        assert_eq!(genesis.index(), 0);
        assert_eq!(genesis.previous(), None);
        assert_eq!(genesis.nonce(), 0);
        assert!(genesis.is_self_consistent());
    }

    #[tokio::test]
    async fn test_resume_on_empty_store() {
        let result = Ledger::initialize(MemoryStore::new(), fast_config(), LedgerSeed::Resume).await;
        assert!(matches!(result, Err(LedgerError::Empty)));
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let config = LedgerConfig::default().with_storage_timeout(Duration::ZERO);
        let result = Ledger::initialize(MemoryStore::new(), config, LedgerSeed::Resume).await;
        assert!(matches!(result, Err(LedgerError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_add_returns_recomputable_digest() {
        let ledger = new_ledger(fast_config()).await;
        let previous = ledger.head();

        let digest = ledger.add(UnsealedBlock::new(b"first".to_vec())).await.unwrap();
        let head = ledger.head();

        assert_eq!(ledger.length(), 2);
        assert_eq!(head.compute_digest(), digest);
        assert!(head.is_valid(&previous));
        assert!(digest.to_hex().starts_with('0'));
        assert_eq!(ledger.block(1).await.unwrap(), Some(head));
    }

    #[tokio::test]
    async fn test_disabled_pow_accepts_any_digest() {
        let ledger = new_ledger(LedgerConfig::default().without_pow()).await;
        for i in 0..5u8 {
            ledger.add(UnsealedBlock::new(vec![i])).await.unwrap();
        }
        assert_eq!(ledger.length(), 6);
        assert_eq!(ledger.validate().await.unwrap().length, 6);
    }

    #[tokio::test]
    async fn test_validate_detects_tampered_row() {
        let ledger = new_ledger(fast_config()).await;
        for i in 0..3u8 {
            ledger.add(UnsealedBlock::new(vec![i])).await.unwrap();
        }
        let report = ledger.validate().await.unwrap();
        assert_eq!(report.length, 4);
        assert_eq!(report.head, ledger.head().digest());

        let mut edited = ledger.block(2).await.unwrap().unwrap();
        edited.payload = Bytes::from_static(b"forged");
        ledger.store().tamper_block(edited).unwrap();

        assert!(matches!(
            ledger.validate().await,
            Err(LedgerError::ChainBroken {
                index: 2,
                reason: LinkError::DigestMismatch { index: 2 }
            })
        ));
    }

    #[tokio::test]
    async fn test_validate_uses_current_difficulty() {
        let ledger = Ledger::initialize(
            MemoryStore::new(),
            LedgerConfig::default().without_pow(),
            LedgerSeed::genesis(b"g".to_vec()),
        )
        .await
        .unwrap();
        // Mine until a block misses the stricter prefix below.
        while ledger.head().digest().to_hex().starts_with("00") || ledger.length() == 1 {
            ledger.add(UnsealedBlock::new(b"x".to_vec())).await.unwrap();
        }

        let strict = Ledger::from_shared(
            ledger.store.clone(),
            LedgerConfig::default(),
            LedgerSeed::Resume,
        )
        .await
        .unwrap();
        assert!(matches!(
            strict.validate().await,
            Err(LedgerError::ChainBroken {
                reason: LinkError::ProofOfWorkUnsatisfied { .. },
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_budget_exhausted_leaves_head() {
        let ledger = new_ledger(unreachable_config().with_max_pow_iterations(8)).await;
        let err = ledger
            .add_from_nonce(UnsealedBlock::new(b"x".to_vec()), 100)
            .await
            .unwrap_err();

        assert!(err.is_retryable());
        assert!(matches!(
            err,
            LedgerError::ProofOfWork(PowError::BudgetExhausted {
                next_nonce: 109,
                iterations: 8
            })
        ));
        assert_eq!(ledger.length(), 1);
        assert_eq!(ledger.store().block_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_cancels_search() {
        let ledger = Arc::new(new_ledger(unreachable_config()).await);

        let worker = {
            let ledger = ledger.clone();
            tokio::spawn(async move { ledger.add(UnsealedBlock::new(b"never".to_vec())).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        ledger.shutdown();

        let result = worker.await.unwrap();
        assert!(matches!(
            result,
            Err(LedgerError::ProofOfWork(PowError::Cancelled { .. }))
        ));
        assert!(matches!(
            ledger.add(UnsealedBlock::new(b"late".to_vec())).await,
            Err(LedgerError::Cancelled)
        ));
        assert_eq!(ledger.length(), 1);
    }

    #[tokio::test]
    async fn test_late_committed_insert_succeeds() {
        let ledger = slow_ledger(true).await;

        let digest = ledger.add(UnsealedBlock::new(b"pay-once".to_vec())).await.unwrap();

        assert_eq!(ledger.length(), 2);
        assert_eq!(ledger.head().digest(), digest);
        assert_eq!(ledger.head().payload.as_ref(), b"pay-once");
        assert_eq!(ledger.store().block_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_timed_out_insert_leaves_head() {
        let ledger = slow_ledger(false).await;
        let genesis = ledger.head();

        let err = ledger.add(UnsealedBlock::new(b"dropped".to_vec())).await.unwrap_err();

        assert!(matches!(err, LedgerError::Timeout(_)));
        assert!(err.is_retryable());
        assert_eq!(ledger.head(), genesis);
        assert_eq!(ledger.store().block_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_dropped_add_stops_search() {
        let ledger = new_ledger(unreachable_config()).await;
        let search = ledger.cancel_flag().child();
        let block = UnsealedBlock::new(b"abandoned".to_vec()).seal(1, Some(ledger.head().digest()), 0);

        let result = tokio::time::timeout(
            Duration::from_millis(20),
            ledger.mine_with(block, search.clone()),
        )
        .await;

        assert!(result.is_err());
        assert!(search.is_cancelled());
        assert!(!ledger.is_shut_down());
    }

    #[tokio::test]
    async fn test_conflict_resyncs_head() {
        let ledger = new_ledger(LedgerConfig::default().without_pow()).await;
        let genesis = ledger.head();

        // Another handle on the same store appends first.
        let rival = UnsealedBlock::new(b"rival".to_vec()).seal(1, Some(genesis.digest()), 0);
        ledger.store().insert_block(&rival).await.unwrap();

        let err = ledger.add(UnsealedBlock::new(b"mine".to_vec())).await.unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateOrConflict { index: 1, .. }));
        assert_eq!(ledger.head(), rival);

        ledger.add(UnsealedBlock::new(b"next".to_vec())).await.unwrap();
        assert_eq!(ledger.length(), 3);
        assert!(ledger.validate().await.is_ok());
    }

    #[tokio::test]
    async fn test_anchor_through_ledger() {
        let ledger = new_ledger(fast_config()).await;
        assert!(ledger.anchor().await.unwrap_err().is_no_progress());

        ledger.add(UnsealedBlock::new(b"a".to_vec())).await.unwrap();
        ledger.add(UnsealedBlock::new(b"b".to_vec())).await.unwrap();
        let anchor = ledger.anchor().await.unwrap();

        assert_eq!(anchor.index, 2);
        assert!(anchor.previous.is_none());
        assert_eq!(ledger.anchors().await.unwrap(), vec![anchor]);
        assert_eq!(ledger.verify_anchors().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_subscribe_sees_new_head() {
        let ledger = new_ledger(fast_config()).await;
        let mut rx = ledger.subscribe();

        let digest = ledger.add(UnsealedBlock::new(b"watched".to_vec())).await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().digest(), digest);
    }

    #[tokio::test]
    async fn test_bounded_times_out() {
        let result: Result<()> = bounded(Duration::from_millis(5), async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<_, anchorchain_store::StoreError>(())
        })
        .await;
        assert!(matches!(result, Err(LedgerError::Timeout(_))));
    }
}
