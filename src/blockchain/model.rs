use std::sync::Mutex;

use log::{debug, info, warn};

use super::error::{AppendError, Rejected};
use super::validation::{check_block, validate_chain};
use super::{Block, Miner};

/// In-memory, append-only chain guarded by a single mutex.
/// Callers only ever get clones of the stored blocks.
#[derive(Debug)]
pub struct ChainStore {
    chain: Mutex<Vec<Block>>,
    difficulty: u32,
}

impl ChainStore {
    /// Initialize a new chain holding only the genesis block.
    pub fn new(difficulty: u32) -> Self {
        Self::with_genesis(Block::genesis(), difficulty)
    }

    pub fn with_genesis(genesis: Block, difficulty: u32) -> Self {
        info!("CHAIN - genesis hash={} (difficulty={})", genesis.hash, difficulty);
        Self {
            chain: Mutex::new(vec![genesis]),
            difficulty,
        }
    }

    /// Consistent copy of the full chain, genesis first.
    pub fn snapshot(&self) -> Vec<Block> {
        self.chain.lock().expect("mutex poisoned").clone()
    }

    /// Copy of the last accepted block.
    pub fn tail(&self) -> Block {
        let chain = self.chain.lock().expect("mutex poisoned");
        chain
            .last()
            .cloned()
            .expect("chain always holds at least the genesis block")
    }

    /// Validate `candidate` against the current tail and append it, as one
    /// critical section. A rejected candidate leaves the chain untouched.
    pub fn try_append(&self, candidate: Block) -> Result<Block, Rejected> {
        let mut chain = self.chain.lock().expect("mutex poisoned");
        self.append_locked(&mut chain, candidate)
    }

    fn append_locked(&self, chain: &mut Vec<Block>, candidate: Block) -> Result<Block, Rejected> {
        let tail = chain
            .last()
            .expect("chain always holds at least the genesis block");

        if let Err(reason) = check_block(&candidate, tail, self.difficulty) {
            warn!("CHAIN - rejected block #{}: {}", candidate.index, reason);
            return Err(reason);
        }

        chain.push(candidate.clone());
        info!(
            "CHAIN - appended block #{} (hash={}, length={})",
            candidate.index,
            candidate.hash,
            chain.len()
        );
        Ok(candidate)
    }

    /// Like `try_append`, but refuses once the miner's cancellation token has
    /// fired. The token is read under the chain lock, so a caller that
    /// cancels and then observes no block knows none will be added later.
    fn append_unless_cancelled(
        &self,
        miner: &Miner,
        candidate: Block,
    ) -> Result<Block, AppendError> {
        let mut chain = self.chain.lock().expect("mutex poisoned");
        if miner.is_cancelled() {
            debug!("CHAIN - dropping block #{}: cancelled", candidate.index);
            return Err(AppendError::Cancelled);
        }
        Ok(self.append_locked(&mut chain, candidate)?)
    }

    /// Mine `data` on top of the current tail without holding the lock, then
    /// append. If another block landed in the meantime, mine once more
    /// against the new tail before giving up.
    pub fn mine_and_append(&self, miner: &Miner, data: &str) -> Result<Block, AppendError> {
        let parent = self.tail();
        let candidate = miner.mine(&parent, data)?;
        self.append_or_remine(miner, data, &parent, candidate)
    }

    fn append_or_remine(
        &self,
        miner: &Miner,
        data: &str,
        parent: &Block,
        candidate: Block,
    ) -> Result<Block, AppendError> {
        match self.append_unless_cancelled(miner, candidate) {
            Err(AppendError::Rejected(reason))
                if reason.is_linkage() && self.tail().hash != parent.hash =>
            {
                debug!(
                    "CHAIN - tail moved past #{} while mining, retrying once",
                    parent.index
                );
                let fresh = self.tail();
                let candidate = miner.mine(&fresh, data)?;
                self.append_unless_cancelled(miner, candidate)
            }
            res => res,
        }
    }

    /// Re-check genesis shape and every link of the current chain.
    pub fn is_valid_chain(&self) -> bool {
        let chain = self.chain.lock().expect("mutex poisoned");
        validate_chain(&chain, self.difficulty)
    }

    pub fn len(&self) -> usize {
        self.chain.lock().expect("mutex poisoned").len()
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::CancelToken;
    use std::sync::Barrier;
    use std::thread;

    const TS: &str = "2024-01-01T00:00:00Z";

    fn store() -> ChainStore {
        ChainStore::with_genesis(Block::genesis_at(TS.into()), 2)
    }

    #[test]
    fn starts_with_genesis_only() {
        let store = ChainStore::new(2);
        let chain = store.snapshot();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].index, 0);
        assert_eq!(chain[0].previous_hash, "");
        assert_eq!(chain[0].data, "Genesis Block");
        assert_eq!(store.len(), 1);
        assert_eq!(store.difficulty(), 2);
        assert!(store.is_valid_chain());
    }

    #[test]
    fn single_mine_then_append() {
        let store = store();
        let genesis = store.tail();
        let candidate = Miner::new(2).mine(&genesis, "hello").unwrap();
        let block = store.try_append(candidate.clone()).unwrap();

        assert_eq!(block, candidate);
        assert_eq!(block.index, 1);
        assert_eq!(block.previous_hash, genesis.hash);
        assert!(block.hash.starts_with("00"));
        assert_eq!(store.len(), 2);
        assert_eq!(store.tail(), block);
    }

    #[test]
    fn rejection_leaves_chain_unchanged_and_is_repeatable() {
        let store = store();
        let genesis = store.tail();
        let mut candidate = Miner::new(2).mine(&genesis, "hello").unwrap();
        candidate.data = "hellp".into();

        let before = store.snapshot();
        for _ in 0..3 {
            assert!(matches!(
                store.try_append(candidate.clone()),
                Err(Rejected::HashMismatch { .. })
            ));
        }
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn stale_candidate_is_rejected() {
        let store = store();
        let genesis = store.tail();
        let miner = Miner::new(2);
        let first = miner.mine(&genesis, "a").unwrap();
        let second = miner.mine(&genesis, "b").unwrap();

        assert!(store.try_append(first).is_ok());
        assert!(matches!(
            store.try_append(second),
            Err(Rejected::IndexMismatch { expected: 2, actual: 1 })
        ));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn concurrent_appends_on_same_tail_admit_exactly_one() {
        let store = store();
        let genesis = store.tail();
        let miner = Miner::new(2);
        let candidates: Vec<Block> = (0..8)
            .map(|i| miner.mine(&genesis, &format!("racer-{i}")).unwrap())
            .collect();
        let barrier = Barrier::new(candidates.len());

        let results: Vec<Result<Block, Rejected>> = thread::scope(|s| {
            let handles: Vec<_> = candidates
                .into_iter()
                .map(|c| {
                    let store = &store;
                    let barrier = &barrier;
                    s.spawn(move || {
                        barrier.wait();
                        store.try_append(c)
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(store.len(), 2);
        assert!(store.is_valid_chain());
    }

    #[test]
    fn concurrent_mine_and_append_keeps_chain_linked() {
        let store = store();
        let miner = Miner::new(2);

        let results: Vec<Result<Block, AppendError>> = thread::scope(|s| {
            let handles: Vec<_> = (0..6)
                .map(|i| {
                    let store = &store;
                    let miner = &miner;
                    s.spawn(move || store.mine_and_append(miner, &format!("payload-{i}")))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let chain = store.snapshot();
        let accepted: Vec<&Block> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        // Losing twice is allowed, but only as a linkage rejection.
        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            assert!(matches!(err, AppendError::Rejected(r) if r.is_linkage()), "{err}");
        }
        assert!(!accepted.is_empty());
        assert_eq!(accepted.len(), chain.len() - 1);
        for block in &accepted {
            assert_eq!(&chain[block.index as usize], *block);
        }

        assert!(store.is_valid_chain());
        for pair in chain.windows(2) {
            assert_eq!(pair[1].index, pair[0].index + 1);
            assert_eq!(pair[1].previous_hash, pair[0].hash);
            assert!(pair[1].hash.starts_with("00"));
        }
    }

    #[test]
    fn moved_tail_is_remined_once() {
        let store = store();
        let genesis = store.tail();
        let miner = Miner::new(2);
        let stale = miner.mine(&genesis, "late").unwrap();

        // Another writer lands first while `stale` was being searched.
        let competitor = store
            .try_append(miner.mine(&genesis, "early").unwrap())
            .unwrap();

        let block = store
            .append_or_remine(&miner, "late", &genesis, stale)
            .unwrap();
        assert_eq!(block.index, 2);
        assert_eq!(block.previous_hash, competitor.hash);
        assert_eq!(block.data, "late");
        assert_eq!(store.len(), 3);
        assert!(store.is_valid_chain());
    }

    #[test]
    fn unmoved_tail_is_not_remined() {
        let store = store();
        let genesis = store.tail();
        let miner = Miner::new(2);
        let mut wrong_parent = genesis.clone();
        wrong_parent.hash = "f".repeat(64);
        let stray = miner.mine(&wrong_parent, "stray").unwrap();

        assert!(matches!(
            store.append_or_remine(&miner, "stray", &genesis, stray),
            Err(AppendError::Rejected(Rejected::PreviousHashMismatch { .. }))
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn cancelled_miner_never_appends() {
        let store = store();
        let genesis = store.tail();
        let token = CancelToken::new();
        let miner = Miner::new(2).with_cancel(token.clone());
        let ready = miner.mine(&genesis, "hello").unwrap();

        token.cancel();
        assert_eq!(
            store.append_or_remine(&miner, "hello", &genesis, ready),
            Err(AppendError::Cancelled)
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn mine_and_append_sequentially() {
        let store = store();
        let miner = Miner::new(2);
        for i in 1..=3u64 {
            let block = store.mine_and_append(&miner, "data").unwrap();
            assert_eq!(block.index, i);
        }
        assert_eq!(store.len(), 4);
        assert!(store.is_valid_chain());
    }

    #[test]
    fn mine_and_append_surfaces_mining_failure() {
        let store = store();
        let miner = Miner::new(2).with_max_iterations(0);
        assert!(matches!(
            store.mine_and_append(&miner, "x"),
            Err(AppendError::Mine(_))
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn miner_difficulty_below_store_is_rejected() {
        let store = ChainStore::with_genesis(Block::genesis_at(TS.into()), 3);
        // 003b31... satisfies 2 but not 3.
        let candidate = Miner::new(2)
            .mine_at(&store.tail(), "hello", TS.into())
            .unwrap();
        assert!(matches!(
            store.try_append(candidate),
            Err(Rejected::InsufficientWork { difficulty: 3, .. })
        ));
    }
}
