use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info};

use super::block::{meets_difficulty, now_timestamp};
use super::error::MineError;
use super::{Block, DEFAULT_MAX_ITERATIONS};

/// How often (in nonces) the search looks at its cancellation token.
const CANCEL_POLL_INTERVAL: u64 = 1024;

/// Shared flag used to stop an in-flight nonce search from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Proof-of-Work search. Nonces are tried in ascending order from 0, so the
/// result is fully determined by the parent, payload and timestamp.
#[derive(Debug, Clone)]
pub struct Miner {
    difficulty: u32,
    max_iterations: u64,
    cancel: Option<CancelToken>,
}

impl Miner {
    pub fn new(difficulty: u32) -> Self {
        Self {
            difficulty,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            cancel: None,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    /// Mine a child of `parent` stamped with the current time.
    pub fn mine(&self, parent: &Block, data: &str) -> Result<Block, MineError> {
        self.mine_at(parent, data, now_timestamp())
    }

    /// Mine a child of `parent` with a caller-chosen timestamp.
    pub fn mine_at(
        &self,
        parent: &Block,
        data: &str,
        timestamp: String,
    ) -> Result<Block, MineError> {
        let mut block = Block::candidate(parent, timestamp, data.to_string());
        debug!(
            "MINER - searching block #{} (difficulty={}, cap={})",
            block.index, self.difficulty, self.max_iterations
        );

        let mut iterations: u64 = 0;
        loop {
            if iterations >= self.max_iterations {
                return Err(MineError::Exhausted { iterations });
            }
            if iterations % CANCEL_POLL_INTERVAL == 0 && self.is_cancelled() {
                return Err(MineError::Cancelled { iterations });
            }

            block.hash = block.compute_hash();
            iterations += 1;
            if meets_difficulty(&block.hash, self.difficulty) {
                break;
            }
            block.nonce = match block.nonce.checked_add(1) {
                Some(n) => n,
                None => return Err(MineError::Exhausted { iterations }),
            };
        }

        info!(
            "MINER - sealed block #{} (hash={}, nonce={})",
            block.index, block.hash, block.nonce
        );
        Ok(block)
    }
}
