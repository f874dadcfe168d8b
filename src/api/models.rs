use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::blockchain::{ChainStore, Miner};
use crate::config::Config;

/// Shared application state: the chain plus the mining limits applied per request.
#[derive(Debug)]
pub struct AppState {
    pub chain: ChainStore,
    pub mine_max_iterations: u64,
    pub mine_timeout: Option<Duration>,
}

impl AppState {
    pub fn new(chain: ChainStore, config: &Config) -> Self {
        Self {
            chain,
            mine_max_iterations: config.mine_max_iterations,
            mine_timeout: config.mine_timeout,
        }
    }

    /// A miner matching the chain's difficulty and the configured cap.
    pub fn miner(&self) -> Miner {
        Miner::new(self.chain.difficulty()).with_max_iterations(self.mine_max_iterations)
    }
}

impl Default for AppState {
    fn default() -> Self {
        let config = Config::default();
        Self::new(ChainStore::new(config.difficulty), &config)
    }
}

/* ---------- Mining API Models ---------- */

/// `data` may be missing or `null`; both mean an empty payload.
#[derive(Debug, Default, Deserialize)]
pub struct MineRequest {
    #[serde(default)]
    pub data: Option<String>,
}

impl MineRequest {
    /// Parse a `/mine` body. A bare JSON `null` counts as an empty request.
    pub fn from_body(body: &[u8]) -> serde_json::Result<Self> {
        let req: Option<Self> = serde_json::from_slice(body)?;
        Ok(req.unwrap_or_default())
    }

    pub fn into_data(self) -> String {
        self.data.unwrap_or_default()
    }
}

/* ---------- Chain API Models ---------- */

#[derive(Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub length: usize,
    pub difficulty: u32,
}

#[derive(Serialize)]
pub struct DifficultyResponse {
    pub difficulty: u32,
}
