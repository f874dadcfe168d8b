use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::GENESIS_DATA;

/// A single block in the chain carrying an opaque string payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: String, // RFC 3339, hashed as-is
    pub data: String,
    #[serde(rename = "previousHash")]
    pub previous_hash: String,
    pub hash: String, // Cached hash of the block
    pub nonce: u64,   // Proof-of-Work nonce
}

/// SHA-256 over the canonical concatenation of the block fields,
/// returned as 64 lowercase hex characters.
pub fn calculate_hash(
    index: u64,
    timestamp: &str,
    data: &str,
    previous_hash: &str,
    nonce: u64,
) -> String {
    let preimage = format!("{index}{timestamp}{data}{previous_hash}{nonce}");
    let mut hasher = Sha256::new();
    hasher.update(preimage.as_bytes());
    hex::encode(hasher.finalize())
}

/// True when `hash` starts with `difficulty` `'0'` hex characters.
pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
    let difficulty = difficulty as usize;
    hash.len() >= difficulty && hash.bytes().take(difficulty).all(|c| c == b'0')
}

/// Current UTC time in the format blocks are stamped with.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl Block {
    /// Create the genesis block (first block in the chain).
    /// Its hash is never checked against the difficulty target.
    pub fn genesis() -> Self {
        Self::genesis_at(now_timestamp())
    }

    pub fn genesis_at(timestamp: String) -> Self {
        let mut block = Self {
            index: 0,
            timestamp,
            data: GENESIS_DATA.to_string(),
            previous_hash: String::new(),
            hash: String::new(),
            nonce: 0,
        };
        block.hash = block.compute_hash();
        block
    }

    /// Unmined child of `parent` with nonce 0 and an empty hash.
    /// A parent at `u64::MAX` yields an index validation will refuse.
    pub fn candidate(parent: &Block, timestamp: String, data: String) -> Self {
        Self {
            index: parent.index.saturating_add(1),
            timestamp,
            data,
            previous_hash: parent.hash.clone(),
            hash: String::new(),
            nonce: 0,
        }
    }

    /// Hash of this block's own fields (excluding the cached `hash`).
    pub fn compute_hash(&self) -> String {
        calculate_hash(
            self.index,
            &self.timestamp,
            &self.data,
            &self.previous_hash,
            self.nonce,
        )
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 0
    }
}
