pub mod block;
pub mod error;
pub mod miner;
pub mod model;
pub mod validation;

pub use block::Block;
pub use error::{AppendError, MineError, Rejected};
pub use miner::{CancelToken, Miner};
pub use model::ChainStore;

/// Default Proof-of-Work difficulty (number of leading zero hex characters).
pub const DEFAULT_DIFFICULTY: u32 = 2;

/// A SHA-256 hex digest has 64 characters; more zeros than that is unsatisfiable.
pub const MAX_DIFFICULTY: u32 = 64;

/// Payload of the block every chain starts from.
pub const GENESIS_DATA: &str = "Genesis Block";

/// Nonce attempts before a search gives up.
pub const DEFAULT_MAX_ITERATIONS: u64 = 50_000_000;
