use thiserror::Error;

/// Why a candidate block was refused, in the order checks are applied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejected {
    #[error("invalid index: expected {expected}, got {actual}")]
    IndexMismatch { expected: u64, actual: u64 },

    #[error("parent index {parent} has no successor")]
    IndexOverflow { parent: u64 },

    #[error("previous hash mismatch: expected {expected}, got {actual}")]
    PreviousHashMismatch { expected: String, actual: String },

    #[error("hash does not match block contents: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },

    #[error("hash {hash} does not meet difficulty {difficulty}")]
    InsufficientWork { difficulty: u32, hash: String },
}

impl Rejected {
    /// Linkage failures are the ones a moved tail can cause.
    pub fn is_linkage(&self) -> bool {
        matches!(
            self,
            Rejected::IndexMismatch { .. }
                | Rejected::IndexOverflow { .. }
                | Rejected::PreviousHashMismatch { .. }
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MineError {
    #[error("no nonce found within {iterations} iterations")]
    Exhausted { iterations: u64 },

    #[error("mining cancelled after {iterations} iterations")]
    Cancelled { iterations: u64 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppendError {
    #[error(transparent)]
    Mine(#[from] MineError),

    #[error("block rejected: {0}")]
    Rejected(#[from] Rejected),

    #[error("mining cancelled before the block was appended")]
    Cancelled,
}
