//! Block and chain validation.
//!
//! A candidate is checked against its claimed parent in a fixed order,
//! stopping at the first failure:
//! 1. index == parent.index + 1
//! 2. previous_hash == parent.hash
//! 3. hash == recomputed hash of the block's own fields
//! 4. hash has `difficulty` leading zero hex characters

use super::Block;
use super::block::meets_difficulty;
use super::error::Rejected;

/// Run all checks and report the first one that fails.
pub fn check_block(candidate: &Block, parent: &Block, difficulty: u32) -> Result<(), Rejected> {
    let Some(expected_index) = parent.index.checked_add(1) else {
        return Err(Rejected::IndexOverflow {
            parent: parent.index,
        });
    };
    if candidate.index != expected_index {
        return Err(Rejected::IndexMismatch {
            expected: expected_index,
            actual: candidate.index,
        });
    }

    if candidate.previous_hash != parent.hash {
        return Err(Rejected::PreviousHashMismatch {
            expected: parent.hash.clone(),
            actual: candidate.previous_hash.clone(),
        });
    }

    let expected_hash = candidate.compute_hash();
    if candidate.hash != expected_hash {
        return Err(Rejected::HashMismatch {
            expected: expected_hash,
            actual: candidate.hash.clone(),
        });
    }

    if !meets_difficulty(&candidate.hash, difficulty) {
        return Err(Rejected::InsufficientWork {
            difficulty,
            hash: candidate.hash.clone(),
        });
    }

    Ok(())
}

/// Boolean form of [`check_block`].
pub fn is_valid(candidate: &Block, parent: &Block, difficulty: u32) -> bool {
    check_block(candidate, parent, difficulty).is_ok()
}

/// Validate a whole chain: genesis shape plus every adjacent pair.
/// Genesis is exempt from the difficulty target.
pub fn validate_chain(blocks: &[Block], difficulty: u32) -> bool {
    let Some(genesis) = blocks.first() else {
        return false;
    };
    if !genesis.is_genesis()
        || !genesis.previous_hash.is_empty()
        || genesis.hash != genesis.compute_hash()
    {
        return false;
    }

    blocks
        .windows(2)
        .all(|pair| is_valid(&pair[1], &pair[0], difficulty))
}
