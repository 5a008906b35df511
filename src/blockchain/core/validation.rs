use crate::blockchain::core::chain::Block;
use std::fmt;

/// First integrity violation found while walking a chain. Indices are chain
/// positions, which equal block indices for any ledger built by appending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainFault {
    /// Stored hash no longer matches the block's content.
    ContentMismatch { index: u64 },
    /// `previous_hash` of block `index` does not equal the stored hash of
    /// block `previous`.
    BrokenLink { index: u64, previous: u64 },
}

impl ChainFault {
    /// Position of the first block the fault implicates.
    pub fn index(&self) -> u64 {
        match self {
            ChainFault::ContentMismatch { index } => *index,
            ChainFault::BrokenLink { previous, .. } => *previous,
        }
    }
}

impl fmt::Display for ChainFault {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChainFault::ContentMismatch { index } => {
                write!(f, "Block {} content does not match its hash", index)
            }
            ChainFault::BrokenLink { index, previous } => write!(
                f,
                "Block {} does not link to the hash of block {}",
                index, previous
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    checked: usize,
    fault: Option<ChainFault>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.fault.is_none()
    }

    pub fn fault(&self) -> Option<&ChainFault> {
        self.fault.as_ref()
    }

    /// Number of blocks whose content hash was checked before stopping.
    pub fn checked(&self) -> usize {
        self.checked
    }
}

/// Walks `blocks` from genesis to tail and stops at the first fault.
///
/// For each block the stored hash is compared with a fresh recomputation,
/// then the successor's `previous_hash` is compared with the stored hash.
/// Nothing is mutated.
pub fn validate_chain(blocks: &[Block]) -> ValidationReport {
    for (position, block) in blocks.iter().enumerate() {
        let index = position as u64;

        if *block.hash() != block.calculate_hash() {
            return ValidationReport {
                checked: position + 1,
                fault: Some(ChainFault::ContentMismatch { index }),
            };
        }

        if let Some(next) = blocks.get(position + 1) {
            if next.previous_hash() != block.hash() {
                return ValidationReport {
                    checked: position + 1,
                    fault: Some(ChainFault::BrokenLink {
                        index: index + 1,
                        previous: index,
                    }),
                };
            }
        }
    }

    ValidationReport {
        checked: blocks.len(),
        fault: None,
    }
}
