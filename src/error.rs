//! Error taxonomy for trie operations.
//!
//! Absent keys are never errors; lookups return `Option`. Errors cover
//! precondition violations at the facade and structural defects found by
//! [`check_invariants`](crate::Trie::check_invariants).

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = TrieError> = std::result::Result<T, E>;

/// Errors reported by [`Trie`](crate::Trie).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum TrieError {
    /// The key does not fit the configuration's key width.
    #[error("key {key:#x} does not fit in {bits} bits")]
    KeyOutOfRange {
        /// Offending key.
        key: u64,
        /// Key width of the trie configuration.
        bits: u32,
    },

    /// A node violates a structural invariant. Indicates a defect in the
    /// update logic; never retry.
    #[error("invariant violated at shift {shift}: {detail}")]
    Invariant {
        /// Shift of the offending node.
        shift: u32,
        /// Human-readable description of the violation.
        detail: String,
    },

    /// The cached size of a subtree disagrees with its reachable entries.
    #[error("cached size {cached} disagrees with {actual} reachable entries")]
    SizeMismatch {
        /// Size stored in the node or root.
        cached: usize,
        /// Size recomputed from scratch.
        actual: usize,
    },
}

impl TrieError {
    pub(crate) fn invariant(shift: u32, detail: impl Into<String>) -> Self {
        Self::Invariant {
            shift,
            detail: detail.into(),
        }
    }
}
