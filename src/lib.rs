//! Persistent bitmap-indexed tries.
//!
//! A [`Trie`] maps fixed-width integer keys (array indices, hash codes,
//! monotonic tokens) to shared values through successive fixed-size chunks
//! of the key. Each level is a [`BitmapNode`](bitmap::BitmapNode): a presence
//! word plus a dense array holding only the occupied slots.
//!
//! # Key properties
//!
//! - **Persistence**: every update returns a new trie; unchanged subtrees
//!   are shared between versions via `Arc`
//! - **Identity short-circuit**: an update that changes nothing returns a
//!   trie sharing the original root
//! - **Canonical form**: the node shape depends only on the key set
//! - **Path compression** ([`Token64`]): levels without branching are
//!   skipped, not allocated
//! - **Splittable iteration**: [`Iter::split`] bisects the remaining range
//!   without a shared cursor; with the `rayon` feature, [`Trie::par_iter`]
//!   builds on it
//! - **Zero `unsafe`**: enforced by `#![forbid(unsafe_code)]`
//!
//! # Configurations
//!
//! | Alias          | Fanout | Key width | Sparse levels          |
//! |----------------|--------|-----------|------------------------|
//! | [`TrieArray`]  | 32     | 32 bits   | single-child nodes     |
//! | [`TokenTrie`]  | 64     | 64 bits   | skipped (path prefix)  |
//!
//! # Example
//!
//! ```
//! use bitmap_trie::TrieArray;
//!
//! let empty = TrieArray::<&str>::new();
//! let one = empty.assign(7, "seven")?;
//! let two = one.assign(1 << 20, "far")?;
//!
//! assert_eq!(one.len(), 1);
//! assert_eq!(two.get(7), Some(&"seven"));
//! assert!(empty.is_empty());
//! assert!(two.delete(99)?.ptr_eq(&two));
//! # Ok::<(), bitmap_trie::TrieError>(())
//! ```
//!
//! # References
//!
//! - Bagwell, 2001 — "Ideal Hash Trees"
//! - Steindorfer & Vinju, 2015 — "Optimizing Hash-Array Mapped Tries
//!   for Fast and Lean Immutable JVM Collections", OOPSLA 2015

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod bitmap;
pub mod error;
pub mod fanout;
pub mod iter;

mod node;
mod ops;
#[cfg(feature = "rayon")]
mod par;
mod trie;

#[cfg(test)]
mod tests;

pub use error::{Result, TrieError};
pub use fanout::{Array32, Fanout, Token64};
pub use iter::Iter;
#[cfg(feature = "rayon")]
pub use par::ParIter;
pub use trie::{TokenTrie, Trie, TrieArray};
