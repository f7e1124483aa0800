//! Persistent trie facade.

use std::fmt;
use std::ops;
use std::sync::Arc;

use tracing::debug;

use crate::error::{Result, TrieError};
use crate::fanout::{Array32, Fanout, Token64};
use crate::iter::{Iter, Keys, Values};
use crate::node::{self, Entry, Node};
use crate::ops::assign::assign_recursive;
use crate::ops::check::check_recursive;
use crate::ops::delete::delete_recursive;
use crate::ops::get::get_recursive;

/// Persistent map from fixed-width integer keys to shared values.
///
/// Every update returns a new trie and leaves `self` untouched; the two
/// versions share every node off the updated path. An update that changes
/// nothing returns a trie sharing `self`'s root (see [`ptr_eq`](Self::ptr_eq)).
///
/// The node shape depends only on the set of keys stored, never on the
/// order of updates.
pub struct Trie<V, F: Fanout = Array32> {
    root: Node<V, F>,
    size: usize,
}

/// 32-way trie over 32-bit keys.
pub type TrieArray<V> = Trie<V, Array32>;

/// Path-compressing 64-way trie over 64-bit keys.
pub type TokenTrie<V> = Trie<V, Token64>;

// ---------------------------------------------------------------------------
// Construction & accessors — no trait bounds
// ---------------------------------------------------------------------------

impl<V, F: Fanout> Trie<V, F> {
    /// Creates an empty trie. Allocation free.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            root: Node::Empty,
            size: 0,
        }
    }

    /// Returns the number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if the trie contains no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns `true` if both tries share the same root node.
    ///
    /// Implies equal contents; the converse does not hold.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.size == other.size && self.root.ptr_eq(&other.root)
    }

    #[cfg(test)]
    pub(crate) const fn root(&self) -> &Node<V, F> {
        &self.root
    }

    #[cfg(test)]
    pub(crate) const fn from_raw(root: Node<V, F>, size: usize) -> Self {
        Self { root, size }
    }
}

// ---------------------------------------------------------------------------
// Read operations
// ---------------------------------------------------------------------------

impl<V, F: Fanout> Trie<V, F> {
    /// Returns the shared handle stored under `key`.
    #[must_use]
    pub fn find(&self, key: u64) -> Option<&Arc<V>> {
        if !node::fits::<F>(key) {
            return None;
        }
        get_recursive(&self.root, key, F::ROOT_SHIFT).map(|entry| &entry.value)
    }

    /// Returns a reference to the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: u64) -> Option<&V> {
        self.find(key).map(|value| &**value)
    }

    /// Returns the value stored under `key`, or `default` if absent.
    #[must_use]
    pub fn get_or<'a>(&'a self, key: u64, default: &'a V) -> &'a V {
        self.get(key).unwrap_or(default)
    }

    /// Returns `true` if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: u64) -> bool {
        self.find(key).is_some()
    }
}

// ---------------------------------------------------------------------------
// Write operations
// ---------------------------------------------------------------------------

impl<V, F: Fanout> Trie<V, F> {
    /// Returns a trie with `key` mapped to `value`.
    ///
    /// If `key` already maps to the very same `Arc`, the result shares
    /// `self`'s root.
    ///
    /// # Errors
    ///
    /// [`TrieError::KeyOutOfRange`] if `key` is wider than `F::KEY_BITS`.
    pub fn assign(&self, key: u64, value: impl Into<Arc<V>>) -> Result<Self> {
        check_key::<F>(key)?;
        let entry = Entry {
            key,
            value: value.into(),
        };
        let Some(outcome) = assign_recursive(&self.root, entry, F::ROOT_SHIFT) else {
            return Ok(self.clone());
        };
        Ok(Self {
            root: outcome.node,
            size: self.size + usize::from(outcome.inserted),
        })
    }

    /// Returns a trie without `key`.
    ///
    /// If `key` is absent, the result shares `self`'s root. Removing the
    /// last entry yields the canonical empty trie.
    ///
    /// # Errors
    ///
    /// [`TrieError::KeyOutOfRange`] if `key` is wider than `F::KEY_BITS`.
    pub fn delete(&self, key: u64) -> Result<Self> {
        check_key::<F>(key)?;
        match delete_recursive(&self.root, key, F::ROOT_SHIFT) {
            None => Ok(self.clone()),
            Some(Node::Empty) => Ok(Self::new()),
            Some(root) => Ok(Self {
                root,
                size: self.size - 1,
            }),
        }
    }

    /// Builds a trie from `(key, value)` pairs; later pairs win.
    ///
    /// # Errors
    ///
    /// [`TrieError::KeyOutOfRange`] on the first key wider than
    /// `F::KEY_BITS`.
    pub fn from_pairs<I, T>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (u64, T)>,
        T: Into<Arc<V>>,
    {
        pairs
            .into_iter()
            .try_fold(Self::new(), |trie, (key, value)| trie.assign(key, value))
    }

    /// Validates every structural invariant and the cached size.
    ///
    /// Full O(n) pass, for tests and diagnostics. A failure indicates a
    /// defect in the update logic.
    ///
    /// # Errors
    ///
    /// [`TrieError::Invariant`] or [`TrieError::SizeMismatch`] describing
    /// the first violation found.
    pub fn check_invariants(&self) -> Result<()> {
        let outcome = check_recursive(&self.root, F::ROOT_SHIFT, true).and_then(|actual| {
            if actual == self.size {
                Ok(())
            } else {
                Err(TrieError::SizeMismatch {
                    cached: self.size,
                    actual,
                })
            }
        });
        match &outcome {
            Ok(()) => debug!(len = self.size, "trie invariants hold"),
            Err(err) => debug!(len = self.size, %err, "trie invariant violated"),
        }
        outcome
    }
}

fn check_key<F: Fanout>(key: u64) -> Result<()> {
    if node::fits::<F>(key) {
        Ok(())
    } else {
        Err(TrieError::KeyOutOfRange {
            key,
            bits: F::KEY_BITS,
        })
    }
}

// ---------------------------------------------------------------------------
// Iteration
// ---------------------------------------------------------------------------

impl<V, F: Fanout> Trie<V, F> {
    /// Returns an iterator over `(key, &value)` pairs in ascending key order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, V, F> {
        Iter::new(&self.root)
    }

    /// Returns an iterator over the keys in ascending order.
    #[must_use]
    pub fn keys(&self) -> Keys<'_, V, F> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values in key order.
    #[must_use]
    pub fn values(&self) -> Values<'_, V, F> {
        Values { inner: self.iter() }
    }
}

// ---------------------------------------------------------------------------
// Trait impls
// ---------------------------------------------------------------------------

impl<V, F: Fanout> Clone for Trie<V, F> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            size: self.size,
        }
    }
}

impl<V, F: Fanout> Default for Trie<V, F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug, F: Fanout> fmt::Debug for Trie<V, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<V: PartialEq, F: Fanout> PartialEq for Trie<V, F> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || (self.size == other.size && self.iter().eq(other.iter()))
    }
}

impl<V: Eq, F: Fanout> Eq for Trie<V, F> {}

impl<V, F: Fanout> ops::Index<u64> for Trie<V, F> {
    type Output = V;

    fn index(&self, key: u64) -> &V {
        self.get(key).expect("key not found")
    }
}

impl<'a, V, F: Fanout> IntoIterator for &'a Trie<V, F> {
    type Item = (u64, &'a V);
    type IntoIter = Iter<'a, V, F>;

    fn into_iter(self) -> Iter<'a, V, F> {
        self.iter()
    }
}
