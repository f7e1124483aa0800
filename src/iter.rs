//! Lazy, splittable iteration over trie entries.
//!
//! An [`Iter`] covers an ordinal range `[offset, limit)` of the entries in
//! ascending key order. The cursor is not built until the first call to
//! `next`: [`produce_range`](Cursor::produce_range) walks from the root to
//! the entry at `offset`, skipping whole subtrees by their cached sizes.
//!
//! [`Iter::split`] bisects the remaining range into two iterators that
//! share nothing but the (immutable) tree; each builds its own cursor, so
//! halves can be consumed on different threads.
//!
//! The cursor itself is a mutable frame stack advanced in place, not a
//! chain of persistent states: an `Iter` cannot be rewound or forked
//! mid-walk except through `split`/`split_at`, which start fresh cursors.
//! Iterating from the back looks each entry up by ordinal from the root.

use std::fmt;
use std::iter::FusedIterator;

use tracing::trace;

use crate::bitmap::Bitmap;
use crate::fanout::Fanout;
use crate::node::{Branch, Entry, Node};

/// Ranges smaller than this are not split.
pub const DEFAULT_MIN_SPLIT_SIZE: usize = 32;

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// One level of the cursor.
enum Frame<'a, V, F: Fanout> {
    /// A root leaf not yet yielded.
    Leaf(&'a Entry<V>),
    /// A branch with the slots still to visit.
    Branch {
        branch: &'a Branch<V, F>,
        pending: F::Bitmap,
    },
}

/// Position inside the tree: the path from the root to the next entry.
///
/// Depth is bounded by the trie height; advancing never recurses.
struct Cursor<'a, V, F: Fanout> {
    frames: Vec<Frame<'a, V, F>>,
}

impl<'a, V, F: Fanout> Cursor<'a, V, F> {
    /// Builds a cursor whose next entry is the one at ordinal `offset`.
    fn produce_range(root: &'a Node<V, F>, offset: usize) -> Self {
        let mut cursor = Self { frames: Vec::new() };
        cursor.descend(root, offset);
        cursor
    }

    /// Pushes the frames leading to ordinal `skip` within `node`.
    fn descend(&mut self, mut node: &'a Node<V, F>, mut skip: usize) {
        loop {
            match node {
                Node::Empty => return,
                Node::Leaf(entry) => {
                    if skip == 0 {
                        self.frames.push(Frame::Leaf(entry));
                    }
                    return;
                }
                Node::Single(single) => node = &single.child,
                Node::Branch(branch) => {
                    let branch: &'a Branch<V, F> = branch;
                    let mut pending = branch.values.presence() | branch.children.presence();
                    loop {
                        let Some(index) = pending.lowest() else {
                            return;
                        };
                        if branch.values.presence().contains(index) {
                            if skip == 0 {
                                self.frames.push(Frame::Branch { branch, pending });
                                return;
                            }
                            skip -= 1;
                        } else if let Some(child) = branch.children.get(index) {
                            let weight = child.size();
                            if skip < weight {
                                self.frames.push(Frame::Branch {
                                    branch,
                                    pending: pending.clear(index),
                                });
                                node = child;
                                break;
                            }
                            skip -= weight;
                        }
                        pending = pending.clear(index);
                    }
                }
            }
        }
    }

    /// Yields the next entry and moves past it.
    fn advance(&mut self) -> Option<&'a Entry<V>> {
        loop {
            match self.frames.last_mut()? {
                Frame::Leaf(entry) => {
                    let entry = *entry;
                    self.frames.pop();
                    return Some(entry);
                }
                Frame::Branch { branch, pending } => {
                    let branch = *branch;
                    let Some(index) = pending.lowest() else {
                        self.frames.pop();
                        continue;
                    };
                    *pending = pending.clear(index);
                    if let Some(entry) = branch.values.get(index) {
                        return Some(entry);
                    }
                    if let Some(child) = branch.children.get(index) {
                        self.descend(child, 0);
                    }
                }
            }
        }
    }
}

/// Finds the entry at ordinal `skip` within `node`.
fn entry_at<'a, V, F: Fanout>(mut node: &'a Node<V, F>, mut skip: usize) -> Option<&'a Entry<V>> {
    loop {
        match node {
            Node::Empty => return None,
            Node::Leaf(entry) => return (skip == 0).then_some(entry),
            Node::Single(single) => node = &single.child,
            Node::Branch(branch) => {
                let branch: &'a Branch<V, F> = branch;
                let mut pending = branch.values.presence() | branch.children.presence();
                node = loop {
                    let index = pending.lowest()?;
                    pending = pending.clear(index);
                    if let Some(entry) = branch.values.get(index) {
                        if skip == 0 {
                            return Some(entry);
                        }
                        skip -= 1;
                    } else if let Some(child) = branch.children.get(index) {
                        let weight = child.size();
                        if skip < weight {
                            break child;
                        }
                        skip -= weight;
                    }
                };
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Iter
// ---------------------------------------------------------------------------

/// Iterator over `(key, &value)` pairs of a [`Trie`](crate::Trie), in
/// ascending key order.
pub struct Iter<'a, V, F: Fanout> {
    root: &'a Node<V, F>,
    offset: usize,
    limit: usize,
    min_split: usize,
    cursor: Option<Cursor<'a, V, F>>,
}

impl<'a, V, F: Fanout> Iter<'a, V, F> {
    pub(crate) fn new(root: &'a Node<V, F>) -> Self {
        Self::range(root, 0, root.size(), DEFAULT_MIN_SPLIT_SIZE)
    }

    fn range(root: &'a Node<V, F>, offset: usize, limit: usize, min_split: usize) -> Self {
        Self {
            root,
            offset,
            limit,
            min_split,
            cursor: None,
        }
    }

    /// Sets the smallest remaining range that may still be split.
    #[must_use]
    pub const fn with_min_split_size(mut self, min_split: usize) -> Self {
        self.min_split = min_split;
        self
    }

    /// Smallest remaining range that may still be split.
    #[must_use]
    pub const fn min_split_size(&self) -> usize {
        self.min_split
    }

    /// Returns `true` if entries remain.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.offset < self.limit
    }

    /// Returns `true` if the remaining range is large enough to split.
    #[must_use]
    pub const fn is_split_allowed(&self) -> bool {
        let remaining = self.limit - self.offset;
        remaining >= 2 && remaining >= self.min_split
    }

    /// Bisects the remaining range at its midpoint.
    ///
    /// Returns `None` when the range is too small (see
    /// [`is_split_allowed`](Self::is_split_allowed)). Concatenating the
    /// two halves yields exactly the entries `self` would have yielded.
    #[must_use]
    pub fn split(&self) -> Option<(Self, Self)> {
        if !self.is_split_allowed() {
            return None;
        }
        Some(self.split_at((self.limit - self.offset) / 2))
    }

    /// Splits the remaining range after its first `index` entries
    /// (clamped to the remaining length).
    #[must_use]
    pub fn split_at(&self, index: usize) -> (Self, Self) {
        let mid = self.offset + index.min(self.limit - self.offset);
        trace!(
            offset = self.offset,
            mid,
            limit = self.limit,
            "splitting iterator range"
        );
        (
            Self::range(self.root, self.offset, mid, self.min_split),
            Self::range(self.root, mid, self.limit, self.min_split),
        )
    }
}

impl<'a, V, F: Fanout> Iterator for Iter<'a, V, F> {
    type Item = (u64, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.limit {
            return None;
        }
        let (root, offset) = (self.root, self.offset);
        let cursor = self
            .cursor
            .get_or_insert_with(|| Cursor::produce_range(root, offset));
        let Some(entry) = cursor.advance() else {
            self.offset = self.limit;
            return None;
        };
        self.offset += 1;
        Some((entry.key, &*entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.limit - self.offset;
        (remaining, Some(remaining))
    }
}

impl<V, F: Fanout> DoubleEndedIterator for Iter<'_, V, F> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.offset >= self.limit {
            return None;
        }
        self.limit -= 1;
        let entry = entry_at(self.root, self.limit)?;
        Some((entry.key, &*entry.value))
    }
}

impl<V, F: Fanout> ExactSizeIterator for Iter<'_, V, F> {}

impl<V, F: Fanout> FusedIterator for Iter<'_, V, F> {}

impl<V, F: Fanout> fmt::Debug for Iter<'_, V, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("offset", &self.offset)
            .field("limit", &self.limit)
            .field("min_split", &self.min_split)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Adapters
// ---------------------------------------------------------------------------

/// Iterator over the keys of a [`Trie`](crate::Trie), ascending.
pub struct Keys<'a, V, F: Fanout> {
    pub(crate) inner: Iter<'a, V, F>,
}

impl<V, F: Fanout> Iterator for Keys<'_, V, F> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V, F: Fanout> DoubleEndedIterator for Keys<'_, V, F> {
    fn next_back(&mut self) -> Option<u64> {
        self.inner.next_back().map(|(key, _)| key)
    }
}

impl<V, F: Fanout> ExactSizeIterator for Keys<'_, V, F> {}

impl<V, F: Fanout> FusedIterator for Keys<'_, V, F> {}

/// Iterator over the values of a [`Trie`](crate::Trie), in key order.
pub struct Values<'a, V, F: Fanout> {
    pub(crate) inner: Iter<'a, V, F>,
}

impl<'a, V, F: Fanout> Iterator for Values<'a, V, F> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, V, F: Fanout> DoubleEndedIterator for Values<'a, V, F> {
    fn next_back(&mut self) -> Option<&'a V> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<V, F: Fanout> ExactSizeIterator for Values<'_, V, F> {}

impl<V, F: Fanout> FusedIterator for Values<'_, V, F> {}

impl<V, F: Fanout> fmt::Debug for Keys<'_, V, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Keys").field(&self.inner).finish()
    }
}

impl<V, F: Fanout> fmt::Debug for Values<'_, V, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Values").field(&self.inner).finish()
    }
}
