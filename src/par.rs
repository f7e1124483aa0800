//! Parallel traversal with rayon.
//!
//! The producer is the splittable [`Iter`] itself: rayon splits the
//! ordinal range with [`Iter::split_at`] and each half positions its own
//! cursor, so nothing is collected up front.

use rayon::iter::plumbing::{Consumer, Producer, ProducerCallback, UnindexedConsumer, bridge};
use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};

use crate::fanout::Fanout;
use crate::iter::Iter;
use crate::trie::Trie;

/// Parallel iterator over `(key, &value)` pairs of a [`Trie`].
///
/// Indexed: `collect`, `zip` and `enumerate` see entries in ascending key
/// order. Splitting stops at the iterator's minimum split size.
pub struct ParIter<'a, V, F: Fanout> {
    inner: Iter<'a, V, F>,
}

impl<V, F: Fanout> ParIter<'_, V, F> {
    /// Sets the smallest range rayon may still split.
    #[must_use]
    pub fn with_min_split_size(self, min_split: usize) -> Self {
        Self {
            inner: self.inner.with_min_split_size(min_split),
        }
    }
}

impl<'a, V: Send + Sync, F: Fanout> ParallelIterator for ParIter<'a, V, F> {
    type Item = (u64, &'a V);

    fn drive_unindexed<C>(self, consumer: C) -> C::Result
    where
        C: UnindexedConsumer<Self::Item>,
    {
        bridge(self, consumer)
    }

    fn opt_len(&self) -> Option<usize> {
        Some(self.inner.len())
    }
}

impl<V: Send + Sync, F: Fanout> IndexedParallelIterator for ParIter<'_, V, F> {
    fn len(&self) -> usize {
        self.inner.len()
    }

    fn drive<C>(self, consumer: C) -> C::Result
    where
        C: Consumer<Self::Item>,
    {
        bridge(self, consumer)
    }

    fn with_producer<CB>(self, callback: CB) -> CB::Output
    where
        CB: ProducerCallback<Self::Item>,
    {
        callback.callback(TrieProducer { inner: self.inner })
    }
}

struct TrieProducer<'a, V, F: Fanout> {
    inner: Iter<'a, V, F>,
}

impl<'a, V: Send + Sync, F: Fanout> Producer for TrieProducer<'a, V, F> {
    type Item = (u64, &'a V);
    type IntoIter = Iter<'a, V, F>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner
    }

    fn min_len(&self) -> usize {
        self.inner.min_split_size().max(1)
    }

    fn split_at(self, index: usize) -> (Self, Self) {
        let (left, right) = self.inner.split_at(index);
        (Self { inner: left }, Self { inner: right })
    }
}

impl<V: Send + Sync, F: Fanout> Trie<V, F> {
    /// Returns a parallel iterator over `(key, &value)` pairs.
    ///
    /// Work runs across threads in any order, but the iterator is indexed:
    /// `collect` into a `Vec` yields ascending key order.
    #[must_use]
    pub fn par_iter(&self) -> ParIter<'_, V, F> {
        ParIter { inner: self.iter() }
    }
}

impl<'a, V: Send + Sync, F: Fanout> IntoParallelIterator for &'a Trie<V, F> {
    type Item = (u64, &'a V);
    type Iter = ParIter<'a, V, F>;

    fn into_par_iter(self) -> Self::Iter {
        self.par_iter()
    }
}
