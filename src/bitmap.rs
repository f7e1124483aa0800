//! Bitmap-compressed sparse slot arrays.
//!
//! A [`BitmapNode`] addresses up to `WIDTH` logical slots (32 or 64) but only
//! stores the occupied ones. Bit `i` of the presence word is set iff slot `i`
//! is occupied, and its value lives at dense position
//! `popcount(presence & (bit_i - 1))`.
//!
//! Nodes are immutable: [`with`](BitmapNode::with) and
//! [`without`](BitmapNode::without) build a new node and leave `self`
//! untouched. Slot storage is reference counted, so returning "this node
//! unchanged" costs one counter increment.

use std::fmt;
use std::iter::FusedIterator;
use std::ops::{BitAnd, BitOr, Not};
use std::slice;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Presence words
// ---------------------------------------------------------------------------

/// Fixed-width presence word.
///
/// Implemented for `u32` (32-way nodes) and `u64` (64-way nodes).
pub trait Bitmap:
    Copy
    + Eq
    + fmt::Debug
    + fmt::Binary
    + Send
    + Sync
    + 'static
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + Not<Output = Self>
{
    /// Number of addressable slots.
    const WIDTH: u32;
    /// No slot occupied.
    const EMPTY: Self;
    /// Every slot occupied.
    const FULL: Self;

    /// Single-bit mask for slot `index`.
    fn bit(index: u32) -> Self;

    /// Number of occupied slots.
    fn count(self) -> u32;

    /// Number of occupied slots strictly below `index`.
    fn rank(self, index: u32) -> usize;

    /// Lowest occupied slot.
    fn lowest(self) -> Option<u32>;

    /// Returns `true` if slot `index` is occupied.
    #[inline]
    fn contains(self, index: u32) -> bool {
        self & Self::bit(index) != Self::EMPTY
    }

    /// Clears slot `index`.
    #[inline]
    #[must_use]
    fn clear(self, index: u32) -> Self {
        self & !Self::bit(index)
    }
}

macro_rules! impl_bitmap {
    ($($word:ty),* $(,)?) => {$(
        impl Bitmap for $word {
            const WIDTH: u32 = <$word>::BITS;
            const EMPTY: Self = 0;
            const FULL: Self = <$word>::MAX;

            #[inline]
            fn bit(index: u32) -> Self {
                1 << index
            }

            #[inline]
            fn count(self) -> u32 {
                self.count_ones()
            }

            #[inline]
            fn rank(self, index: u32) -> usize {
                (self & (Self::bit(index) - 1)).count_ones() as usize
            }

            #[inline]
            fn lowest(self) -> Option<u32> {
                if self == 0 {
                    None
                } else {
                    Some(self.trailing_zeros())
                }
            }
        }
    )*};
}

impl_bitmap!(u32, u64);

/// Panics unless `index` addresses a slot of a `B`-wide node.
#[inline]
fn check_slot<B: Bitmap>(index: u32) {
    assert!(
        index < B::WIDTH,
        "slot {index} out of range for fanout {}",
        B::WIDTH
    );
}

// ---------------------------------------------------------------------------
// Reference identity
// ---------------------------------------------------------------------------

/// Reference identity between slot occupants.
///
/// [`BitmapNode::with`] uses it to skip allocation when the new occupant is
/// the very object already stored in the slot.
pub trait SlotIdentity {
    /// Returns `true` if `self` and `other` are the same shared object.
    fn same_ref(&self, other: &Self) -> bool;
}

impl<T: ?Sized> SlotIdentity for Arc<T> {
    #[inline]
    fn same_ref(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

// ---------------------------------------------------------------------------
// BitmapNode
// ---------------------------------------------------------------------------

/// Immutable sparse array of up to `B::WIDTH` slots.
///
/// Invariant: `slots.len() == presence.count()`.
pub struct BitmapNode<T, B: Bitmap> {
    presence: B,
    slots: Arc<[T]>,
}

impl<T, B: Bitmap> BitmapNode<T, B> {
    /// Creates a node with no occupied slots.
    #[must_use]
    pub fn new() -> Self {
        Self {
            presence: B::EMPTY,
            slots: Arc::from(Vec::new()),
        }
    }

    /// Creates a node with exactly one occupied slot.
    ///
    /// # Panics
    ///
    /// Panics if `index >= B::WIDTH`.
    #[must_use]
    pub fn single(index: u32, value: T) -> Self {
        check_slot::<B>(index);
        Self {
            presence: B::bit(index),
            slots: Arc::from(vec![value]),
        }
    }

    /// Creates a node with two distinct occupied slots.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range or if `i == j`.
    #[must_use]
    pub fn pair(i: u32, a: T, j: u32, b: T) -> Self {
        check_slot::<B>(i);
        check_slot::<B>(j);
        assert_ne!(i, j, "pair slots must differ");
        let slots = if i < j { vec![a, b] } else { vec![b, a] };
        Self {
            presence: B::bit(i) | B::bit(j),
            slots: Arc::from(slots),
        }
    }

    /// Presence word.
    #[must_use]
    pub const fn presence(&self) -> B {
        self.presence
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if no slot is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns `true` if every slot is occupied.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.presence == B::FULL
    }

    /// Returns `true` if slot `index` is occupied.
    ///
    /// # Panics
    ///
    /// Panics if `index >= B::WIDTH`.
    #[must_use]
    pub fn contains(&self, index: u32) -> bool {
        check_slot::<B>(index);
        self.presence.contains(index)
    }

    /// Returns the occupant of slot `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= B::WIDTH`.
    #[inline]
    #[must_use]
    pub fn get(&self, index: u32) -> Option<&T> {
        check_slot::<B>(index);
        if self.is_full() {
            // Dense: slot index equals array index.
            return self.slots.get(index as usize);
        }
        if self.presence.contains(index) {
            Some(&self.slots[self.presence.rank(index)])
        } else {
            None
        }
    }

    /// Occupied slots as a dense slice, in slot order.
    #[must_use]
    pub fn slots(&self) -> &[T] {
        &self.slots
    }

    /// Returns the sole occupant and its slot index, if exactly one slot is
    /// occupied.
    #[must_use]
    pub fn only(&self) -> Option<(u32, &T)> {
        if self.slots.len() == 1 {
            let index = self.presence.lowest()?;
            Some((index, &self.slots[0]))
        } else {
            None
        }
    }

    /// Iterates `(slot index, occupant)` in ascending slot order.
    #[must_use]
    pub fn iter(&self) -> SlotIter<'_, T, B> {
        SlotIter {
            remaining: self.presence,
            slots: self.slots.iter(),
        }
    }

    /// Returns `true` if both nodes share the same slot storage.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.slots, &other.slots)
    }
}

impl<T: Clone, B: Bitmap> BitmapNode<T, B> {
    /// Returns a node with `value` stored in slot `index`.
    ///
    /// If the slot already holds the very same object, `self` is returned
    /// unchanged (shared storage, no allocation).
    ///
    /// # Panics
    ///
    /// Panics if `index >= B::WIDTH`.
    #[must_use]
    pub fn with(&self, index: u32, value: T) -> Self
    where
        T: SlotIdentity,
    {
        check_slot::<B>(index);
        let pos = self.presence.rank(index);
        if self.presence.contains(index) {
            if self.slots[pos].same_ref(&value) {
                return self.clone();
            }
            let mut slots = self.slots.to_vec();
            slots[pos] = value;
            Self {
                presence: self.presence,
                slots: Arc::from(slots),
            }
        } else {
            let mut slots = Vec::with_capacity(self.slots.len() + 1);
            slots.extend_from_slice(&self.slots[..pos]);
            slots.push(value);
            slots.extend_from_slice(&self.slots[pos..]);
            Self {
                presence: self.presence | B::bit(index),
                slots: Arc::from(slots),
            }
        }
    }

    /// Returns a node with slot `index` cleared.
    ///
    /// If the slot is already empty, `self` is returned unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `index >= B::WIDTH`.
    #[must_use]
    pub fn without(&self, index: u32) -> Self {
        check_slot::<B>(index);
        if !self.presence.contains(index) {
            return self.clone();
        }
        let pos = self.presence.rank(index);
        let mut slots = Vec::with_capacity(self.slots.len() - 1);
        slots.extend_from_slice(&self.slots[..pos]);
        slots.extend_from_slice(&self.slots[pos + 1..]);
        Self {
            presence: self.presence.clear(index),
            slots: Arc::from(slots),
        }
    }
}

// ---------------------------------------------------------------------------
// Slot iterator
// ---------------------------------------------------------------------------

/// Iterator over `(slot index, occupant)` pairs of a [`BitmapNode`].
pub struct SlotIter<'a, T, B: Bitmap> {
    remaining: B,
    slots: slice::Iter<'a, T>,
}

impl<'a, T, B: Bitmap> Iterator for SlotIter<'a, T, B> {
    type Item = (u32, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.remaining.lowest()?;
        self.remaining = self.remaining.clear(index);
        self.slots.next().map(|value| (index, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.slots.size_hint()
    }
}

impl<T, B: Bitmap> ExactSizeIterator for SlotIter<'_, T, B> {}

impl<T, B: Bitmap> FusedIterator for SlotIter<'_, T, B> {}

// ---------------------------------------------------------------------------
// Manual trait impls — avoid false `T: Trait` bounds.
// ---------------------------------------------------------------------------

impl<T, B: Bitmap> Clone for BitmapNode<T, B> {
    fn clone(&self) -> Self {
        Self {
            presence: self.presence,
            slots: Arc::clone(&self.slots),
        }
    }
}

impl<T, B: Bitmap> Default for BitmapNode<T, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, B: Bitmap> fmt::Debug for BitmapNode<T, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitmapNode")
            .field("presence", &format_args!("{:#b}", self.presence))
            .field("len", &self.slots.len())
            .finish()
    }
}
