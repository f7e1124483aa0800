//! Trie node variants and key arithmetic.

use std::fmt;
use std::sync::Arc;

use crate::bitmap::{BitmapNode, SlotIdentity};
use crate::fanout::Fanout;

/// Key paired with its shared value.
pub struct Entry<V> {
    /// Full key.
    pub key: u64,
    /// Shared value; identity is `Arc::ptr_eq`.
    pub value: Arc<V>,
}

/// Trie node.
///
/// Four variants:
/// - [`Empty`](Self::Empty) — nothing below here; allocation free.
/// - [`Leaf`](Self::Leaf) — exactly one entry (root of a one-entry trie).
/// - [`Single`](Self::Single) — one occupied child slot at a materialized level.
/// - [`Branch`](Self::Branch) — two or more occupied slots.
pub enum Node<V, F: Fanout> {
    /// No entries.
    Empty,
    /// Exactly one entry.
    Leaf(Entry<V>),
    /// Level with exactly one occupied slot, holding a subtree.
    Single(Arc<SingleChild<V, F>>),
    /// Level with at least two occupied slots.
    Branch(Arc<Branch<V, F>>),
}

/// Level with one occupied child slot.
///
/// Invariant: `child` holds at least two entries and sits at
/// `shift - F::BITS`.
pub struct SingleChild<V, F: Fanout> {
    /// Key bits above this level.
    pub prefix: u64,
    /// Shift of this level.
    pub shift: u32,
    /// Occupied slot.
    pub index: u32,
    /// Subtree under `index`.
    pub child: Node<V, F>,
    /// Entries reachable through `child`.
    pub size: usize,
}

/// Level with two or more occupied slots.
///
/// Invariants:
/// - `values.presence() & children.presence() == 0`;
/// - a value slot holds the only key under that slot, a child slot at
///   least two keys;
/// - `size == values.len() + Σ child.size()`.
pub struct Branch<V, F: Fanout> {
    /// Key bits above this level.
    pub prefix: u64,
    /// Shift of this level.
    pub shift: u32,
    /// Inline entries.
    pub values: BitmapNode<Entry<V>, F::Bitmap>,
    /// Child subtrees.
    pub children: BitmapNode<Node<V, F>, F::Bitmap>,
    /// Entries reachable from this node.
    pub size: usize,
}

// ---------------------------------------------------------------------------
// Key arithmetic
// ---------------------------------------------------------------------------

/// Extracts the chunk of `key` consumed at `shift`.
#[inline]
#[must_use]
pub fn chunk<F: Fanout>(key: u64, shift: u32) -> u32 {
    ((key >> shift) & F::CHUNK_MASK) as u32
}

/// Returns `key` with every bit below `shift + F::BITS` cleared: the part
/// of the key shared by all entries under a node at `shift`.
#[inline]
#[must_use]
pub fn prefix<F: Fanout>(key: u64, shift: u32) -> u64 {
    let low = shift + F::BITS;
    if low >= u64::BITS {
        0
    } else {
        key & !((1 << low) - 1)
    }
}

/// Returns the highest level at which the chunks of two distinct keys differ.
#[inline]
#[must_use]
pub fn diverge<F: Fanout>(a: u64, b: u64) -> u32 {
    debug_assert_ne!(a, b, "identical keys never diverge");
    let high = u64::BITS - 1 - (a ^ b).leading_zeros();
    high / F::BITS * F::BITS
}

/// Returns `true` if `key` fits the configuration's key width.
#[inline]
#[must_use]
pub const fn fits<F: Fanout>(key: u64) -> bool {
    matches!(key.checked_shr(F::KEY_BITS), None | Some(0))
}

// ---------------------------------------------------------------------------
// Constructors & accessors
// ---------------------------------------------------------------------------

impl<V, F: Fanout> Node<V, F> {
    /// Wraps a single-child level.
    #[must_use]
    pub fn single(prefix: u64, shift: u32, index: u32, child: Self, size: usize) -> Self {
        Self::Single(Arc::new(SingleChild {
            prefix,
            shift,
            index,
            child,
            size,
        }))
    }

    /// Wraps a branch level. `size` is supplied by the caller, which
    /// derives it additively from the node being replaced.
    #[must_use]
    pub fn branch(
        prefix: u64,
        shift: u32,
        values: BitmapNode<Entry<V>, F::Bitmap>,
        children: BitmapNode<Self, F::Bitmap>,
        size: usize,
    ) -> Self {
        Self::Branch(Arc::new(Branch {
            prefix,
            shift,
            values,
            children,
            size,
        }))
    }

    /// Number of entries reachable from this node.
    #[must_use]
    pub fn size(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Leaf(_) => 1,
            Self::Single(single) => single.size,
            Self::Branch(branch) => branch.size,
        }
    }

    /// Shift of an interior node; `None` for `Empty` and `Leaf`, whose
    /// position is implied by the slot holding them.
    #[must_use]
    pub fn level(&self) -> Option<u32> {
        match self {
            Self::Empty | Self::Leaf(_) => None,
            Self::Single(single) => Some(single.shift),
            Self::Branch(branch) => Some(branch.shift),
        }
    }

    /// A key describing the path to this node: the leaf key, or the prefix
    /// (plus the occupied slot of a single-child level).
    #[must_use]
    pub fn path_key(&self) -> u64 {
        match self {
            Self::Empty => 0,
            Self::Leaf(entry) => entry.key,
            Self::Single(single) => single.prefix | (u64::from(single.index) << single.shift),
            Self::Branch(branch) => branch.prefix,
        }
    }

    /// Returns `true` if both handles denote the same node.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Empty, Self::Empty) => true,
            (Self::Leaf(a), Self::Leaf(b)) => a.same_ref(b),
            (Self::Single(a), Self::Single(b)) => Arc::ptr_eq(a, b),
            (Self::Branch(a), Self::Branch(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<V> SlotIdentity for Entry<V> {
    fn same_ref(&self, other: &Self) -> bool {
        self.key == other.key && Arc::ptr_eq(&self.value, &other.value)
    }
}

impl<V, F: Fanout> SlotIdentity for Node<V, F> {
    fn same_ref(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

// ---------------------------------------------------------------------------
// Manual trait impls — avoid false `V: Trait, F: Trait` bounds.
// Cloning copies handles only.
// ---------------------------------------------------------------------------

impl<V> Clone for Entry<V> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            value: Arc::clone(&self.value),
        }
    }
}

impl<V, F: Fanout> Clone for Node<V, F> {
    fn clone(&self) -> Self {
        match self {
            Self::Empty => Self::Empty,
            Self::Leaf(entry) => Self::Leaf(entry.clone()),
            Self::Single(single) => Self::Single(Arc::clone(single)),
            Self::Branch(branch) => Self::Branch(Arc::clone(branch)),
        }
    }
}

impl<V> fmt::Debug for Entry<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("key", &format_args!("{:#x}", self.key))
            .finish_non_exhaustive()
    }
}

impl<V, F: Fanout> fmt::Debug for Node<V, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Leaf(entry) => f.debug_tuple("Leaf").field(entry).finish(),
            Self::Single(single) => f
                .debug_struct("Single")
                .field("prefix", &format_args!("{:#x}", single.prefix))
                .field("shift", &single.shift)
                .field("index", &single.index)
                .field("size", &single.size)
                .field("child", &single.child)
                .finish(),
            Self::Branch(branch) => f
                .debug_struct("Branch")
                .field("prefix", &format_args!("{:#x}", branch.prefix))
                .field("shift", &branch.shift)
                .field("values", &format_args!("{:#b}", branch.values.presence()))
                .field("children", &branch.children.slots())
                .field("size", &branch.size)
                .finish(),
        }
    }
}
