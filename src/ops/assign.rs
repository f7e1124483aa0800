//! Assignment — path-copy insert/replace with identity short-circuit.

use std::sync::Arc;

use tracing::trace;

use crate::bitmap::BitmapNode;
use crate::fanout::Fanout;
use crate::node::{self, Branch, Entry, Node, SingleChild};

/// Outcome of a recursive assign that changed the tree.
pub struct AssignOutcome<V, F: Fanout> {
    /// New (path-copied) root of the modified subtree.
    pub node: Node<V, F>,
    /// `true` if a new key was added, `false` if an existing value was replaced.
    pub inserted: bool,
}

impl<V, F: Fanout> AssignOutcome<V, F> {
    const fn inserted(node: Node<V, F>) -> Self {
        Self {
            node,
            inserted: true,
        }
    }

    const fn replaced(node: Node<V, F>) -> Self {
        Self {
            node,
            inserted: false,
        }
    }

    fn delta(&self) -> usize {
        usize::from(self.inserted)
    }
}

/// Assigns `entry` into the subtree `node`, which sits where a node at
/// `shift` is expected.
///
/// Returns `None` if the tree is unchanged: the key already maps to the
/// very same `Arc`. Callers then keep their own node, so nothing above the
/// slot is copied either.
pub fn assign_recursive<V, F: Fanout>(
    node: &Node<V, F>,
    entry: Entry<V>,
    shift: u32,
) -> Option<AssignOutcome<V, F>> {
    match node {
        Node::Empty => Some(AssignOutcome::inserted(Node::Leaf(entry))),
        Node::Leaf(existing) => {
            if existing.key != entry.key {
                return Some(AssignOutcome::inserted(synthesize_ancestor(
                    node.clone(),
                    entry,
                    shift,
                )));
            }
            if Arc::ptr_eq(&existing.value, &entry.value) {
                return None;
            }
            Some(AssignOutcome::replaced(Node::Leaf(entry)))
        }
        Node::Single(single) => assign_into_single(node, single, entry, shift),
        Node::Branch(branch) => assign_into_branch(node, branch, entry, shift),
    }
}

// ---------------------------------------------------------------------------
// Single-child level
// ---------------------------------------------------------------------------

fn assign_into_single<V, F: Fanout>(
    node: &Node<V, F>,
    single: &SingleChild<V, F>,
    entry: Entry<V>,
    shift: u32,
) -> Option<AssignOutcome<V, F>> {
    debug_assert_eq!(single.shift, shift, "single-child level out of place");
    if node::prefix::<F>(entry.key, single.shift) != single.prefix
        || node::chunk::<F>(entry.key, single.shift) != single.index
    {
        return Some(AssignOutcome::inserted(synthesize_ancestor(
            node.clone(),
            entry,
            shift,
        )));
    }

    let outcome = assign_recursive(&single.child, entry, single.shift - F::BITS)?;
    let size = single.size + outcome.delta();
    Some(AssignOutcome {
        node: Node::single(single.prefix, single.shift, single.index, outcome.node, size),
        inserted: outcome.inserted,
    })
}

// ---------------------------------------------------------------------------
// Branch level
// ---------------------------------------------------------------------------

fn assign_into_branch<V, F: Fanout>(
    node: &Node<V, F>,
    branch: &Branch<V, F>,
    entry: Entry<V>,
    shift: u32,
) -> Option<AssignOutcome<V, F>> {
    if node::prefix::<F>(entry.key, branch.shift) != branch.prefix {
        // Key leaves this node's compressed path above its level.
        return Some(AssignOutcome::inserted(synthesize_ancestor(
            node.clone(),
            entry,
            shift,
        )));
    }

    let frag = node::chunk::<F>(entry.key, branch.shift);

    if let Some(existing) = branch.values.get(frag) {
        if existing.key == entry.key {
            if Arc::ptr_eq(&existing.value, &entry.value) {
                return None;
            }
            let values = branch.values.with(frag, entry);
            return Some(AssignOutcome::replaced(Node::branch(
                branch.prefix,
                branch.shift,
                values,
                branch.children.clone(),
                branch.size,
            )));
        }

        // Different key at same slot → push both into a subtree.
        debug_assert!(branch.shift > 0, "distinct keys share a slot at shift 0");
        let subtree = synthesize_ancestor(
            Node::Leaf(existing.clone()),
            entry,
            branch.shift - F::BITS,
        );
        return Some(AssignOutcome::inserted(Node::branch(
            branch.prefix,
            branch.shift,
            branch.values.without(frag),
            branch.children.with(frag, subtree),
            branch.size + 1,
        )));
    }

    if let Some(child) = branch.children.get(frag) {
        let outcome = assign_recursive(child, entry, branch.shift - F::BITS)?;
        let size = branch.size + outcome.delta();
        return Some(AssignOutcome {
            node: Node::branch(
                branch.prefix,
                branch.shift,
                branch.values.clone(),
                branch.children.with(frag, outcome.node),
                size,
            ),
            inserted: outcome.inserted,
        });
    }

    // Slot empty → add inline entry.
    Some(AssignOutcome::inserted(Node::branch(
        branch.prefix,
        branch.shift,
        branch.values.with(frag, entry),
        branch.children.clone(),
        branch.size + 1,
    )))
}

// ---------------------------------------------------------------------------
// Ancestor synthesis
// ---------------------------------------------------------------------------

/// Joins `existing` (a non-empty subtree) and `entry` (whose key is not
/// under `existing`) into one subtree that fits where a node at `shift`
/// is expected.
///
/// Exactly one branch is created, at the highest level where the two
/// paths disagree. Levels between `shift` and that branch are skipped
/// (compressed paths) or filled with single-child levels.
pub fn synthesize_ancestor<V, F: Fanout>(
    existing: Node<V, F>,
    entry: Entry<V>,
    shift: u32,
) -> Node<V, F> {
    let existing_key = existing.path_key();
    let level = node::diverge::<F>(existing_key, entry.key);
    debug_assert!(level <= shift, "paths diverge above the expected level");
    trace!(shift, level, key = entry.key, "synthesizing ancestor");

    let prefix = node::prefix::<F>(entry.key, level);
    let entry_slot = node::chunk::<F>(entry.key, level);
    let size = existing.size() + 1;

    let joined = match existing {
        Node::Leaf(leaf) => {
            let leaf_slot = node::chunk::<F>(leaf.key, level);
            Node::branch(
                prefix,
                level,
                BitmapNode::pair(leaf_slot, leaf, entry_slot, entry),
                BitmapNode::new(),
                size,
            )
        }
        // Same level, different slot: widen the single-child level in place.
        Node::Single(single) if single.shift == level => Node::branch(
            prefix,
            level,
            BitmapNode::single(entry_slot, entry),
            BitmapNode::single(single.index, single.child.clone()),
            size,
        ),
        other => {
            let other_slot = node::chunk::<F>(existing_key, level);
            Node::branch(
                prefix,
                level,
                BitmapNode::single(entry_slot, entry),
                BitmapNode::single(other_slot, materialize(other, level - F::BITS)),
                size,
            )
        }
    };
    materialize(joined, shift)
}

/// Fits an interior node into a slot expecting a node at `shift`.
///
/// With compressed paths the node is stored as is. Otherwise the skipped
/// levels are filled with single-child levels, bottom up.
pub fn materialize<V, F: Fanout>(node: Node<V, F>, shift: u32) -> Node<V, F> {
    if F::COMPRESSED_PATHS {
        return node;
    }
    let Some(mut level) = node.level() else {
        return node;
    };
    let key = node.path_key();
    let size = node.size();
    let mut node = node;
    while level < shift {
        level += F::BITS;
        node = Node::single(
            node::prefix::<F>(key, level),
            level,
            node::chunk::<F>(key, level),
            node,
            size,
        );
    }
    node
}
