//! Deletion — path-copy delete with collapsing of degenerate levels.

use crate::bitmap::BitmapNode;
use crate::fanout::Fanout;
use crate::node::{self, Branch, Entry, Node};

/// Removes `key` from the subtree `node`, which sits where a node at
/// `shift` is expected.
///
/// Returns `None` if the key is absent (tree unchanged), otherwise the new
/// subtree holding one entry fewer. A subtree left with one entry comes
/// back as a `Leaf`; the parent inlines it.
pub fn delete_recursive<V, F: Fanout>(
    node: &Node<V, F>,
    key: u64,
    shift: u32,
) -> Option<Node<V, F>> {
    match node {
        Node::Empty => None,
        Node::Leaf(entry) => (entry.key == key).then_some(Node::Empty),
        Node::Single(single) => {
            debug_assert_eq!(single.shift, shift, "single-child level out of place");
            if node::prefix::<F>(key, single.shift) != single.prefix
                || node::chunk::<F>(key, single.shift) != single.index
            {
                return None;
            }
            let child = delete_recursive(&single.child, key, single.shift - F::BITS)?;
            Some(match child {
                Node::Empty => Node::Empty,
                // One entry left below: hoist it towards the nearest branch.
                leaf @ Node::Leaf(_) => leaf,
                subtree => Node::single(
                    single.prefix,
                    single.shift,
                    single.index,
                    subtree,
                    single.size - 1,
                ),
            })
        }
        Node::Branch(branch) => delete_from_branch(branch, key),
    }
}

fn delete_from_branch<V, F: Fanout>(branch: &Branch<V, F>, key: u64) -> Option<Node<V, F>> {
    if node::prefix::<F>(key, branch.shift) != branch.prefix {
        return None;
    }
    let frag = node::chunk::<F>(key, branch.shift);

    if let Some(existing) = branch.values.get(frag) {
        if existing.key != key {
            return None;
        }
        return Some(collapse(
            branch,
            branch.values.without(frag),
            branch.children.clone(),
        ));
    }

    let child = branch.children.get(frag)?;
    let new_child = delete_recursive(child, key, branch.shift - F::BITS)?;
    let (values, children) = match new_child {
        Node::Empty => (branch.values.clone(), branch.children.without(frag)),
        // Canonical form: a lone entry moves back inline.
        Node::Leaf(entry) => (branch.values.with(frag, entry), branch.children.without(frag)),
        subtree => (branch.values.clone(), branch.children.with(frag, subtree)),
    };
    Some(collapse(branch, values, children))
}

/// Rebuilds `branch` with one entry fewer, demoting it to a simpler variant
/// when two occupied slots are no longer there.
fn collapse<V, F: Fanout>(
    branch: &Branch<V, F>,
    values: BitmapNode<Entry<V>, F::Bitmap>,
    children: BitmapNode<Node<V, F>, F::Bitmap>,
) -> Node<V, F> {
    let size = branch.size - 1;
    if children.is_empty() {
        if values.is_empty() {
            return Node::Empty;
        }
        if let Some((_, entry)) = values.only() {
            return Node::Leaf(entry.clone());
        }
    } else if values.is_empty() {
        if let Some((index, child)) = children.only() {
            return if F::COMPRESSED_PATHS {
                // The child carries its own prefix; this level is redundant.
                child.clone()
            } else {
                Node::single(branch.prefix, branch.shift, index, child.clone(), size)
            };
        }
    }
    Node::branch(branch.prefix, branch.shift, values, children, size)
}
