//! Lookup operation — traverses the trie to find a key.

use crate::fanout::Fanout;
use crate::node::{self, Entry, Node};

/// Searches for `key` in the subtree `node`, which sits where a node at
/// `shift` is expected.
///
/// Returns the stored entry if found.
pub fn get_recursive<V, F: Fanout>(node: &Node<V, F>, key: u64, shift: u32) -> Option<&Entry<V>> {
    match node {
        Node::Empty => None,
        Node::Leaf(entry) => (entry.key == key).then_some(entry),
        Node::Single(single) => {
            debug_assert_eq!(single.shift, shift, "single-child level out of place");
            if node::prefix::<F>(key, single.shift) != single.prefix
                || node::chunk::<F>(key, single.shift) != single.index
            {
                return None;
            }
            get_recursive(&single.child, key, single.shift - F::BITS)
        }
        Node::Branch(branch) => {
            debug_assert!(branch.shift <= shift, "branch above its expected level");
            // Compressed paths skip levels; the prefix check covers them.
            if node::prefix::<F>(key, branch.shift) != branch.prefix {
                return None;
            }
            let frag = node::chunk::<F>(key, branch.shift);
            if let Some(entry) = branch.values.get(frag) {
                // Inline entry: the only key under this slot.
                (entry.key == key).then_some(entry)
            } else {
                let child = branch.children.get(frag)?;
                get_recursive(child, key, branch.shift - F::BITS)
            }
        }
    }
}
