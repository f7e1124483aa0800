//! Structural validation — full O(n) pass, for tests and diagnostics only.

use crate::bitmap::{Bitmap, BitmapNode};
use crate::error::{Result, TrieError};
use crate::fanout::Fanout;
use crate::node::{self, Branch, Node, SingleChild};

/// Validates the subtree `node`, which sits where a node at `shift` is
/// expected, and returns the number of entries actually reachable.
pub fn check_recursive<V, F: Fanout>(
    node: &Node<V, F>,
    shift: u32,
    is_root: bool,
) -> Result<usize> {
    match node {
        Node::Empty if is_root => Ok(0),
        Node::Empty => Err(TrieError::invariant(shift, "empty subtree stored below the root")),
        Node::Leaf(entry) => {
            if !is_root {
                return Err(TrieError::invariant(
                    shift,
                    format!("leaf {:#x} stored as a child instead of inline", entry.key),
                ));
            }
            if !node::fits::<F>(entry.key) {
                return Err(TrieError::invariant(shift, "leaf key wider than the key width"));
            }
            Ok(1)
        }
        Node::Single(single) => check_single(single, shift),
        Node::Branch(branch) => check_branch(branch, shift),
    }
}

fn check_single<V, F: Fanout>(single: &SingleChild<V, F>, shift: u32) -> Result<usize> {
    if F::COMPRESSED_PATHS {
        return Err(TrieError::invariant(
            single.shift,
            "single-child level in a path-compressed trie",
        ));
    }
    if single.shift != shift {
        return Err(TrieError::invariant(
            single.shift,
            format!("single-child level where shift {shift} is expected"),
        ));
    }
    if single.shift == 0 {
        return Err(TrieError::invariant(0, "single-child level at the bottom level"));
    }
    if node::prefix::<F>(single.prefix, single.shift) != single.prefix {
        return Err(TrieError::invariant(single.shift, "prefix has bits below its level"));
    }
    check_child_path::<V, F>(&single.child, single.prefix, single.shift, single.index)?;

    let actual = check_recursive(&single.child, single.shift - F::BITS, false)?;
    if actual != single.size {
        return Err(TrieError::SizeMismatch {
            cached: single.size,
            actual,
        });
    }
    Ok(actual)
}

fn check_branch<V, F: Fanout>(branch: &Branch<V, F>, shift: u32) -> Result<usize> {
    let placed = if F::COMPRESSED_PATHS {
        branch.shift <= shift
    } else {
        branch.shift == shift
    };
    if !placed || branch.shift % F::BITS != 0 {
        return Err(TrieError::invariant(
            branch.shift,
            format!("branch level where shift {shift} is expected"),
        ));
    }
    if node::prefix::<F>(branch.prefix, branch.shift) != branch.prefix {
        return Err(TrieError::invariant(branch.shift, "prefix has bits below its level"));
    }
    check_slots(&branch.values, branch.shift, "values")?;
    check_slots(&branch.children, branch.shift, "children")?;
    if branch.values.presence() & branch.children.presence() != F::Bitmap::EMPTY {
        return Err(TrieError::invariant(
            branch.shift,
            "slot holds both an inline entry and a child",
        ));
    }
    if branch.values.len() + branch.children.len() < 2 {
        return Err(TrieError::invariant(
            branch.shift,
            "branch with fewer than two occupied slots",
        ));
    }
    if branch.shift == 0 && !branch.children.is_empty() {
        return Err(TrieError::invariant(0, "children below the bottom level"));
    }

    for (index, entry) in branch.values.iter() {
        if node::prefix::<F>(entry.key, branch.shift) != branch.prefix
            || node::chunk::<F>(entry.key, branch.shift) != index
        {
            return Err(TrieError::invariant(
                branch.shift,
                format!("entry {:#x} stored under slot {index}", entry.key),
            ));
        }
    }

    let mut actual = branch.values.len();
    for (index, child) in branch.children.iter() {
        check_child_path::<V, F>(child, branch.prefix, branch.shift, index)?;
        actual += check_recursive(child, branch.shift - F::BITS, false)?;
    }
    if actual != branch.size {
        return Err(TrieError::SizeMismatch {
            cached: branch.size,
            actual,
        });
    }
    Ok(actual)
}

/// A child under slot `index` must extend its parent's path.
fn check_child_path<V, F: Fanout>(
    child: &Node<V, F>,
    prefix: u64,
    shift: u32,
    index: u32,
) -> Result<()> {
    let key = child.path_key();
    if node::prefix::<F>(key, shift) != prefix || node::chunk::<F>(key, shift) != index {
        return Err(TrieError::invariant(
            shift,
            format!("child with path {key:#x} stored under slot {index}"),
        ));
    }
    Ok(())
}

/// Compacted slot array must hold exactly one occupant per presence bit.
fn check_slots<T, B: Bitmap>(slots: &BitmapNode<T, B>, shift: u32, what: &str) -> Result<()> {
    let expected = slots.presence().count() as usize;
    if slots.len() != expected {
        return Err(TrieError::invariant(
            shift,
            format!("{what}: {} slots for {expected} presence bits", slots.len()),
        ));
    }
    Ok(())
}
