//! `check_invariants` must accept every tree the update logic builds and
//! reject hand-made defects.

use std::sync::Arc;

use crate::bitmap::BitmapNode;
use crate::node::{Entry, Node};
use crate::tests::init_tracing;
use crate::{Array32, Token64, Trie, TrieError};

fn entry(key: u64) -> Entry<u64> {
    Entry {
        key,
        value: Arc::new(key),
    }
}

fn assert_invariant<F: crate::Fanout>(trie: &Trie<u64, F>, needle: &str) {
    match trie.check_invariants() {
        Err(TrieError::Invariant { detail, .. }) => {
            assert!(detail.contains(needle), "unexpected detail: {detail}");
        }
        other => panic!("expected an invariant violation, got {other:?}"),
    }
}

#[test]
fn built_tries_pass() {
    init_tracing();
    let array: Trie<u64, Array32> =
        Trie::from_pairs((0..5000_u64).map(|i| (i * 2_654_435 % (1 << 32), i))).unwrap();
    array.check_invariants().unwrap();
    let token: Trie<u64, Token64> =
        Trie::from_pairs((0..5000_u64).map(|i| (i.wrapping_mul(0x9E37_79B9_7F4A_7C15), i)))
            .unwrap();
    token.check_invariants().unwrap();
}

#[test]
fn root_size_mismatch() {
    let valid: Trie<u64, Token64> = Trie::from_pairs([(1, 1), (2, 2)]).unwrap();
    let broken = Trie::from_raw(valid.root().clone(), 3);
    assert_eq!(
        broken.check_invariants(),
        Err(TrieError::SizeMismatch {
            cached: 3,
            actual: 2
        })
    );
}

#[test]
fn branch_size_mismatch() {
    let root = Node::branch(0, 0, BitmapNode::pair(1, entry(1), 2, entry(2)), BitmapNode::new(), 5);
    let broken: Trie<u64, Token64> = Trie::from_raw(root, 5);
    assert_eq!(
        broken.check_invariants(),
        Err(TrieError::SizeMismatch {
            cached: 5,
            actual: 2
        })
    );
}

#[test]
fn branch_with_one_slot() {
    let root = Node::branch(0, 0, BitmapNode::single(1, entry(1)), BitmapNode::new(), 1);
    assert_invariant(&Trie::<u64, Token64>::from_raw(root, 1), "fewer than two");
}

#[test]
fn slot_holds_value_and_child() {
    let child = Node::branch(
        0,
        0,
        BitmapNode::pair(0, entry(0), 1, entry(1)),
        BitmapNode::new(),
        2,
    );
    let root = Node::branch(
        0,
        6,
        BitmapNode::single(0, entry(5)),
        BitmapNode::single(0, child),
        3,
    );
    assert_invariant(&Trie::<u64, Token64>::from_raw(root, 3), "both");
}

#[test]
fn entry_under_wrong_slot() {
    let root = Node::branch(0, 0, BitmapNode::pair(1, entry(1), 3, entry(2)), BitmapNode::new(), 2);
    assert_invariant(&Trie::<u64, Token64>::from_raw(root, 2), "slot 3");
}

#[test]
fn leaf_stored_as_child() {
    let root = Node::branch(
        0,
        6,
        BitmapNode::single(1, entry(64)),
        BitmapNode::single(0, Node::Leaf(entry(0))),
        2,
    );
    assert_invariant(&Trie::<u64, Token64>::from_raw(root, 2), "instead of inline");
}

#[test]
fn single_child_in_compressed_trie() {
    let child = Node::branch(
        0,
        0,
        BitmapNode::pair(0, entry(0), 1, entry(1)),
        BitmapNode::new(),
        2,
    );
    let root = Node::single(0, 60, 0, child, 2);
    assert_invariant(&Trie::<u64, Token64>::from_raw(root, 2), "path-compressed");
}

#[test]
fn skipped_level_in_materialized_trie() {
    // Branch at shift 0 directly under the root: levels 5..30 are missing.
    let root = Node::branch(
        0,
        0,
        BitmapNode::pair(0, entry(0), 1, entry(1)),
        BitmapNode::new(),
        2,
    );
    assert_invariant(&Trie::<u64, Array32>::from_raw(root, 2), "shift 30 is expected");
}

#[test]
fn leaf_key_too_wide() {
    let root = Node::Leaf(entry(1 << 40));
    assert_invariant(&Trie::<u64, Array32>::from_raw(root, 1), "key width");
}

#[test]
fn error_display() {
    let err = TrieError::Invariant {
        shift: 12,
        detail: String::from("branch with fewer than two occupied slots"),
    };
    assert_eq!(
        err.to_string(),
        "invariant violated at shift 12: branch with fewer than two occupied slots"
    );
}
