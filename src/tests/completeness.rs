//! Completeness: assign/delete must not lose or invent entries, in any
//! version.

use std::collections::BTreeMap;

use crate::{Fanout, TokenTrie, Trie, TrieArray};

fn assert_matches<F: Fanout>(trie: &Trie<u64, F>, model: &BTreeMap<u64, u64>) {
    assert_eq!(trie.len(), model.len());
    for (&k, &v) in model {
        assert_eq!(trie.get(k), Some(&v), "missing key {k:#x}");
    }
    let listed: Vec<(u64, u64)> = trie.iter().map(|(k, v)| (k, *v)).collect();
    let expected: Vec<(u64, u64)> = model.iter().map(|(&k, &v)| (k, v)).collect();
    assert_eq!(listed, expected);
    trie.check_invariants().unwrap();
}

// ---------------------------------------------------------------------------
// assign: size delta is +1 for new keys, 0 for replacements
// ---------------------------------------------------------------------------

#[test]
fn assign_new_grows() {
    let trie = TrieArray::<i32>::new().assign(1, 1).unwrap();
    assert_eq!(trie.len(), 1, "new key should add one entry");
}

#[test]
fn assign_existing_keeps_size() {
    let trie = TrieArray::<i32>::from_pairs([(1, 1), (2, 2)]).unwrap();
    let updated = trie.assign(1, 10).unwrap();
    assert_eq!(updated.len(), 2, "replacing should not change the size");
    assert_eq!(updated.get(1), Some(&10));
}

#[test]
fn assign_update_chain() {
    let v1 = TrieArray::<i32>::new().assign(9, 10).unwrap();
    let v2 = v1.assign(9, 20).unwrap();
    let v3 = v2.assign(9, 30).unwrap();
    assert_eq!(v1.get(9), Some(&10));
    assert_eq!(v2.get(9), Some(&20));
    assert_eq!(v3.get(9), Some(&30));
    assert_eq!(v3.len(), 1);
}

#[test]
fn assign_is_idempotent_by_content() {
    let once = TrieArray::<i32>::from_pairs([(1, 1), (40, 2)]).unwrap();
    let twice = once.assign(40, 2).unwrap();
    assert_eq!(once, twice);
    assert_eq!(twice.len(), 2);
}

// ---------------------------------------------------------------------------
// delete: exactly the named key disappears
// ---------------------------------------------------------------------------

#[test]
fn delete_among_many() {
    let trie: TrieArray<u64> = TrieArray::from_pairs((0..100).map(|i| (i, i * 10))).unwrap();
    let trie = trie.delete(50).unwrap();
    assert_eq!(trie.get(50), None);
    assert_eq!(trie.len(), 99);
    let mut model: BTreeMap<u64, u64> = (0..100).map(|i| (i, i * 10)).collect();
    model.remove(&50);
    assert_matches(&trie, &model);
}

#[test]
fn delete_twice_is_noop() {
    let trie = TrieArray::<i32>::from_pairs([(1, 1), (2, 2)]).unwrap();
    let once = trie.delete(1).unwrap();
    let twice = once.delete(1).unwrap();
    assert!(twice.ptr_eq(&once));
}

#[test]
fn old_versions_survive_deletes() {
    let full: TokenTrie<u64> = TokenTrie::from_pairs((0..64).map(|i| (i << 20, i))).unwrap();
    let mut versions = vec![full];
    for i in 0..64 {
        let next = versions[versions.len() - 1].delete(i << 20).unwrap();
        versions.push(next);
    }
    for (n, version) in versions.iter().enumerate() {
        let first = u64::try_from(n).unwrap();
        let model: BTreeMap<u64, u64> = (first..64).map(|i| (i << 20, i)).collect();
        assert_matches(version, &model);
    }
}

// ---------------------------------------------------------------------------
// Dense and sparse key sets
// ---------------------------------------------------------------------------

#[test]
fn keys_zero_to_thirty_one_fill_one_level() {
    let trie: TrieArray<u64> = TrieArray::from_pairs((0..32).map(|i| (i, i))).unwrap();
    let model: BTreeMap<u64, u64> = (0..32).map(|i| (i, i)).collect();
    assert_matches(&trie, &model);

    let trie = (0..32).fold(trie, |t, i| t.delete(i).unwrap());
    assert!(trie.is_empty());
    assert!(trie.ptr_eq(&TrieArray::new()));
}

#[test]
fn powers_of_two() {
    let mut model = BTreeMap::new();
    let mut array: TrieArray<u64> = TrieArray::new();
    let mut token: TokenTrie<u64> = TokenTrie::new();
    for bit in 0..32 {
        let key = 1_u64 << bit;
        model.insert(key, key);
        array = array.assign(key, key).unwrap();
        token = token.assign(key, key).unwrap();
    }
    for bit in 32..64 {
        token = token.assign(1_u64 << bit, 1_u64 << bit).unwrap();
    }
    assert_matches(&array, &model);

    let token_model: BTreeMap<u64, u64> = (0..64).map(|b| (1_u64 << b, 1_u64 << b)).collect();
    assert_matches(&token, &token_model);
}

#[test]
fn interleaved_assign_delete() {
    let mut model = BTreeMap::new();
    let mut trie: TokenTrie<u64> = TokenTrie::new();
    for round in 0_u64..2000 {
        let key = round.wrapping_mul(0x9E37_79B9_7F4A_7C15) >> (round % 7 * 8);
        if round % 3 == 2 && !model.is_empty() {
            let nth = usize::try_from(round).unwrap() % model.len();
            let victim = *model.keys().nth(nth).unwrap();
            model.remove(&victim);
            trie = trie.delete(victim).unwrap();
        } else {
            model.insert(key, round);
            trie = trie.assign(key, round).unwrap();
        }
    }
    assert_matches(&trie, &model);
}
