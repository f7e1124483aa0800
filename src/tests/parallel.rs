use rayon::prelude::*;

use crate::{TokenTrie, TrieArray};

#[test]
fn par_iter_empty() {
    let trie: TrieArray<u64> = TrieArray::new();
    assert_eq!(trie.par_iter().count(), 0);
}

#[test]
fn par_iter_visits_every_entry() {
    let trie: TokenTrie<u64> =
        TokenTrie::from_pairs((0..20_000_u64).map(|i| (i.wrapping_mul(0x9E37_79B9_7F4A_7C15), i)))
            .unwrap();
    let keys: Vec<u64> = trie.par_iter().map(|(k, _)| k).collect();
    assert_eq!(keys, trie.keys().collect::<Vec<_>>(), "collect keeps key order");

    let sum: u64 = trie.par_iter().map(|(_, v)| *v).sum();
    assert_eq!(sum, (0..20_000_u64).sum());
}

#[test]
fn par_iter_reports_length() {
    let trie: TrieArray<u64> = TrieArray::from_pairs((0..1000).map(|i| (i, i))).unwrap();
    assert_eq!(trie.par_iter().opt_len(), Some(1000));
    assert_eq!(trie.par_iter().len(), 1000);
}

#[test]
fn collect_with_small_splits_is_ordered() {
    let trie: TrieArray<u64> =
        TrieArray::from_pairs((0..4000_u64).map(|i| (i * 2_654_435 % (1 << 32), i))).unwrap();
    let pairs: Vec<(u64, u64)> = trie
        .par_iter()
        .with_min_split_size(2)
        .map(|(k, v)| (k, *v))
        .collect();
    let expected: Vec<(u64, u64)> = trie.iter().map(|(k, v)| (k, *v)).collect();
    assert_eq!(pairs, expected);

    let mut extended = vec![(0, 0)];
    extended.par_extend(trie.par_iter().map(|(k, v)| (k, *v)));
    assert_eq!(extended.len(), 4001);
    assert_eq!(extended[1..], expected[..]);
}

#[test]
fn enumerate_and_zip_follow_key_order() {
    let trie: TokenTrie<u64> = TokenTrie::from_pairs((0..3000_u64).map(|i| (i << 20, i))).unwrap();
    assert!(
        trie.par_iter()
            .enumerate()
            .all(|(n, (k, _))| k == u64::try_from(n).unwrap() << 20)
    );
    let matched = trie
        .par_iter()
        .zip(trie.par_iter().skip(1))
        .filter(|((a, _), (b, _))| a < b)
        .count();
    assert_eq!(matched, 2999);
}

#[test]
fn into_par_iter_for_reference() {
    let trie: TrieArray<u64> = TrieArray::from_pairs((0..5000).map(|i| (i * 7, i))).unwrap();
    let max = (&trie).into_par_iter().map(|(k, _)| k).max();
    assert_eq!(max, Some(4999 * 7));
}

#[test]
fn min_split_size_bounds_work_units() {
    let trie: TrieArray<u64> = TrieArray::from_pairs((0..3000).map(|i| (i, i))).unwrap();
    let counted = trie
        .par_iter()
        .with_min_split_size(500)
        .fold(|| 0_usize, |n, _| n + 1)
        .collect::<Vec<_>>();
    assert!(counted.iter().all(|&n| n > 0));
    assert_eq!(counted.iter().sum::<usize>(), 3000);
}
