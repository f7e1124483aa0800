//! Trie operation benchmarks

use std::hint::black_box;

use bitmap_trie::{TokenTrie, TrieArray};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SIZES: [u64; 3] = [1_000, 10_000, 100_000];

fn random_keys(n: u64) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(1);
    (0..n).map(|_| u64::from(rng.gen_range(0..=u32::MAX))).collect()
}

fn bench_assign(c: &mut Criterion) {
    let mut group = c.benchmark_group("assign");
    for n in SIZES {
        let keys = random_keys(n);
        group.bench_with_input(BenchmarkId::new("array32_random", n), &keys, |b, keys| {
            b.iter(|| {
                keys.iter()
                    .fold(TrieArray::<u64>::new(), |t, &k| t.assign(k, k).unwrap())
            });
        });
        group.bench_with_input(BenchmarkId::new("token64_monotonic", n), &n, |b, &n| {
            b.iter(|| (0..n).fold(TokenTrie::<u64>::new(), |t, k| t.assign(k, k).unwrap()));
        });
    }
    group.finish();
}

fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("get");
    for n in SIZES {
        let keys = random_keys(n);
        let trie: TrieArray<u64> = TrieArray::from_pairs(keys.iter().map(|&k| (k, k))).unwrap();
        group.bench_with_input(BenchmarkId::new("array32_hit", n), &keys, |b, keys| {
            b.iter(|| keys.iter().filter(|&&k| trie.get(black_box(k)).is_some()).count());
        });
    }
    group.finish();
}

fn bench_delete(c: &mut Criterion) {
    let mut group = c.benchmark_group("delete");
    for n in SIZES {
        let trie: TokenTrie<u64> = TokenTrie::from_pairs((0..n).map(|k| (k, k))).unwrap();
        group.bench_with_input(BenchmarkId::new("token64_drain", n), &n, |b, &n| {
            b.iter(|| (0..n).fold(trie.clone(), |t, k| t.delete(k).unwrap()));
        });
    }
    group.finish();
}

fn bench_iter(c: &mut Criterion) {
    let mut group = c.benchmark_group("iter");
    for n in SIZES {
        let trie: TrieArray<u64> = TrieArray::from_pairs(random_keys(n).into_iter().map(|k| (k, k)))
            .unwrap();
        group.bench_with_input(BenchmarkId::new("sequential", n), &trie, |b, trie| {
            b.iter(|| trie.values().sum::<u64>());
        });
        group.bench_with_input(BenchmarkId::new("split_halves", n), &trie, |b, trie| {
            b.iter(|| {
                let (left, right) = trie.iter().split().unwrap();
                left.chain(right).map(|(_, v)| *v).sum::<u64>()
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_assign, bench_get, bench_delete, bench_iter);
criterion_main!(benches);
