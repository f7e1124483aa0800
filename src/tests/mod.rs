mod completeness;
mod invariants;
#[cfg(feature = "rayon")]
mod parallel;

use tracing_subscriber::EnvFilter;

/// Installs a test subscriber once; `RUST_LOG=bitmap_trie=trace` shows
/// ancestor synthesis and iterator splits.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Structural fingerprint of a trie: node variants, levels, prefixes and
/// slot occupancy, without values.
pub fn shape<V, F: crate::Fanout>(trie: &crate::Trie<V, F>) -> String {
    format!("{:?}", trie.root())
}
