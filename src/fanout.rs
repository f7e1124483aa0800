//! Trie configurations: fanout, key width and level layout.
//!
//! A configuration fixes how many key bits each level consumes, how wide
//! keys may be, and whether runs of single-child levels are materialized
//! or skipped.

use crate::bitmap::Bitmap;

mod private {
    pub trait Sealed {}
}

/// Compile-time trie configuration.
///
/// Sealed: implemented only by [`Array32`] and [`Token64`].
pub trait Fanout: private::Sealed + Send + Sync + 'static {
    /// Presence word type; its width is the fanout.
    type Bitmap: Bitmap;

    /// Key bits consumed per level.
    const BITS: u32;

    /// Widest key accepted, in bits.
    const KEY_BITS: u32;

    /// Shift of the topmost level. `ROOT_SHIFT + BITS >= KEY_BITS`.
    const ROOT_SHIFT: u32;

    /// `true` if levels without branching are skipped instead of
    /// materialized as single-child nodes.
    const COMPRESSED_PATHS: bool;

    /// Mask selecting one chunk.
    const CHUNK_MASK: u64 = (1 << Self::BITS) - 1;
}

/// 32-way trie over 32-bit keys (array indices, 32-bit hash codes).
///
/// Every level between the root and a branching point is materialized;
/// a level with one occupied child slot is a single-child node.
#[derive(Debug)]
pub enum Array32 {}

impl private::Sealed for Array32 {}

impl Fanout for Array32 {
    type Bitmap = u32;
    const BITS: u32 = 5;
    const KEY_BITS: u32 = 32;
    const ROOT_SHIFT: u32 = 30;
    const COMPRESSED_PATHS: bool = false;
}

/// Path-compressing 64-way trie over 64-bit keys (monotonic tokens).
///
/// Branch nodes record their key prefix, so levels without branching
/// are never allocated.
#[derive(Debug)]
pub enum Token64 {}

impl private::Sealed for Token64 {}

impl Fanout for Token64 {
    type Bitmap = u64;
    const BITS: u32 = 6;
    const KEY_BITS: u32 = 64;
    const ROOT_SHIFT: u32 = 60;
    const COMPRESSED_PATHS: bool = true;
}
