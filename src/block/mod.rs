//! LZ4 block compression and decompression.
//!
//! This module contains the LZ4 block-format engine, ported whole (one-shot,
//! dictionary, and streaming APIs alike). It backs the [`crate::codec::Lz4Block`]
//! pair codec — the crate's built-in, always-available implementation of the
//! pluggable [`crate::codec::PairCodec`] contract. Only the one-shot entry
//! points below are re-exported and reachable from [`crate::codec`]: the pair
//! buffer (§4.2) always encodes/decodes a whole contiguous run at once, so
//! the streaming/dictionary API the format also supports has no caller in
//! this crate, though it remains available on `compress`/`decompress_api`
//! directly for anyone embedding the engine outside the pair-codec contract.

pub mod compress;
pub mod decompress_api;
pub mod decompress_core;
pub mod types;

// Re-export the most important public API items at the module level.
pub use compress::{
    compress_bound, compress_default, compress_fast, Lz4Error, LZ4_ACCELERATION_DEFAULT,
    LZ4_ACCELERATION_MAX, LZ4_MAX_INPUT_SIZE,
};
pub use decompress_api::{decompress_safe, BlockDecompressError};
pub use types::{StreamStateInternal, LZ4_DISTANCE_MAX};
