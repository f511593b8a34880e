//! The pluggable pair codec (§6.1, §6.3).
//!
//! The core treats the codec as an opaque object over arrays of 32-bit
//! unsigned words; it never inspects or depends on the wire format a codec
//! chooses to produce. Two implementations ship with this crate so it is
//! usable without an external dependency: [`Varint`], a minimal always-correct
//! baseline, and [`Lz4Block`], built on the crate's own LZ4 block engine
//! (`crate::block`) for the cases where compression ratio matters.

mod lz4;
mod varint;

pub use lz4::Lz4Block;
pub use varint::Varint;

use crate::error::{CoreError, Result};

/// Contract a pair-buffer backing codec must satisfy (§6.1).
///
/// All three methods operate on logical *words* (`u32`), not bytes — callers
/// convert to/from bytes only at the chunk-framing boundary (§6.2).
pub trait PairCodec {
    /// Upper bound on compressed output size, in words, for `n` input words.
    fn require(&self, n: usize) -> usize;

    /// Compress the first `n` words of `src` into `dst`. Returns the number
    /// of words actually written, which must not exceed `self.require(n)`.
    fn encode(&self, src: &[u32], n: usize, dst: &mut [u32]) -> Result<usize>;

    /// Decompress `src` (its first `src_len` words are meaningful) into
    /// exactly `n` words of `dst`. Any other output length is a decode error.
    fn decode(&self, src: &[u32], src_len: usize, dst: &mut [u32], n: usize) -> Result<()>;
}

/// Selects a built-in [`PairCodec`] by name — the moral equivalent of the
/// original's `--integer-encoding` numeric codec id, kept as a closed enum
/// here since both built-ins are part of this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecKind {
    Varint,
    Lz4Block,
}

impl CodecKind {
    pub fn build(self) -> Box<dyn PairCodec> {
        match self {
            CodecKind::Varint => Box::new(Varint),
            CodecKind::Lz4Block => Box::new(Lz4Block),
        }
    }
}

impl std::str::FromStr for CodecKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "varint" => Ok(CodecKind::Varint),
            "lz4" => Ok(CodecKind::Lz4Block),
            other => Err(CoreError::InvalidConfig(format!(
                "unknown codec '{other}', expected 'varint' or 'lz4'"
            ))),
        }
    }
}
