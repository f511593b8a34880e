//! Crate-level error taxonomy.
//!
//! Mirrors the layering the block codec uses internally (`block::compress::Lz4Error`,
//! `block::decompress_core::DecompressError`): a plain enum with hand-written
//! `Display`/`Error` impls, no derive macro. Four of the five failure classes a
//! stream can hit map directly onto a variant; I/O signals (end of block, EOF)
//! are *not* represented here — they are returned as `Ok(false)`/`Option::None`
//! at the call site, never as an error (see the module docs on `Decompressor::read_frame`).

use std::fmt;

/// Everything that can go wrong building, feeding, or draining a stream.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Construction-time configuration is nonsensical (taxonomy class 1).
    InvalidConfig(String),
    /// A sample violated the contract the compressor was built under
    /// (non-finite, `|x| > bound`, pushed after `finish`, …) (taxonomy class 2).
    ContractViolation(String),
    /// An internal invariant (interleaver ordering, tube bounds, …) did not
    /// hold. Always a bug, never a data problem (taxonomy class 3).
    InvariantViolation(String),
    /// A chunk's declared payload length could not be fully read from the
    /// chunk source (taxonomy class 4; distinct from the *normal*
    /// zero-length-chunk / EOF signals).
    TruncatedChunk,
    /// The codec produced a different number of words than requested
    /// (taxonomy class 5).
    CodecMismatch { expected: usize, actual: usize },
    /// The configured codec rejected the input or output buffer it was given.
    Codec(String),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
            CoreError::ContractViolation(msg) => write!(f, "contract violation: {msg}"),
            CoreError::InvariantViolation(msg) => write!(f, "internal invariant violated: {msg}"),
            CoreError::TruncatedChunk => write!(f, "chunk source returned a truncated payload"),
            CoreError::CodecMismatch { expected, actual } => write!(
                f,
                "codec decoded {actual} words, expected {expected}"
            ),
            CoreError::Codec(msg) => write!(f, "codec error: {msg}"),
        }
    }
}

impl std::error::Error for CoreError {}

pub type Result<T> = std::result::Result<T, CoreError>;
