//! Error-bounded streaming compression for dense multi-trajectory numeric
//! time series.
//!
//! The [`core`] module is the self-contained compression/decompression
//! engine: it speaks frames in, chunks out (and back), and has no idea
//! where either side lives. [`codec`] supplies the pluggable integer-pair
//! codecs the engine's chunks are compressed with. [`io`] adapts real byte
//! streams — files, stdio, a synthetic generator — onto the engine's
//! callback-based frame and chunk interfaces. [`cli`] is the command-line
//! surface built on top of all three. [`block`] is the LZ4 block engine
//! backing [`codec::Lz4Block`]; nothing outside `codec` depends on it
//! directly.

pub mod cli;

pub mod block;
pub mod codec;
pub mod core;
pub mod error;
pub mod io;

pub use core::{ChunkHeader, ChunkSink, ChunkSource, Compressor, CoreConfig, Decompressor};
pub use error::CoreError;
