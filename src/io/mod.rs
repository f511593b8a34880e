//! Frame-level I/O adapters.
//!
//! The core never touches a file descriptor or a byte buffer directly — it
//! speaks in frames of `f64` values and in chunk headers plus payloads (see
//! [`crate::core::frame_io`]). Everything in this module exists to bridge
//! that callback-based core to an actual source of trajectory data: a fixed
//! binary layout, a tab-separated text layout, or a deterministic synthetic
//! generator used for benchmarking and tests. Adapter errors carry real I/O
//! failures, so they return [`anyhow::Result`] rather than the core's closed
//! [`crate::error::CoreError`] taxonomy.

pub mod binary;
pub mod chunks;
pub mod synthetic;
pub mod text;

pub use binary::{BinaryReader, BinaryWriter};
pub use chunks::{FileChunkSink, FileChunkSource};
pub use synthetic::SyntheticSource;
pub use text::{TsvReader, TsvWriter};

/// Reads one frame of `num_traj` values at a time.
pub trait FrameReader {
    /// Fills `out` with the next frame. Returns `false` at end of input,
    /// leaving `out` unmodified.
    fn read_frame(&mut self, out: &mut [f64]) -> anyhow::Result<bool>;
}

/// Writes one frame of `num_traj` values at a time.
pub trait FrameWriter {
    fn write_frame(&mut self, values: &[f64]) -> anyhow::Result<()>;
}
