//! Command-line surface, one flag per construction-time parameter the core
//! and its I/O adapters need.

use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Compress,
    Decompress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Fixed-width little-endian binary, `num_traj` f64 values per frame.
    Binary,
    /// One tab-separated line of `num_traj` values per frame.
    Tsv,
    /// Deterministic synthetic generator, for benchmarking and smoke tests.
    Synthetic,
}

#[derive(Debug, Parser)]
#[command(name = "trajc", about = "Error-bounded streaming compressor for dense multi-trajectory time series")]
pub struct Cli {
    #[arg(value_enum)]
    pub mode: Mode,

    /// Input path. Ignored in `decompress` mode if `format` is `synthetic`;
    /// use `-` for stdin.
    #[arg(long, default_value = "-")]
    pub src: String,

    /// Output path; use `-` for stdout.
    #[arg(long, default_value = "-")]
    pub dst: String,

    #[arg(long, value_enum, default_value = "binary")]
    pub format: Format,

    /// Number of trajectories per frame.
    #[arg(long)]
    pub num_traj: u16,

    /// Largest magnitude any sample is allowed to reach.
    #[arg(long, default_value_t = 1_000.0)]
    pub bound: f64,

    /// Maximum absolute reconstruction error tolerated for any sample.
    #[arg(long, default_value_t = 0.01)]
    pub error: f64,

    /// Fraction of `error` spent on quantisation grid spacing rather than
    /// the predictor's error tube; must lie strictly between 0 and 1.
    #[arg(long, default_value_t = 0.5)]
    pub qp_ratio: f64,

    /// Maximum number of support vectors buffered before a chunk is flushed.
    #[arg(long, default_value_t = 1024)]
    pub chunk_size: usize,

    /// Frames per independently-decodable block. Only meaningful when
    /// compressing; `0` means one block for the entire stream.
    #[arg(long, default_value_t = 1024)]
    pub block_size: usize,

    #[arg(long, value_enum, default_value = "varint")]
    pub codec: CodecArg,

    /// Number of frames the synthetic generator produces. Ignored unless
    /// `format` is `synthetic`.
    #[arg(long, default_value_t = 1_000_000)]
    pub synthetic_frames: u64,

    #[arg(short, long, default_value_t = 2)]
    pub verbose: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CodecArg {
    Varint,
    Lz4,
}

impl From<CodecArg> for crate::codec::CodecKind {
    fn from(arg: CodecArg) -> Self {
        match arg {
            CodecArg::Varint => crate::codec::CodecKind::Varint,
            CodecArg::Lz4 => crate::codec::CodecKind::Lz4Block,
        }
    }
}
