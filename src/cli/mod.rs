pub mod args;
pub mod constants;

pub use args::{Cli, CodecArg, Format, Mode};
