use std::cell::RefCell;
use std::rc::Rc;

use trajc::core::frame_io::ChunkHeader;
use trajc::core::{Compressor, CoreConfig, Decompressor};

/// Compresses `frames` (each of length `config.num_traj`) into an in-memory
/// sequence of framed chunks, exactly as a file-backed sink would receive
/// them.
pub fn compress_all(config: &CoreConfig, frames: &[Vec<f64>]) -> Vec<(ChunkHeader, Vec<u8>)> {
    let chunks = Rc::new(RefCell::new(Vec::new()));
    {
        let chunks = chunks.clone();
        let sink = move |header: ChunkHeader, payload: &[u8]| -> trajc::error::Result<()> {
            chunks.borrow_mut().push((header, payload.to_vec()));
            Ok(())
        };
        let mut compressor = Compressor::new(config, sink).expect("valid config");
        for frame in frames {
            compressor.add_frame(frame).expect("frame within contract");
        }
        compressor.finish().expect("finish should drain cleanly");
    }
    Rc::try_unwrap(chunks).unwrap().into_inner()
}

/// Replays chunks produced by [`compress_all`] back into frames.
pub fn decompress_all(config: &CoreConfig, chunks: &[(ChunkHeader, Vec<u8>)]) -> Vec<Vec<f64>> {
    let mut idx = 0usize;
    let chunks = chunks.to_vec();
    let source = move |buf: &mut Vec<u8>| -> trajc::error::Result<ChunkHeader> {
        let (header, payload) = &chunks[idx];
        buf.clear();
        buf.extend_from_slice(payload);
        idx += 1;
        Ok(*header)
    };
    let mut decompressor = Decompressor::new(config, source).expect("valid config");
    let mut out = vec![0.0; config.num_traj as usize];
    let mut frames = Vec::new();
    while decompressor.read_frame(&mut out).expect("read_frame should not error on well-formed input") {
        frames.push(out.clone());
    }
    frames
}

pub fn max_abs_error(a: &[Vec<f64>], b: &[Vec<f64>]) -> f64 {
    assert_eq!(a.len(), b.len(), "frame count mismatch");
    a.iter()
        .zip(b)
        .flat_map(|(fa, fb)| fa.iter().zip(fb).map(|(x, y)| (x - y).abs()))
        .fold(0.0, f64::max)
}
