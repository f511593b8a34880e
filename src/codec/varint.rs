//! `Varint` — a minimal byte-oriented LEB128-style pair codec (§6.3).
//!
//! This is the crate's always-correct fallback: one symbol per input word,
//! 7 payload bits per byte with the high bit as a continuation flag. It does
//! not exploit cross-symbol redundancy the way [`super::Lz4Block`] does, but
//! it has no failure mode beyond running out of destination capacity, which
//! makes it the right default for tests and for the synthetic I/O adapter.

use super::PairCodec;
use crate::error::{CoreError, Result};

pub struct Varint;

/// Worst case: a `u32` needs 5 LEB128 bytes (`ceil(32/7) == 5`).
const MAX_BYTES_PER_WORD: usize = 5;

impl PairCodec for Varint {
    fn require(&self, n: usize) -> usize {
        // Worst-case byte count, rounded up to whole words, plus one spare
        // word so padding to a word boundary never runs out of room.
        (n * MAX_BYTES_PER_WORD).div_ceil(4) + 1
    }

    fn encode(&self, src: &[u32], n: usize, dst: &mut [u32]) -> Result<usize> {
        let mut bytes: Vec<u8> = Vec::with_capacity(n * 2);
        for &word in &src[..n] {
            let mut v = word;
            loop {
                let mut byte = (v & 0x7F) as u8;
                v >>= 7;
                if v != 0 {
                    byte |= 0x80;
                    bytes.push(byte);
                } else {
                    bytes.push(byte);
                    break;
                }
            }
        }
        while bytes.len() % 4 != 0 {
            bytes.push(0);
        }
        let words_needed = bytes.len() / 4;
        if words_needed > dst.len() {
            return Err(CoreError::Codec(format!(
                "varint encode needs {words_needed} words, destination has {}",
                dst.len()
            )));
        }
        for (i, chunk) in bytes.chunks_exact(4).enumerate() {
            dst[i] = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Ok(words_needed)
    }

    fn decode(&self, src: &[u32], src_len: usize, dst: &mut [u32], n: usize) -> Result<()> {
        let bytes: Vec<u8> = src[..src_len].iter().flat_map(|w| w.to_le_bytes()).collect();
        let mut pos = 0usize;
        for slot in dst[..n].iter_mut() {
            let mut value: u32 = 0;
            let mut shift = 0u32;
            loop {
                let byte = *bytes.get(pos).ok_or_else(|| {
                    CoreError::Codec("varint decode ran out of input bytes".into())
                })?;
                pos += 1;
                value |= ((byte & 0x7F) as u32) << shift;
                if byte & 0x80 == 0 {
                    break;
                }
                shift += 7;
            }
            *slot = value;
        }
        Ok(())
    }
}
