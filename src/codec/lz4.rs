//! `Lz4Block` — the built-in high-ratio pair codec (§6.3), backed by the
//! crate's own LZ4 block engine (`crate::block`).
//!
//! The block format itself has no notion of "array of words" — it is a byte
//! codec — so this wrapper prefixes the compressed payload with one extra
//! word carrying its exact byte length (LZ4 block output is not in general a
//! multiple of 4 bytes) before packing it into whole words. That header word
//! is private to this codec; nothing outside `encode`/`decode` here
//! interprets it.

use super::PairCodec;
use crate::block::{compress_bound, compress_default, decompress_safe};
use crate::error::{CoreError, Result};

pub struct Lz4Block;

fn words_to_le_bytes(words: &[u32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(words.len() * 4);
    for w in words {
        out.extend_from_slice(&w.to_le_bytes());
    }
    out
}

impl PairCodec for Lz4Block {
    fn require(&self, n: usize) -> usize {
        let raw_bytes = n * 4;
        let bound = compress_bound(raw_bytes as i32).max(16) as usize;
        1 + bound.div_ceil(4) + 1
    }

    fn encode(&self, src: &[u32], n: usize, dst: &mut [u32]) -> Result<usize> {
        let raw = words_to_le_bytes(&src[..n]);
        let bound = compress_bound(raw.len() as i32).max(16) as usize;
        let mut compressed = vec![0u8; bound];
        let written = compress_default(&raw, &mut compressed)
            .map_err(|e| CoreError::Codec(format!("lz4 block encode failed: {e:?}")))?;
        compressed.truncate(written);
        while compressed.len() % 4 != 0 {
            compressed.push(0);
        }
        let payload_words = compressed.len() / 4;
        if 1 + payload_words > dst.len() {
            return Err(CoreError::Codec(format!(
                "lz4 encode needs {} words, destination has {}",
                1 + payload_words,
                dst.len()
            )));
        }
        dst[0] = written as u32;
        for (i, chunk) in compressed.chunks_exact(4).enumerate() {
            dst[1 + i] = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Ok(1 + payload_words)
    }

    fn decode(&self, src: &[u32], src_len: usize, dst: &mut [u32], n: usize) -> Result<()> {
        if src_len == 0 {
            return Err(CoreError::Codec("lz4 decode: empty input".into()));
        }
        let exact_len = src[0] as usize;
        let payload_bytes = words_to_le_bytes(&src[1..src_len]);
        if exact_len > payload_bytes.len() {
            return Err(CoreError::Codec(
                "lz4 decode: declared length exceeds payload".into(),
            ));
        }
        let compressed = &payload_bytes[..exact_len];
        let mut raw = vec![0u8; n * 4];
        let written = decompress_safe(compressed, &mut raw)
            .map_err(|e| CoreError::Codec(format!("lz4 block decode failed: {e:?}")))?;
        if written != n * 4 {
            return Err(CoreError::CodecMismatch {
                expected: n,
                actual: written / 4,
            });
        }
        for (i, chunk) in raw.chunks_exact(4).enumerate() {
            dst[i] = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(values: &[u32]) {
        let codec = Lz4Block;
        let mut dst = vec![0u32; codec.require(values.len())];
        let words = codec.encode(values, values.len(), &mut dst).unwrap();
        let mut out = vec![0u32; values.len()];
        codec.decode(&dst, words, &mut out, values.len()).unwrap();
        assert_eq!(out, values);
    }

    #[test]
    fn round_trips_repetitive_data() {
        // Typical support-vector stream: lots of dt=0, small v.
        let values: Vec<u32> = (0..512).map(|i| if i % 3 == 0 { 1 } else { 0 }).collect();
        round_trip(&values);
    }

    #[test]
    fn round_trips_random_looking_data() {
        let mut values = Vec::new();
        let mut state: u32 = 12345;
        for _ in 0..256 {
            state = state.wrapping_mul(1103515245).wrapping_add(12345);
            values.push(state);
        }
        round_trip(&values);
    }

    #[test]
    fn round_trips_empty() {
        round_trip(&[]);
    }

    #[test]
    fn compresses_repetitive_data_smaller_than_varint() {
        use super::super::Varint;
        let values: Vec<u32> = vec![0u32; 1024];
        let lz4 = Lz4Block;
        let varint = Varint;
        let mut lz4_dst = vec![0u32; lz4.require(values.len())];
        let lz4_words = lz4.encode(&values, values.len(), &mut lz4_dst).unwrap();
        let mut varint_dst = vec![0u32; varint.require(values.len())];
        let varint_words = varint
            .encode(&values, values.len(), &mut varint_dst)
            .unwrap();
        assert!(lz4_words < varint_words);
    }
}
