//! The split pair buffer (§4.2).
//!
//! Stores up to `size` `(dt, v)` pairs as two contiguous runs growing away
//! from a shared midpoint — `dt`s above it, `v`s below it, both indexed
//! outward from slot 0 — so a codec can exploit the differing magnitude
//! distributions of the two fields without the caller ever copying data
//! between separate buffers.

use crate::codec::PairCodec;
use crate::core::svi::Svi;
use crate::error::Result;

pub struct SplitPairBuffer {
    size: usize,
    /// Length `2 * size`; logical midpoint is `uncompressed[size]`.
    uncompressed: Vec<u32>,
    compressed: Vec<u32>,
}

impl SplitPairBuffer {
    pub fn new(codec: &dyn PairCodec, size: usize) -> Self {
        SplitPairBuffer {
            size,
            uncompressed: vec![0u32; 2 * size],
            compressed: vec![0u32; codec.require(2 * size)],
        }
    }

    #[inline]
    fn dt_index(&self, i: usize) -> usize {
        self.size + i
    }

    #[inline]
    fn v_index(&self, i: usize) -> usize {
        self.size - 1 - i
    }

    pub fn set(&mut self, i: usize, svi: Svi) {
        let dt_idx = self.dt_index(i);
        let v_idx = self.v_index(i);
        self.uncompressed[dt_idx] = svi.dt;
        self.uncompressed[v_idx] = svi.v;
    }

    pub fn get(&self, i: usize) -> Svi {
        Svi {
            dt: self.uncompressed[self.dt_index(i)],
            v: self.uncompressed[self.v_index(i)],
        }
    }

    /// Encodes the `n` pairs starting at slot 0, i.e. the `2n`-word logical
    /// run `[size - n, size + n)`. Returns the number of compressed words
    /// written; the caller reads them back from [`SplitPairBuffer::compressed_words`].
    pub fn encode(&mut self, codec: &dyn PairCodec, n: usize) -> Result<usize> {
        let lo = self.size - n;
        let hi = self.size + n;
        codec.encode(&self.uncompressed[lo..hi], 2 * n, &mut self.compressed)
    }

    pub fn compressed_words(&self, n_words: usize) -> &[u32] {
        &self.compressed[..n_words]
    }

    /// Decodes `csize` compressed words back into the `2n`-word logical run,
    /// the inverse of [`SplitPairBuffer::encode`].
    pub fn decode(&mut self, codec: &dyn PairCodec, n: usize, csize: usize) -> Result<()> {
        let lo = self.size - n;
        let hi = self.size + n;
        let mut scratch = vec![0u32; 2 * n];
        codec.decode(&self.compressed, csize, &mut scratch, 2 * n)?;
        self.uncompressed[lo..hi].copy_from_slice(&scratch);
        Ok(())
    }

    /// Copies compressed words from an external source (e.g. freshly read
    /// off the wire) into this buffer's compressed scratch region.
    pub fn load_compressed(&mut self, words: &[u32]) {
        self.compressed[..words.len()].copy_from_slice(words);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Varint;

    #[test]
    fn set_get_round_trip() {
        let codec = Varint;
        let mut buf = SplitPairBuffer::new(&codec, 8);
        for i in 0..8 {
            buf.set(i, Svi { dt: i as u32, v: (i * 3) as u32 });
        }
        for i in 0..8 {
            let svi = buf.get(i);
            assert_eq!(svi.dt, i as u32);
            assert_eq!(svi.v, (i * 3) as u32);
        }
    }

    #[test]
    fn encode_decode_round_trip() {
        let codec = Varint;
        let mut buf = SplitPairBuffer::new(&codec, 16);
        for i in 0..16 {
            buf.set(i, Svi { dt: i as u32, v: (100 - i) as u32 });
        }
        let words = buf.encode(&codec, 16).unwrap();

        let mut buf2 = SplitPairBuffer::new(&codec, 16);
        buf2.load_compressed(buf.compressed_words(words));
        buf2.decode(&codec, 16, words).unwrap();
        for i in 0..16 {
            assert_eq!(buf2.get(i), buf.get(i));
        }
    }
}
