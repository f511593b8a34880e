//! The chunk packager (§4.4) — accumulates support vectors until `chunk_size`
//! is reached, then compresses and frames them.

use crate::codec::PairCodec;
use crate::core::frame_io::{ChunkHeader, ChunkSink};
use crate::core::split_buffer::SplitPairBuffer;
use crate::core::svi::Svi;
use crate::error::Result;

pub struct ChunkPackager {
    buf: SplitPairBuffer,
    chunk_size: usize,
    cur_sv: usize,
}

impl ChunkPackager {
    pub fn new(codec: &dyn PairCodec, chunk_size: usize) -> Self {
        ChunkPackager {
            buf: SplitPairBuffer::new(codec, chunk_size),
            chunk_size,
            cur_sv: 0,
        }
    }

    /// Current number of pairs buffered but not yet pushed as a chunk.
    pub fn pending(&self) -> usize {
        self.cur_sv
    }

    /// Appends one support vector; pushes the chunk automatically once full.
    pub fn append(
        &mut self,
        codec: &dyn PairCodec,
        sink: &mut dyn ChunkSink,
        svi: Svi,
    ) -> Result<()> {
        self.buf.set(self.cur_sv, svi);
        self.cur_sv += 1;
        if self.cur_sv == self.chunk_size {
            self.push_chunk(codec, sink)?;
        }
        Ok(())
    }

    /// Compresses and emits whatever is currently buffered (possibly zero
    /// pairs, which is the end-of-block sentinel — §4.4).
    pub fn push_chunk(&mut self, codec: &dyn PairCodec, sink: &mut dyn ChunkSink) -> Result<()> {
        let raw = (self.cur_sv * 2 * 4) as u32;
        if self.cur_sv == 0 {
            sink.push_chunk(ChunkHeader::END_OF_BLOCK, &[])?;
            return Ok(());
        }
        let words = self.buf.encode(codec, self.cur_sv)?;
        let compressed_words = self.buf.compressed_words(words);
        let payload: Vec<u8> = compressed_words.iter().flat_map(|w| w.to_le_bytes()).collect();
        let header = ChunkHeader { raw, compressed: payload.len() as u32 };
        sink.push_chunk(header, &payload)?;
        self.cur_sv = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Varint;

    #[test]
    fn empty_push_emits_end_of_block_sentinel() {
        let codec = Varint;
        let mut packager = ChunkPackager::new(&codec, 4);
        let mut chunks: Vec<(ChunkHeader, Vec<u8>)> = Vec::new();
        let mut sink = |h: ChunkHeader, p: &[u8]| {
            chunks.push((h, p.to_vec()));
            Ok(())
        };
        packager.push_chunk(&codec, &mut sink).unwrap();
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].0.is_end_of_block());
    }

    #[test]
    fn auto_pushes_once_chunk_size_reached() {
        let codec = Varint;
        let mut packager = ChunkPackager::new(&codec, 2);
        let mut chunks: Vec<(ChunkHeader, Vec<u8>)> = Vec::new();
        let mut sink = |h: ChunkHeader, p: &[u8]| {
            chunks.push((h, p.to_vec()));
            Ok(())
        };
        packager.append(&codec, &mut sink, Svi { dt: 0, v: 1 }).unwrap();
        assert_eq!(chunks.len(), 0);
        packager.append(&codec, &mut sink, Svi { dt: 2, v: 3 }).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].0.raw, 16);
        assert!(!chunks[0].0.is_end_of_block());
    }
}
