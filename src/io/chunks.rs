//! Adapts a byte stream (file, stdin/stdout, or any `Read`/`Write`) into the
//! core's [`ChunkSink`]/[`ChunkSource`] callbacks. This is the one place
//! that maps a physical end of stream onto the zero-length end-of-block
//! chunk the core treats as its own sentinel — the core itself never opens
//! or reads a file.

use std::io::{Read, Write};

use crate::core::frame_io::{ChunkHeader, ChunkSink, ChunkSource, CHUNK_HEADER_LEN};
use crate::error::{CoreError, Result};

pub struct FileChunkSink<W> {
    writer: W,
}

impl<W: Write> FileChunkSink<W> {
    pub fn new(writer: W) -> Self {
        FileChunkSink { writer }
    }
}

impl<W: Write> ChunkSink for FileChunkSink<W> {
    fn push_chunk(&mut self, header: ChunkHeader, payload: &[u8]) -> Result<()> {
        self.writer.write_all(&header.to_bytes()).map_err(|e| CoreError::Codec(e.to_string()))?;
        self.writer.write_all(payload).map_err(|e| CoreError::Codec(e.to_string()))
    }
}

pub struct FileChunkSource<R> {
    reader: R,
}

impl<R: Read> FileChunkSource<R> {
    pub fn new(reader: R) -> Self {
        FileChunkSource { reader }
    }
}

impl<R: Read> ChunkSource for FileChunkSource<R> {
    fn pull_chunk(&mut self, buf: &mut Vec<u8>) -> Result<ChunkHeader> {
        let mut header_bytes = [0u8; CHUNK_HEADER_LEN];
        let mut filled = 0;
        while filled < CHUNK_HEADER_LEN {
            let n = self
                .reader
                .read(&mut header_bytes[filled..])
                .map_err(|e| CoreError::Codec(e.to_string()))?;
            if n == 0 {
                if filled == 0 {
                    return Ok(ChunkHeader::END_OF_BLOCK);
                }
                return Err(CoreError::TruncatedChunk);
            }
            filled += n;
        }
        let header = ChunkHeader::from_bytes(&header_bytes)?;

        buf.clear();
        if header.compressed > 0 {
            buf.resize(header.compressed as usize, 0);
            let mut filled = 0;
            while filled < buf.len() {
                let n = self.reader.read(&mut buf[filled..]).map_err(|e| CoreError::Codec(e.to_string()))?;
                if n == 0 {
                    return Err(CoreError::TruncatedChunk);
                }
                filled += n;
            }
        }
        Ok(header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_few_chunks_and_then_signals_eof() {
        let mut bytes = Vec::new();
        {
            let mut sink = FileChunkSink::new(&mut bytes);
            sink.push_chunk(ChunkHeader { raw: 16, compressed: 3 }, &[1, 2, 3]).unwrap();
            sink.push_chunk(ChunkHeader::END_OF_BLOCK, &[]).unwrap();
        }

        let mut source = FileChunkSource::new(bytes.as_slice());
        let mut payload = Vec::new();
        let h1 = source.pull_chunk(&mut payload).unwrap();
        assert_eq!(h1, ChunkHeader { raw: 16, compressed: 3 });
        assert_eq!(payload, vec![1, 2, 3]);

        let h2 = source.pull_chunk(&mut payload).unwrap();
        assert!(h2.is_end_of_block());

        // Physical EOF past the written sentinel also reads as end-of-block.
        let h3 = source.pull_chunk(&mut payload).unwrap();
        assert!(h3.is_end_of_block());
    }

    #[test]
    fn truncated_header_is_an_error() {
        let mut source = FileChunkSource::new(&[0u8, 1, 2][..]);
        let mut payload = Vec::new();
        assert!(source.pull_chunk(&mut payload).is_err());
    }
}
