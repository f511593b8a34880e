//! Streaming decompressor: the inverse of [`crate::core::interleaver::Compressor`].
//!
//! Where the compressor interleaves many independent segment streams into
//! one canonical order, the decompressor only has to consume that order: at
//! any moment each trajectory is mid-way through the one segment that
//! currently covers it, and `expected_segment` tracks when each trajectory's
//! *next* segment is due. A trajectory's position at an arbitrary time
//! inside its current segment is a linear interpolation between the
//! segment's start and end — never repredicted, just replayed.

use std::collections::BinaryHeap;

use crate::codec::PairCodec;
use crate::core::config::CoreConfig;
use crate::core::frame_io::ChunkSource;
use crate::core::keyframe::BitReader;
use crate::core::quantize::{dequantize, unzigzag};
use crate::core::split_buffer::SplitPairBuffer;
use crate::core::stp::{MinStp, Stp, Time};
use crate::error::{CoreError, Result};

struct DecompTrajState {
    t0: Time,
    dt: Time,
    x0: i64,
    dx: i64,
}

impl DecompTrajState {
    fn value_at(&self, t1: Time, quantum: f64) -> f64 {
        if self.dt != 0 {
            dequantize(self.x0, quantum) + (t1 - self.t0) as f64 * dequantize(self.dx, quantum) / self.dt as f64
        } else {
            dequantize(self.x0, quantum)
        }
    }
}

pub struct Decompressor<S: ChunkSource> {
    num_traj: usize,
    quantum: f64,
    traj_state: Vec<DecompTrajState>,
    expected_segment: BinaryHeap<MinStp>,
    cur_time: Time,
    buf: SplitPairBuffer,
    chunk_sz: usize,
    chunk_cur: usize,
    codec: Box<dyn PairCodec>,
    source: S,
}

impl<S: ChunkSource> Decompressor<S> {
    pub fn new(config: &CoreConfig, source: S) -> Result<Self> {
        config.validate()?;
        let codec = config.codec.build();
        let buf = SplitPairBuffer::new(codec.as_ref(), config.chunk_size);
        Ok(Decompressor {
            num_traj: config.num_traj as usize,
            quantum: config.quantum(),
            traj_state: Vec::new(),
            expected_segment: BinaryHeap::new(),
            cur_time: 0,
            buf,
            chunk_sz: 0,
            chunk_cur: 0,
            codec,
            source,
        })
    }

    /// Reads one frame into `out` (must have length `num_traj`). Returns
    /// `false` once the block's terminator chunk has been reached; `out` is
    /// left unmodified in that case.
    pub fn read_frame(&mut self, out: &mut [f64]) -> Result<bool> {
        if out.len() != self.num_traj {
            return Err(CoreError::ContractViolation(format!(
                "expected a buffer of {} trajectories, got {}",
                self.num_traj,
                out.len()
            )));
        }

        if self.cur_time == 0 && !self.read_key_frame()? {
            return Ok(false);
        }

        loop {
            let due = match self.expected_segment.peek() {
                Some(&MinStp(top)) => top.time() == self.cur_time && self.chunk_cur < self.chunk_sz,
                None => false,
            };
            if !due {
                break;
            }
            self.read_segment()?;
        }

        let top_time = match self.expected_segment.peek() {
            Some(&MinStp(top)) => top.time(),
            None => {
                return Err(CoreError::InvariantViolation(
                    "no expected segment pending while reading a frame".into(),
                ))
            }
        };
        if top_time <= self.cur_time {
            return Ok(false);
        }

        for i in 0..self.num_traj {
            out[i] = self.traj_state[i].value_at(self.cur_time, self.quantum);
        }
        self.cur_time += 1;
        Ok(true)
    }

    fn read_key_frame(&mut self) -> Result<bool> {
        let mut payload = Vec::new();
        let header = self.source.pull_chunk(&mut payload)?;
        if header.is_end_of_block() {
            return Ok(false);
        }
        let bit_count = header.raw / self.num_traj as u32;
        if bit_count * self.num_traj as u32 != header.raw {
            return Err(CoreError::InvariantViolation(
                "key frame size does not evenly divide the trajectory count".into(),
            ));
        }

        let mut reader = BitReader::new(&payload);
        self.traj_state.clear();
        for i in 0..self.num_traj {
            let code = reader.read(bit_count);
            self.traj_state.push(DecompTrajState { t0: 0, dt: 0, x0: unzigzag(code) as i64, dx: 0 });
            self.expected_segment.push(MinStp(Stp::new(1, i as u16)));
        }

        self.load_next_chunk()?;
        Ok(true)
    }

    fn read_segment(&mut self) -> Result<()> {
        let MinStp(top) = *self
            .expected_segment
            .peek()
            .ok_or_else(|| CoreError::InvariantViolation("no expected segment to read".into()))?;
        let id = top.id() as usize;
        let svi = self.buf.get(self.chunk_cur);

        let traj = &mut self.traj_state[id];
        traj.x0 += traj.dx;
        traj.t0 += traj.dt;
        traj.dt = svi.duration() as Time;
        traj.dx = unzigzag(svi.v) as i64;

        let new_stp = Stp::new(self.cur_time + traj.dt, top.id());
        self.expected_segment.pop();
        self.expected_segment.push(MinStp(new_stp));

        self.chunk_cur += 1;
        if self.chunk_cur == self.chunk_sz {
            self.load_next_chunk()?;
        }
        Ok(())
    }

    fn load_next_chunk(&mut self) -> Result<()> {
        let mut payload = Vec::new();
        let header = self.source.pull_chunk(&mut payload)?;
        self.chunk_cur = 0;
        self.chunk_sz = (header.raw / 2 / 4) as usize;
        if self.chunk_sz > 0 {
            if payload.len() != header.compressed as usize || payload.len() % 4 != 0 {
                return Err(CoreError::TruncatedChunk);
            }
            let words: Vec<u32> =
                payload.chunks_exact(4).map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]])).collect();
            self.buf.load_compressed(&words);
            self.buf.decode(self.codec.as_ref(), self.chunk_sz, words.len())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CodecKind;
    use crate::core::interleaver::Compressor;

    fn cfg(num_traj: u16) -> CoreConfig {
        CoreConfig {
            num_traj,
            bound: 10.0,
            error: 0.01,
            qp_ratio: 0.5,
            chunk_size: 8,
            codec: CodecKind::Varint,
        }
    }

    #[test]
    fn round_trips_a_short_constant_block() {
        let config = cfg(2);
        let chunks = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        {
            let chunks = chunks.clone();
            let sink = move |h: crate::core::frame_io::ChunkHeader, p: &[u8]| -> Result<()> {
                chunks.borrow_mut().push((h, p.to_vec()));
                Ok(())
            };
            let mut compressor = Compressor::new(&config, sink).unwrap();
            for _ in 0..40 {
                compressor.add_frame(&[1.0, -2.0]).unwrap();
            }
            compressor.finish().unwrap();
        }

        let chunks = chunks.borrow();
        let mut idx = 0usize;
        let source = move |buf: &mut Vec<u8>| -> Result<crate::core::frame_io::ChunkHeader> {
            let (h, p) = &chunks[idx];
            buf.clear();
            buf.extend_from_slice(p);
            idx += 1;
            Ok(*h)
        };
        let mut decompressor = Decompressor::new(&config, source).unwrap();
        let mut out = [0.0; 2];
        let mut frames = 0;
        while decompressor.read_frame(&mut out).unwrap() {
            assert!((out[0] - 1.0).abs() < 0.02);
            assert!((out[1] + 2.0).abs() < 0.02);
            frames += 1;
        }
        assert_eq!(frames, 40);
    }
}
