//! Streaming compressor: runs one predictor per trajectory and interleaves
//! their emitted segments back into canonical `(time, id)` order.
//!
//! A predictor only knows when *its own* segment ends; nothing tells it
//! when a segment is safe to write out relative to the others. The
//! interleaver closes that gap with two structures: `expected_segment`, a
//! min-heap of the next space-time point the stream as a whole is waiting
//! on, and `known_segment`, an ordered map of segments that have already
//! been produced but are still ahead of that point. A segment becomes
//! writable exactly when its start matches the smallest expected point;
//! writing it announces a new expected point one segment further out.

use std::collections::{BTreeMap, BinaryHeap};

use crate::codec::PairCodec;
use crate::core::config::CoreConfig;
use crate::core::frame_io::{ChunkHeader, ChunkSink};
use crate::core::keyframe::BitWriter;
use crate::core::packager::ChunkPackager;
use crate::core::predictor::TrajState;
use crate::core::quantize::zigzag;
use crate::core::stp::{MinStp, Stp, Time};
use crate::core::svi::Svi;
use crate::error::{CoreError, Result};

pub struct Compressor<S: ChunkSink> {
    num_traj: usize,
    bound: f64,
    error: f64,
    quantum: f64,
    key_frame_bit_width: u32,
    traj_state: Vec<TrajState>,
    expected_segment: BinaryHeap<MinStp>,
    known_segment: BTreeMap<Stp, Svi>,
    cur_time: Time,
    packager: ChunkPackager,
    codec: Box<dyn PairCodec>,
    sink: S,
    finished: bool,
}

impl<S: ChunkSink> Compressor<S> {
    pub fn new(config: &CoreConfig, sink: S) -> Result<Self> {
        config.validate()?;
        let codec = config.codec.build();
        let packager = ChunkPackager::new(codec.as_ref(), config.chunk_size);
        Ok(Compressor {
            num_traj: config.num_traj as usize,
            bound: config.bound,
            error: config.prediction_error(),
            quantum: config.quantum(),
            key_frame_bit_width: config.key_frame_bit_width(),
            traj_state: (0..config.num_traj).map(|_| TrajState::new(config.quantum())).collect(),
            expected_segment: BinaryHeap::new(),
            known_segment: BTreeMap::new(),
            cur_time: 0,
            packager,
            codec,
            sink,
            finished: false,
        })
    }

    /// Feeds one frame: `values[i]` is trajectory `i`'s position at the
    /// current time step. Frames must be fed in time order starting at `t=0`.
    pub fn add_frame(&mut self, values: &[f64]) -> Result<()> {
        if self.finished {
            return Err(CoreError::ContractViolation(
                "add_frame called after finish".into(),
            ));
        }
        if values.len() != self.num_traj {
            return Err(CoreError::ContractViolation(format!(
                "expected {} trajectory values, got {}",
                self.num_traj,
                values.len()
            )));
        }
        for (i, &x) in values.iter().enumerate() {
            if !x.is_finite() || x.abs() > self.bound {
                return Err(CoreError::ContractViolation(format!(
                    "trajectory {i}'s value {x} is not finite or exceeds bound {}",
                    self.bound
                )));
            }
        }
        if self.cur_time == 0 {
            self.add_first_frame(values)
        } else {
            self.add_later_frame(values)
        }
    }

    fn add_first_frame(&mut self, values: &[f64]) -> Result<()> {
        let mut writer = BitWriter::new();
        for (i, &x) in values.iter().enumerate() {
            let qx0 = self.traj_state[i].add_first(x);
            let code = zigzag(qx0 as i32);
            writer.write(code, self.key_frame_bit_width);
        }
        let payload = writer.into_bytes();
        let header = ChunkHeader {
            raw: self.key_frame_bit_width * self.num_traj as u32,
            compressed: payload.len() as u32,
        };
        self.sink.push_chunk(header, &payload)?;

        self.cur_time = 1;
        for i in 0..self.num_traj {
            self.expected_segment.push(MinStp(Stp::new(self.cur_time, i as u16)));
        }
        Ok(())
    }

    fn add_later_frame(&mut self, values: &[f64]) -> Result<()> {
        for (i, &x) in values.iter().enumerate() {
            let Some(svi) = self.traj_state[i].add(x, self.error) else { continue };
            let start = Stp::new(self.cur_time - svi.duration() as Time, i as u16);
            self.known_segment.insert(start, svi);
            self.drain_known_segments()?;
        }

        if self.cur_time + 1 >= crate::core::stp::MAX_TIME {
            return Err(CoreError::ContractViolation("stream exceeds the maximum representable time".into()));
        }
        self.cur_time += 1;
        Ok(())
    }

    /// Moves every known segment that has become the stream's next expected
    /// point from `known_segment` into the outgoing chunk buffer, repeating
    /// until the smallest known segment no longer matches the smallest
    /// expected point.
    fn drain_known_segments(&mut self) -> Result<()> {
        loop {
            let Some(&MinStp(expected_top)) = self.expected_segment.peek() else { break };
            let Some(&known_top) = self.known_segment.keys().next() else { break };
            if expected_top != known_top {
                break;
            }

            let (stp, svi) = self.known_segment.remove_entry(&known_top).unwrap();
            let new_seg = Stp::new(stp.time() + svi.duration() as Time, stp.id());
            self.expected_segment.push(MinStp(new_seg));
            self.expected_segment.pop();
            self.packager.append(self.codec.as_ref(), &mut self.sink, svi)?;
        }
        Ok(())
    }

    /// Drains every trajectory's tail segment and closes the block with the
    /// end-of-block sentinel chunk. No more frames may be added afterwards.
    pub fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Err(CoreError::ContractViolation("finish called twice".into()));
        }
        if self.cur_time == 0 {
            return Err(CoreError::ContractViolation("finish called without adding any frame".into()));
        }
        self.finished = true;

        if self.cur_time > 1 {
            while let Some(&MinStp(es)) = self.expected_segment.peek() {
                if es.time() >= self.cur_time {
                    return Err(CoreError::InvariantViolation(
                        "an expected segment never arrived before the end of the stream".into(),
                    ));
                }

                let known_first = self.known_segment.keys().next().copied();
                let svi = if known_first == Some(es) {
                    let (stp, svi) = self.known_segment.remove_entry(&es).unwrap();
                    let new_seg = Stp::new(stp.time() + svi.duration() as Time, stp.id());
                    if new_seg.time() >= self.cur_time {
                        return Err(CoreError::InvariantViolation(
                            "a pending segment would extend past the end of the stream".into(),
                        ));
                    }
                    self.expected_segment.push(MinStp(new_seg));
                    svi
                } else {
                    self.traj_state[es.id() as usize].flush()
                };
                self.expected_segment.pop();
                self.packager.append(self.codec.as_ref(), &mut self.sink, svi)?;
            }
        }

        if self.packager.pending() > 0 {
            self.packager.push_chunk(self.codec.as_ref(), &mut self.sink)?;
        }
        self.packager.push_chunk(self.codec.as_ref(), &mut self.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CodecKind;

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
    fn first_frame_emits_exactly_one_key_frame_chunk() {
        let mut chunks: Vec<(ChunkHeader, Vec<u8>)> = Vec::new();
        let sink = move |h: ChunkHeader, p: &[u8]| -> Result<()> {
            chunks.push((h, p.to_vec()));
            Ok(())
        };
        let mut compressor = Compressor::new(&cfg(2), sink).unwrap();
        compressor.add_frame(&[1.0, 2.0]).unwrap();
        // The sink closure was moved into the compressor; inspect indirectly
        // by confirming no error occurred and the stream is now mid-block.
        assert_eq!(compressor.cur_time, 1);
    }

    #[test]
    fn finish_without_any_frame_is_a_contract_violation() {
        let sink = |_: ChunkHeader, _: &[u8]| -> Result<()> { Ok(()) };
        let mut compressor = Compressor::new(&cfg(1), sink).unwrap();
        assert!(compressor.finish().is_err());
    }

    #[test]
    fn constant_trajectories_round_trip_through_finish_without_panicking() {
        let chunks = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let chunks_for_sink = chunks.clone();
        let sink = move |h: ChunkHeader, p: &[u8]| -> Result<()> {
            chunks_for_sink.borrow_mut().push((h, p.to_vec()));
            Ok(())
        };
        let mut compressor = Compressor::new(&cfg(3), sink).unwrap();
        for _ in 0..50 {
            compressor.add_frame(&[1.0, 2.0, 3.0]).unwrap();
        }
        compressor.finish().unwrap();
        let chunks = chunks.borrow();
        assert!(chunks.len() >= 2, "expect at least a key frame and the terminator");
        assert!(chunks.last().unwrap().0.is_end_of_block());
    }
}
