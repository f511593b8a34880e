//! Construction-time configuration shared by the compressor and decompressor.
//!
//! A single user-facing tolerance `error` is split into the two error
//! budgets the predictor and the quantiser actually consume: `qp_ratio`
//! (`r`) decides how much of the total goes to quantisation grid spacing
//! (`quantum = 2 * r * error`) versus how much is left for the tube the
//! predictor is allowed to track (`prediction_error = (1 - r) * error`).
//! A small `r` favours finer prediction segments over a finer quantisation
//! grid and vice versa; `r = 0.5` splits the budget evenly.

use crate::codec::CodecKind;
use crate::core::stp::TId;
use crate::error::{CoreError, Result};

#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub num_traj: TId,
    pub bound: f64,
    pub error: f64,
    pub qp_ratio: f64,
    pub chunk_size: usize,
    pub codec: CodecKind,
}

impl CoreConfig {
    pub fn validate(&self) -> Result<()> {
        if self.num_traj == 0 {
            return Err(CoreError::InvalidConfig("num_traj must be nonzero".into()));
        }
        if !(self.bound.is_finite() && self.bound > 0.0) {
            return Err(CoreError::InvalidConfig("bound must be finite and positive".into()));
        }
        if !(self.error.is_finite() && self.error > 0.0) {
            return Err(CoreError::InvalidConfig("error must be finite and positive".into()));
        }
        if !(0.0..=1.0).contains(&self.qp_ratio) {
            return Err(CoreError::InvalidConfig("qp_ratio must lie in [0, 1]".into()));
        }
        if self.chunk_size == 0 {
            return Err(CoreError::InvalidConfig("chunk_size must be nonzero".into()));
        }
        Ok(())
    }

    /// Quantisation grid spacing derived from the error budget split.
    pub fn quantum(&self) -> f64 {
        2.0 * self.qp_ratio * self.error
    }

    /// Tolerance left over for the predictor's error tube after quantisation
    /// has taken its share.
    pub fn prediction_error(&self) -> f64 {
        (1.0 - self.qp_ratio) * self.error
    }

    /// Bit width of one key-frame field, derived from `bound` and the
    /// already-split `quantum`.
    pub fn key_frame_bit_width(&self) -> u32 {
        crate::core::quantize::key_frame_bit_width(self.bound, self.quantum())
    }
}
