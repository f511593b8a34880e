//! The per-trajectory error-tube predictor (§4.3).
//!
//! `TrajState` tracks the set of slopes still consistent with every sample
//! fed into the current segment. Each `add` either tightens that tube or, if
//! the new sample would empty it, flushes the current segment and anchors a
//! fresh one on the flushed endpoint.

use super::quantize::{dequantize, quantize, zigzag};
use super::svi::Svi;

pub struct TrajState {
    qx0: i64,
    x0: f64,
    x1: f64,
    vmin: f64,
    vmax: f64,
    dt: u32,
    quantum: f64,
}

impl TrajState {
    pub fn new(quantum: f64) -> Self {
        TrajState {
            qx0: 0,
            x0: 0.0,
            x1: 0.0,
            vmin: f64::NEG_INFINITY,
            vmax: f64::INFINITY,
            dt: 0,
            quantum,
        }
    }

    /// Initialises the trajectory from its first sample. Returns the
    /// quantised value for key-frame storage.
    pub fn add_first(&mut self, x: f64) -> i64 {
        self.qx0 = quantize(x, self.quantum);
        self.x0 = dequantize(self.qx0, self.quantum);
        self.x1 = x;
        self.vmin = f64::NEG_INFINITY;
        self.vmax = f64::INFINITY;
        self.dt = 0;
        self.qx0
    }

    /// Extends the current segment with a new sample. Returns `Some(svi)`
    /// when the tube emptied and a segment had to be flushed first.
    pub fn add(&mut self, x: f64, e: f64) -> Option<Svi> {
        let d = (self.dt + 1) as f64;
        let vmin2 = self.vmin.max((x - self.x0 - e) / d);
        let vmax2 = self.vmax.min((x - self.x0 + e) / d);

        if vmin2 > vmax2 {
            let flushed = self.flush();
            // Both bounds below are derived from the post-flush x0 (set by
            // `flush`), not a mix of pre- and post-flush anchors (§4.3, §9).
            self.x1 = x;
            self.dt = 1;
            self.vmin = x - self.x0 - e;
            self.vmax = x - self.x0 + e;
            Some(flushed)
        } else {
            self.x1 = x;
            self.vmin = vmin2;
            self.vmax = vmax2;
            self.dt += 1;
            None
        }
    }

    /// Emits the current segment even though its tube is still non-empty,
    /// and re-anchors a new (empty, `dt = 0`) segment at the emitted endpoint.
    pub fn flush(&mut self) -> Svi {
        debug_assert!(self.dt >= 1, "flush requires at least one absorbed sample");

        let dt = self.dt as f64;
        let sv = if self.x1 - self.x0 < self.vmin * dt {
            self.x0 + self.vmin * dt
        } else if self.x1 - self.x0 > self.vmax * dt {
            self.x0 + self.vmax * dt
        } else {
            self.x1
        };

        let v = zigzag(quantize(sv - self.x0, self.quantum) as i32);
        let svi = Svi { dt: self.dt - 1, v };

        self.qx0 = quantize(sv, self.quantum);
        self.x0 = dequantize(self.qx0, self.quantum);
        svi
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_signal_emits_one_long_segment_on_flush() {
        let quantum = 0.002;
        let e = 0.009;
        let mut traj = TrajState::new(quantum);
        traj.add_first(5.0);
        for _ in 0..998 {
            assert!(traj.add(5.0, e).is_none());
        }
        let svi = traj.flush();
        assert_eq!(svi.dt, 998); // 999 samples absorbed after the first -> duration 999
    }

    #[test]
    fn ramp_within_tolerance_does_not_flush_early() {
        let quantum = 0.0001;
        let e = 0.0009;
        let mut traj = TrajState::new(quantum);
        traj.add_first(0.0);
        let mut flushes = 0;
        for i in 1..1000 {
            if traj.add(0.001 * i as f64, e).is_some() {
                flushes += 1;
            }
        }
        assert!(flushes <= 1, "a perfect ramp should need at most one intermediate flush");
    }

    #[test]
    fn slope_change_forces_a_flush() {
        let quantum = 0.0001;
        let e = 0.0009;
        let mut traj = TrajState::new(quantum);
        traj.add_first(0.0);
        let mut flushes = 0;
        for i in 1..500 {
            if traj.add(0.001 * i as f64, e).is_some() {
                flushes += 1;
            }
        }
        for i in 500..1000 {
            let x = 0.5 - 0.001 * (i - 500) as f64;
            if traj.add(x, e).is_some() {
                flushes += 1;
            }
        }
        assert!(flushes >= 1, "a slope reversal must force at least one flush");
    }
}
