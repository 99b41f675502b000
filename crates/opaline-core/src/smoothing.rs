//! Parameter smoothing for avoiding zipper noise during automation.
//!
//! [`Smoother`] is a one-pole lag that advances once per *smoothing block*
//! rather than once per sample: the processor steps every smoother at a
//! fixed cadence (see [`crate::types::DEFAULT_SMOOTHING_BLOCK`]) and feeds
//! the interpolated values into the engine's setters at the same cadence.
//! Engine coefficients are therefore recomputed a handful of times per
//! callback instead of once per sample, which is all a perceptually slow
//! parameter change needs.
//!
//! # Usage
//!
//! ```ignore
//! let mut lag = Smoother::new();
//! lag.set_rate(5.0, 48_000.0, 8); // 5 ms time constant, 8-sample cadence
//! lag.snap_to(0.0);
//! lag.set_target(1.0);
//! let value = lag.step(); // once per smoothing block
//! ```
//!
//! # Thread Safety
//!
//! `Smoother` requires `&mut self` for advancing state and is intended for
//! single-threaded audio processing only. Cross-thread parameter traffic
//! goes through the message queues, never through the smoother itself.

/// Threshold for snapping to target value to avoid denormals and finish smoothing.
const SNAP_THRESHOLD: f64 = 1e-8;

/// A block-cadence one-pole parameter smoother.
///
/// The interpolated value converges monotonically toward the target; it
/// never overshoots the interval between the old and new targets. Until
/// [`set_rate`](Self::set_rate) has run with a real sample rate the smoother
/// passes targets through unsmoothed ("not yet activated").
#[derive(Debug, Clone)]
pub struct Smoother {
    current: f64,
    target: f64,
    // Per-block pole coefficient. 1.0 until activation supplies a rate.
    coefficient: f64,
}

impl Smoother {
    /// Create a new smoother at value 0.0 with an instant (unactivated) rate.
    pub fn new() -> Self {
        Self {
            current: 0.0,
            target: 0.0,
            coefficient: 1.0,
        }
    }

    /// Recompute the per-block coefficient from a time constant.
    ///
    /// `block_size` is the number of samples between [`step`](Self::step)
    /// calls. Call this whenever the sample rate or smoothing cadence
    /// changes (on activation).
    ///
    /// A zero or negative `sample_rate` means the host has not activated the
    /// processor yet; the computation is deferred and the smoother keeps
    /// passing values through instantly. Never divides by zero.
    pub fn set_rate(&mut self, time_constant_ms: f64, sample_rate: f64, block_size: u32) {
        if sample_rate <= 0.0 {
            return;
        }

        let samples_per_tau = time_constant_ms * 0.001 * sample_rate;
        if samples_per_tau > 0.0 {
            // One-pole: reach ~63% of a step after one time constant.
            self.coefficient = 1.0 - (-(block_size as f64) / samples_per_tau).exp();
        } else {
            self.coefficient = 1.0;
        }
    }

    /// Record a new target value.
    ///
    /// Takes effect from the next [`step`](Self::step); an event landing
    /// mid-cadence does not retroactively bend samples already rendered.
    #[inline]
    pub fn set_target(&mut self, target: f64) {
        self.target = target;
    }

    /// Set interpolated value and target to `value` immediately, no ramp.
    ///
    /// Used on reset-to-default and patch load, where stepping is the
    /// intended behavior and a ramp would be wrong.
    #[inline]
    pub fn snap_to(&mut self, value: f64) {
        self.current = value;
        self.target = value;
    }

    /// Advance the interpolated value one block-step toward the target.
    ///
    /// Call exactly once per smoothing block on the audio thread.
    #[inline]
    pub fn step(&mut self) -> f64 {
        self.current += self.coefficient * (self.target - self.current);

        // Land exactly on target when close enough; also keeps the
        // difference from decaying into denormal territory.
        if (self.current - self.target).abs() < SNAP_THRESHOLD {
            self.current = self.target;
        }
        self.current
    }

    /// Get the current interpolated value without advancing.
    #[inline]
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Get the target value.
    #[inline]
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Returns true if still converging toward the target.
    #[inline]
    pub fn is_smoothing(&self) -> bool {
        (self.current - self.target).abs() > SNAP_THRESHOLD
    }
}

impl Default for Smoother {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unactivated_passes_through() {
        // No set_rate call: targets apply on the first step, no ramp.
        let mut s = Smoother::new();
        s.snap_to(0.0);
        s.set_target(1.0);
        assert!((s.step() - 1.0).abs() < 1e-12);
        assert!(!s.is_smoothing());
    }

    #[test]
    fn test_zero_sample_rate_deferred() {
        let mut s = Smoother::new();
        s.set_rate(5.0, 0.0, 8);
        s.snap_to(0.25);
        s.set_target(0.75);
        // Still instant: the rate computation was deferred, not zeroed.
        assert!((s.step() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_snap_is_instant() {
        let mut s = Smoother::new();
        s.set_rate(5.0, 48_000.0, 8);
        s.snap_to(0.3);
        assert!((s.current() - 0.3).abs() < 1e-12);
        assert!((s.target() - 0.3).abs() < 1e-12);
        assert!(!s.is_smoothing());
    }

    #[test]
    fn test_monotonic_convergence_no_overshoot() {
        let mut s = Smoother::new();
        s.set_rate(5.0, 48_000.0, 8);
        s.snap_to(0.0);
        s.set_target(1.0);

        let mut prev = s.current();
        for _ in 0..10_000 {
            let v = s.step();
            assert!(v >= prev - 1e-12, "not monotonic: {} then {}", prev, v);
            assert!(v <= 1.0 + 1e-12, "overshoot: {}", v);
            prev = v;
        }
        assert!((s.current() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_retarget_mid_ramp_stays_in_envelope() {
        let mut s = Smoother::new();
        s.set_rate(5.0, 48_000.0, 8);
        s.snap_to(0.0);
        s.set_target(1.0);

        // A few steps separated by fewer than one smoothing block of
        // settling, then a retarget back below the current value.
        for _ in 0..3 {
            s.step();
        }
        let at_retarget = s.current();
        s.set_target(0.02);
        assert!(at_retarget > 0.02);
        let mut prev = s.current();
        for _ in 0..10_000 {
            let v = s.step();
            let lo = 0.02 - 1e-12;
            let hi = at_retarget + 1e-12;
            assert!(v >= lo && v <= hi, "escaped envelope: {}", v);
            assert!(v <= prev + 1e-12);
            prev = v;
        }
        assert!((s.current() - 0.02).abs() < 1e-6);
    }

    #[test]
    fn test_rate_follows_block_size() {
        // A larger block size covers the same time constant in fewer steps,
        // so each step moves proportionally further.
        let mut fine = Smoother::new();
        fine.set_rate(5.0, 48_000.0, 8);
        let mut coarse = Smoother::new();
        coarse.set_rate(5.0, 48_000.0, 64);

        fine.snap_to(0.0);
        fine.set_target(1.0);
        coarse.snap_to(0.0);
        coarse.set_target(1.0);

        assert!(coarse.step() > fine.step());
    }
}
