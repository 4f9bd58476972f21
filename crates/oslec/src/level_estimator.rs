//! Leaky-integrator signal level tracking.
//!
//! Ported from the `Ltxacc`/`Lrxacc`/`Lcleanacc`/`Lbgn_acc` updates in
//! `drivers/misc/echo/echo.c`. One estimator shape serves every tracked
//! level; they differ only in time constant and in which signal feeds them.

use oslec_dsp::bit_ops::round_shift;

/// Single-pole envelope tracker over sample magnitudes.
///
/// `acc += |x| - level; level = round_shift(acc, log2tc)` — a fixed-point
/// leaky integrator with time constant `2^log2tc` samples.
#[derive(Debug, Clone)]
pub(crate) struct LevelEstimator {
    acc: i32,
    level: i32,
    log2tc: u32,
}

impl LevelEstimator {
    /// `log2tc` is the base-2 log of the time constant in samples: 5 for the
    /// fast signal meters (4 ms at 8 kHz), 12 for the background-noise
    /// tracker (~0.5 s).
    pub(crate) fn new(log2tc: u32) -> Self {
        Self {
            acc: 0,
            level: 0,
            log2tc,
        }
    }

    /// Feeds one magnitude and returns the updated level.
    pub(crate) fn update(&mut self, magnitude: i32) -> i32 {
        debug_assert!(magnitude >= 0);
        self.acc += magnitude - self.level;
        self.level = round_shift(self.acc, self.log2tc);
        self.level
    }

    /// Current level without updating.
    pub(crate) fn level(&self) -> i32 {
        self.level
    }

    pub(crate) fn reset(&mut self) {
        self.acc = 0;
        self.level = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settles_to_constant_magnitude() {
        let mut est = LevelEstimator::new(5);
        let mut level = 0;
        for _ in 0..500 {
            level = est.update(1000);
        }
        assert!(
            (level - 1000).abs() <= 1,
            "level {level} should settle at the input magnitude"
        );
    }

    #[test]
    fn slow_tracker_ignores_short_bursts() {
        let mut est = LevelEstimator::new(12);
        for _ in 0..2000 {
            est.update(100);
        }
        let before = est.level();
        // A 50-sample burst 20x the floor barely moves a 2^12 tracker.
        for _ in 0..50 {
            est.update(2000);
        }
        let after = est.level();
        assert!(
            after - before < 50,
            "burst moved slow tracker too far: {before} -> {after}"
        );
    }

    #[test]
    fn decays_back_to_zero_on_silence() {
        let mut est = LevelEstimator::new(5);
        for _ in 0..500 {
            est.update(5000);
        }
        for _ in 0..1000 {
            est.update(0);
        }
        assert!(est.level() <= 1, "stale level {}", est.level());
    }

    #[test]
    fn reset_matches_fresh_estimator() {
        let mut est = LevelEstimator::new(5);
        for i in 0..100 {
            est.update(i * 17 % 3000);
        }
        est.reset();

        let mut fresh = LevelEstimator::new(5);
        for i in 0..100 {
            assert_eq!(est.update(i * 31 % 2000), fresh.update(i * 31 % 2000));
        }
    }
}
