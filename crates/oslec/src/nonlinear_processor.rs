//! Non-linear processor: residual suppression and comfort noise.
//!
//! Ported from the NLP block in `drivers/misc/echo/echo.c`. Once the linear
//! canceller has bought at least 24 dB of echo reduction, whatever residual
//! remains is mostly channel non-linearity (µ-law/A-law quantization) that
//! no linear filter can remove, so it is either zeroed outright (CLIP) or
//! replaced with synthesized comfort noise matched to the tracked
//! background level (CNG). Suppressing to digital silence sounds like the
//! line went dead; the CNG path fills the hole with a roughly Hoth-shaped
//! noise floor instead. With neither flavor selected the block only tracks
//! the background level and the residual passes through.

use crate::AdaptionMode;
use crate::level_estimator::LevelEstimator;

/// Suppression engages when `16 * Lclean < Ltx`, i.e. the canceller has
/// improved the echo by at least 24 dB (each factor of 2 is 6 dB).
const NLP_GATE_SHIFT: i32 = 16;

/// Residual level below which the background-noise tracker is allowed to
/// integrate; keeps near-end speech out of the noise-floor estimate.
const BGN_UPDATE_CEILING: i32 = 40;

/// Base-2 log of the background-noise tracker time constant (~0.5 s).
const BGN_LOG2TC: u32 = 12;

#[derive(Debug, Clone)]
pub(crate) struct NonLinearProcessor {
    background: LevelEstimator,
    cng_rndnum: u32,
    cng_filter: i32,
    cng_level: i32,
}

impl NonLinearProcessor {
    pub(crate) fn new() -> Self {
        Self {
            background: LevelEstimator::new(BGN_LOG2TC),
            cng_rndnum: 0,
            cng_filter: 0,
            cng_level: 0,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.background.reset();
        self.cng_rndnum = 0;
        self.cng_filter = 0;
        self.cng_level = 0;
    }

    /// Current background-noise level estimate.
    pub(crate) fn background_level(&self) -> i32 {
        self.background.level()
    }

    /// Post-processes one cancelled sample.
    ///
    /// `lclean` and `ltx` are the current residual and transmit levels; the
    /// mode bits select the suppression flavor. With NLP unset, or with
    /// neither CNG nor CLIP to pick a flavor, this is a passthrough.
    pub(crate) fn process(
        &mut self,
        clean: i16,
        lclean: i32,
        ltx: i32,
        mode: AdaptionMode,
    ) -> i16 {
        if !mode.contains(AdaptionMode::NLP) {
            return clean;
        }

        if NLP_GATE_SHIFT * lclean < ltx {
            if mode.contains(AdaptionMode::CNG) {
                self.cng_level = self.background.level();
                self.generate_comfort_noise()
            } else if mode.contains(AdaptionMode::CLIP) {
                // Hard suppression, the older flavor. Audibly worse than
                // CNG on long calls.
                0
            } else {
                clean
            }
        } else {
            // Residual is audible signal (echo leakage or near-end speech):
            // pass it through, and let the noise-floor tracker integrate
            // only when the residual is quiet enough to be noise.
            if lclean < BGN_UPDATE_CEILING {
                self.background.update(i32::from(clean).abs());
            }
            clean
        }
    }

    /// One sample of comfort noise at the latched background level: a
    /// wrapping LCG rolled off by a one-pole filter, very vaguely
    /// Hoth-shaped.
    fn generate_comfort_noise(&mut self) -> i16 {
        self.cng_rndnum = self
            .cng_rndnum
            .wrapping_mul(1664525)
            .wrapping_add(1013904223);
        let white = (self.cng_rndnum & 0xFFFF) as i32 - 32768;
        self.cng_filter = (white + 5 * self.cng_filter) >> 3;

        let scaled = (i64::from(self.cng_filter) * i64::from(self.cng_level) * 8) >> 14;
        scaled.clamp(i64::from(i16::MIN), i64::from(i16::MAX)) as i16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nlp_clip() -> AdaptionMode {
        AdaptionMode::NLP | AdaptionMode::CLIP
    }

    /// Settles the background tracker near `level` without engaging the
    /// suppression gate.
    fn seed_background(nlp: &mut NonLinearProcessor, level: i16) {
        for _ in 0..40_000 {
            // lclean below the update ceiling, gate open (16*30 >= 100).
            nlp.process(level, 30, 100, AdaptionMode::NLP);
        }
    }

    #[test]
    fn passthrough_when_nlp_disabled() {
        let mut nlp = NonLinearProcessor::new();
        assert_eq!(nlp.process(1234, 0, 10_000, AdaptionMode::ADAPTION), 1234);
    }

    #[test]
    fn passthrough_above_the_gate() {
        let mut nlp = NonLinearProcessor::new();
        // 16 * lclean >= ltx: residual is real signal.
        assert_eq!(nlp.process(-2500, 700, 10_000, nlp_clip()), -2500);
    }

    #[test]
    fn passthrough_without_cng_or_clip() {
        // NLP alone selects no suppression flavor: even a gated residual
        // passes through.
        let mut nlp = NonLinearProcessor::new();
        assert_eq!(nlp.process(300, 10, 10_000, AdaptionMode::NLP), 300);
    }

    #[test]
    fn clip_zeroes_the_suppressed_residual() {
        let mut nlp = NonLinearProcessor::new();
        assert_eq!(nlp.process(5000, 10, 10_000, nlp_clip()), 0);
        assert_eq!(nlp.process(-3, 10, 10_000, nlp_clip()), 0);
        // Above the gate the same residual passes untouched.
        assert_eq!(nlp.process(5000, 700, 10_000, nlp_clip()), 5000);
    }

    #[test]
    fn comfort_noise_matches_background_level() {
        let mode = AdaptionMode::NLP | AdaptionMode::CNG;
        let mut nlp = NonLinearProcessor::new();
        seed_background(&mut nlp, 1000);
        let lbgn = nlp.background_level();
        assert!((900..=1100).contains(&lbgn), "lbgn settled at {lbgn}");

        let mut sum_abs = 0i64;
        let mut max_abs = 0i64;
        const N: i64 = 8000;
        for _ in 0..N {
            let s = i64::from(nlp.process(0, 0, 10_000, mode)).abs();
            sum_abs += s;
            max_abs = max_abs.max(s);
        }
        let mean_abs = sum_abs / N;
        let lbgn = i64::from(lbgn);
        assert!(
            mean_abs >= lbgn / 4 && mean_abs <= 2 * lbgn,
            "CNG mean level {mean_abs} not matched to background {lbgn}"
        );
        assert!(
            max_abs <= 8 * lbgn,
            "CNG peak {max_abs} wildly above background {lbgn}"
        );
    }

    #[test]
    fn comfort_noise_is_deterministic() {
        let mode = AdaptionMode::NLP | AdaptionMode::CNG;
        let mut a = NonLinearProcessor::new();
        let mut b = NonLinearProcessor::new();
        seed_background(&mut a, 800);
        seed_background(&mut b, 800);
        for _ in 0..1000 {
            assert_eq!(
                a.process(0, 0, 10_000, mode),
                b.process(0, 0, 10_000, mode)
            );
        }
    }

    #[test]
    fn loud_residual_does_not_raise_the_noise_floor() {
        let mut nlp = NonLinearProcessor::new();
        seed_background(&mut nlp, 100);
        let before = nlp.background_level();
        // Residual level above the update ceiling: tracker must not move.
        for _ in 0..10_000 {
            nlp.process(8000, 500, 1000, AdaptionMode::NLP);
        }
        assert_eq!(nlp.background_level(), before);
    }
}
