//! The adaptive echo canceller core.
//!
//! Ported from `drivers/misc/echo/echo.c` (`oslec_create` / `oslec_update` /
//! `oslec_flush` / `oslec_hpf_tx`).
//!
//! One instance per channel/call. The per-sample [`EchoCanceller::update`]
//! path performs no allocation, no locking and no I/O; the whole pipeline is
//! integer arithmetic with explicit shift/rounding steps, so a given input
//! stream always produces the same output stream.

use derive_more::Debug;

use oslec_dsp::bit_ops::{round_shift, top_bit};
use oslec_dsp::dc_restore::DcRestore;
use oslec_dsp::fir::{TapHistory, predict};

use crate::AdaptionMode;
use crate::double_talk::DoubleTalkDetector;
use crate::level_estimator::LevelEstimator;
use crate::monitor::{self, ChannelId};
use crate::nonlinear_processor::NonLinearProcessor;
use crate::stats::EchoCancellerStats;
use crate::tap_set::TapSetController;

/// Floor added to the history block power before deriving the adaptation
/// step, so a silent transmit path cannot blow the step size up.
const MIN_TX_POWER_FOR_ADAPTION: i32 = 64;

/// Base-2 log of the fast level-meter time constant (4 ms at 8 kHz).
const FAST_LOG2TC: u32 = 5;

/// RX-path HPF limit: samples there already carry the one-bit input scaling.
const RX_HPF_LIMIT: i32 = 16383;

/// TX conditioning runs on unscaled samples.
const TX_HPF_LIMIT: i32 = 32767;

/// Error from [`EchoCanceller::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateError {
    /// The filter length must cover at least one tap.
    ZeroFilterLength,
}

impl std::fmt::Display for CreateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::ZeroFilterLength => write!(f, "echo canceller filter length must be non-zero"),
        }
    }
}

impl std::error::Error for CreateError {}

/// Line echo canceller for one telephony channel.
///
/// Holds two tap sets over a shared transmit history: the foreground set
/// produces the output, the background set adapts continuously and is
/// promoted when it proves itself (see [`crate::stats::ConvergenceState`]).
#[derive(Debug)]
pub struct EchoCanceller {
    mode: AdaptionMode,
    taps: usize,
    log2taps: u32,
    channel: ChannelId,

    #[debug(skip)]
    foreground: Vec<i16>,
    #[debug(skip)]
    background: Vec<i16>,
    #[debug(skip)]
    history: TapHistory,

    /// Rolling block power of the history window, Q0.
    pstates: i32,
    /// Step-size exponent used by the last adaptation pass.
    shift: i32,

    ltx: LevelEstimator,
    lrx: LevelEstimator,
    lclean: LevelEstimator,
    lclean_bg: LevelEstimator,

    dtd: DoubleTalkDetector,
    controller: TapSetController,
    nlp: NonLinearProcessor,

    tx_hpf: DcRestore,
    rx_hpf: DcRestore,
}

#[inline]
fn sat16(x: i32) -> i16 {
    x.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

impl EchoCanceller {
    /// Creates a canceller with `taps` filter coefficients (echo-path span
    /// of `taps / 8` ms at 8 kHz; 128–256 is typical).
    pub fn new(taps: usize, mode: AdaptionMode) -> Result<Self, CreateError> {
        if taps == 0 {
            return Err(CreateError::ZeroFilterLength);
        }
        let channel = ChannelId::next();
        monitor::register(channel);
        tracing::debug!(?channel, taps, ?mode, "echo canceller created");

        Ok(Self {
            mode,
            taps,
            log2taps: top_bit(taps as u32) as u32,
            channel,
            foreground: vec![0; taps],
            background: vec![0; taps],
            history: TapHistory::new(taps),
            pstates: 0,
            shift: 0,
            ltx: LevelEstimator::new(FAST_LOG2TC),
            lrx: LevelEstimator::new(FAST_LOG2TC),
            lclean: LevelEstimator::new(FAST_LOG2TC),
            lclean_bg: LevelEstimator::new(FAST_LOG2TC),
            dtd: DoubleTalkDetector::new(),
            controller: TapSetController::new(),
            nlp: NonLinearProcessor::new(),
            tx_hpf: DcRestore::new(),
            rx_hpf: DcRestore::new(),
        })
    }

    /// Processes one synchronized sample pair: `tx` is the far-end reference
    /// being played into the line, `rx` the near-end return carrying its
    /// echo. Returns the echo-cancelled near-end sample.
    pub fn update(&mut self, tx: i16, rx: i16) -> i16 {
        // One bit of input scaling buys headroom against clipping when tx
        // runs hot; everything downstream works on half-amplitude samples.
        let tx = tx >> 1;
        let mut rx = rx >> 1;

        if self.mode.contains(AdaptionMode::RX_HPF) {
            rx = self.rx_hpf.process(rx, RX_HPF_LIMIT);
        }

        // Rolling block power over the filter window: out with the sample
        // leaving the history, in with the new one, so the whole window is
        // never re-summed.
        let incoming = i32::from(tx) * i32::from(tx);
        let outgoing = {
            let s = i32::from(self.history.outgoing());
            s * s
        };
        self.pstates += if self.log2taps > 0 {
            round_shift(incoming - outgoing, self.log2taps)
        } else {
            incoming - outgoing
        };
        if self.pstates < 0 {
            self.pstates = 0;
        }

        self.history.push(tx);

        let ltx = self.ltx.update(i32::from(tx).abs());
        let lrx = self.lrx.update(i32::from(rx).abs());

        // Foreground filter: predicts the echo the caller hears.
        let echo = predict(&self.foreground, self.history.window());
        let clean = sat16(i32::from(rx) - i32::from(echo));
        let lclean = self.lclean.update(i32::from(clean).abs());

        // Background filter: the one that learns.
        let echo_bg = predict(&self.background, self.history.window());
        let clean_bg = sat16(i32::from(rx) - i32::from(echo_bg));
        let lclean_bg = self.lclean_bg.update(i32::from(clean_bg).abs());

        // Background adaptation. The gate reads the hold-off carried over
        // from the previous sample; the detector observes afterwards.
        // `shift` keeps its last adapted value across held samples so the
        // stats snapshot stays meaningful; only `flush` clears it.
        if self.mode.contains(AdaptionMode::ADAPTION) && !self.dtd.holding() {
            // Step size per the NLMS stability rule f = beta * e / P,
            // computed as a pure exponent so no division lands on the
            // per-sample path: factor = clean_bg * 2^(30 - 2 - log2(P)),
            // with P the window power plus a silence floor.
            let p = MIN_TX_POWER_FOR_ADAPTION + self.pstates;
            let logp = top_bit(p as u32) + self.log2taps as i32;
            self.shift = 30 - 2 - logp;
            self.adapt_background(i32::from(clean_bg), self.shift);
        }

        self.dtd.observe(ltx, lrx);

        // Two-path transfer logic: promote the background set once it has
        // beaten the foreground for long enough, never during double talk.
        let background_wins = self.mode.contains(AdaptionMode::ADAPTION)
            && !self.dtd.holding()
            && 8 * lclean_bg < 7 * lclean
            && 8 * lclean_bg < ltx;
        if self.controller.step(background_wins) {
            self.foreground.copy_from_slice(&self.background);
        }

        let out = self.nlp.process(clean, lclean, ltx, self.mode);

        self.history.advance();
        // Undo the one-bit input scaling so the output sits at the caller's
        // level.
        sat16(i32::from(out) << 1)
    }

    fn adapt_background(&mut self, clean_bg: i32, shift: i32) {
        let factor = if shift >= 0 {
            i64::from(clean_bg) << shift
        } else {
            i64::from(clean_bg) >> -shift
        };

        // Tap adds wrap at 16 bits exactly as the reference's int16
        // arithmetic does; the transfer conditions never promote a wrapped
        // (diverged) background set.
        for (tap, &h) in self.background.iter_mut().zip(self.history.window()) {
            let delta = ((i64::from(h) * factor) >> 15) as i16;
            *tap = tap.wrapping_add(delta);
        }
    }

    /// Standalone transmit-path DC conditioning, for hosts that feed the
    /// line driver through the canceller. Passthrough unless
    /// [`AdaptionMode::TX_HPF`] is set.
    pub fn hpf_tx(&mut self, tx: i16) -> i16 {
        if self.mode.contains(AdaptionMode::TX_HPF) {
            self.tx_hpf.process(tx, TX_HPF_LIMIT)
        } else {
            tx
        }
    }

    /// Resets every adaptive structure to the just-created state without
    /// reallocating. Used when a channel is reused across calls.
    pub fn flush(&mut self) {
        self.foreground.fill(0);
        self.background.fill(0);
        self.history.clear();
        self.pstates = 0;
        self.shift = 0;
        self.ltx.reset();
        self.lrx.reset();
        self.lclean.reset();
        self.lclean_bg.reset();
        self.dtd.reset();
        self.controller.reset();
        self.nlp.reset();
        self.tx_hpf.reset();
        self.rx_hpf.reset();
        tracing::debug!(channel = ?self.channel, "echo canceller flushed");
    }

    /// Replaces the operating mode; takes effect on the next [`update`](Self::update).
    pub fn set_mode(&mut self, mode: AdaptionMode) {
        self.mode = mode;
    }

    pub fn mode(&self) -> AdaptionMode {
        self.mode
    }

    /// Filter length in taps.
    pub fn taps(&self) -> usize {
        self.taps
    }

    /// This instance's identity in the [`monitor`] registry.
    pub fn channel_id(&self) -> ChannelId {
        self.channel
    }

    /// The foreground tap set — the current estimate of the echo-path
    /// impulse response, Q15.
    pub fn echo_model(&self) -> &[i16] {
        &self.foreground
    }

    /// Snapshot of the level meters and control state.
    pub fn stats(&self) -> EchoCancellerStats {
        EchoCancellerStats {
            ltx: self.ltx.level(),
            lrx: self.lrx.level(),
            lclean: self.lclean.level(),
            lclean_bg: self.lclean_bg.level(),
            lbgn: self.nlp.background_level(),
            shift: self.shift,
            nonupdate_dwell: self.dtd.dwell(),
            state: self.controller.state(),
        }
    }
}

impl Drop for EchoCanceller {
    fn drop(&mut self) {
        monitor::deregister(self.channel);
    }
}
