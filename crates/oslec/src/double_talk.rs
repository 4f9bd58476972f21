//! Near-end speech (double-talk) detection.
//!
//! Ported from the DTD block in `drivers/misc/echo/echo.c`. The test is
//! deliberately crude: an echo can never be louder than the signal that
//! caused it, so a receive level above the transmit level means the near end
//! is talking. While that holds (plus a hangover to cover speech tails),
//! tap adaptation and tap-set promotion are suspended so the filter cannot
//! learn the near-end talker as if it were an echo-path change.

/// Hangover, in samples, applied after the last double-talk trigger (75 ms
/// at 8 kHz).
const DTD_HANGOVER: i32 = 600;

/// Receive level below which the rx/tx comparison is meaningless noise.
const MIN_RX_POWER_FOR_ADAPTION: i32 = 64;

#[derive(Debug, Clone, Default)]
pub(crate) struct DoubleTalkDetector {
    nonupdate_dwell: i32,
}

impl DoubleTalkDetector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// True while adaptation must stay frozen.
    ///
    /// Sampled *before* [`observe`](Self::observe) each sample: the
    /// background adaptation gate uses the dwell carried over from the
    /// previous sample, matching the reference ordering.
    pub(crate) fn holding(&self) -> bool {
        self.nonupdate_dwell != 0
    }

    /// Remaining hold-off in samples.
    pub(crate) fn dwell(&self) -> i32 {
        self.nonupdate_dwell
    }

    /// Feeds this sample's levels: re-arms the hangover on near-end speech,
    /// otherwise lets it run down by one.
    pub(crate) fn observe(&mut self, ltx: i32, lrx: i32) {
        if lrx > MIN_RX_POWER_FOR_ADAPTION && lrx > ltx {
            if self.nonupdate_dwell == 0 {
                tracing::trace!(ltx, lrx, "double-talk onset, freezing adaptation");
            }
            self.nonupdate_dwell = DTD_HANGOVER;
        }
        if self.nonupdate_dwell > 0 {
            self.nonupdate_dwell -= 1;
        }
    }

    pub(crate) fn reset(&mut self) {
        self.nonupdate_dwell = 0;
    }
}
