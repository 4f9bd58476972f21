//! Read-only canceller diagnostics.
//!
//! A snapshot of the internal meters for a monitoring layer — the fields the
//! kernel wrapper used to print through `/proc`. Reading a snapshot takes no
//! locks; the host provides whatever synchronization it already has around
//! the instance.

/// Phase of the dual tap-set convergence controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConvergenceState {
    /// Foreground filter holds; background not (yet) outperforming it.
    #[default]
    Converged,
    /// Background filter has been outperforming the foreground and is
    /// accumulating wins toward promotion.
    Recovering,
    /// A promotion just happened; further promotions are blocked for a
    /// minimum dwell.
    Switching,
}

/// Snapshot of the canceller's level meters and control state.
///
/// Levels are leaky-integrated mean magnitudes of the internally scaled
/// (half-amplitude) samples, not dBm0; compare them to each other, not to
/// absolute thresholds.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoCancellerStats {
    /// Transmit (far-end reference) level.
    pub ltx: i32,
    /// Receive (near-end return) level.
    pub lrx: i32,
    /// Residual level after the foreground filter.
    pub lclean: i32,
    /// Residual level after the background filter.
    pub lclean_bg: i32,
    /// Background-noise floor estimate feeding the NLP and comfort noise.
    pub lbgn: i32,
    /// Step-size exponent used by the most recent background adaptation
    /// (`factor = residual << shift`). Retained while adaptation is held;
    /// cleared by `flush`.
    pub shift: i32,
    /// Remaining double-talk hold-off in samples; adaptation is frozen while
    /// non-zero.
    pub nonupdate_dwell: i32,
    /// Convergence controller phase.
    pub state: ConvergenceState,
}
