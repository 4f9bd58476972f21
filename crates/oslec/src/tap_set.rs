//! Dual tap-set convergence controller.
//!
//! Ported from the transfer logic in `drivers/misc/echo/echo.c`, which
//! implements the two-path algorithm of Ochiai, Areseki and Ogihara ("Echo
//! Canceler with Two Echo Path Models", IEEE Trans. Comm., 1977): the
//! background filter adapts continuously and is promoted to foreground only
//! once it has demonstrably outperformed it. The reference tracked this with
//! a bare counter; here the phases are an explicit state machine, and a
//! minimum dwell after each promotion prevents the two sets from thrashing.
//!
//! Promotion conditions per sample (all must hold):
//! - adaptation enabled and no double-talk hold-off,
//! - `8 * Lclean_bg < 7 * Lclean` — background residual at least ~1 dB below
//!   foreground,
//! - `8 * Lclean_bg < Ltx` — background residual at least 18 dB below the
//!   transmit level, so the comparison is about echo, not noise.

use crate::stats::ConvergenceState;

/// Consecutive winning samples the background filter needs before promotion.
const WINS_TO_PROMOTE: u32 = 6;

/// Samples after a promotion during which no further promotion may occur.
const PROMOTION_DWELL: u32 = 128;

#[derive(Debug, Clone)]
enum State {
    Converged,
    Recovering { wins: u32 },
    Switching { dwell: u32 },
}

#[derive(Debug, Clone)]
pub(crate) struct TapSetController {
    state: State,
}

impl TapSetController {
    pub(crate) fn new() -> Self {
        Self {
            state: State::Converged,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.state = State::Converged;
    }

    /// Advances one sample; returns true when the background tap set should
    /// be copied over the foreground set now.
    ///
    /// `background_wins` is the per-sample promotion condition evaluated by
    /// the caller from the current levels.
    pub(crate) fn step(&mut self, background_wins: bool) -> bool {
        match self.state {
            State::Switching { dwell } => {
                self.state = if dwell > 1 {
                    State::Switching { dwell: dwell - 1 }
                } else {
                    State::Converged
                };
                false
            }
            State::Converged if background_wins => {
                self.state = State::Recovering { wins: 1 };
                false
            }
            State::Recovering { wins } if background_wins => {
                if wins + 1 >= WINS_TO_PROMOTE {
                    tracing::trace!("background tap set promoted to foreground");
                    self.state = State::Switching {
                        dwell: PROMOTION_DWELL,
                    };
                    true
                } else {
                    self.state = State::Recovering { wins: wins + 1 };
                    false
                }
            }
            _ => {
                self.state = State::Converged;
                false
            }
        }
    }

    pub(crate) fn state(&self) -> ConvergenceState {
        match self.state {
            State::Converged => ConvergenceState::Converged,
            State::Recovering { .. } => ConvergenceState::Recovering,
            State::Switching { .. } => ConvergenceState::Switching,
        }
    }
}
