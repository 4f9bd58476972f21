//! Oslec line echo canceller — pure Rust port.
//!
//! A fixed-point adaptive line echo canceller for 8 kHz telephony: NLMS-style
//! tap adaptation with power-normalized step size, dual tap sets for safe
//! reconvergence, double-talk hold-off, and a non-linear processor with
//! comfort noise.
//!
//! # Quick Start
//!
//! ```
//! use oslec::{AdaptionMode, EchoCanceller};
//!
//! let mode = AdaptionMode::ADAPTION | AdaptionMode::NLP | AdaptionMode::CNG;
//! let mut ec = EchoCanceller::new(128, mode).unwrap();
//!
//! // For each synchronized 8 kHz sample pair, tx being the far-end
//! // reference and rx the near-end return:
//! let clean = ec.update(1000, 250);
//!
//! // Reuse across calls without reallocating:
//! ec.flush();
//! ```
//!
//! `update()` never allocates, never blocks, and produces a defined output
//! for any `i16` input pair. One instance per channel; drive each instance
//! from a single thread at a time.

mod adaption_mode;
pub(crate) mod double_talk;
mod echo_canceller;
pub(crate) mod level_estimator;
pub mod monitor;
pub(crate) mod nonlinear_processor;
pub mod stats;
pub(crate) mod tap_set;

// Public re-exports.
pub use adaption_mode::AdaptionMode;
pub use echo_canceller::{CreateError, EchoCanceller};
pub use stats::{ConvergenceState, EchoCancellerStats};
