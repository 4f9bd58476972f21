//! DC-blocking high-pass filter.
//!
//! Ported from the TX/RX HPF blocks in `drivers/misc/echo/echo.c`.
//!
//! Any DC offset left over from codec quantization badly slows adaptive
//! filter convergence, so both signal paths can be conditioned with this
//! one-pole high-pass before the cancellation math sees them. Zero at DC,
//! pole at `1 - 2^-3` on the real axis; the 3 dB frequency in radians is
//! approximately the pole offset, so 0.125 rad ≈ 160 Hz at 8 kHz.

const DC_LOG2BETA: u32 = 3;

/// One-pole DC-blocking filter with a hard output limit.
///
/// The accumulator is kept in 64 bits where the reference used a 32-bit
/// `int`; values are identical whenever the reference arithmetic does not
/// overflow, and defined (then limited) when it would.
#[derive(Debug, Clone, Default)]
pub struct DcRestore {
    acc: i64,
    prev_in: i64,
}

impl DcRestore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the filter memory.
    pub fn reset(&mut self) {
        self.acc = 0;
        self.prev_in = 0;
    }

    /// Filters one sample, limiting the output to `±limit`.
    ///
    /// The RX path runs with `limit = 16383` (samples there are already
    /// scaled down by one bit); the standalone TX conditioner uses the full
    /// `32767`.
    pub fn process(&mut self, sample: i16, limit: i32) -> i16 {
        let mut x = i64::from(sample) << 15;
        // Compensate so the passband gain is 1.0. This can still saturate a
        // little under impulse conditions, but the limiter below keeps the
        // error small relative to the downstream processing.
        x -= x >> 4;

        self.acc += -(self.acc >> DC_LOG2BETA) + x - self.prev_in;
        self.prev_in = x;

        let y = (self.acc >> 15) as i32;
        y.clamp(-limit, limit) as i16
    }
}
