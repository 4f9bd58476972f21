//! Q15 FIR filtering over a shared transmit history.
//!
//! Ported from `drivers/misc/echo/fir.h`. Each new sample is written twice
//! (`buf[pos]` and `buf[pos + len]`), so the filter window is always the
//! contiguous slice `buf[pos..pos + len]` and the dot product never wraps.
//! The position walks downward, which keeps `window()[i]` aligned with tap
//! index `i`: `window()[0]` is the newest sample.
//!
//! The reference keeps one complete FIR state per tap set even though both
//! are fed the same transmit signal; here a single `TapHistory` serves both
//! the foreground and background tap sets.

/// Circular transmit-sample history with a double-write layout.
#[derive(Debug, Clone)]
pub struct TapHistory {
    buf: Vec<i16>,
    pos: usize,
    len: usize,
}

impl TapHistory {
    /// Creates a zeroed history of logical length `len`.
    ///
    /// `len` must match the tap-set length and is fixed for the life of the
    /// buffer.
    pub fn new(len: usize) -> Self {
        assert!(len > 0, "history length must be non-zero");
        Self {
            buf: vec![0; 2 * len],
            pos: len - 1,
            len,
        }
    }

    /// Logical length (the filter order).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Zeroes the history without reallocating.
    pub fn clear(&mut self) {
        self.buf.fill(0);
        self.pos = self.len - 1;
    }

    /// The sample the next `push` will overwrite, i.e. the one entering the
    /// history `len` samples ago. Used for rolling block-power updates.
    pub fn outgoing(&self) -> i16 {
        self.buf[self.pos]
    }

    /// Stores `sample` at the current position (and its mirror).
    pub fn push(&mut self, sample: i16) {
        self.buf[self.pos] = sample;
        self.buf[self.pos + self.len] = sample;
    }

    /// The contiguous filter window, newest sample first.
    pub fn window(&self) -> &[i16] {
        &self.buf[self.pos..self.pos + self.len]
    }

    /// Steps to the next write position. Call once per sample, after all tap
    /// sets have consumed the current window.
    pub fn advance(&mut self) {
        self.pos = if self.pos == 0 { self.len - 1 } else { self.pos - 1 };
    }
}

/// Q15 dot product of a tap set against the history window.
///
/// Double-width accumulation, truncating `>> 15` back to sample width, and
/// a truncating cast to `i16`, exactly as the reference's `fir16()`. The
/// accumulator is sized so that even 256 taps of full-scale products cannot
/// overflow (256 · 2^15 · 2^15 < 2^46); converged tap sets stay within the
/// reference's 32-bit range.
#[inline]
pub fn predict(taps: &[i16], window: &[i16]) -> i16 {
    debug_assert_eq!(taps.len(), window.len());
    let mut y = 0i64;
    for (&c, &x) in taps.iter().zip(window.iter()) {
        y += i64::from(c) * i64::from(x);
    }
    ((y >> 15) as i32) as i16
}
