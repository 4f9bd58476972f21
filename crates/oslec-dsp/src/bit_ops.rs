//! Bit-level helpers for fixed-point arithmetic.
//!
//! Ported from `drivers/misc/echo/bit_operations.h`, reduced to the
//! operations the canceller actually uses. `round_shift` gives a name to the
//! `(x + (1 << (n - 1))) >> n` idiom that appears at every precision-dropping
//! step, so the rounding mode is stated once.

/// Index of the most significant set bit, or `-1` if `bits == 0`.
///
/// `top_bit(1) == 0`, `top_bit(0x8000_0000) == 31`.
#[inline]
pub fn top_bit(bits: u32) -> i32 {
    if bits == 0 {
        -1
    } else {
        31 - bits.leading_zeros() as i32
    }
}

/// Arithmetic right shift by `n` with round-to-nearest (ties away from
/// negative infinity): `(x + (1 << (n - 1))) >> n`.
///
/// This is the only rounding mode used in the canceller; plain `>>` is
/// reserved for places where the reference arithmetic truncates.
#[inline]
pub fn round_shift(x: i32, n: u32) -> i32 {
    debug_assert!(n >= 1);
    (x + (1 << (n - 1))) >> n
}
