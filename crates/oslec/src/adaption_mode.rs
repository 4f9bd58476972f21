//! Canceller operating-mode bitmask.
//!
//! Ported from the `ECHO_CAN_USE_*` flags in `drivers/misc/echo/oslec.h`;
//! the bit values are kept so a kernel-ABI adapter can pass the host's mode
//! word straight through.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Bitmask selecting which parts of the canceller are active.
///
/// Written only through [`EchoCanceller::set_mode`](crate::EchoCanceller::set_mode)
/// (or at construction); read on every sample; never mutated by the filter
/// math itself.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct AdaptionMode(u32);

impl AdaptionMode {
    /// No processing beyond prediction and subtraction.
    pub const NONE: Self = Self(0);
    /// Enable tap adaptation. Without it the filter predicts and subtracts
    /// but never learns.
    pub const ADAPTION: Self = Self(0x01);
    /// Enable the non-linear processor. On its own it only tracks the
    /// background-noise level; pair it with [`Self::CNG`] or [`Self::CLIP`]
    /// to actually suppress the gated residual.
    pub const NLP: Self = Self(0x02);
    /// Replace suppressed residual with comfort noise matched to the
    /// background level. Only meaningful with [`Self::NLP`].
    pub const CNG: Self = Self(0x04);
    /// Zero the suppressed residual outright instead of synthesizing noise.
    /// Only meaningful with [`Self::NLP`]; [`Self::CNG`] takes precedence
    /// when both are set.
    pub const CLIP: Self = Self(0x08);
    /// DC-block the transmit path in [`EchoCanceller::hpf_tx`](crate::EchoCanceller::hpf_tx).
    pub const TX_HPF: Self = Self(0x10);
    /// DC-block the receive path before cancellation.
    pub const RX_HPF: Self = Self(0x20);

    /// Returns true if every bit of `other` is set in `self`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// The raw bit pattern (kernel ABI values).
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Reconstructs a mode from a raw bit pattern, ignoring unknown bits.
    #[inline]
    pub const fn from_bits_truncate(bits: u32) -> Self {
        Self(bits & 0x3F)
    }
}

impl BitOr for AdaptionMode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for AdaptionMode {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for AdaptionMode {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Debug for AdaptionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(AdaptionMode, &str); 6] = [
            (AdaptionMode::ADAPTION, "ADAPTION"),
            (AdaptionMode::NLP, "NLP"),
            (AdaptionMode::CNG, "CNG"),
            (AdaptionMode::CLIP, "CLIP"),
            (AdaptionMode::TX_HPF, "TX_HPF"),
            (AdaptionMode::RX_HPF, "RX_HPF"),
        ];

        if self.0 == 0 {
            return f.write_str("NONE");
        }
        let mut first = true;
        for (flag, name) in NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_values_match_kernel_abi() {
        assert_eq!(AdaptionMode::ADAPTION.bits(), 0x01);
        assert_eq!(AdaptionMode::NLP.bits(), 0x02);
        assert_eq!(AdaptionMode::CNG.bits(), 0x04);
        assert_eq!(AdaptionMode::CLIP.bits(), 0x08);
        assert_eq!(AdaptionMode::TX_HPF.bits(), 0x10);
        assert_eq!(AdaptionMode::RX_HPF.bits(), 0x20);
    }

    #[test]
    fn contains_requires_all_bits() {
        let mode = AdaptionMode::ADAPTION | AdaptionMode::NLP;
        assert!(mode.contains(AdaptionMode::ADAPTION));
        assert!(mode.contains(AdaptionMode::NLP));
        assert!(!mode.contains(AdaptionMode::CNG));
        assert!(!mode.contains(AdaptionMode::NLP | AdaptionMode::CNG));
    }

    #[test]
    fn from_bits_truncate_drops_unknown_bits() {
        let mode = AdaptionMode::from_bits_truncate(0xFF);
        assert_eq!(mode.bits(), 0x3F);
    }

    #[test]
    fn debug_lists_set_flags() {
        let mode = AdaptionMode::ADAPTION | AdaptionMode::RX_HPF;
        assert_eq!(format!("{mode:?}"), "ADAPTION | RX_HPF");
        assert_eq!(format!("{:?}", AdaptionMode::NONE), "NONE");
    }
}
