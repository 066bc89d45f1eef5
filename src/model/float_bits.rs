//! # IEEE-754 Width Abstraction
//!
//! Every comparison in this crate runs on the raw bit pattern of a float,
//! reinterpreted as an unsigned integer of the same width:
//!
//! ```text
//! f32 layout:  [ sign (1b) | exponent (8b)  | mantissa (23b + implicit 1) ]
//!                bit 31      bits 30..23      bits 22..0
//!
//! f64 layout:  [ sign (1b) | exponent (11b) | mantissa (52b + implicit 1) ]
//!                bit 63      bits 62..52      bits 51..0
//! ```
//!
//! Bit patterns are carried zero-extended in a `u64` so the distance and
//! tolerance arithmetic is written once for both widths. All masks come
//! from [`FloatLayout`], never from hard-coded shifts.

use std::fmt::{Debug, Display};

use serde::{Deserialize, Serialize};

// ============================================================================
// Layout constants
// ============================================================================

/// Fixed bit layout of an IEEE-754 binary format.
///
/// `mantissa_bits` includes the implicit leading 1, so
/// `total_bits == exponent_bits + mantissa_bits` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FloatLayout {
    pub total_bits: u32,
    pub sign_bits: u32,
    pub exponent_bits: u32,
    pub mantissa_bits: u32,
}

/// IEEE-754 binary32.
pub const F32_LAYOUT: FloatLayout = FloatLayout {
    total_bits: 32,
    sign_bits: 1,
    exponent_bits: 8,
    mantissa_bits: 24,
};

/// IEEE-754 binary64.
pub const F64_LAYOUT: FloatLayout = FloatLayout {
    total_bits: 64,
    sign_bits: 1,
    exponent_bits: 11,
    mantissa_bits: 53,
};

impl FloatLayout {
    /// All bits of the native width set (`0xFFFF_FFFF` for f32).
    #[inline]
    pub const fn width_mask(&self) -> u64 {
        if self.total_bits >= 64 {
            u64::MAX
        } else {
            (1u64 << self.total_bits) - 1
        }
    }

    /// The sign bit alone.
    #[inline]
    pub const fn sign_mask(&self) -> u64 {
        1u64 << (self.total_bits - 1)
    }

    /// Everything except the sign bit.
    #[inline]
    pub const fn abs_mask(&self) -> u64 {
        self.width_mask() & !self.sign_mask()
    }

    /// Largest step count representable at this width.
    #[inline]
    pub const fn max_steps(&self) -> u64 {
        self.width_mask()
    }

    /// Short name used in reports.
    pub const fn name(&self) -> &'static str {
        match self.total_bits {
            32 => "f32",
            64 => "f64",
            _ => "float",
        }
    }
}

// ============================================================================
// FloatBits: the width trait
// ============================================================================

/// A float whose bits can be reinterpreted as an unsigned integer of the
/// same width. Implemented for `f32` and `f64`.
pub trait FloatBits: Copy + PartialEq + Debug + Display + Serialize + 'static {
    /// Bit layout of this width.
    const LAYOUT: FloatLayout;

    /// Smallest positive normal value; the default noise floor.
    const MIN_POSITIVE: Self;

    /// Raw bit pattern, zero-extended to 64 bits.
    fn to_raw_bits(self) -> u64;

    /// Narrow a configured `f64` to this width.
    fn from_f64(value: f64) -> Self;

    /// Widen to `f64` (lossless for both widths).
    fn to_f64(self) -> f64;

    fn is_nan(self) -> bool;
    fn is_infinite(self) -> bool;
    fn is_sign_positive(self) -> bool;

    #[inline]
    fn is_finite(self) -> bool {
        !self.is_nan() && !self.is_infinite()
    }
}

impl FloatBits for f32 {
    const LAYOUT: FloatLayout = F32_LAYOUT;
    const MIN_POSITIVE: Self = f32::MIN_POSITIVE;

    #[inline(always)]
    fn to_raw_bits(self) -> u64 {
        u64::from(self.to_bits())
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value as f32
    }

    #[inline]
    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    #[inline(always)]
    fn is_nan(self) -> bool {
        f32::is_nan(self)
    }

    #[inline(always)]
    fn is_infinite(self) -> bool {
        f32::is_infinite(self)
    }

    #[inline(always)]
    fn is_sign_positive(self) -> bool {
        f32::is_sign_positive(self)
    }
}

impl FloatBits for f64 {
    const LAYOUT: FloatLayout = F64_LAYOUT;
    const MIN_POSITIVE: Self = f64::MIN_POSITIVE;

    #[inline(always)]
    fn to_raw_bits(self) -> u64 {
        self.to_bits()
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline(always)]
    fn is_nan(self) -> bool {
        f64::is_nan(self)
    }

    #[inline(always)]
    fn is_infinite(self) -> bool {
        f64::is_infinite(self)
    }

    #[inline(always)]
    fn is_sign_positive(self) -> bool {
        f64::is_sign_positive(self)
    }
}

// ============================================================================
// Order-preserving encoding
// ============================================================================

/// Map a raw bit pattern onto an unsigned scale that preserves float order.
///
/// Negative values become the two's complement of their pattern (within the
/// width), positive values get the sign bit set. Negatives therefore land
/// below positives and magnitude order is kept within each sign. `+0.0` and
/// `-0.0` map to the same point.
#[inline(always)]
pub fn ordered_bits(raw: u64, layout: FloatLayout) -> u64 {
    let sign = layout.sign_mask();
    if raw & sign != 0 {
        (!raw).wrapping_add(1) & layout.width_mask()
    } else {
        raw | sign
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layouts_account_for_every_bit() {
        for layout in [F32_LAYOUT, F64_LAYOUT] {
            assert_eq!(layout.total_bits, layout.exponent_bits + layout.mantissa_bits);
            assert_eq!(layout.sign_bits, 1);
        }
    }

    #[test]
    fn masks_match_native_widths() {
        assert_eq!(F32_LAYOUT.width_mask(), u64::from(u32::MAX));
        assert_eq!(F32_LAYOUT.sign_mask(), 0x8000_0000);
        assert_eq!(F32_LAYOUT.abs_mask(), 0x7FFF_FFFF);
        assert_eq!(F64_LAYOUT.width_mask(), u64::MAX);
        assert_eq!(F64_LAYOUT.sign_mask(), 1u64 << 63);
        assert_eq!(F64_LAYOUT.abs_mask(), u64::MAX >> 1);
    }

    #[test]
    fn raw_bits_are_zero_extended() {
        assert_eq!((-1.0f32).to_raw_bits(), 0xBF80_0000);
        assert_eq!(1.0f64.to_raw_bits(), 0x3FF0_0000_0000_0000);
    }

    #[test]
    fn signed_zeros_share_an_encoding() {
        let pos = ordered_bits(0.0f32.to_raw_bits(), F32_LAYOUT);
        let neg = ordered_bits((-0.0f32).to_raw_bits(), F32_LAYOUT);
        assert_eq!(pos, neg);
        assert_eq!(pos, F32_LAYOUT.sign_mask());
    }

    #[test]
    fn encoding_preserves_order_across_sign() {
        let values = [-2.5f64, -1.0, -f64::MIN_POSITIVE, 0.0, 1e-300, 1.0, 3.0];
        let encoded: Vec<u64> = values
            .iter()
            .map(|v| ordered_bits(v.to_raw_bits(), F64_LAYOUT))
            .collect();
        assert!(encoded.windows(2).all(|w| w[0] < w[1]), "{encoded:?}");
    }

    #[test]
    fn encoding_stays_within_width() {
        let enc = ordered_bits(f32::MIN.to_raw_bits(), F32_LAYOUT);
        assert!(enc <= F32_LAYOUT.width_mask());
    }
}
