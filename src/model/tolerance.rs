//! # Tolerance Model
//!
//! Converts "relax the last N mantissa bits" into the largest step count
//! that still counts as a match:
//!
//! ```text
//! shift        = total - (sign + exponent + (mantissa - implicit 1) - tolerance_bits)
//! max_distance = 1 << shift
//!
//! f32, 2 tolerance bits:  32 - (1 + 8 + (24 - 1) - 2) = 2   → 4 ulp
//! f64, 2 tolerance bits:  64 - (1 + 11 + (53 - 1) - 2) = 2  → 4 ulp
//! ```
//!
//! Requested bits are clamped through a [`ClampPolicy`] so the shift stays
//! inside the width. Both widths share the same policy; the floor is an
//! explicit configuration value rather than a per-width constant.

use serde::{Deserialize, Serialize};

use super::float_bits::{FloatBits, FloatLayout};

/// Default lower clamp for tolerance bits, shared by f32 and f64.
pub const DEFAULT_MIN_TOLERANCE_BITS: u32 = 2;

/// Default requested tolerance when a caller does not pass one.
pub const DEFAULT_TOLERANCE_BITS: i32 = 2;

/// Largest acceptable distance for `tolerance_bits`.
///
/// Bits above `mantissa_bits - 1` are treated as `mantissa_bits - 1`, the
/// loosest threshold that still keeps the implicit bit. No floor is applied
/// here; use [`ClampPolicy::spec`] for that.
#[inline]
pub fn max_distance(tolerance_bits: u32, layout: FloatLayout) -> u64 {
    let tolerance_bits = tolerance_bits.min(layout.mantissa_bits - 1);
    let kept = layout.sign_bits + layout.exponent_bits + (layout.mantissa_bits - 1);
    let shift = layout.total_bits - (kept - tolerance_bits);
    1u64 << shift
}

// ============================================================================
// Clamp policy
// ============================================================================

/// How requested tolerance bits are forced into the valid range
/// `[floor, mantissa_bits - 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClampPolicy {
    /// Lowest tolerance ever applied. Capped at `mantissa_bits - 1`.
    pub floor: u32,
}

impl Default for ClampPolicy {
    fn default() -> Self {
        Self {
            floor: DEFAULT_MIN_TOLERANCE_BITS,
        }
    }
}

impl ClampPolicy {
    /// Policy that lets callers ask for exact (1 ulp) matching.
    pub const fn exact() -> Self {
        Self { floor: 0 }
    }

    /// Clamp `requested` for `layout`.
    pub fn clamp(&self, requested: i32, layout: FloatLayout) -> u32 {
        let ceiling = layout.mantissa_bits - 1;
        let floor = self.floor.min(ceiling);
        let requested = u32::try_from(requested.max(0)).unwrap_or(0);
        requested.clamp(floor, ceiling)
    }

    /// Clamp `requested` and build the resulting tolerance for width `T`.
    pub fn spec<T: FloatBits>(&self, requested: i32) -> ToleranceSpec {
        ToleranceSpec {
            tolerance_bits: self.clamp(requested, T::LAYOUT),
            layout: T::LAYOUT,
        }
    }
}

// ============================================================================
// ToleranceSpec
// ============================================================================

/// A clamped tolerance bound to a float layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToleranceSpec {
    pub tolerance_bits: u32,
    pub layout: FloatLayout,
}

impl ToleranceSpec {
    /// Threshold: distances at or below this are a match.
    #[inline]
    pub fn max_distance(&self) -> u64 {
        max_distance(self.tolerance_bits, self.layout)
    }

    /// Mantissa bit at which a mismatch starts being allowed.
    #[inline]
    pub fn min_matching_bits(&self) -> u32 {
        self.layout.mantissa_bits - self.tolerance_bits.min(self.layout.mantissa_bits - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::float_bits::{F32_LAYOUT, F64_LAYOUT};

    #[test]
    fn shift_equals_tolerance_bits_for_ieee_layouts() {
        assert_eq!(max_distance(0, F32_LAYOUT), 1);
        assert_eq!(max_distance(2, F32_LAYOUT), 4);
        assert_eq!(max_distance(23, F32_LAYOUT), 1 << 23);
        assert_eq!(max_distance(2, F64_LAYOUT), 4);
        assert_eq!(max_distance(52, F64_LAYOUT), 1 << 52);
    }

    #[test]
    fn out_of_range_bits_use_last_mantissa_bit() {
        assert_eq!(max_distance(24, F32_LAYOUT), 1 << 23);
        assert_eq!(max_distance(30, F32_LAYOUT), 1 << 23);
        assert_eq!(max_distance(40, F32_LAYOUT), 1 << 23);
        assert_eq!(max_distance(u32::MAX, F64_LAYOUT), 1 << 52);

        let loose = ToleranceSpec {
            tolerance_bits: 99,
            layout: F32_LAYOUT,
        };
        assert_eq!(loose.max_distance(), 1 << 23);
        assert_eq!(loose.min_matching_bits(), 1);
    }

    #[test]
    fn default_policy_floors_at_two_bits() {
        let policy = ClampPolicy::default();
        assert_eq!(policy.clamp(0, F32_LAYOUT), 2);
        assert_eq!(policy.clamp(-7, F64_LAYOUT), 2);
        assert_eq!(policy.clamp(5, F64_LAYOUT), 5);
    }

    #[test]
    fn ceiling_is_last_mantissa_bit() {
        let policy = ClampPolicy::exact();
        assert_eq!(policy.clamp(24, F32_LAYOUT), 23);
        assert_eq!(policy.clamp(i32::MAX, F32_LAYOUT), 23);
        assert_eq!(policy.clamp(100, F64_LAYOUT), 52);
    }

    #[test]
    fn oversized_floor_is_capped() {
        let policy = ClampPolicy { floor: 40 };
        assert_eq!(policy.clamp(0, F32_LAYOUT), 23);
        assert_eq!(policy.clamp(0, F64_LAYOUT), 40);
    }

    #[test]
    fn negative_request_with_exact_policy_is_zero() {
        assert_eq!(ClampPolicy::exact().clamp(-1, F32_LAYOUT), 0);
    }

    #[test]
    fn spec_reports_allowed_mismatch_position() {
        let spec = ClampPolicy::default().spec::<f32>(2);
        assert_eq!(spec.tolerance_bits, 2);
        assert_eq!(spec.max_distance(), 4);
        assert_eq!(spec.min_matching_bits(), 22);

        let spec = ClampPolicy::default().spec::<f64>(10);
        assert_eq!(spec.max_distance(), 1024);
        assert_eq!(spec.min_matching_bits(), 43);
    }

    #[test]
    fn max_distance_is_monotonic_over_clamp_range() {
        for layout in [F32_LAYOUT, F64_LAYOUT] {
            let policy = ClampPolicy::exact();
            let mut prev = 0;
            for requested in -3..70 {
                let d = max_distance(policy.clamp(requested, layout), layout);
                assert!(d >= prev, "{} bits: {d} < {prev}", requested);
                prev = d;
            }
        }
    }
}
