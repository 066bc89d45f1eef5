//! Mantissa match: invert the tolerance formula for reporting.
//!
//! The pass/fail check is `distance <= 1 << shift`. Given an observed
//! distance, find the smallest such single-bit threshold that bounds it and
//! solve the tolerance formula (with zero tolerance bits) for the number of
//! mantissa bits that still agree. Never used for the pass/fail decision.

use super::distance::Distance;
use super::float_bits::FloatLayout;

/// Leading mantissa bits (implicit 1 included) that agree for a step count.
pub fn matching_bits_for_steps(steps: u64, layout: FloatLayout) -> u32 {
    let mut shift = if steps == 0 { 0 } else { 63 - steps.leading_zeros() };
    // More than one bit on needs the next single-bit threshold up
    if steps.count_ones() > 1 {
        shift += 1;
    }

    if shift >= layout.mantissa_bits {
        return 0;
    }
    // total - (sign + exponent + (shift - implicit 1)), kept non-negative
    layout.total_bits + 1 - (layout.sign_bits + layout.exponent_bits + shift)
}

/// [`matching_bits_for_steps`] on a [`Distance`]. Sentinels report 0.
pub fn matching_bits(distance: Distance, layout: FloatLayout) -> u32 {
    match distance {
        Distance::Steps(n) => matching_bits_for_steps(n, layout),
        Distance::NonFiniteMismatch | Distance::BelowMinSignal => 0,
    }
}
