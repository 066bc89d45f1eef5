//! # Bit Distance
//!
//! Distance between two same-width floats, counted in representable steps
//! (ULPs) along the order-preserving encoding from [`ordered_bits`].
//!
//! ```text
//!   -inf ... -1.0 ... -0.0 == +0.0 ... 1.0 ... +inf
//!     |        |          |              |        |
//!   encoded as a monotonic unsigned scale, distance = |enc(a) - enc(b)|
//! ```
//!
//! Two outcomes are not step counts and get their own variants:
//! both operands below the noise floor, and an irreconcilable non-finite
//! pair. Keeping them out of the numeric range means no step count can
//! collide with a sentinel.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::float_bits::{FloatBits, FloatLayout, ordered_bits};
use crate::{Precondition, Result};

/// Result of comparing two floats of the same width.
///
/// Variant order is significant: every `Steps` sorts below
/// `NonFiniteMismatch`, which sorts below `BelowMinSignal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "steps", rename_all = "snake_case")]
pub enum Distance {
    /// Number of representable values between the operands.
    Steps(u64),
    /// Opposite infinities, or exactly one operand non-finite.
    NonFiniteMismatch,
    /// Both operands were smaller in magnitude than the noise floor.
    BelowMinSignal,
}

impl Distance {
    /// Step count, if this is a numeric distance.
    #[inline]
    pub fn steps(self) -> Option<u64> {
        match self {
            Distance::Steps(n) => Some(n),
            _ => None,
        }
    }

    #[inline]
    pub fn is_below_min_signal(self) -> bool {
        matches!(self, Distance::BelowMinSignal)
    }

    /// Numeric view used where sentinels must take part in arithmetic
    /// (the median). Both sentinels saturate to the width's maximum.
    #[inline]
    pub fn saturating_steps(self, layout: FloatLayout) -> u64 {
        match self {
            Distance::Steps(n) => n,
            Distance::NonFiniteMismatch | Distance::BelowMinSignal => layout.max_steps(),
        }
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distance::Steps(n) => write!(f, "{n} ulp"),
            Distance::NonFiniteMismatch => f.write_str("non-finite mismatch"),
            Distance::BelowMinSignal => f.write_str("below min_signal"),
        }
    }
}

// ============================================================================
// Per-element distance
// ============================================================================

/// Distance in representable steps between `a` and `b`.
///
/// - NaN vs NaN and same-signed infinities are equal (`Steps(0)`).
/// - Any other pairing involving a non-finite value is `NonFiniteMismatch`.
/// - If both magnitudes are strictly below `min_signal`'s magnitude the pair
///   is `BelowMinSignal`, whatever their relative difference.
/// - A NaN or infinite `min_signal` is replaced by `T::MIN_POSITIVE`.
pub fn distance<T: FloatBits>(a: T, b: T, min_signal: T) -> Distance {
    let layout = T::LAYOUT;
    let min_signal = effective_min_signal(min_signal);

    if !a.is_finite() || !b.is_finite() {
        if a.is_nan() && b.is_nan() {
            return Distance::Steps(0);
        }
        if a.is_infinite() && b.is_infinite() && a.is_sign_positive() == b.is_sign_positive() {
            return Distance::Steps(0);
        }
        return Distance::NonFiniteMismatch;
    }

    let a_raw = a.to_raw_bits();
    let b_raw = b.to_raw_bits();

    // Magnitudes come from the raw patterns, not the encoded ones
    let abs = layout.abs_mask();
    let floor = min_signal.to_raw_bits() & abs;
    if (a_raw & abs) < floor && (b_raw & abs) < floor {
        return Distance::BelowMinSignal;
    }

    let a_enc = ordered_bits(a_raw, layout);
    let b_enc = ordered_bits(b_raw, layout);
    Distance::Steps(a_enc.abs_diff(b_enc))
}

/// Noise floor actually applied for `min_signal`.
///
/// A non-finite floor would have a magnitude pattern above every finite
/// value and turn every comparison into noise.
#[inline]
pub fn effective_min_signal<T: FloatBits>(min_signal: T) -> T {
    if min_signal.is_finite() {
        min_signal
    } else {
        T::MIN_POSITIVE
    }
}

/// Elementwise [`distance`] over two equal-length slices.
///
/// # Errors
///
/// Returns [`Precondition::LengthMismatch`] (as an error) if the slices
/// differ in length.
pub fn distances<T: FloatBits>(a: &[T], b: &[T], min_signal: T) -> Result<Vec<Distance>> {
    if a.len() != b.len() {
        return Err(Precondition::LengthMismatch {
            expected: a.len(),
            actual: b.len(),
        }
        .into());
    }
    Ok(a.iter()
        .zip(b)
        .map(|(&x, &y)| distance(x, y, min_signal))
        .collect())
}
