//! # Numeric Model
//!
//! Pure building blocks of the comparison engine: float width layouts,
//! bit distance, the tolerance model and its mantissa-match inverse.
//!
//! Design rule: no reporting, no tensors, no configuration here.
//! This module is pure functions over values: no I/O, no state.

pub mod float_bits;
pub mod distance;
pub mod tolerance;
pub mod mantissa;

pub use float_bits::{FloatBits, FloatLayout, F32_LAYOUT, F64_LAYOUT, ordered_bits};
pub use distance::{Distance, distance, distances, effective_min_signal};
pub use tolerance::{
    ClampPolicy, ToleranceSpec, max_distance,
    DEFAULT_MIN_TOLERANCE_BITS, DEFAULT_TOLERANCE_BITS,
};
pub use mantissa::{matching_bits, matching_bits_for_steps};
