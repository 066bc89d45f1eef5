//! # mantissa-close: Float Comparison in Mantissa Bits
//!
//! Approximate equality for `f32` / `f64` data, with tolerance expressed as
//! "how many trailing mantissa bits may differ" instead of an epsilon.
//!
//! ## Design Principles
//!
//! 1. **Bits, not epsilons**: distance is the count of representable values
//!    between two floats, measured on their raw IEEE-754 patterns
//! 2. **Sentinels are types**: "both below the noise floor" and
//!    "non-finite mismatch" are `Distance` variants, not magic integers
//! 3. **Reports, not panics**: every comparison returns a
//!    `ComparisonReport`; callers decide how to surface a failure
//! 4. **Tensors stay outside**: the engine reads flat slices; structured
//!    data goes through the `TensorView` adapter
//!
//! ## Quick Start
//!
//! ```rust
//! use mantissa_close::{Comparator, CompareConfig};
//!
//! let cmp = Comparator::new(CompareConfig::default().with_tolerance_bits(2));
//! let report = cmp.compare(&[1.0f32, 2.0, 3.0], &[1.0, 2.0, 3.0]);
//! assert!(report.passed);
//! println!("{report}");
//! ```
//!
//! ## Components
//!
//! | Component | Module | Description |
//! |-----------|--------|-------------|
//! | BitDistance | `model::distance` | Steps between two same-width floats |
//! | ToleranceModel | `model::tolerance` | Tolerance bits → max distance |
//! | MantissaMatch | `model::mantissa` | Distance → agreeing mantissa bits |
//! | SequenceComparator | `compare` | Elementwise check, stats, report |
//! | TensorAdapter | `tensor` | Shape/layout checks, flattening |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod compare;
pub mod config;
pub mod tensor;

// ============================================================================
// Re-exports: Model
// ============================================================================

pub use model::{
    Distance, FloatBits, FloatLayout, ToleranceSpec, ClampPolicy,
    distance, distances, max_distance, matching_bits,
    F32_LAYOUT, F64_LAYOUT, DEFAULT_MIN_TOLERANCE_BITS, DEFAULT_TOLERANCE_BITS,
};

// ============================================================================
// Re-exports: Comparison
// ============================================================================

pub use compare::{
    Comparator, ComparisonReport, DistanceStats, Extremum, Mismatch, Outcome,
    all_close_f, close_f, assert_all_close_f,
};
pub use config::{CompareConfig, INFO_ENV_VAR};

// ============================================================================
// Re-exports: Tensors
// ============================================================================

pub use tensor::{Layout, Tensor, TensorView, compare_tensors, compare_tensor_batches};

// ============================================================================
// Error Types
// ============================================================================

/// Why two inputs could not be compared at all.
///
/// Carried inside a failed [`ComparisonReport`]; no element data is read
/// once one of these is detected.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, thiserror::Error)]
pub enum Precondition {
    #[error("length mismatch: expected {expected} elements, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Cannot compare tensors with different layouts ({expected} vs {actual})")]
    LayoutMismatch { expected: String, actual: String },

    #[error("Cannot compare tensors with different shapes ({expected:?} vs {actual:?})")]
    ShapeMismatch { expected: Vec<usize>, actual: Vec<usize> },

    #[error("Cannot compare tensor batches of different sizes ({expected} vs {actual})")]
    BatchSizeMismatch { expected: usize, actual: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Precondition failed: {0}")]
    Precondition(#[from] Precondition),

    #[error("Numeric mismatch:\n{0}")]
    Mismatch(String),

    #[error("Invalid tensor: {0}")]
    InvalidTensor(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
