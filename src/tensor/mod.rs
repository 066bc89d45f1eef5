//! # Tensor Adapter
//!
//! The boundary between structured tensor-like objects and the sequence
//! comparator. A tensor is comparable to another only if both share the
//! same element layout and the same shape; that is checked before any data
//! is read. On success both are flattened in logical (row-major) order and
//! handed to [`Comparator::compare`].
//!
//! ## Implementations
//!
//! | Type | Module | Description |
//! |------|--------|-------------|
//! | `Tensor<T>` | `dense` | Owned in-memory buffer with explicit layout |
//!
//! Anything else that can describe its shape and layout and produce a flat
//! copy of its elements can implement [`TensorView`].

pub mod dense;

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::Precondition;
use crate::compare::{ComparisonReport, Comparator};
use crate::model::FloatBits;

pub use dense::Tensor;

/// Inline storage for shapes and strides; most tensors have ≤ 4 dims.
pub type Dims = SmallVec<[usize; 4]>;

// ============================================================================
// Layout
// ============================================================================

/// How elements are ordered in a tensor's backing buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layout {
    /// Last dimension varies fastest.
    RowMajor,
    /// First dimension varies fastest.
    ColumnMajor,
    /// Explicit per-dimension element strides.
    Strided(Dims),
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::RowMajor => f.write_str("row-major"),
            Layout::ColumnMajor => f.write_str("column-major"),
            Layout::Strided(strides) => write!(f, "strided{:?}", strides.as_slice()),
        }
    }
}

// ============================================================================
// TensorView trait
// ============================================================================

/// A tensor-like handle the comparator can read.
pub trait TensorView<T: FloatBits> {
    fn shape(&self) -> &[usize];

    fn layout(&self) -> &Layout;

    /// All elements in logical row-major order.
    fn to_flat(&self) -> Vec<T>;

    /// Number of elements implied by the shape.
    fn element_count(&self) -> usize {
        self.shape().iter().product()
    }
}

// ============================================================================
// Entry points
// ============================================================================

/// Structural precondition shared by both tensors of a pair.
fn check_comparable<T, A, B>(expected: &A, actual: &B) -> Option<Precondition>
where
    T: FloatBits,
    A: TensorView<T> + ?Sized,
    B: TensorView<T> + ?Sized,
{
    if expected.layout() != actual.layout() {
        return Some(Precondition::LayoutMismatch {
            expected: expected.layout().to_string(),
            actual: actual.layout().to_string(),
        });
    }
    if expected.shape() != actual.shape() {
        return Some(Precondition::ShapeMismatch {
            expected: expected.shape().to_vec(),
            actual: actual.shape().to_vec(),
        });
    }
    None
}

/// Compare two tensors after checking layout and shape.
pub fn compare_tensors<T, A, B>(expected: &A, actual: &B, comparator: &Comparator) -> ComparisonReport<T>
where
    T: FloatBits,
    A: TensorView<T> + ?Sized,
    B: TensorView<T> + ?Sized,
{
    if let Some(failure) = check_comparable::<T, A, B>(expected, actual) {
        warn!(%failure, "tensor comparison skipped");
        return ComparisonReport::precondition(
            failure,
            comparator.tolerance::<T>(),
            comparator.config().min_signal_for::<T>(),
            expected.element_count(),
        );
    }
    comparator.compare(&expected.to_flat(), &actual.to_flat())
}

/// Compare two batches pairwise, stopping at the first failure.
///
/// Returns that failure's report. When every pair passes, the result is a
/// summary report over all pairs' elements concatenated in batch order, so
/// `len`, the extrema and the median describe the whole batch. An empty
/// pair of batches passes vacuously.
pub fn compare_tensor_batches<T, V>(
    expected: &[V],
    actual: &[V],
    comparator: &Comparator,
) -> ComparisonReport<T>
where
    T: FloatBits,
    V: TensorView<T>,
{
    let tolerance = comparator.tolerance::<T>();
    let min_signal = comparator.config().min_signal_for::<T>();

    if expected.len() != actual.len() {
        let failure = Precondition::BatchSizeMismatch {
            expected: expected.len(),
            actual: actual.len(),
        };
        warn!(%failure, "batch comparison skipped");
        return ComparisonReport::precondition(failure, tolerance, min_signal, expected.len());
    }

    let mut all_expected = Vec::new();
    let mut all_actual = Vec::new();
    for (pair, (a, b)) in expected.iter().zip(actual).enumerate() {
        let report = compare_tensors(a, b, comparator);
        if !report.passed {
            debug!(pair, "batch stopped at failing pair");
            return report;
        }
        all_expected.extend(a.to_flat());
        all_actual.extend(b.to_flat());
    }
    comparator.compare(&all_expected, &all_actual)
}
