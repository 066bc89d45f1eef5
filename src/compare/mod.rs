//! # Sequence Comparator
//!
//! Elementwise approximate equality of two equal-length float sequences.
//!
//! ```text
//! expected[i], actual[i] ──► distance() ──► ≤ max_distance? ──► pass / mismatch
//!                                 │
//!                                 └──► min / max / median ──► matching_bits() ──► report
//! ```
//!
//! Elements are visited in index order so the listed mismatches are the
//! first ones and ties on min/max go to the first occurrence.

pub mod median;
pub mod report;

use std::io::Write;

use tracing::{debug, trace, warn};

use crate::config::CompareConfig;
use crate::model::{
    ClampPolicy, Distance, FloatBits, ToleranceSpec, distance, matching_bits,
};
use crate::{Precondition, Result};

pub use median::{median_distance, midpoint};
pub use report::{ComparisonReport, DistanceStats, Extremum, Mismatch, Outcome};

// ============================================================================
// Comparator
// ============================================================================

/// Compares float sequences under one [`CompareConfig`].
#[derive(Debug, Clone, Default)]
pub struct Comparator {
    config: CompareConfig,
}

impl Comparator {
    pub fn new(config: CompareConfig) -> Self {
        Self { config }
    }

    /// Defaults plus the environment info toggle, read now and only now.
    pub fn from_env() -> Self {
        Self::new(CompareConfig::from_env())
    }

    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    /// Tolerance this comparator applies to width `T`.
    pub fn tolerance<T: FloatBits>(&self) -> ToleranceSpec {
        self.config.clamp_policy().spec::<T>(self.config.tolerance_bits)
    }

    /// Single-pair check with the same semantics as [`compare`](Self::compare).
    pub fn is_close<T: FloatBits>(&self, expected: T, actual: T) -> bool {
        within(
            distance(expected, actual, self.config.min_signal_for::<T>()),
            self.tolerance::<T>(),
        )
    }

    /// Compare `actual` against `expected` element by element.
    pub fn compare<T: FloatBits>(&self, expected: &[T], actual: &[T]) -> ComparisonReport<T> {
        let tolerance = self.tolerance::<T>();
        let min_signal = self.config.min_signal_for::<T>();

        if expected.len() != actual.len() {
            let failure = Precondition::LengthMismatch {
                expected: expected.len(),
                actual: actual.len(),
            };
            warn!(%failure, "sequence comparison skipped");
            return ComparisonReport::precondition(failure, tolerance, min_signal, expected.len());
        }
        if expected.is_empty() {
            return ComparisonReport::empty(tolerance, min_signal);
        }

        let layout = tolerance.layout;
        let threshold = tolerance.max_distance();
        let cap = self.config.max_reported_mismatches;

        let mut distances = Vec::with_capacity(expected.len());
        let mut mismatches = Vec::new();
        let mut mismatch_count = 0usize;
        let mut below_min_signal = 0usize;
        let mut tightest: Option<(usize, Distance)> = None;
        let mut loosest: Option<(usize, Distance)> = None;

        for (index, (&e, &a)) in expected.iter().zip(actual).enumerate() {
            let d = distance(e, a, min_signal);
            distances.push(d);

            if d.is_below_min_signal() {
                below_min_signal += 1;
                continue;
            }

            if loosest.is_none_or(|(_, max)| d > max) {
                loosest = Some((index, d));
            }
            if tightest.is_none_or(|(_, min)| d < min) {
                tightest = Some((index, d));
            }

            if !within(d, tolerance) {
                trace!(index, expected = %e, actual = %a, distance = %d, "element outside tolerance");
                if mismatch_count < cap {
                    mismatches.push(Mismatch {
                        index,
                        expected: e,
                        actual: a,
                        distance: d,
                    });
                }
                mismatch_count += 1;
            }
        }

        let extremum = |found: Option<(usize, Distance)>| {
            found.map(|(index, d)| Extremum {
                index,
                expected: expected[index],
                actual: actual[index],
                distance: d,
                matching_bits: matching_bits(d, layout),
            })
        };
        // distances is non-empty here
        let median = median_distance(&mut distances, layout).unwrap_or(Distance::BelowMinSignal);
        let stats = DistanceStats {
            tightest: extremum(tightest),
            loosest: extremum(loosest),
            median,
            median_matching_bits: matching_bits(median, layout),
        };

        let passed = mismatch_count == 0;
        debug!(
            width = layout.name(),
            len = expected.len(),
            passed,
            mismatch_count,
            below_min_signal,
            threshold,
            "sequence comparison finished"
        );

        ComparisonReport {
            passed,
            outcome: Outcome::Compared,
            tolerance,
            min_signal,
            len: expected.len(),
            mismatch_count,
            mismatches,
            below_min_signal,
            stats: Some(stats),
        }
    }

    /// [`compare`](Self::compare), writing the one-line summary to `sink`
    /// when the comparison passes and `info` is enabled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) if writing to `sink` fails.
    pub fn compare_and_log<T: FloatBits>(
        &self,
        expected: &[T],
        actual: &[T],
        sink: &mut dyn Write,
    ) -> Result<ComparisonReport<T>> {
        let report = self.compare(expected, actual);
        if self.config.info {
            if let Some(line) = report.info_line() {
                writeln!(sink, "{line}")?;
            }
        }
        Ok(report)
    }
}

#[inline]
fn within(d: Distance, tolerance: ToleranceSpec) -> bool {
    match d {
        Distance::Steps(n) => n <= tolerance.max_distance(),
        Distance::BelowMinSignal => true,
        Distance::NonFiniteMismatch => false,
    }
}

// ============================================================================
// Free-function entry points
// ============================================================================

fn comparator_for<T: FloatBits>(tolerance_bits: i32, min_signal: T) -> Comparator {
    Comparator::new(
        CompareConfig::default()
            .with_tolerance_bits(tolerance_bits)
            .with_min_signal(min_signal.to_f64()),
    )
}

/// Compare two sequences with the default clamp floor and mismatch cap.
///
/// A NaN or infinite `min_signal` is treated as `T::MIN_POSITIVE`.
pub fn all_close_f<T: FloatBits>(
    expected: &[T],
    actual: &[T],
    tolerance_bits: i32,
    min_signal: T,
) -> ComparisonReport<T> {
    comparator_for(tolerance_bits, min_signal).compare(expected, actual)
}

/// Single-pair form of [`all_close_f`].
pub fn close_f<T: FloatBits>(expected: T, actual: T, tolerance_bits: i32, min_signal: T) -> bool {
    within(
        distance(expected, actual, min_signal),
        ClampPolicy::default().spec::<T>(tolerance_bits),
    )
}

/// Panic with the rendered report unless `actual` matches `expected`
/// within `tolerance_bits` (default noise floor).
#[track_caller]
pub fn assert_all_close_f<T: FloatBits>(expected: &[T], actual: &[T], tolerance_bits: i32) {
    let report = Comparator::new(CompareConfig::default().with_tolerance_bits(tolerance_bits))
        .compare(expected, actual);
    assert!(report.passed, "{report}");
}
