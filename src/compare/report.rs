//! Comparison report: the terminal artifact of every comparison.
//!
//! Built once per call and never mutated afterwards. `Display` renders the
//! human-readable diagnostic; `to_json` exports the same data structurally.

use std::fmt;

use serde::Serialize;

use crate::model::{Distance, FloatBits, ToleranceSpec};
use crate::{Error, Precondition, Result};

// ============================================================================
// Report parts
// ============================================================================

/// How a comparison ended, independent of pass/fail.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Outcome {
    /// Inputs were not comparable; no element was inspected.
    Precondition(Precondition),
    /// Both inputs were empty.
    Empty,
    /// Every element pair was measured.
    Compared,
}

/// One element pair outside tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Mismatch<T> {
    pub index: usize,
    pub expected: T,
    pub actual: T,
    pub distance: Distance,
}

/// The element with the smallest or largest measured distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Extremum<T> {
    pub index: usize,
    pub expected: T,
    pub actual: T,
    pub distance: Distance,
    /// Leading mantissa bits that agree at this element.
    pub matching_bits: u32,
}

/// Distance statistics over a compared sequence.
///
/// `tightest` and `loosest` skip elements below the noise floor and are
/// `None` when every element was below it. The median covers all elements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistanceStats<T> {
    pub tightest: Option<Extremum<T>>,
    pub loosest: Option<Extremum<T>>,
    pub median: Distance,
    pub median_matching_bits: u32,
}

// ============================================================================
// ComparisonReport
// ============================================================================

/// Aggregate result of comparing two sequences.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport<T> {
    pub passed: bool,
    pub outcome: Outcome,
    /// Tolerance actually applied, after clamping.
    pub tolerance: ToleranceSpec,
    pub min_signal: T,
    /// Elements per sequence (the expected side for precondition failures).
    pub len: usize,
    pub mismatch_count: usize,
    /// First few mismatches, in index order.
    pub mismatches: Vec<Mismatch<T>>,
    pub below_min_signal: usize,
    pub stats: Option<DistanceStats<T>>,
}

impl<T: FloatBits> ComparisonReport<T> {
    /// Failed report for inputs that could not be compared.
    pub(crate) fn precondition(
        failure: Precondition,
        tolerance: ToleranceSpec,
        min_signal: T,
        len: usize,
    ) -> Self {
        Self {
            passed: false,
            outcome: Outcome::Precondition(failure),
            tolerance,
            min_signal,
            len,
            mismatch_count: 0,
            mismatches: Vec::new(),
            below_min_signal: 0,
            stats: None,
        }
    }

    /// Vacuous success for empty inputs.
    pub(crate) fn empty(tolerance: ToleranceSpec, min_signal: T) -> Self {
        Self {
            passed: true,
            outcome: Outcome::Empty,
            tolerance,
            min_signal,
            len: 0,
            mismatch_count: 0,
            mismatches: Vec::new(),
            below_min_signal: 0,
            stats: None,
        }
    }

    pub fn is_precondition_failure(&self) -> bool {
        matches!(self.outcome, Outcome::Precondition(_))
    }

    /// True when elements were compared and all of them sat below the floor.
    pub fn all_below_min_signal(&self) -> bool {
        self.outcome == Outcome::Compared && self.below_min_signal == self.len
    }

    /// Largest measured distance, if any element was above the floor.
    pub fn max_distance(&self) -> Option<Distance> {
        self.stats.and_then(|s| s.loosest).map(|e| e.distance)
    }

    /// One-line precision summary for a passing comparison.
    ///
    /// `None` unless elements were compared and all matched.
    pub fn info_line(&self) -> Option<String> {
        if !self.passed || self.outcome != Outcome::Compared {
            return None;
        }
        let spec = self.tolerance;
        let mut line = format!(
            "[   INFO   ] Verifying match of >= {} mantissa bits ({} bits precision - {} tolerance). ",
            spec.min_matching_bits(),
            spec.layout.mantissa_bits,
            spec.tolerance_bits,
        );
        match self.stats.and_then(|s| s.loosest) {
            Some(loosest) if !self.all_below_min_signal() => line.push_str(&format!(
                "{} value(s) below min_signal: {} Loosest match found is {} mantissa bits.",
                self.below_min_signal, self.min_signal, loosest.matching_bits,
            )),
            _ => line.push_str(&format!("All values below min_signal: {}", self.min_signal)),
        }
        Some(line)
    }

    /// Structured export of the whole report.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// `Ok(self)` on pass; otherwise an error carrying the rendered report.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Precondition`] for incomparable inputs and
    /// [`Error::Mismatch`] when elements fell outside tolerance.
    pub fn into_result(self) -> Result<Self> {
        if self.passed {
            return Ok(self);
        }
        if let Outcome::Precondition(failure) = &self.outcome {
            return Err(Error::Precondition(failure.clone()));
        }
        Err(Error::Mismatch(self.to_string()))
    }
}

impl<T: FloatBits> fmt::Display for ComparisonReport<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.passed { "passed" } else { "FAILED" };
        let width = self.tolerance.layout.name();

        match &self.outcome {
            Outcome::Precondition(failure) => {
                return writeln!(f, "all_close_f {verdict}: {failure}");
            }
            Outcome::Empty => return writeln!(f, "all_close_f {verdict}: No elements to compare"),
            Outcome::Compared => writeln!(f, "all_close_f {verdict} ({width}, {} elements)", self.len)?,
        }

        for m in &self.mismatches {
            writeln!(f, "{} is not close to {} at index {}", m.expected, m.actual, m.index)?;
        }
        if self.mismatch_count > 0 {
            writeln!(f, "diff count: {} out of {}", self.mismatch_count, self.len)?;
        }

        writeln!(
            f,
            "passing criteria - mismatch allowed  @ mantissa bit: {} or later ({} tolerance bits)",
            self.tolerance.min_matching_bits(),
            self.tolerance.tolerance_bits,
        )?;

        let Some(stats) = self.stats else {
            return Ok(());
        };
        let (Some(tightest), Some(loosest)) = (stats.tightest, stats.loosest) else {
            return writeln!(f, "All values below min_signal: {}", self.min_signal);
        };

        writeln!(f, "{} value(s) below min_signal: {}", self.below_min_signal, self.min_signal)?;
        writeln!(
            f,
            "tightest match   - mismatch occurred @ mantissa bit: {} or next bit ({} vs {} at [{}])",
            tightest.matching_bits, tightest.expected, tightest.actual, tightest.index,
        )?;
        writeln!(
            f,
            "loosest match    - mismatch occurred @ mantissa bit: {} or next bit ({} vs {} at [{}])",
            loosest.matching_bits, loosest.expected, loosest.actual, loosest.index,
        )?;
        writeln!(
            f,
            "median match     - mismatch occurred @ mantissa bit: {} or next bit",
            stats.median_matching_bits,
        )
    }
}
