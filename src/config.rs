//! Comparison configuration.
//!
//! A [`CompareConfig`] is built once (defaults, JSON, or the process
//! environment) and handed to a [`Comparator`](crate::Comparator). It is
//! never read again from the environment after construction.

use serde::{Deserialize, Serialize};

use crate::model::{
    ClampPolicy, DEFAULT_MIN_TOLERANCE_BITS, DEFAULT_TOLERANCE_BITS, FloatBits,
    effective_min_signal,
};
use crate::{Error, Result};

/// Environment variable that turns on the one-line success summary.
/// Only its presence matters.
pub const INFO_ENV_VAR: &str = "MANTISSA_CLOSE_INFO";

/// Number of mismatches listed in a report before the rest are only counted.
pub const DEFAULT_MAX_REPORTED_MISMATCHES: usize = 5;

/// Settings for a sequence comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompareConfig {
    /// Requested tolerance in mantissa bits, clamped before use.
    pub tolerance_bits: i32,
    /// Clamp floor applied to `tolerance_bits`, for both widths.
    pub min_tolerance_bits: u32,
    /// Noise floor. `None` means the compared width's smallest normal value.
    pub min_signal: Option<f64>,
    /// Cap on listed mismatches.
    pub max_reported_mismatches: usize,
    /// Emit the one-line summary on success.
    pub info: bool,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            tolerance_bits: DEFAULT_TOLERANCE_BITS,
            min_tolerance_bits: DEFAULT_MIN_TOLERANCE_BITS,
            min_signal: None,
            max_reported_mismatches: DEFAULT_MAX_REPORTED_MISMATCHES,
            info: false,
        }
    }
}

impl CompareConfig {
    /// Defaults, with `info` taken from [`INFO_ENV_VAR`].
    pub fn from_env() -> Self {
        Self {
            info: std::env::var_os(INFO_ENV_VAR).is_some(),
            ..Self::default()
        }
    }

    /// Parse and validate a JSON document. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] for malformed input and [`Error::Config`]
    /// for out-of-range values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()
    }

    /// Ensure the configuration values are usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `min_signal` is negative or non-finite,
    /// or if `max_reported_mismatches` is zero.
    #[must_use = "Validation should not be ignored"]
    pub fn validate(self) -> Result<Self> {
        if let Some(floor) = self.min_signal {
            if !floor.is_finite() || floor < 0.0 {
                return Err(Error::Config(format!(
                    "min_signal must be a finite, non-negative value (got {floor})"
                )));
            }
        }
        if self.max_reported_mismatches == 0 {
            return Err(Error::Config(
                "max_reported_mismatches must be greater than 0".into(),
            ));
        }
        Ok(self)
    }

    pub fn with_tolerance_bits(mut self, bits: i32) -> Self {
        self.tolerance_bits = bits;
        self
    }

    pub fn with_min_tolerance_bits(mut self, bits: u32) -> Self {
        self.min_tolerance_bits = bits;
        self
    }

    pub fn with_min_signal(mut self, floor: f64) -> Self {
        self.min_signal = Some(floor);
        self
    }

    pub fn with_max_reported_mismatches(mut self, cap: usize) -> Self {
        self.max_reported_mismatches = cap;
        self
    }

    pub fn with_info(mut self, info: bool) -> Self {
        self.info = info;
        self
    }

    pub fn clamp_policy(&self) -> ClampPolicy {
        ClampPolicy {
            floor: self.min_tolerance_bits,
        }
    }

    /// Noise floor narrowed to width `T`. A floor that is not finite at
    /// that width falls back to `T::MIN_POSITIVE`.
    pub fn min_signal_for<T: FloatBits>(&self) -> T {
        self.min_signal
            .map_or(T::MIN_POSITIVE, |v| effective_min_signal(T::from_f64(v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    /// Restores the info variable to its prior state on drop.
    struct EnvGuard {
        old: Option<std::ffi::OsString>,
    }

    impl EnvGuard {
        fn set(value: Option<&str>) -> Self {
            let old = std::env::var_os(INFO_ENV_VAR);
            unsafe {
                match value {
                    Some(v) => std::env::set_var(INFO_ENV_VAR, v),
                    None => std::env::remove_var(INFO_ENV_VAR),
                }
            }
            Self { old }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            unsafe {
                match &self.old {
                    Some(v) => std::env::set_var(INFO_ENV_VAR, v),
                    None => std::env::remove_var(INFO_ENV_VAR),
                }
            }
        }
    }

    #[test]
    #[serial(info_env)]
    fn from_env_reads_info_toggle() {
        {
            let _guard = EnvGuard::set(Some("1"));
            let cfg = CompareConfig::from_env();
            assert!(cfg.info);
            assert_eq!(cfg.tolerance_bits, DEFAULT_TOLERANCE_BITS);
        }
        {
            // presence alone enables it, whatever the value
            let _guard = EnvGuard::set(Some(""));
            assert!(CompareConfig::from_env().info);
        }
        let _guard = EnvGuard::set(None);
        assert!(!CompareConfig::from_env().info);
    }

    #[test]
    #[serial(info_env)]
    fn comparator_from_env_writes_info_line() {
        use crate::compare::Comparator;

        let _guard = EnvGuard::set(Some("1"));
        let comparator = Comparator::from_env();
        assert!(comparator.config().info);

        let mut out = Vec::new();
        let report = comparator
            .compare_and_log(&[1.0f32], &[1.0], &mut out)
            .unwrap();
        assert!(report.passed);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Verifying match of >= 22 mantissa bits"), "{text}");
    }

    #[test]
    fn defaults() {
        let cfg = CompareConfig::default();
        assert_eq!(cfg.tolerance_bits, 2);
        assert_eq!(cfg.min_tolerance_bits, 2);
        assert_eq!(cfg.max_reported_mismatches, 5);
        assert!(!cfg.info);
        assert_eq!(cfg.min_signal_for::<f32>(), f32::MIN_POSITIVE);
        assert_eq!(cfg.min_signal_for::<f64>(), f64::MIN_POSITIVE);
    }

    #[test]
    fn json_fills_missing_fields() {
        let cfg = CompareConfig::from_json(r#"{"tolerance_bits": 8, "min_signal": 1e-5}"#).unwrap();
        assert_eq!(cfg.tolerance_bits, 8);
        assert_eq!(cfg.min_signal_for::<f32>(), 1e-5f32);
        assert_eq!(cfg.max_reported_mismatches, DEFAULT_MAX_REPORTED_MISMATCHES);
    }

    #[test]
    fn json_rejects_unknown_fields() {
        let err = CompareConfig::from_json(r#"{"epsilon": 0.1}"#).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn validate_rejects_bad_floor() {
        let err = CompareConfig::default().with_min_signal(-1.0).validate().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        let err = CompareConfig::default().with_min_signal(f64::NAN).validate().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn validate_rejects_zero_mismatch_cap() {
        let err = CompareConfig::default()
            .with_max_reported_mismatches(0)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("max_reported_mismatches"));
    }

    #[test]
    fn round_trips_through_json() {
        let cfg = CompareConfig::default().with_tolerance_bits(4).with_info(true);
        let json = serde_json::to_string(&cfg).unwrap();
        assert_eq!(CompareConfig::from_json(&json).unwrap(), cfg);
    }

    #[test]
    fn clamp_policy_uses_configured_floor() {
        let cfg = CompareConfig::default().with_min_tolerance_bits(0);
        assert_eq!(cfg.clamp_policy(), ClampPolicy::exact());
    }
}
