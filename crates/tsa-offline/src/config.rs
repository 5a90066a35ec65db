// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use tsa_core::TsaError;
use tsa_stats::population_std;

const DEFAULT_BINSEG_MIN_SEGMENT_FRACTION: f64 = 0.05;
const DEFAULT_BINSEG_MIN_SEGMENT_FLOOR: usize = 3;
const DEFAULT_MEAN_DIFF_FRACTION: f64 = 1.0 / 20.0;
const DEFAULT_MEAN_DIFF_FLOOR: f64 = 0.05;
const DEFAULT_SLIDING_WINDOW_FLOOR: usize = 200;
const DEFAULT_SLIDING_WINDOW_FRACTION: f64 = 0.1;
const DEFAULT_SLIDING_THRESHOLD_FLOOR: f64 = 0.7;
const DEFAULT_SLIDING_MAX_POINTS: usize = 5;
const DEFAULT_REGIME_THRESHOLD: f64 = 40.0;
const DEFAULT_MERGE_TOLERANCE_FRACTION: f64 = 0.1;
const DEFAULT_PELT_PENALTY: f64 = 100.0;
const DEFAULT_PELT_MIN_SIZE: usize = 2;
const DEFAULT_PELT_JUMP: usize = 5;

/// Configuration for [`crate::ChangePointDetector`].
///
/// Window sizes and thresholds are derived per series from these fractions
/// and floors; see [`DetectionParams::derive`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
#[derive(Clone, Debug, PartialEq)]
pub struct ChangePointConfig {
    pub binseg_min_segment_fraction: f64,
    pub binseg_min_segment_floor: usize,
    /// Fraction of the series std used as the mean-difference threshold.
    pub mean_diff_fraction: f64,
    pub mean_diff_floor: f64,
    pub sliding_window_floor: usize,
    pub sliding_window_fraction: f64,
    pub sliding_threshold_floor: f64,
    pub sliding_max_points: usize,
    /// Value separating the low regime (`< threshold`) from normal operation.
    pub regime_threshold: f64,
    pub merge_tolerance_fraction: f64,
    /// Cost of one change in the L1 PELT pass.
    pub pelt_penalty: f64,
    pub pelt_min_size: usize,
    /// Grid step for PELT split candidates.
    pub pelt_jump: usize,
}

impl Default for ChangePointConfig {
    fn default() -> Self {
        Self {
            binseg_min_segment_fraction: DEFAULT_BINSEG_MIN_SEGMENT_FRACTION,
            binseg_min_segment_floor: DEFAULT_BINSEG_MIN_SEGMENT_FLOOR,
            mean_diff_fraction: DEFAULT_MEAN_DIFF_FRACTION,
            mean_diff_floor: DEFAULT_MEAN_DIFF_FLOOR,
            sliding_window_floor: DEFAULT_SLIDING_WINDOW_FLOOR,
            sliding_window_fraction: DEFAULT_SLIDING_WINDOW_FRACTION,
            sliding_threshold_floor: DEFAULT_SLIDING_THRESHOLD_FLOOR,
            sliding_max_points: DEFAULT_SLIDING_MAX_POINTS,
            regime_threshold: DEFAULT_REGIME_THRESHOLD,
            merge_tolerance_fraction: DEFAULT_MERGE_TOLERANCE_FRACTION,
            pelt_penalty: DEFAULT_PELT_PENALTY,
            pelt_min_size: DEFAULT_PELT_MIN_SIZE,
            pelt_jump: DEFAULT_PELT_JUMP,
        }
    }
}

fn validate_fraction(name: &str, value: f64) -> Result<(), TsaError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(TsaError::invalid_request(format!(
            "ChangePointConfig.{name} must be finite and in [0, 1]; got {value}"
        )));
    }
    Ok(())
}

fn validate_non_negative(name: &str, value: f64) -> Result<(), TsaError> {
    if !value.is_finite() || value < 0.0 {
        return Err(TsaError::invalid_request(format!(
            "ChangePointConfig.{name} must be finite and >= 0; got {value}"
        )));
    }
    Ok(())
}

impl ChangePointConfig {
    pub fn validate(&self) -> Result<(), TsaError> {
        validate_fraction(
            "binseg_min_segment_fraction",
            self.binseg_min_segment_fraction,
        )?;
        validate_fraction("sliding_window_fraction", self.sliding_window_fraction)?;
        validate_fraction("merge_tolerance_fraction", self.merge_tolerance_fraction)?;
        validate_non_negative("mean_diff_fraction", self.mean_diff_fraction)?;
        validate_non_negative("mean_diff_floor", self.mean_diff_floor)?;
        validate_non_negative("sliding_threshold_floor", self.sliding_threshold_floor)?;

        if self.binseg_min_segment_floor == 0 {
            return Err(TsaError::invalid_request(
                "ChangePointConfig.binseg_min_segment_floor must be >= 1; got 0",
            ));
        }
        if self.sliding_window_floor == 0 {
            return Err(TsaError::invalid_request(
                "ChangePointConfig.sliding_window_floor must be >= 1; got 0",
            ));
        }
        if self.sliding_max_points == 0 {
            return Err(TsaError::invalid_request(
                "ChangePointConfig.sliding_max_points must be >= 1; got 0",
            ));
        }
        if !self.pelt_penalty.is_finite() || self.pelt_penalty <= 0.0 {
            return Err(TsaError::invalid_request(format!(
                "ChangePointConfig.pelt_penalty must be finite and > 0; got {}",
                self.pelt_penalty
            )));
        }
        if self.pelt_min_size == 0 {
            return Err(TsaError::invalid_request(
                "ChangePointConfig.pelt_min_size must be >= 1; got 0",
            ));
        }
        if self.pelt_jump == 0 {
            return Err(TsaError::invalid_request(
                "ChangePointConfig.pelt_jump must be >= 1; got 0",
            ));
        }
        if !self.regime_threshold.is_finite() {
            return Err(TsaError::invalid_request(format!(
                "ChangePointConfig.regime_threshold must be finite; got {}",
                self.regime_threshold
            )));
        }
        Ok(())
    }
}

/// Per-series parameters resolved from a [`ChangePointConfig`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectionParams {
    pub n: usize,
    pub std: f64,
    pub min_segment: usize,
    pub mean_diff_threshold: f64,
    pub sliding_window: usize,
    pub sliding_threshold: f64,
    pub sliding_max_points: usize,
    pub regime_threshold: f64,
    pub merge_tolerance: usize,
    pub pelt_penalty: f64,
    pub pelt_min_size: usize,
    pub pelt_jump: usize,
}

fn floor_fraction(n: usize, fraction: f64) -> usize {
    (n as f64 * fraction).floor() as usize
}

impl DetectionParams {
    pub fn derive(values: &[f64], config: &ChangePointConfig) -> Self {
        let n = values.len();
        let std = population_std(values);
        let mean_diff_threshold = (std * config.mean_diff_fraction).max(config.mean_diff_floor);
        Self {
            n,
            std,
            min_segment: floor_fraction(n, config.binseg_min_segment_fraction)
                .max(config.binseg_min_segment_floor),
            mean_diff_threshold,
            sliding_window: floor_fraction(n, config.sliding_window_fraction)
                .max(config.sliding_window_floor),
            sliding_threshold: mean_diff_threshold.max(config.sliding_threshold_floor),
            sliding_max_points: config.sliding_max_points,
            regime_threshold: config.regime_threshold,
            merge_tolerance: floor_fraction(n, config.merge_tolerance_fraction),
            pelt_penalty: config.pelt_penalty,
            pelt_min_size: config.pelt_min_size,
            pelt_jump: config.pelt_jump,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ChangePointConfig, DetectionParams};

    #[test]
    fn defaults_and_validation() {
        let cfg = ChangePointConfig::default();
        assert_eq!(cfg.binseg_min_segment_floor, 3);
        assert_eq!(cfg.sliding_window_floor, 200);
        assert_eq!(cfg.sliding_max_points, 5);
        assert_eq!(cfg.regime_threshold, 40.0);
        assert_eq!(cfg.pelt_penalty, 100.0);
        assert_eq!((cfg.pelt_min_size, cfg.pelt_jump), (2, 5));
        cfg.validate().expect("default config should be valid");

        let err = ChangePointConfig {
            merge_tolerance_fraction: 1.5,
            ..ChangePointConfig::default()
        }
        .validate()
        .expect_err("fraction > 1 must fail");
        assert!(err.to_string().contains("merge_tolerance_fraction"));

        let err = ChangePointConfig {
            sliding_max_points: 0,
            ..ChangePointConfig::default()
        }
        .validate()
        .expect_err("zero cap must fail");
        assert!(err.to_string().contains("sliding_max_points"));

        let err = ChangePointConfig {
            pelt_penalty: 0.0,
            ..ChangePointConfig::default()
        }
        .validate()
        .expect_err("zero penalty must fail");
        assert!(err.to_string().contains("pelt_penalty"));

        let err = ChangePointConfig {
            pelt_jump: 0,
            ..ChangePointConfig::default()
        }
        .validate()
        .expect_err("zero jump must fail");
        assert!(err.to_string().contains("pelt_jump"));

        let err = ChangePointConfig {
            regime_threshold: f64::NAN,
            ..ChangePointConfig::default()
        }
        .validate()
        .expect_err("NaN threshold must fail");
        assert!(err.to_string().contains("regime_threshold"));
    }

    #[test]
    fn derived_params_for_two_thousand_points() {
        let values: Vec<f64> = (0..2000).map(|i| if i < 1000 { 0.0 } else { 2.0 }).collect();
        let params = DetectionParams::derive(&values, &ChangePointConfig::default());
        assert_eq!(params.n, 2000);
        assert_eq!(params.min_segment, 100);
        assert!((params.std - 1.0).abs() < 1e-12);
        assert!((params.mean_diff_threshold - 0.05).abs() < 1e-12);
        assert_eq!(params.sliding_window, 200);
        assert_eq!(params.sliding_threshold, 0.7);
        assert_eq!(params.merge_tolerance, 200);
    }

    #[test]
    fn floors_apply_to_short_series() {
        let params = DetectionParams::derive(&[1.0; 10], &ChangePointConfig::default());
        assert_eq!(params.min_segment, 3);
        assert_eq!(params.mean_diff_threshold, 0.05);
        assert_eq!(params.merge_tolerance, 1);
    }
}
