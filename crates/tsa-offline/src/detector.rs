// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::binseg::binary_segmentation;
use crate::config::{ChangePointConfig, DetectionParams};
use crate::merge::merge_change_points;
use crate::pelt::pelt_l1;
use crate::regime::threshold_regimes;
use crate::window::sliding_window;
use std::borrow::Cow;
use std::time::Instant;
use tsa_core::{Diagnostics, TsaError};

/// Output of every heuristic plus the merged change-point set.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Clone, Debug, PartialEq)]
pub struct ChangePointReport {
    pub binary: Vec<usize>,
    pub sliding: Vec<usize>,
    pub regime: Vec<usize>,
    /// Strictly increasing; adjacent entries are more than
    /// `params.merge_tolerance` apart.
    pub merged: Vec<usize>,
    /// Penalized L1 change points, reported alongside the merged set and
    /// never folded into it.
    pub pelt: Vec<usize>,
    pub params: DetectionParams,
    pub diagnostics: Diagnostics,
}

/// Runs the three change-point heuristics and merges them deterministically,
/// plus a standalone penalized L1 pass.
#[derive(Clone, Debug)]
pub struct ChangePointDetector {
    config: ChangePointConfig,
}

impl ChangePointDetector {
    pub fn new(config: ChangePointConfig) -> Result<Self, TsaError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ChangePointConfig {
        &self.config
    }

    pub fn detect(&self, values: &[f64]) -> ChangePointReport {
        let started_at = Instant::now();
        let params = DetectionParams::derive(values, &self.config);

        let binary = binary_segmentation(values, params.min_segment, params.mean_diff_threshold);
        let sliding = sliding_window(
            values,
            params.sliding_window,
            params.sliding_threshold,
            params.sliding_max_points,
        );
        let regime = threshold_regimes(values, params.regime_threshold);
        let merged = merge_change_points(
            &merge_change_points(&binary, &sliding, params.merge_tolerance),
            &regime,
            params.merge_tolerance,
        );

        let (pelt, pelt_failure) = match pelt_l1(
            values,
            params.pelt_penalty,
            params.pelt_min_size,
            params.pelt_jump,
        ) {
            Ok(pelt) => (pelt, None),
            Err(err) => {
                tracing::warn!(code = err.code(), %err, "pelt l1 pass failed");
                (vec![], Some(err))
            }
        };

        tracing::debug!(
            n = params.n,
            std = params.std,
            min_segment = params.min_segment,
            mean_diff_threshold = params.mean_diff_threshold,
            sliding_window = params.sliding_window,
            merge_tolerance = params.merge_tolerance,
            binary = ?binary,
            sliding = ?sliding,
            regime = ?regime,
            merged = ?merged,
            pelt = ?pelt,
            "change points detected"
        );

        let mut diagnostics = Diagnostics {
            n: params.n,
            runtime_ms: Some(u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX)),
            algorithm: Cow::Borrowed("binseg+sliding_window+threshold_regime"),
            ..Diagnostics::default()
        };
        diagnostics.note(format!(
            "min_segment={}, mean_diff_threshold={}, sliding_window={}, sliding_threshold={}, regime_threshold={}, merge_tolerance={}",
            params.min_segment,
            params.mean_diff_threshold,
            params.sliding_window,
            params.sliding_threshold,
            params.regime_threshold,
            params.merge_tolerance
        ));
        diagnostics.note(format!(
            "binary={}, sliding={}, regime={}, merged={}, pelt={} (penalty={})",
            binary.len(),
            sliding.len(),
            regime.len(),
            merged.len(),
            pelt.len(),
            params.pelt_penalty
        ));
        if let Some(err) = pelt_failure {
            diagnostics.warn(format!("pelt l1 skipped: {err}"));
        }
        if params.n <= params.sliding_window * 2 {
            diagnostics.warn(format!(
                "series of {} points is too short for sliding window {}; sliding detector skipped",
                params.n, params.sliding_window
            ));
        }

        ChangePointReport {
            binary,
            sliding,
            regime,
            merged,
            pelt,
            params,
            diagnostics,
        }
    }
}
