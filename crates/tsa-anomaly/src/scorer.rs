// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use tsa_core::{Series, Timestamp, TsaError};
use tsa_stats::DescriptiveStats;

pub const DEFAULT_ANOMALY_THRESHOLD: f64 = 2.0;
/// Method label carried into report metadata.
pub const ANOMALY_METHOD: &str = "mean+std+mad";

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnomalyConfig {
    /// Multiplier `k` shared by all three rules.
    pub threshold: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_ANOMALY_THRESHOLD,
        }
    }
}

impl AnomalyConfig {
    pub fn validate(&self) -> Result<(), TsaError> {
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(TsaError::invalid_request(format!(
                "AnomalyConfig.threshold must be finite and > 0.0; got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

/// One scored point.
///
/// `is_mean_anomaly` and `is_std_anomaly` test the same condition
/// (`|v-mean| > k*std` and `|z| > k`) and always agree; both are reported.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnomalyRecord {
    pub timestamp: Timestamp,
    pub value: f64,
    pub mean: f64,
    pub std: f64,
    pub mad: f64,
    pub z_score: f64,
    pub mad_score: f64,
    pub is_mean_anomaly: bool,
    pub is_std_anomaly: bool,
    pub is_mad_anomaly: bool,
    pub anomaly_score: f64,
}

impl AnomalyRecord {
    pub fn is_anomaly(&self) -> bool {
        self.is_mean_anomaly || self.is_std_anomaly || self.is_mad_anomaly
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Clone, Debug, PartialEq)]
pub struct AnomalyReport {
    pub threshold: f64,
    pub method: String,
    pub total_points: usize,
    pub mean: f64,
    pub std: f64,
    pub mad: f64,
    pub records: Vec<AnomalyRecord>,
    pub mean_anomalies: Vec<AnomalyRecord>,
    pub std_anomalies: Vec<AnomalyRecord>,
    pub mad_anomalies: Vec<AnomalyRecord>,
}

impl AnomalyReport {
    pub fn mean_anomaly_count(&self) -> usize {
        self.mean_anomalies.len()
    }

    pub fn std_anomaly_count(&self) -> usize {
        self.std_anomalies.len()
    }

    pub fn mad_anomaly_count(&self) -> usize {
        self.mad_anomalies.len()
    }

    /// Sum of the per-method counts; a point flagged by several rules counts
    /// once per rule.
    pub fn total_flags(&self) -> usize {
        self.mean_anomaly_count() + self.std_anomaly_count() + self.mad_anomaly_count()
    }

    /// [`Self::total_flags`] as a percentage of scored points.
    pub fn flag_percentage(&self) -> f64 {
        if self.total_points == 0 {
            0.0
        } else {
            self.total_flags() as f64 / self.total_points as f64 * 100.0
        }
    }
}

/// Scores every point of a series against the series' own mean, std and
/// mean absolute deviation.
#[derive(Clone, Debug)]
pub struct PointAnomalyScorer {
    config: AnomalyConfig,
}

impl PointAnomalyScorer {
    pub fn new(config: AnomalyConfig) -> Result<Self, TsaError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnomalyConfig {
        &self.config
    }

    pub fn score(&self, series: &Series) -> AnomalyReport {
        let stats = DescriptiveStats::from_values(&series.values());
        self.score_with_stats(series, &stats)
    }

    /// Scores with precomputed summary statistics of `series`.
    pub fn score_with_stats(&self, series: &Series, stats: &DescriptiveStats) -> AnomalyReport {
        let k = self.config.threshold;
        let (mean, std, mad) = (stats.mean, stats.std, stats.mad);

        let records: Vec<AnomalyRecord> = series
            .points()
            .iter()
            .map(|point| {
                let deviation = (point.value - mean).abs();
                let z_score = stats.z_score(point.value);
                let mad_score = if mad > 0.0 { deviation / mad } else { 0.0 };
                AnomalyRecord {
                    timestamp: point.timestamp,
                    value: point.value,
                    mean,
                    std,
                    mad,
                    z_score,
                    mad_score,
                    is_mean_anomaly: std > 0.0 && deviation > k * std,
                    is_std_anomaly: z_score.abs() > k,
                    is_mad_anomaly: mad_score > k,
                    anomaly_score: (z_score.abs() / k).max(mad_score / k),
                }
            })
            .collect();

        let subset = |keep: fn(&AnomalyRecord) -> bool| -> Vec<AnomalyRecord> {
            records.iter().filter(|r| keep(r)).copied().collect()
        };
        let mean_anomalies = subset(|r| r.is_mean_anomaly);
        let std_anomalies = subset(|r| r.is_std_anomaly);
        let mad_anomalies = subset(|r| r.is_mad_anomaly);

        tracing::debug!(
            points = records.len(),
            mean,
            std,
            mad,
            threshold = k,
            mean_anomalies = mean_anomalies.len(),
            std_anomalies = std_anomalies.len(),
            mad_anomalies = mad_anomalies.len(),
            "point anomalies scored"
        );

        AnomalyReport {
            threshold: k,
            method: ANOMALY_METHOD.to_string(),
            total_points: records.len(),
            mean,
            std,
            mad,
            records,
            mean_anomalies,
            std_anomalies,
            mad_anomalies,
        }
    }
}
