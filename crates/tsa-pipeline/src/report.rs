// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use tsa_anomaly::AnomalyRecord;
use tsa_core::{Diagnostics, ExcludeRange, Timestamp};
use tsa_offline::DetectionParams;
use tsa_stats::{Baseline, SegmentTrend, TrendDirection};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Period {
    pub start: Timestamp,
    pub end: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub column: String,
    pub period: Period,
    pub exclude_ranges: Vec<ExcludeRange>,
    /// Rows returned by the data source.
    pub raw_points: usize,
    /// Points left after cleaning and exclusion.
    pub filtered_points: usize,
    /// Points in the resampled series every statistic is computed on.
    pub data_points: usize,
    pub total_points: usize,
    pub method: String,
    /// Sum of the three per-method anomaly counts.
    pub anomaly_count: usize,
    pub anomaly_percentage: f64,
    pub threshold: f64,
    pub fetch_time_secs: f64,
    pub processing_time_secs: f64,
}

/// Change-point region with both index and time bounds, inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub start_idx: usize,
    pub end_idx: usize,
    pub start: Timestamp,
    pub end: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePointBreakdown {
    pub binary: Vec<usize>,
    pub sliding: Vec<usize>,
    pub regime: Vec<usize>,
    /// Penalized L1 change points; not part of the merged set.
    pub pelt: Vec<usize>,
    pub params: DetectionParams,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedStats {
    pub min_value: f64,
    pub max_value: f64,
    pub range: f64,
    pub skewness: f64,
    pub kurtosis: f64,
    /// Anomaly flags per covered hour.
    pub anomaly_density: f64,
    pub trend_slope: f64,
    pub trend_intercept: f64,
    pub trend_r_squared: f64,
    pub trend_direction: TrendDirection,
    pub trend_significance: String,
    pub autocorrelation: f64,
    pub coefficient_of_variation: f64,
    pub change_points: Vec<usize>,
    pub change_point_sources: ChangePointBreakdown,
    pub region_boundaries: Vec<Region>,
    pub segment_trends: Vec<SegmentTrend>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResampledSeries {
    pub timestamps: Vec<Timestamp>,
    pub values: Vec<f64>,
}

/// Full analysis payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub metadata: Metadata,
    pub anomalies: Vec<AnomalyRecord>,
    pub mean_anomalies: Vec<AnomalyRecord>,
    pub std_anomalies: Vec<AnomalyRecord>,
    pub mad_anomalies: Vec<AnomalyRecord>,
    pub mean_anomaly_count: usize,
    pub std_anomaly_count: usize,
    pub mad_anomaly_count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub mad: f64,
    pub advanced_stats: AdvancedStats,
    pub baseline: Baseline,
    pub resampled: ResampledSeries,
    pub diagnostics: Diagnostics,
}

/// Percentile bands without anomaly or change-point work.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineReport {
    pub column: String,
    pub period: Period,
    pub exclude_ranges: Vec<ExcludeRange>,
    pub data_points: usize,
    pub baseline: Baseline,
    pub diagnostics: Diagnostics,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MovingAverage {
    pub x: Vec<Timestamp>,
    pub y: Vec<f64>,
}

/// Resampled series for charting with a trailing moving average.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesView {
    pub x: Vec<Timestamp>,
    pub y: Vec<f64>,
    pub moving_average: MovingAverage,
}
