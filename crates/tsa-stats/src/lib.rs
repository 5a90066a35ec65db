// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod baseline;
pub mod descriptive;
pub mod smoothing;
pub mod trend;

pub use baseline::{
    Baseline, BaselineCalculator, BaselineConfig, BandSide, DEFAULT_PERCENTILES, PercentileEntry,
    RecommendedBand, percentile_of_sorted,
};
pub use descriptive::{DescriptiveStats, mean, median, population_std, sorted_values};
pub use smoothing::{DEFAULT_MOVING_AVERAGE_WINDOW, trailing_moving_average};
pub use trend::{
    LinearFit, SegmentTrend, TrendAxis, TrendConfig, TrendDirection, TrendResult,
    analyze_trend, axis_values, lag1_autocorrelation, linear_fit, segment_trend,
};
