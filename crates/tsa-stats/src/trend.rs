// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::descriptive::mean;
use tsa_core::{Series, TsaError};

const MILLIS_PER_DAY: f64 = 86_400_000.0;
/// Slopes within `±DIRECTION_EPSILON` are reported as stable.
pub const DIRECTION_EPSILON: f64 = 0.001;
/// Fits with `R²` above this are reported as significant.
pub const SIGNIFICANCE_R_SQUARED: f64 = 0.1;
/// Segment fits also need `|slope|` above this to be significant.
pub const SEGMENT_SLOPE_FLOOR: f64 = 0.01;
const MIN_SEGMENT_POINTS: usize = 3;

/// X coordinate used for regression.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TrendAxis {
    /// Position in the series, `0..n`.
    #[default]
    SampleIndex,
    /// Fractional days since the first sample.
    DayOffset,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrendConfig {
    pub axis: TrendAxis,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrendDirection {
    Rising,
    Falling,
    Stable,
}

impl TrendDirection {
    pub fn from_slope(slope: f64) -> Self {
        if slope > DIRECTION_EPSILON {
            Self::Rising
        } else if slope < -DIRECTION_EPSILON {
            Self::Falling
        } else {
            Self::Stable
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rising => "Rising",
            Self::Falling => "Falling",
            Self::Stable => "Stable",
        }
    }
}

/// Ordinary least squares result.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LinearFit {
    pub n: usize,
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

/// Fits `y = slope * x + intercept`.
///
/// A zero x spread gives slope `0`; a zero y spread gives `R² = 0`.
pub fn linear_fit(xs: &[f64], ys: &[f64]) -> Result<LinearFit, TsaError> {
    if xs.len() != ys.len() {
        return Err(TsaError::invalid_request(format!(
            "linear_fit requires equal lengths; got xs={} ys={}",
            xs.len(),
            ys.len()
        )));
    }
    let n = xs.len();
    if n == 0 {
        return Ok(LinearFit::default());
    }
    if ys.iter().all(|y| *y == ys[0]) {
        return Ok(LinearFit {
            n,
            intercept: ys[0],
            ..LinearFit::default()
        });
    }

    let x_mean = mean(xs);
    let y_mean = mean(ys);
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - x_mean;
        sxy += dx * (y - y_mean);
        sxx += dx * dx;
    }
    let slope = if sxx == 0.0 { 0.0 } else { sxy / sxx };
    let intercept = y_mean - slope * x_mean;

    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let residual = y - (slope * x + intercept);
        let centered = y - y_mean;
        ss_res += residual * residual;
        ss_tot += centered * centered;
    }
    let r_squared = if ss_tot == 0.0 {
        0.0
    } else {
        1.0 - ss_res / ss_tot
    };

    Ok(LinearFit {
        n,
        slope,
        intercept,
        r_squared,
    })
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrendResult {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub direction: TrendDirection,
    pub significant: bool,
}

impl TrendResult {
    pub fn from_fit(fit: LinearFit) -> Self {
        Self {
            slope: fit.slope,
            intercept: fit.intercept,
            r_squared: fit.r_squared,
            direction: TrendDirection::from_slope(fit.slope),
            significant: fit.r_squared > SIGNIFICANCE_R_SQUARED,
        }
    }

    pub fn significance_label(&self) -> &'static str {
        if self.significant {
            "Significant"
        } else {
            "Not Significant"
        }
    }
}

/// X coordinates for `series` on the chosen axis.
pub fn axis_values(series: &Series, axis: TrendAxis) -> Vec<f64> {
    match axis {
        TrendAxis::SampleIndex => (0..series.len()).map(|i| i as f64).collect(),
        TrendAxis::DayOffset => {
            let Some(origin) = series.first().map(|p| p.timestamp) else {
                return Vec::new();
            };
            series
                .points()
                .iter()
                .map(|p| (p.timestamp - origin).num_milliseconds() as f64 / MILLIS_PER_DAY)
                .collect()
        }
    }
}

/// Whole-series OLS trend.
pub fn analyze_trend(series: &Series, config: &TrendConfig) -> TrendResult {
    let xs = axis_values(series, config.axis);
    let fit = linear_fit(&xs, &series.values()).unwrap_or_default();
    TrendResult::from_fit(fit)
}

/// Lag-1 autocorrelation `Σ(vᵢ−m)(vᵢ₊₁−m) / Σ(vᵢ−m)²`; the numerator runs
/// over `i < n−1`, the denominator over all `n` values, so the result stays in
/// `[-1, 1]`.
///
/// Returns `0` for fewer than two values, a constant sequence or a zero
/// denominator.
pub fn lag1_autocorrelation(values: &[f64]) -> f64 {
    if values.len() < 2 || values.iter().all(|v| *v == values[0]) {
        return 0.0;
    }
    let m = mean(values);
    let numerator: f64 = values
        .windows(2)
        .map(|pair| (pair[0] - m) * (pair[1] - m))
        .sum();
    let denominator: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Trend of the points between two region boundaries, both inclusive.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentTrend {
    pub start: usize,
    pub end: usize,
    pub n: usize,
    pub mean: f64,
    pub slope: f64,
    pub r_squared: f64,
    pub direction: TrendDirection,
    pub significant: bool,
}

/// Fits `series[start..=end]`; x stays on the whole-series axis.
///
/// Segments with fewer than three points report zeros and are never
/// significant.
pub fn segment_trend(
    series: &Series,
    config: &TrendConfig,
    start: usize,
    end: usize,
) -> SegmentTrend {
    let len = series.len();
    let end = end.min(len.saturating_sub(1));
    let n = if len == 0 || start > end { 0 } else { end - start + 1 };
    let empty = SegmentTrend {
        start,
        end,
        n,
        mean: 0.0,
        slope: 0.0,
        r_squared: 0.0,
        direction: TrendDirection::Stable,
        significant: false,
    };
    if n < MIN_SEGMENT_POINTS {
        return empty;
    }

    let xs = axis_values(series, config.axis);
    let ys: Vec<f64> = series.points()[start..=end].iter().map(|p| p.value).collect();
    let Ok(fit) = linear_fit(&xs[start..=end], &ys) else {
        return empty;
    };
    SegmentTrend {
        mean: mean(&ys),
        slope: fit.slope,
        r_squared: fit.r_squared,
        direction: TrendDirection::from_slope(fit.slope),
        significant: fit.slope.abs() > SEGMENT_SLOPE_FLOOR
            && fit.r_squared > SIGNIFICANCE_R_SQUARED,
        ..empty
    }
}
