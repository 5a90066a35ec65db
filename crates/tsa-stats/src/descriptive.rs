// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

/// Population summary of a value sequence.
///
/// `mad` is the mean absolute deviation from the mean, not the median
/// absolute deviation.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DescriptiveStats {
    pub n: usize,
    pub mean: f64,
    pub variance: f64,
    pub std: f64,
    pub mad: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub skewness: f64,
    pub kurtosis: f64,
}

impl DescriptiveStats {
    /// Summarizes `values`; every field is `0` for an empty slice.
    ///
    /// A constant sequence reports its value as the mean and exactly zero
    /// spread, so downstream z-scores and moments stay at `0`.
    pub fn from_values(values: &[f64]) -> Self {
        let n = values.len();
        if n == 0 {
            return Self::default();
        }

        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        if min == max {
            return Self {
                n,
                mean: min,
                median: min,
                min,
                max,
                ..Self::default()
            };
        }

        let m = n as f64;
        let mean = values.iter().sum::<f64>() / m;
        let mut sum_sq = 0.0;
        let mut sum_abs = 0.0;
        for &v in values {
            let diff = v - mean;
            sum_sq += diff * diff;
            sum_abs += diff.abs();
        }
        let variance = sum_sq / m;
        let std = variance.sqrt();
        let mad = sum_abs / m;

        let (skewness, kurtosis) = if std > 0.0 {
            let mut s3 = 0.0;
            let mut s4 = 0.0;
            for &v in values {
                let z = (v - mean) / std;
                let z2 = z * z;
                s3 += z2 * z;
                s4 += z2 * z2;
            }
            (s3 / m, s4 / m - 3.0)
        } else {
            (0.0, 0.0)
        };

        Self {
            n,
            mean,
            variance,
            std,
            mad,
            median: median(values).unwrap_or(0.0),
            min,
            max,
            skewness,
            kurtosis,
        }
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// `std / |mean|` as a percentage, `0` when the mean is zero.
    pub fn coefficient_of_variation(&self) -> f64 {
        if self.mean == 0.0 {
            0.0
        } else {
            self.std / self.mean.abs() * 100.0
        }
    }

    /// Z-score of `value`, `0` when the sequence has no spread.
    pub fn z_score(&self, value: f64) -> f64 {
        if self.std > 0.0 {
            (value - self.mean) / self.std
        } else {
            0.0
        }
    }
}

/// Arithmetic mean, `0` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Population standard deviation, `0` for an empty slice.
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values
        .iter()
        .map(|v| {
            let diff = *v - m;
            diff * diff
        })
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}

/// Median averaging the two middle elements for even lengths.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sorted = sorted_values(values);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) * 0.5)
    }
}

/// Ascending copy of `values`.
pub fn sorted_values(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}
