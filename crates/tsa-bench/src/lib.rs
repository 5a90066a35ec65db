// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Synthetic fixtures shared by the benchmarks.

use tsa_core::{Series, SeriesPoint, timestamp_from_millis};

const HOUR_MS: i64 = 3_600_000;
const EPOCH_2024_MS: i64 = 1_704_067_200_000;

/// Daily sinusoid around 50 with a shutdown block at 10 covering the middle
/// half percent of the series.
pub fn shutdown_values(n: usize) -> Vec<f64> {
    let block_start = n / 2;
    let block_end = block_start + n / 200;
    (0..n)
        .map(|i| {
            if (block_start..block_end).contains(&i) {
                10.0
            } else {
                50.0 + 5.0 * (i as f64 * std::f64::consts::TAU / 24.0).sin()
            }
        })
        .collect()
}

/// [`shutdown_values`] sampled hourly from 2024-01-01 UTC.
pub fn hourly_series(n: usize) -> Series {
    let points = shutdown_values(n)
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| {
            let offset = i64::try_from(i).ok()?.checked_mul(HOUR_MS)?;
            let timestamp = timestamp_from_millis(EPOCH_2024_MS + offset).ok()?;
            Some(SeriesPoint::new(timestamp, value))
        })
        .collect();
    Series::new(points).unwrap_or_else(|_| Series::empty())
}
