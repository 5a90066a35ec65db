// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub const DEFAULT_MOVING_AVERAGE_WINDOW: usize = 10;

/// Trailing mean of `values[i-window+1..=i]` for each `i >= window-1`.
///
/// Output has `n - window + 1` entries and is empty when `window` is `0` or
/// exceeds `values.len()`.
pub fn trailing_moving_average(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 {
        return Vec::new();
    }
    values
        .windows(window)
        .map(|w| w.iter().sum::<f64>() / window as f64)
        .collect()
}
