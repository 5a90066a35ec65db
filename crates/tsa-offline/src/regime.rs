// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

/// Boundaries of stretches below `threshold`.
///
/// Emits the first index of each low stretch and the first index back at or
/// above `threshold`. A series that ends low also emits `n-1`. Index `0` is
/// emitted when the series starts low.
pub fn threshold_regimes(values: &[f64], threshold: f64) -> Vec<usize> {
    let mut change_points = vec![];
    let mut in_low = false;

    for (i, &value) in values.iter().enumerate() {
        let previous = if i == 0 { None } else { Some(values[i - 1]) };
        if !in_low && value < threshold {
            if previous.is_none_or(|p| p >= threshold) {
                change_points.push(i);
                in_low = true;
            }
        } else if in_low && value >= threshold && previous.is_some_and(|p| p < threshold) {
            change_points.push(i);
            in_low = false;
        }
    }

    if in_low {
        change_points.push(values.len() - 1);
    }
    change_points
}
