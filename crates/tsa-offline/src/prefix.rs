// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

/// Cumulative sums for O(1) range means over `[start, end)`.
pub(crate) struct PrefixSums {
    sums: Vec<f64>,
}

impl PrefixSums {
    pub(crate) fn new(values: &[f64]) -> Self {
        let mut sums = Vec::with_capacity(values.len() + 1);
        sums.push(0.0);
        let mut acc = 0.0;
        for v in values {
            acc += v;
            sums.push(acc);
        }
        Self { sums }
    }

    /// Mean of `values[start..end]`; callers guarantee `start < end`.
    pub(crate) fn mean(&self, start: usize, end: usize) -> f64 {
        (self.sums[end] - self.sums[start]) / (end - start) as f64
    }
}
