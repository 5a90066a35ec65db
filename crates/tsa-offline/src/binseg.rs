// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::prefix::PrefixSums;

/// Recursive mean-shift splitting over half-open ranges.
///
/// Within `[start, end)` every split `i` in `[start+min_segment, end-min_segment]`
/// is scored by `|mean(start..i) - mean(i..end)|`. The first split with the
/// largest score is kept when the score reaches `mean_diff_threshold`, and both
/// halves are searched again. Output is ascending and restricted to
/// `[min_segment, n-min_segment]`.
pub fn binary_segmentation(
    values: &[f64],
    min_segment: usize,
    mean_diff_threshold: f64,
) -> Vec<usize> {
    let n = values.len();
    let min_segment = min_segment.max(1);
    if n < min_segment.saturating_mul(2) {
        return vec![];
    }

    let prefix = PrefixSums::new(values);
    let mut change_points = vec![];
    let mut stack = vec![(0usize, n)];

    while let Some((start, end)) = stack.pop() {
        if end - start < min_segment * 2 {
            continue;
        }

        let mut best: Option<(usize, f64)> = None;
        for split in (start + min_segment)..=(end - min_segment) {
            let diff = (prefix.mean(start, split) - prefix.mean(split, end)).abs();
            let best_diff = best.map_or(0.0, |(_, d)| d);
            if diff > best_diff {
                best = Some((split, diff));
            }
        }

        if let Some((split, diff)) = best
            && diff >= mean_diff_threshold
        {
            tracing::trace!(start, end, split, diff, "binseg split accepted");
            change_points.push(split);
            stack.push((split, end));
            stack.push((start, split));
        }
    }

    change_points.sort_unstable();
    change_points.retain(|&idx| idx >= min_segment && idx <= n - min_segment);
    change_points
}
