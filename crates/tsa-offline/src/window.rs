// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::prefix::PrefixSums;

#[derive(Clone, Copy, Debug)]
struct CandidateScore {
    split: usize,
    score: f64,
}

fn rank_candidates(scores: &mut [CandidateScore]) {
    scores.sort_by(|left, right| {
        right
            .score
            .total_cmp(&left.score)
            .then_with(|| left.split.cmp(&right.split))
    });
}

/// Downward step detector over two adjacent windows of width `window`.
///
/// For each `i` in `[window, n-window)` the score is
/// `mean(i-window..i) - mean(i..i+window)`; only scores above `threshold` are
/// candidates, so upward steps are never reported. Candidates are taken by
/// descending score and kept only when every kept index is more than `window`
/// away, up to `max_points`. Output is ascending.
pub fn sliding_window(
    values: &[f64],
    window: usize,
    threshold: f64,
    max_points: usize,
) -> Vec<usize> {
    let n = values.len();
    if window == 0 || n <= window.saturating_mul(2) || max_points == 0 {
        return vec![];
    }

    let prefix = PrefixSums::new(values);
    let mut candidates: Vec<CandidateScore> = (window..n - window)
        .filter_map(|split| {
            let score = prefix.mean(split - window, split) - prefix.mean(split, split + window);
            (score > threshold).then_some(CandidateScore { split, score })
        })
        .collect();
    rank_candidates(&mut candidates);

    let mut selected: Vec<usize> = Vec::with_capacity(max_points);
    for candidate in &candidates {
        if selected
            .iter()
            .all(|&kept| kept.abs_diff(candidate.split) > window)
        {
            selected.push(candidate.split);
            if selected.len() == max_points {
                break;
            }
        }
    }
    selected.sort_unstable();
    selected
}

#[cfg(test)]
mod tests {
    use super::sliding_window;

    #[test]
    fn detects_downward_step_only() {
        let mut down = vec![50.0; 600];
        down[300..].fill(45.0);
        assert_eq!(sliding_window(&down, 200, 0.7, 5), vec![300]);

        let mut up = vec![45.0; 600];
        up[300..].fill(50.0);
        assert!(sliding_window(&up, 200, 0.7, 5).is_empty());
    }

    #[test]
    fn nearby_candidates_are_suppressed() {
        let mut values = vec![10.0; 100];
        values[50..].fill(0.0);
        // scores peak at 50 and decay on either side; the neighbours lie within the window.
        assert_eq!(sliding_window(&values, 20, 0.7, 5), vec![50]);
    }

    #[test]
    fn cap_limits_kept_points() {
        let mut values = Vec::new();
        for level in (0..8).rev() {
            values.extend(std::iter::repeat_n(f64::from(level) * 10.0, 30));
        }
        let all = sliding_window(&values, 10, 0.7, 10);
        assert_eq!(all, vec![30, 60, 90, 120, 150, 180, 210]);
        assert_eq!(sliding_window(&values, 10, 0.7, 5).len(), 5);
    }

    #[test]
    fn short_series_has_no_windows() {
        assert!(sliding_window(&[5.0; 400], 200, 0.7, 5).is_empty());
        assert!(sliding_window(&[], 200, 0.7, 5).is_empty());
    }
}
