// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use tsa_core::TsaError;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Ordered(f64);

impl Eq for Ordered {}

impl PartialOrd for Ordered {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ordered {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Two-heap running median with per-side sums, so the L1 cost of the values
/// pushed so far is O(1) to read.
#[derive(Debug, Default)]
struct RunningMedian {
    low: BinaryHeap<Ordered>,
    high: BinaryHeap<Reverse<Ordered>>,
    low_sum: f64,
    high_sum: f64,
}

impl RunningMedian {
    fn clear(&mut self) {
        self.low.clear();
        self.high.clear();
        self.low_sum = 0.0;
        self.high_sum = 0.0;
    }

    fn push(&mut self, value: f64) {
        if self.low.peek().is_none_or(|top| value <= top.0) {
            self.low.push(Ordered(value));
            self.low_sum += value;
        } else {
            self.high.push(Reverse(Ordered(value)));
            self.high_sum += value;
        }

        // low holds the extra element when the count is odd
        if self.low.len() > self.high.len() + 1 {
            if let Some(Ordered(moved)) = self.low.pop() {
                self.low_sum -= moved;
                self.high.push(Reverse(Ordered(moved)));
                self.high_sum += moved;
            }
        } else if self.high.len() > self.low.len()
            && let Some(Reverse(Ordered(moved))) = self.high.pop()
        {
            self.high_sum -= moved;
            self.low.push(Ordered(moved));
            self.low_sum += moved;
        }
    }

    /// `Σ|v - median|`. Any value between the two middle elements minimizes
    /// the sum, so the lower middle is used for even counts.
    fn abs_deviation(&self) -> f64 {
        let Some(&Ordered(median)) = self.low.peek() else {
            return 0.0;
        };
        let below = median * self.low.len() as f64 - self.low_sum;
        let above = self.high_sum - median * self.high.len() as f64;
        let cost = below + above;
        if cost.is_finite() {
            cost.max(0.0)
        } else {
            cost
        }
    }
}

/// Penalized change points under an L1 (absolute deviation from the segment
/// median) cost, found with Pruned Exact Linear Time search.
///
/// Candidate split positions are the multiples of `jump` that are at least
/// `min_size`; every segment holds at least `min_size` values. Each change
/// costs `penalty`. Output is ascending and holds neither `0` nor `n`.
///
/// Fails with [`TsaError::NumericalIssue`] when a segment cost overflows.
pub fn pelt_l1(
    values: &[f64],
    penalty: f64,
    min_size: usize,
    jump: usize,
) -> Result<Vec<usize>, TsaError> {
    if !penalty.is_finite() || penalty <= 0.0 {
        return Err(TsaError::invalid_request(format!(
            "pelt penalty must be finite and > 0; got {penalty}"
        )));
    }
    let n = values.len();
    let min_size = min_size.max(1);
    let jump = jump.max(1);
    if n < min_size {
        return Ok(vec![]);
    }

    let mut targets: Vec<usize> = (0..n).step_by(jump).filter(|&k| k >= min_size).collect();
    targets.push(n);

    let mut f = vec![f64::INFINITY; n + 1];
    let mut last_cp = vec![usize::MAX; n + 1];
    f[0] = -penalty;
    last_cp[0] = 0;

    let mut candidates = vec![0usize];
    let mut median = RunningMedian::default();
    let mut cost_evals = 0usize;
    let mut pruned = 0usize;

    for &t in &targets {
        median.clear();
        let mut filled_from = t;
        let mut scored = vec![None; candidates.len()];
        let mut best_cost = f64::INFINITY;
        let mut best_tau = usize::MAX;

        // descending tau lets one running median cover every segment ending at t
        for (idx, &tau) in candidates.iter().enumerate().rev() {
            if t - tau < min_size {
                continue;
            }
            for &value in &values[tau..filled_from] {
                median.push(value);
            }
            filled_from = tau;
            cost_evals += 1;

            let segment_cost = median.abs_deviation();
            let score = f[tau] + segment_cost;
            let candidate = score + penalty;
            if !candidate.is_finite() {
                return Err(TsaError::numerical_issue(format!(
                    "non-finite L1 objective on [{tau}, {t}): segment_cost={segment_cost}"
                )));
            }
            scored[idx] = Some(score);

            if candidate < best_cost || (candidate == best_cost && tau < best_tau) {
                best_cost = candidate;
                best_tau = tau;
            }
        }

        if best_tau == usize::MAX {
            return Err(TsaError::invalid_request(format!(
                "no feasible segmentation ending at t={t}; check pelt min_size and jump"
            )));
        }
        f[t] = best_cost;
        last_cp[t] = best_tau;

        let mut next = Vec::with_capacity(candidates.len() + 1);
        for (idx, &tau) in candidates.iter().enumerate() {
            match scored[idx] {
                Some(score) if score >= best_cost => pruned += 1,
                _ => next.push(tau),
            }
        }
        if t < n {
            next.push(t);
        }
        candidates = next;
    }

    let mut change_points = vec![];
    let mut cursor = n;
    while cursor > 0 {
        let tau = last_cp[cursor];
        if tau == 0 || tau >= cursor {
            break;
        }
        change_points.push(tau);
        cursor = tau;
    }
    change_points.reverse();

    tracing::trace!(
        n,
        penalty,
        cost_evals,
        pruned,
        objective = f[n],
        "pelt l1 finished"
    );
    Ok(change_points)
}

#[cfg(test)]
mod tests {
    use super::{RunningMedian, pelt_l1};
    use tsa_core::TsaError;

    fn steps(levels: &[(f64, usize)]) -> Vec<f64> {
        levels
            .iter()
            .flat_map(|&(level, len)| std::iter::repeat_n(level, len))
            .collect()
    }

    #[test]
    fn running_median_tracks_absolute_deviation() {
        let mut median = RunningMedian::default();
        for v in [5.0, 1.0, 9.0, 3.0] {
            median.push(v);
        }
        // lower middle 3: |5-3| + |1-3| + |9-3| + 0 = 10
        assert_eq!(median.abs_deviation(), 10.0);
        median.push(7.0);
        // median 5: 0 + 4 + 4 + 2 + 2
        assert_eq!(median.abs_deviation(), 12.0);
        median.clear();
        assert_eq!(median.abs_deviation(), 0.0);
    }

    #[test]
    fn single_step_is_found() {
        let values = steps(&[(60.0, 100), (52.0, 100)]);
        assert_eq!(pelt_l1(&values, 100.0, 2, 5).expect("pelt should run"), vec![100]);
    }

    #[test]
    fn two_steps_are_found() {
        let values = steps(&[(60.0, 100), (30.0, 100), (60.0, 100)]);
        assert_eq!(
            pelt_l1(&values, 100.0, 2, 5).expect("pelt should run"),
            vec![100, 200]
        );
    }

    #[test]
    fn split_snaps_to_jump_grid() {
        // [0,105) costs 2*8 around median 60; splitting at 100 instead costs 3*8
        let values = steps(&[(60.0, 103), (52.0, 97)]);
        assert_eq!(pelt_l1(&values, 100.0, 2, 5).expect("pelt should run"), vec![105]);
    }

    #[test]
    fn shift_cheaper_than_penalty_is_ignored() {
        // one segment costs 40, a split costs the 100 penalty
        let values = steps(&[(50.0, 40), (51.0, 40)]);
        assert!(pelt_l1(&values, 100.0, 2, 5).expect("pelt should run").is_empty());
    }

    #[test]
    fn constant_short_and_empty_inputs_have_no_changes() {
        assert!(pelt_l1(&[45.0; 300], 100.0, 2, 5).expect("pelt should run").is_empty());
        assert!(pelt_l1(&[45.0], 100.0, 2, 5).expect("pelt should run").is_empty());
        assert!(pelt_l1(&[], 100.0, 2, 5).expect("pelt should run").is_empty());
    }

    #[test]
    fn invalid_penalty_is_rejected() {
        let err = pelt_l1(&[1.0, 2.0], 0.0, 2, 5).expect_err("zero penalty must fail");
        assert!(matches!(err, TsaError::InvalidRequest(_)));
    }

    #[test]
    fn overflowing_cost_is_numerical_issue() {
        let values = [1e308, -1e308, 1e308, -1e308, 1e308, -1e308];
        let err = pelt_l1(&values, 100.0, 2, 5).expect_err("overflow must fail");
        assert!(matches!(err, TsaError::NumericalIssue(_)));
        assert_eq!(err.code(), "numerical_issue");
    }
}
