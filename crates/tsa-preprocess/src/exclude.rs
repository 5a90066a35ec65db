// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use tsa_core::{ExcludeRange, Series};

/// Removes every point whose timestamp falls inside any of `ranges`.
///
/// Ranges may be unordered and may overlap. Returns the number of removed
/// points; an empty result is not an error here.
pub fn filter_excluded(series: &mut Series, ranges: &[ExcludeRange]) -> usize {
    if ranges.is_empty() {
        return 0;
    }
    let before = series.len();
    series.retain(|point| !ranges.iter().any(|range| range.contains(point.timestamp)));
    let removed = before - series.len();
    tracing::debug!(ranges = ranges.len(), removed, remaining = series.len(), "applied exclusions");
    removed
}

#[cfg(test)]
mod tests {
    use super::filter_excluded;
    use tsa_core::{ExcludeRange, Series, SeriesPoint, timestamp_from_millis};

    fn series(stamps: &[i64]) -> Series {
        Series::new(
            stamps
                .iter()
                .map(|&ms| {
                    SeriesPoint::new(timestamp_from_millis(ms).expect("valid"), ms as f64)
                })
                .collect(),
        )
        .expect("test series should be ordered")
    }

    fn range(start: i64, end: i64) -> ExcludeRange {
        ExcludeRange::new(
            timestamp_from_millis(start).expect("valid"),
            timestamp_from_millis(end).expect("valid"),
        )
    }

    #[test]
    fn removes_points_inside_inclusive_bounds() {
        let mut s = series(&[0, 10, 20, 30, 40]);
        let removed = filter_excluded(&mut s, &[range(10, 30)]);
        assert_eq!(removed, 3);
        assert_eq!(s.values(), vec![0.0, 40.0]);
    }

    #[test]
    fn overlapping_and_unordered_ranges_remove_each_point_once() {
        let mut s = series(&[0, 10, 20, 30, 40, 50]);
        let removed = filter_excluded(&mut s, &[range(35, 55), range(5, 25), range(15, 22)]);
        assert_eq!(removed, 4);
        assert_eq!(s.values(), vec![0.0, 30.0]);
    }

    #[test]
    fn range_outside_span_leaves_series_unchanged() {
        let mut s = series(&[100, 200, 300]);
        let removed = filter_excluded(&mut s, &[range(0, 50), range(400, 500)]);
        assert_eq!(removed, 0);
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn can_remove_everything() {
        let mut s = series(&[1, 2, 3]);
        filter_excluded(&mut s, &[range(0, 10)]);
        assert!(s.is_empty());
    }
}
