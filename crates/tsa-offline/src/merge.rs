// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

/// Concatenates both lists, sorts them and keeps an index only when it lies
/// more than `tolerance` after the last kept index.
pub fn merge_change_points(first: &[usize], second: &[usize], tolerance: usize) -> Vec<usize> {
    let mut all: Vec<usize> = first.iter().chain(second).copied().collect();
    all.sort_unstable();

    let mut merged: Vec<usize> = Vec::with_capacity(all.len());
    for idx in all {
        match merged.last() {
            Some(&last) if idx - last <= tolerance => {}
            _ => merged.push(idx),
        }
    }
    merged
}

/// Consecutive index pair from `[0, change points..., n-1]`, both inclusive.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegionBoundary {
    pub start_idx: usize,
    pub end_idx: usize,
}

/// Brackets `change_points` between the first and last index of a series of
/// length `n`. Empty for an empty series.
pub fn region_boundaries(change_points: &[usize], n: usize) -> Vec<RegionBoundary> {
    if n == 0 {
        return vec![];
    }
    let mut anchors = Vec::with_capacity(change_points.len() + 2);
    anchors.push(0);
    anchors.extend(change_points.iter().copied().filter(|&idx| idx < n));
    anchors.push(n - 1);

    anchors
        .windows(2)
        .map(|pair| RegionBoundary {
            start_idx: pair[0],
            end_idx: pair[1],
        })
        .collect()
}
