// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::TsaError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Instant on the UTC timeline.
pub type Timestamp = DateTime<Utc>;

/// Converts Unix milliseconds into a [`Timestamp`].
pub fn timestamp_from_millis(millis: i64) -> Result<Timestamp, TsaError> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| TsaError::invalid_request(format!("timestamp out of range: {millis} ms")))
}

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parses RFC 3339, `YYYY-MM-DD HH:MM[:SS[.fff]]` or a bare `YYYY-MM-DD`.
///
/// Inputs without an offset are read as UTC; a bare date is midnight.
pub fn parse_timestamp(raw: &str) -> Result<Timestamp, TsaError> {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        && let Some(midnight) = date.and_hms_opt(0, 0, 0)
    {
        return Ok(midnight.and_utc());
    }
    Err(TsaError::invalid_request(format!(
        "unrecognized timestamp '{trimmed}'; expected RFC 3339 or YYYY-MM-DD[ HH:MM:SS]"
    )))
}

/// One reading of the selected sensor.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeriesPoint {
    pub timestamp: Timestamp,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(timestamp: Timestamp, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Caller-supplied interval to drop from analysis. Both bounds are inclusive.
///
/// A range whose `start` is after its `end` matches nothing.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExcludeRange {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl ExcludeRange {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    /// Returns true when `t` lies inside `[start, end]`.
    pub fn contains(&self, t: Timestamp) -> bool {
        self.start <= t && t <= self.end
    }
}

/// Owned series ordered ascending by timestamp with finite values.
///
/// Every stage that depends on temporal order takes a `Series`, so the
/// ordering check happens once at construction.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Series {
    points: Vec<SeriesPoint>,
}

impl Series {
    /// Validates an already ordered sequence.
    pub fn new(points: Vec<SeriesPoint>) -> Result<Self, TsaError> {
        if let Some(idx) = points
            .windows(2)
            .position(|pair| pair[1].timestamp < pair[0].timestamp)
        {
            return Err(TsaError::invalid_request(format!(
                "series must be ordered ascending by timestamp: index {} ({}) precedes index {} ({})",
                idx,
                points[idx].timestamp,
                idx + 1,
                points[idx + 1].timestamp
            )));
        }
        validate_finite(&points)?;
        Ok(Self { points })
    }

    /// Sorts by timestamp (stable, so equal instants keep arrival order) and validates.
    pub fn from_unsorted(mut points: Vec<SeriesPoint>) -> Result<Self, TsaError> {
        points.sort_by_key(|point| point.timestamp);
        validate_finite(&points)?;
        Ok(Self { points })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn into_points(self) -> Vec<SeriesPoint> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&SeriesPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&SeriesPoint> {
        self.points.last()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|point| point.value).collect()
    }

    pub fn timestamps(&self) -> Vec<Timestamp> {
        self.points.iter().map(|point| point.timestamp).collect()
    }

    /// Span between the first and last timestamps, zero for fewer than two points.
    pub fn span(&self) -> chrono::Duration {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => last.timestamp - first.timestamp,
            _ => chrono::Duration::zero(),
        }
    }

    /// Keeps the points matching `keep`; order is preserved.
    pub fn retain(&mut self, keep: impl FnMut(&SeriesPoint) -> bool) {
        self.points.retain(keep);
    }

    /// Builds a series from points that are already known to be ordered and finite.
    pub(crate) fn from_trusted(points: Vec<SeriesPoint>) -> Self {
        Self { points }
    }

    /// Selects points by strictly increasing indices.
    pub fn select(&self, indices: &[usize]) -> Result<Self, TsaError> {
        if indices.windows(2).any(|pair| pair[1] <= pair[0]) {
            return Err(TsaError::invalid_request(
                "selection indices must be strictly increasing",
            ));
        }
        let mut points = Vec::with_capacity(indices.len());
        for &idx in indices {
            let point = self.points.get(idx).ok_or_else(|| {
                TsaError::invalid_request(format!(
                    "selection index {idx} out of bounds for series of length {}",
                    self.points.len()
                ))
            })?;
            points.push(*point);
        }
        Ok(Self::from_trusted(points))
    }
}

fn validate_finite(points: &[SeriesPoint]) -> Result<(), TsaError> {
    if let Some((idx, point)) = points
        .iter()
        .enumerate()
        .find(|(_, point)| !point.value.is_finite())
    {
        return Err(TsaError::invalid_request(format!(
            "series values must be finite: index {idx} has {}",
            point.value
        )));
    }
    Ok(())
}
