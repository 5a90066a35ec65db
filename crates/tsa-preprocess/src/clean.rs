// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use tsa_core::{Series, SeriesPoint, Timestamp, TsaError};

/// Row as delivered by a data source, before cleaning.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawRow {
    pub timestamp: Timestamp,
    pub value: Option<f64>,
}

impl RawRow {
    pub fn new(timestamp: Timestamp, value: Option<f64>) -> Self {
        Self { timestamp, value }
    }
}

/// Counts of rows dropped while cleaning.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub input_rows: usize,
    pub missing: usize,
    pub non_finite: usize,
    pub zero: usize,
}

impl CleanReport {
    pub fn dropped(&self) -> usize {
        self.missing + self.non_finite + self.zero
    }
}

/// Drops unusable readings and orders the remainder by timestamp.
///
/// A reading of exactly `0` is the sensors' dropout marker and is dropped when
/// `drop_zero_readings` is set.
pub fn clean_rows(
    rows: Vec<RawRow>,
    drop_zero_readings: bool,
) -> Result<(Series, CleanReport), TsaError> {
    let mut report = CleanReport {
        input_rows: rows.len(),
        ..CleanReport::default()
    };
    let mut points = Vec::with_capacity(rows.len());

    for row in rows {
        let Some(value) = row.value else {
            report.missing += 1;
            continue;
        };
        if !value.is_finite() {
            report.non_finite += 1;
            continue;
        }
        if drop_zero_readings && value == 0.0 {
            report.zero += 1;
            continue;
        }
        points.push(SeriesPoint::new(row.timestamp, value));
    }

    let series = Series::from_unsorted(points)?;
    Ok((series, report))
}
