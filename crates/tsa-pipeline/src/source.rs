// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use chrono::{Datelike, NaiveDate, TimeDelta};
use std::collections::BTreeMap;
use tsa_core::{Timestamp, TsaError};
use tsa_preprocess::RawRow;

/// Rows of one column between two instants, both inclusive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowQuery {
    pub column: String,
    pub start: Timestamp,
    pub end: Timestamp,
}

impl RowQuery {
    pub fn new(column: impl Into<String>, start: Timestamp, end: Timestamp) -> Self {
        Self {
            column: column.into(),
            start,
            end,
        }
    }

    pub fn contains(&self, t: Timestamp) -> bool {
        self.start <= t && t <= self.end
    }
}

/// Storage capability supplying raw rows.
///
/// Fetch failures surface as [`TsaError::Upstream`] and are never retried by
/// the pipeline.
pub trait DataSource {
    /// Sensor columns available for analysis.
    fn columns(&self) -> Result<Vec<String>, TsaError>;

    /// Splits `query` into independently fetched storage partitions.
    fn partitions(&self, query: &RowQuery) -> Vec<RowQuery> {
        vec![query.clone()]
    }

    /// Rows inside `query`, in any order. An unknown column is
    /// [`TsaError::InvalidRequest`].
    fn fetch_rows(&self, query: &RowQuery) -> Result<Vec<RawRow>, TsaError>;
}

fn first_of_next_month(t: Timestamp) -> Option<Timestamp> {
    let (year, month) = if t.month() == 12 {
        (t.year() + 1, 1)
    } else {
        (t.year(), t.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Splits `query` at calendar-month boundaries (UTC).
///
/// Partitions are ascending, non-overlapping and together cover
/// `[start, end]`. An inverted range yields no partitions.
pub fn month_partitions(query: &RowQuery) -> Vec<RowQuery> {
    let mut parts = vec![];
    if query.start > query.end {
        return parts;
    }

    let mut cursor = query.start;
    loop {
        let Some(next_month) = first_of_next_month(cursor) else {
            parts.push(RowQuery::new(query.column.clone(), cursor, query.end));
            break;
        };
        let part_end = (next_month - TimeDelta::milliseconds(1)).min(query.end);
        parts.push(RowQuery::new(query.column.clone(), cursor, part_end));
        if next_month > query.end {
            break;
        }
        cursor = next_month;
    }
    parts
}

/// In-memory columns partitioned by calendar month.
#[derive(Clone, Debug, Default)]
pub struct InMemorySource {
    columns: BTreeMap<String, Vec<RawRow>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column(mut self, name: impl Into<String>, rows: Vec<RawRow>) -> Self {
        self.insert_column(name, rows);
        self
    }

    pub fn insert_column(&mut self, name: impl Into<String>, rows: Vec<RawRow>) {
        self.columns.insert(name.into(), rows);
    }
}

impl DataSource for InMemorySource {
    fn columns(&self) -> Result<Vec<String>, TsaError> {
        Ok(self.columns.keys().cloned().collect())
    }

    fn partitions(&self, query: &RowQuery) -> Vec<RowQuery> {
        month_partitions(query)
    }

    fn fetch_rows(&self, query: &RowQuery) -> Result<Vec<RawRow>, TsaError> {
        let rows = self.columns.get(&query.column).ok_or_else(|| {
            TsaError::invalid_request(format!("unknown column '{}'", query.column))
        })?;
        Ok(rows
            .iter()
            .filter(|row| query.contains(row.timestamp))
            .copied()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::{DataSource, InMemorySource, RowQuery, month_partitions};
    use tsa_core::parse_timestamp;
    use tsa_preprocess::RawRow;

    fn ts(raw: &str) -> tsa_core::Timestamp {
        parse_timestamp(raw).expect("test timestamp should parse")
    }

    #[test]
    fn month_partitions_cover_the_range_without_overlap() {
        let query = RowQuery::new("Oven1", ts("2023-11-15 08:00:00"), ts("2024-02-03 00:00:00"));
        let parts = month_partitions(&query);
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0].start, query.start);
        assert_eq!(parts[0].end, ts("2023-11-30T23:59:59.999Z"));
        assert_eq!(parts[1].start, ts("2023-12-01"));
        assert_eq!(parts[2].start, ts("2024-01-01"));
        assert_eq!(parts[3].start, ts("2024-02-01"));
        assert_eq!(parts[3].end, query.end);
        assert!(parts.iter().all(|p| p.column == "Oven1"));
    }

    #[test]
    fn single_month_and_inverted_ranges() {
        let query = RowQuery::new("c", ts("2024-03-02"), ts("2024-03-20"));
        assert_eq!(month_partitions(&query), vec![query.clone()]);

        let inverted = RowQuery::new("c", ts("2024-03-20"), ts("2024-03-02"));
        assert!(month_partitions(&inverted).is_empty());

        let boundary = RowQuery::new("c", ts("2024-03-02"), ts("2024-04-01"));
        let parts = month_partitions(&boundary);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1].start, parts[1].end);
    }

    #[test]
    fn in_memory_source_filters_inclusively_and_rejects_unknown_columns() {
        let rows = vec![
            RawRow::new(ts("2024-01-01 00:00:00"), Some(1.0)),
            RawRow::new(ts("2024-01-02 00:00:00"), Some(2.0)),
            RawRow::new(ts("2024-01-03 00:00:00"), Some(3.0)),
        ];
        let source = InMemorySource::new().with_column("Oven1", rows);
        assert_eq!(
            source.columns().expect("columns should list"),
            vec!["Oven1".to_string()]
        );

        let query = RowQuery::new("Oven1", ts("2024-01-01"), ts("2024-01-02"));
        let fetched = source.fetch_rows(&query).expect("known column should fetch");
        assert_eq!(fetched.len(), 2);

        let err = source
            .fetch_rows(&RowQuery::new("Oven9", ts("2024-01-01"), ts("2024-01-02")))
            .expect_err("unknown column must fail");
        assert_eq!(err.code(), "invalid_request");
    }
}
