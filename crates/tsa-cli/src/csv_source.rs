// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use std::fs::File;
use std::io::Read;
use std::path::Path;
use tsa_core::{Timestamp, TsaError, parse_timestamp};
use tsa_pipeline::{DataSource, RowQuery, month_partitions};
use tsa_preprocess::RawRow;

const TIMESTAMP_HEADER: &str = "Date";

/// Sensor export held in memory: a `Date` column followed by one column per
/// sensor.
///
/// Empty or non-numeric cells load as missing readings; an unparsable
/// timestamp fails the whole load.
#[derive(Clone, Debug)]
pub struct CsvSource {
    columns: Vec<String>,
    rows: Vec<(Timestamp, Vec<Option<f64>>)>,
}

impl CsvSource {
    pub fn open(path: &Path) -> Result<Self, TsaError> {
        let file = File::open(path).map_err(|source| {
            TsaError::upstream(format!("failed to open '{}'", path.display()), source)
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TsaError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|source| TsaError::upstream("failed to read CSV header", source))?
            .clone();
        match headers.get(0) {
            Some(first) if first == TIMESTAMP_HEADER => {}
            other => {
                return Err(TsaError::upstream(
                    "invalid CSV header",
                    format!(
                        "first column must be '{TIMESTAMP_HEADER}'; got '{}'",
                        other.unwrap_or_default()
                    ),
                ));
            }
        }
        let columns: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

        let mut rows = vec![];
        for (index, record) in reader.records().enumerate() {
            let line = index + 2;
            let record = record.map_err(|source| {
                TsaError::upstream(format!("failed to read CSV row {line}"), source)
            })?;
            let raw_ts = record.get(0).unwrap_or_default();
            let timestamp = parse_timestamp(raw_ts).map_err(|err| {
                TsaError::upstream(format!("CSV row {line} has an unparsable timestamp"), err)
            })?;
            let values = (0..columns.len())
                .map(|col| record.get(col + 1).and_then(parse_cell))
                .collect();
            rows.push((timestamp, values));
        }

        tracing::debug!(columns = columns.len(), rows = rows.len(), "CSV source loaded");
        Ok(Self { columns, rows })
    }

    fn column_index(&self, column: &str) -> Result<usize, TsaError> {
        self.columns
            .iter()
            .position(|name| name == column)
            .ok_or_else(|| TsaError::invalid_request(format!("unknown column '{column}'")))
    }
}

fn parse_cell(raw: &str) -> Option<f64> {
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok()
}

impl DataSource for CsvSource {
    fn columns(&self) -> Result<Vec<String>, TsaError> {
        Ok(self.columns.clone())
    }

    fn partitions(&self, query: &RowQuery) -> Vec<RowQuery> {
        month_partitions(query)
    }

    fn fetch_rows(&self, query: &RowQuery) -> Result<Vec<RawRow>, TsaError> {
        let col = self.column_index(&query.column)?;
        Ok(self
            .rows
            .iter()
            .filter(|(timestamp, _)| query.contains(*timestamp))
            .map(|(timestamp, values)| RawRow::new(*timestamp, values[col]))
            .collect())
    }
}
