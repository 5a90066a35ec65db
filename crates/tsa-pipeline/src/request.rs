// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use serde::Deserialize;
use std::collections::BTreeMap;
use tsa_core::{ExcludeRange, Timestamp, TsaError, parse_timestamp};

/// Window size used for the minimum-size check when none is given.
pub const DEFAULT_WINDOW_SIZE: usize = 50;

/// One analysis request over a column and period.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisRequest {
    pub column: String,
    pub start: Timestamp,
    pub end: Timestamp,
    /// Only used for the sufficiency check: at least `2 * window_size` points
    /// must survive exclusion.
    pub window_size: usize,
    /// Overrides the configured resample target.
    pub resample_points: Option<usize>,
    pub exclude_ranges: Vec<ExcludeRange>,
    /// Overrides the configured baseline percentiles.
    pub percentiles: Option<Vec<u32>>,
    /// Problems recovered from while parsing.
    pub warnings: Vec<String>,
}

impl AnalysisRequest {
    pub fn new(column: impl Into<String>, start: Timestamp, end: Timestamp) -> Self {
        Self {
            column: column.into(),
            start,
            end,
            window_size: DEFAULT_WINDOW_SIZE,
            resample_points: None,
            exclude_ranges: vec![],
            percentiles: None,
            warnings: vec![],
        }
    }

    /// Builds a request from string parameters.
    ///
    /// `column`, `start_date` and `end_date` are required. Unparsable numbers
    /// or dates are rejected; a malformed `exclude_ranges` payload is replaced
    /// by an empty list and reported in [`Self::warnings`].
    pub fn from_params(params: &BTreeMap<String, String>) -> Result<Self, TsaError> {
        let required = |key: &str| -> Result<&str, TsaError> {
            params
                .get(key)
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
                .ok_or_else(|| {
                    TsaError::invalid_request("Column, start_date, and end_date are required")
                })
        };
        let column = required("column")?;
        let start = parse_timestamp(required("start_date")?)?;
        let end = parse_timestamp(required("end_date")?)?;

        let mut request = Self::new(column, start, end);
        if let Some(raw) = optional(params, "window_size") {
            request.window_size = parse_count("window_size", raw)?;
        }
        if let Some(raw) = optional(params, "resample_points") {
            request.resample_points = Some(parse_count("resample_points", raw)?);
        }
        if let Some(raw) = optional(params, "percentiles") {
            request.percentiles = Some(parse_percentiles(raw)?);
        }
        if let Some(raw) = optional(params, "exclude_ranges") {
            match parse_exclude_ranges(raw) {
                Ok(ranges) => request.exclude_ranges = ranges,
                Err(reason) => {
                    tracing::warn!(%reason, "failed to parse exclude_ranges, using empty list");
                    request
                        .warnings
                        .push(format!("exclude_ranges ignored: {reason}"));
                }
            }
        }
        Ok(request)
    }
}

fn optional<'a>(params: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn parse_count(name: &str, raw: &str) -> Result<usize, TsaError> {
    raw.parse::<usize>().map_err(|err| {
        TsaError::invalid_request(format!("{name} must be a non-negative integer; got '{raw}': {err}"))
    })
}

/// Parses a comma-separated percentile list such as `5,10,90`.
pub fn parse_percentiles(raw: &str) -> Result<Vec<u32>, TsaError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let p = part.parse::<u32>().map_err(|err| {
                TsaError::invalid_request(format!("invalid percentile '{part}': {err}"))
            })?;
            if p > 100 {
                return Err(TsaError::invalid_request(format!(
                    "percentile must lie in 0..=100; got {p}"
                )));
            }
            Ok(p)
        })
        .collect()
}

#[derive(Deserialize)]
struct RawExcludeRange {
    start: String,
    end: String,
}

/// Parses `[{"start": .., "end": ..}, ...]`.
///
/// The error is a human-readable reason; callers recover by excluding
/// nothing.
pub fn parse_exclude_ranges(raw: &str) -> Result<Vec<ExcludeRange>, String> {
    let parsed: Vec<RawExcludeRange> =
        serde_json::from_str(raw).map_err(|err| format!("invalid JSON: {err}"))?;
    parsed
        .into_iter()
        .map(|range| {
            let start = parse_timestamp(&range.start).map_err(|err| err.to_string())?;
            let end = parse_timestamp(&range.end).map_err(|err| err.to_string())?;
            Ok(ExcludeRange::new(start, end))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{AnalysisRequest, DEFAULT_WINDOW_SIZE, parse_exclude_ranges, parse_percentiles};
    use std::collections::BTreeMap;
    use tsa_core::parse_timestamp;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn minimal_request_uses_defaults() {
        let request = AnalysisRequest::from_params(&params(&[
            ("column", "Oven1"),
            ("start_date", "2024-01-01"),
            ("end_date", "2024-02-01"),
        ]))
        .expect("minimal request should parse");
        assert_eq!(request.column, "Oven1");
        assert_eq!(request.window_size, DEFAULT_WINDOW_SIZE);
        assert_eq!(request.resample_points, None);
        assert!(request.exclude_ranges.is_empty());
        assert!(request.warnings.is_empty());
    }

    #[test]
    fn missing_required_parameter_is_invalid_request() {
        for missing in ["column", "start_date", "end_date"] {
            let mut p = params(&[
                ("column", "Oven1"),
                ("start_date", "2024-01-01"),
                ("end_date", "2024-02-01"),
            ]);
            p.remove(missing);
            let err = AnalysisRequest::from_params(&p).expect_err("missing parameter must fail");
            assert_eq!(err.code(), "invalid_request");
            assert!(err.to_string().contains("required"));
        }
    }

    #[test]
    fn optional_parameters_are_parsed() {
        let request = AnalysisRequest::from_params(&params(&[
            ("column", "Oven1"),
            ("start_date", "2024-01-01 00:00:00"),
            ("end_date", "2024-02-01T00:00:00Z"),
            ("window_size", "20"),
            ("resample_points", "500"),
            ("percentiles", "5, 50,95"),
            (
                "exclude_ranges",
                r#"[{"start":"2024-01-10 00:00:00","end":"2024-01-11 00:00:00"}]"#,
            ),
        ]))
        .expect("full request should parse");
        assert_eq!(request.window_size, 20);
        assert_eq!(request.resample_points, Some(500));
        assert_eq!(request.percentiles, Some(vec![5, 50, 95]));
        assert_eq!(request.exclude_ranges.len(), 1);
        assert_eq!(
            request.exclude_ranges[0].start,
            parse_timestamp("2024-01-10").expect("valid")
        );
    }

    #[test]
    fn malformed_exclude_ranges_degrade_to_empty_with_warning() {
        let request = AnalysisRequest::from_params(&params(&[
            ("column", "Oven1"),
            ("start_date", "2024-01-01"),
            ("end_date", "2024-02-01"),
            ("exclude_ranges", "[{\"start\": oops"),
        ]))
        .expect("malformed exclusions must not fail the request");
        assert!(request.exclude_ranges.is_empty());
        assert_eq!(request.warnings.len(), 1);
        assert!(request.warnings[0].contains("exclude_ranges"));

        assert!(parse_exclude_ranges(r#"[{"start":"soon","end":"2024-01-01"}]"#).is_err());
        assert_eq!(parse_exclude_ranges("[]"), Ok(vec![]));
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let err = AnalysisRequest::from_params(&params(&[
            ("column", "Oven1"),
            ("start_date", "2024-01-01"),
            ("end_date", "2024-02-01"),
            ("window_size", "-3"),
        ]))
        .expect_err("negative window must fail");
        assert!(err.to_string().contains("window_size"));

        assert!(parse_percentiles("5,abc").is_err());
        assert!(parse_percentiles("101").is_err());
    }
}
