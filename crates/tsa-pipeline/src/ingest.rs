// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::config::IngestConfig;
use crate::source::{DataSource, RowQuery};
use tsa_core::{ExcludeRange, Series, SeriesPoint, TsaError};
use tsa_preprocess::{ResampleConfig, StratifiedResampler, clean_rows, filter_excluded};

/// Counters gathered while ingesting one request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub partitions: usize,
    /// Rows returned by the source before any cleaning.
    pub raw_rows: usize,
    pub missing: usize,
    pub non_finite: usize,
    pub zero: usize,
    pub excluded: usize,
    /// Interim exclude-and-resample passes triggered by the high-water mark.
    pub safety_valve_passes: usize,
}

/// Cleaned, ordered, exclusion-filtered series plus ingestion counters.
#[derive(Clone, Debug)]
pub struct Ingested {
    pub series: Series,
    pub report: IngestReport,
}

/// Fetches every partition of `query`, cleaning each batch as it arrives.
///
/// When the buffer exceeds `config.high_water_mark`, it is sorted,
/// exclusion-filtered and, if still above `2 * resample.target_points`,
/// resampled to that size before the next partition is fetched. Exclusion is
/// applied once more after the last partition.
pub fn ingest(
    source: &dyn DataSource,
    query: &RowQuery,
    exclude_ranges: &[ExcludeRange],
    config: &IngestConfig,
    resample: &ResampleConfig,
) -> Result<Ingested, TsaError> {
    let mut report = IngestReport::default();
    let mut buffer: Vec<SeriesPoint> = vec![];
    let interim_target = resample.target_points.saturating_mul(2);

    for partition in source.partitions(query) {
        report.partitions += 1;
        let rows = source.fetch_rows(&partition)?;
        let fetched = rows.len();
        let (batch, cleaned) = clean_rows(rows, config.drop_zero_readings)?;
        report.raw_rows += cleaned.input_rows;
        report.missing += cleaned.missing;
        report.non_finite += cleaned.non_finite;
        report.zero += cleaned.zero;
        tracing::debug!(
            column = %partition.column,
            start = %partition.start,
            end = %partition.end,
            fetched,
            kept = batch.len(),
            "partition fetched"
        );
        buffer.extend(batch.into_points());

        if buffer.len() > config.high_water_mark {
            let before = buffer.len();
            let mut interim = Series::from_unsorted(std::mem::take(&mut buffer))?;
            report.excluded += filter_excluded(&mut interim, exclude_ranges);
            if interim.len() > interim_target {
                let resampler = StratifiedResampler::new(ResampleConfig {
                    target_points: interim_target,
                    seed: resample.seed,
                })?;
                interim = resampler.resample(&interim)?;
            }
            report.safety_valve_passes += 1;
            tracing::info!(
                before,
                after = interim.len(),
                high_water_mark = config.high_water_mark,
                "early filter and resample pass"
            );
            buffer = interim.into_points();
        }
    }

    let mut series = Series::from_unsorted(buffer)?;
    report.excluded += filter_excluded(&mut series, exclude_ranges);
    tracing::info!(
        column = %query.column,
        partitions = report.partitions,
        raw_rows = report.raw_rows,
        dropped = report.missing + report.non_finite + report.zero,
        excluded = report.excluded,
        kept = series.len(),
        "ingestion complete"
    );
    Ok(Ingested { series, report })
}
