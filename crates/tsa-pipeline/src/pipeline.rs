// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::config::AnalysisConfig;
use crate::ingest::{IngestReport, Ingested, ingest};
use crate::report::{
    AdvancedStats, AnalysisReport, BaselineReport, ChangePointBreakdown, Metadata, MovingAverage,
    Period, Region, ResampledSeries, SeriesView,
};
use crate::request::AnalysisRequest;
use crate::source::{DataSource, RowQuery};
use std::borrow::Cow;
use std::time::{Duration, Instant};
use tsa_anomaly::PointAnomalyScorer;
use tsa_core::{Diagnostics, Series, TelemetrySink, TsaError};
use tsa_offline::{ChangePointDetector, region_boundaries};
use tsa_preprocess::{ResampleConfig, StratifiedResampler, filter_excluded};
use tsa_stats::{
    BaselineCalculator, BaselineConfig, DEFAULT_MOVING_AVERAGE_WINDOW, DescriptiveStats,
    analyze_trend, lag1_autocorrelation, segment_trend, trailing_moving_average,
};

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Sequences ingestion, resampling, statistics, change points, trend and
/// anomaly scoring for one request at a time.
pub struct Pipeline<'a> {
    config: AnalysisConfig,
    telemetry: Option<&'a dyn TelemetrySink>,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: AnalysisConfig) -> Result<Self, TsaError> {
        config.validate()?;
        Ok(Self {
            config,
            telemetry: None,
        })
    }

    /// Sets an optional telemetry sink.
    pub fn with_telemetry_sink(mut self, telemetry: &'a dyn TelemetrySink) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    fn record_scalar(&self, key: &'static str, value: f64) {
        if let Some(sink) = self.telemetry {
            sink.record_scalar(key, value);
        }
    }

    fn resample_config(&self, request: &AnalysisRequest) -> ResampleConfig {
        ResampleConfig {
            target_points: request
                .resample_points
                .unwrap_or(self.config.resample.target_points),
            seed: self.config.resample.seed,
        }
    }

    fn baseline_config(&self, request: &AnalysisRequest) -> BaselineConfig {
        let mut config = self.config.baseline.clone();
        if let Some(percentiles) = &request.percentiles {
            config.percentiles = percentiles.clone();
        }
        config
    }

    fn fetch(
        &self,
        source: &dyn DataSource,
        request: &AnalysisRequest,
    ) -> Result<(Ingested, Duration), TsaError> {
        validate_period(request)?;
        let started_at = Instant::now();
        let query = RowQuery::new(request.column.clone(), request.start, request.end);
        let ingested = ingest(
            source,
            &query,
            &request.exclude_ranges,
            &self.config.ingest,
            &self.resample_config(request),
        )?;
        let elapsed = started_at.elapsed();
        self.record_scalar("pipeline.fetch_ms", elapsed.as_secs_f64() * 1000.0);
        self.record_scalar("pipeline.raw_points", ingested.report.raw_rows as f64);
        Ok((ingested, elapsed))
    }

    /// Fetches `request` from `source` and runs the full analysis.
    pub fn analyze(
        &self,
        source: &dyn DataSource,
        request: &AnalysisRequest,
    ) -> Result<AnalysisReport, TsaError> {
        let (ingested, fetch_time) = self.fetch(source, request)?;
        self.run(ingested, request, fetch_time)
    }

    /// Runs the full analysis on an in-memory series; no data source involved.
    ///
    /// `series` is exclusion-filtered with the request's ranges first.
    pub fn analyze_series(
        &self,
        series: Series,
        request: &AnalysisRequest,
    ) -> Result<AnalysisReport, TsaError> {
        let mut series = series;
        let raw_rows = series.len();
        let excluded = filter_excluded(&mut series, &request.exclude_ranges);
        let ingested = Ingested {
            series,
            report: IngestReport {
                raw_rows,
                excluded,
                ..IngestReport::default()
            },
        };
        self.run(ingested, request, Duration::ZERO)
    }

    fn run(
        &self,
        ingested: Ingested,
        request: &AnalysisRequest,
        fetch_time: Duration,
    ) -> Result<AnalysisReport, TsaError> {
        let started_at = Instant::now();
        let Ingested { series, report } = ingested;

        let required = request.window_size.saturating_mul(2).max(1);
        if series.len() < required {
            return Err(TsaError::insufficient_data(required, series.len()));
        }

        let resample_config = self.resample_config(request);
        let (seed, target) = (resample_config.seed, resample_config.target_points);
        let resampled = StratifiedResampler::new(resample_config)?.resample(&series)?;
        let n = resampled.len();
        tracing::info!(
            filtered = series.len(),
            resampled = n,
            target,
            "series resampled"
        );
        self.record_scalar("pipeline.resampled_points", n as f64);

        let values = resampled.values();
        let stats = DescriptiveStats::from_values(&values);
        let baseline = BaselineCalculator::new(self.baseline_config(request))?.compute(&values)?;

        let change_points =
            ChangePointDetector::new(self.config.change_points.clone())?.detect(&values);
        self.record_scalar(
            "pipeline.change_points",
            change_points.merged.len() as f64,
        );

        let trend = analyze_trend(&resampled, &self.config.trend);
        let autocorrelation = lag1_autocorrelation(&values);

        let points = resampled.points();
        let regions: Vec<Region> = region_boundaries(&change_points.merged, n)
            .into_iter()
            .map(|boundary| Region {
                start_idx: boundary.start_idx,
                end_idx: boundary.end_idx,
                start: points[boundary.start_idx].timestamp,
                end: points[boundary.end_idx].timestamp,
            })
            .collect();
        let segment_trends = regions
            .iter()
            .map(|region| {
                segment_trend(
                    &resampled,
                    &self.config.trend,
                    region.start_idx,
                    region.end_idx,
                )
            })
            .collect();

        let anomalies =
            PointAnomalyScorer::new(self.config.anomaly)?.score_with_stats(&resampled, &stats);
        let anomaly_count = anomalies.total_flags();
        self.record_scalar("pipeline.anomaly_count", anomaly_count as f64);
        let covered_hours = resampled.span().num_milliseconds() as f64 / MILLIS_PER_HOUR;
        let anomaly_density = if n > 1 && covered_hours > 0.0 {
            anomaly_count as f64 / covered_hours
        } else {
            0.0
        };
        tracing::info!(
            points = n,
            mean = stats.mean,
            std = stats.std,
            change_points = change_points.merged.len(),
            anomalies = anomaly_count,
            trend = trend.direction.as_str(),
            "analysis complete"
        );

        let processing_time = started_at.elapsed();
        self.record_scalar(
            "pipeline.processing_ms",
            processing_time.as_secs_f64() * 1000.0,
        );

        let mut diagnostics = Diagnostics {
            n,
            runtime_ms: Some(
                u64::try_from((fetch_time + processing_time).as_millis()).unwrap_or(u64::MAX),
            ),
            algorithm: Cow::Borrowed("stratified_resample+change_points+mean_std_mad"),
            seed: Some(seed),
            ..Diagnostics::default()
        };
        ingest_notes(&mut diagnostics, &report, series.len());
        diagnostics.note(format!("resampled {} -> {n} points", series.len()));
        diagnostics.notes.extend(change_points.diagnostics.notes);
        diagnostics.warnings.extend(request.warnings.iter().cloned());
        diagnostics.warnings.extend(change_points.diagnostics.warnings);
        diagnostics.note(
            "mean and std anomaly rules test the same condition; their lists always match",
        );

        Ok(AnalysisReport {
            metadata: Metadata {
                column: request.column.clone(),
                period: Period {
                    start: request.start,
                    end: request.end,
                },
                exclude_ranges: request.exclude_ranges.clone(),
                raw_points: report.raw_rows,
                filtered_points: series.len(),
                data_points: n,
                total_points: anomalies.total_points,
                method: anomalies.method.clone(),
                anomaly_count,
                anomaly_percentage: anomalies.flag_percentage(),
                threshold: anomalies.threshold,
                fetch_time_secs: fetch_time.as_secs_f64(),
                processing_time_secs: processing_time.as_secs_f64(),
            },
            mean_anomaly_count: anomalies.mean_anomaly_count(),
            std_anomaly_count: anomalies.std_anomaly_count(),
            mad_anomaly_count: anomalies.mad_anomaly_count(),
            mean: stats.mean,
            median: stats.median,
            std: stats.std,
            mad: stats.mad,
            advanced_stats: AdvancedStats {
                min_value: stats.min,
                max_value: stats.max,
                range: stats.range(),
                skewness: stats.skewness,
                kurtosis: stats.kurtosis,
                anomaly_density,
                trend_slope: trend.slope,
                trend_intercept: trend.intercept,
                trend_r_squared: trend.r_squared,
                trend_direction: trend.direction,
                trend_significance: trend.significance_label().to_string(),
                autocorrelation,
                coefficient_of_variation: stats.coefficient_of_variation(),
                change_points: change_points.merged,
                change_point_sources: ChangePointBreakdown {
                    binary: change_points.binary,
                    sliding: change_points.sliding,
                    regime: change_points.regime,
                    pelt: change_points.pelt,
                    params: change_points.params,
                },
                region_boundaries: regions,
                segment_trends,
            },
            anomalies: anomalies.records,
            mean_anomalies: anomalies.mean_anomalies,
            std_anomalies: anomalies.std_anomalies,
            mad_anomalies: anomalies.mad_anomalies,
            baseline,
            resampled: ResampledSeries {
                timestamps: resampled.timestamps(),
                values,
            },
            diagnostics,
        })
    }

    /// Percentile bands only. No valid points is [`TsaError::NoValidData`].
    pub fn detect_baseline(
        &self,
        source: &dyn DataSource,
        request: &AnalysisRequest,
    ) -> Result<BaselineReport, TsaError> {
        let started_at = Instant::now();
        let (Ingested { series, report }, _) = self.fetch(source, request)?;
        let resample_config = self.resample_config(request);
        let seed = resample_config.seed;
        let resampled = StratifiedResampler::new(resample_config)?.resample(&series)?;
        let baseline =
            BaselineCalculator::new(self.baseline_config(request))?.compute(&resampled.values())?;
        tracing::info!(
            column = %request.column,
            points = resampled.len(),
            lower = baseline.recommended.lower,
            upper = baseline.recommended.upper,
            "baseline computed"
        );

        let mut diagnostics = Diagnostics {
            n: resampled.len(),
            runtime_ms: Some(u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX)),
            algorithm: Cow::Borrowed("stratified_resample+nearest_rank_percentiles"),
            seed: Some(seed),
            ..Diagnostics::default()
        };
        ingest_notes(&mut diagnostics, &report, series.len());
        diagnostics.warnings.extend(request.warnings.iter().cloned());

        Ok(BaselineReport {
            column: request.column.clone(),
            period: Period {
                start: request.start,
                end: request.end,
            },
            exclude_ranges: request.exclude_ranges.clone(),
            data_points: resampled.len(),
            baseline,
            diagnostics,
        })
    }

    /// Cleaned, resampled series with a trailing moving average of width 10.
    pub fn series_view(
        &self,
        source: &dyn DataSource,
        request: &AnalysisRequest,
    ) -> Result<SeriesView, TsaError> {
        let (Ingested { series, .. }, _) = self.fetch(source, request)?;
        if series.is_empty() {
            return Err(TsaError::NoValidData);
        }
        let resampled = StratifiedResampler::new(self.resample_config(request))?.resample(&series)?;
        let x = resampled.timestamps();
        let y = resampled.values();
        let window = DEFAULT_MOVING_AVERAGE_WINDOW;
        let moving_average = MovingAverage {
            x: x.iter().skip(window.saturating_sub(1)).copied().collect(),
            y: trailing_moving_average(&y, window),
        };
        tracing::debug!(points = y.len(), window, "series view prepared");
        Ok(SeriesView {
            x,
            y,
            moving_average,
        })
    }
}

fn validate_period(request: &AnalysisRequest) -> Result<(), TsaError> {
    if request.start > request.end {
        return Err(TsaError::invalid_request(format!(
            "start_date {} is after end_date {}",
            request.start, request.end
        )));
    }
    Ok(())
}

fn ingest_notes(diagnostics: &mut Diagnostics, report: &IngestReport, kept: usize) {
    diagnostics.note(format!(
        "ingested partitions={}, raw_rows={}, missing={}, non_finite={}, zero={}, excluded={}, kept={kept}",
        report.partitions,
        report.raw_rows,
        report.missing,
        report.non_finite,
        report.zero,
        report.excluded
    ));
    if report.safety_valve_passes > 0 {
        diagnostics.warn(format!(
            "row count exceeded the high-water mark; {} early filter and resample passes ran",
            report.safety_valve_passes
        ));
    }
}
