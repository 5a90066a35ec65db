// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;
use tsa_core::{Series, SeriesPoint, timestamp_from_millis};
use tsa_pipeline::{AnalysisConfig, AnalysisReport, AnalysisRequest, Pipeline};

const MIN_PROPTEST_CASES: u32 = 256;
const MINUTE_MS: i64 = 60_000;
const JAN_1_2024_MS: i64 = 1_704_067_200_000;

fn proptest_cases() -> u32 {
    std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .map(|parsed| parsed.max(MIN_PROPTEST_CASES))
        .unwrap_or(MIN_PROPTEST_CASES)
}

fn build_series(samples: &[(i64, f64)]) -> Series {
    let mut offset_ms = JAN_1_2024_MS;
    let points = samples
        .iter()
        .map(|&(gap_minutes, value)| {
            offset_ms += gap_minutes * MINUTE_MS;
            SeriesPoint::new(
                timestamp_from_millis(offset_ms).expect("valid timestamp"),
                value,
            )
        })
        .collect();
    Series::new(points).expect("generated series should be ordered")
}

fn analyze(series: &Series, resample_points: usize, seed: u64) -> AnalysisReport {
    let start = series.first().expect("generated series is non-empty").timestamp;
    let end = series.last().expect("generated series is non-empty").timestamp;
    let mut request = AnalysisRequest::new("Oven1", start, end);
    request.window_size = 20;
    request.resample_points = Some(resample_points);

    let mut config = AnalysisConfig::default();
    config.resample.seed = seed;
    Pipeline::new(config)
        .expect("default config should be valid")
        .analyze_series(series.clone(), &request)
        .expect("analysis should succeed")
}

fn assert_ascending_within(indices: &[usize], n: usize) -> Result<(), TestCaseError> {
    for pair in indices.windows(2) {
        prop_assert!(pair[0] < pair[1], "not ascending: {indices:?}");
    }
    prop_assert!(indices.iter().all(|&idx| idx < n), "out of range: {indices:?}");
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: proptest_cases(),
        .. ProptestConfig::default()
    })]

    #[test]
    fn analysis_is_deterministic_under_fixed_seed(
        samples in prop::collection::vec((1i64..120, 1.0f64..100.0), 40..400),
        resample_points in 10usize..200,
        seed in any::<u64>(),
    ) {
        let series = build_series(&samples);
        let first = analyze(&series, resample_points, seed);
        let second = analyze(&series, resample_points, seed);

        prop_assert_eq!(&first.resampled, &second.resampled);
        prop_assert_eq!(&first.advanced_stats, &second.advanced_stats);
        prop_assert_eq!(&first.anomalies, &second.anomalies);
        prop_assert_eq!(&first.baseline, &second.baseline);
        prop_assert_eq!(first.metadata.anomaly_count, second.metadata.anomaly_count);
    }

    #[test]
    fn report_is_internally_consistent(
        samples in prop::collection::vec((1i64..120, 1.0f64..100.0), 40..400),
        resample_points in 10usize..200,
    ) {
        let series = build_series(&samples);
        let report = analyze(&series, resample_points, 0);
        let n = report.resampled.values.len();
        let stats = &report.advanced_stats;

        prop_assert_eq!(report.metadata.data_points, n);
        prop_assert_eq!(report.resampled.timestamps.len(), n);
        prop_assert!(n <= samples.len());
        prop_assert_eq!(
            report.metadata.anomaly_count,
            report.mean_anomaly_count + report.std_anomaly_count + report.mad_anomaly_count
        );
        prop_assert_eq!(report.mean_anomaly_count, report.std_anomaly_count);
        prop_assert!(
            (-1.0 - 1e-12..=1.0 + 1e-12).contains(&stats.autocorrelation),
            "autocorrelation out of range: {}",
            stats.autocorrelation
        );

        assert_ascending_within(&stats.change_points, n)?;
        assert_ascending_within(&stats.change_point_sources.pelt, n)?;
        prop_assert!(stats.change_point_sources.pelt.iter().all(|&cp| cp > 0));

        let regions = &stats.region_boundaries;
        prop_assert_eq!(regions.first().map(|r| r.start_idx), Some(0));
        prop_assert_eq!(regions.last().map(|r| r.end_idx), Some(n - 1));

        let encoded = serde_json::to_value(&report).expect("report should serialize");
        prop_assert!(encoded["advancedStats"]["changePointSources"]["pelt"].is_array());
        prop_assert_eq!(
            encoded["metadata"]["dataPoints"].as_u64(),
            Some(n as u64)
        );
    }
}
