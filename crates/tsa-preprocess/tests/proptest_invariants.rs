// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;
use tsa_core::{ExcludeRange, Series, SeriesPoint, timestamp_from_millis};
use tsa_preprocess::{ResampleConfig, StratifiedResampler, filter_excluded};

const MIN_PROPTEST_CASES: u32 = 256;

fn proptest_cases() -> u32 {
    std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .map(|parsed| parsed.max(MIN_PROPTEST_CASES))
        .unwrap_or(MIN_PROPTEST_CASES)
}

fn series_from(gaps: &[i64], values: &[f64]) -> Series {
    let mut t = 1_600_000_000_000_i64;
    let points = gaps
        .iter()
        .zip(values)
        .map(|(&gap, &value)| {
            t += gap;
            SeriesPoint::new(timestamp_from_millis(t).expect("timestamp in range"), value)
        })
        .collect();
    Series::new(points).expect("generated series is ordered")
}

fn series_strategy() -> impl Strategy<Value = Series> {
    (1usize..600).prop_flat_map(|n| {
        (
            prop::collection::vec(0i64..120_000, n),
            prop::collection::vec(-50.0f64..150.0, n),
        )
            .prop_map(|(gaps, values)| series_from(&gaps, &values))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(proptest_cases()))]

    #[test]
    fn resampling_never_grows_and_never_empties(
        series in series_strategy(),
        target in 1usize..200,
        seed in any::<u64>(),
    ) {
        let resampler = StratifiedResampler::new(ResampleConfig { target_points: target, seed })
            .expect("config should be valid");
        let out = resampler.resample(&series).expect("resample should succeed");

        prop_assert!(out.len() <= series.len());
        prop_assert!(!out.is_empty());
        prop_assert!(out.points().windows(2).all(|pair| pair[0].timestamp <= pair[1].timestamp));
        if series.len() <= target {
            prop_assert_eq!(&out, &series);
        }
    }

    #[test]
    fn resampling_keeps_global_min_and_max(
        series in series_strategy(),
        target in 1usize..200,
    ) {
        let resampler = StratifiedResampler::new(ResampleConfig { target_points: target, seed: 5 })
            .expect("config should be valid");
        let out = resampler.resample(&series).expect("resample should succeed");
        let min = |s: &Series| s.values().into_iter().fold(f64::INFINITY, f64::min);
        let max = |s: &Series| s.values().into_iter().fold(f64::NEG_INFINITY, f64::max);
        prop_assert_eq!(min(&out), min(&series));
        prop_assert_eq!(max(&out), max(&series));
    }

    #[test]
    fn exclusion_outside_span_is_a_no_op(series in series_strategy(), width in 1i64..1_000_000) {
        let first = series.first().expect("non-empty").timestamp.timestamp_millis();
        let last = series.last().expect("non-empty").timestamp.timestamp_millis();
        let before = ExcludeRange::new(
            timestamp_from_millis(first - 1 - width).expect("valid"),
            timestamp_from_millis(first - 1).expect("valid"),
        );
        let after = ExcludeRange::new(
            timestamp_from_millis(last + 1).expect("valid"),
            timestamp_from_millis(last + 1 + width).expect("valid"),
        );
        let mut filtered = series.clone();
        let removed = filter_excluded(&mut filtered, &[before, after]);
        prop_assert_eq!(removed, 0);
        prop_assert_eq!(filtered.len(), series.len());
    }
}
