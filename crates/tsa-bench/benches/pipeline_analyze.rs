// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use tsa_bench::hourly_series;
use tsa_pipeline::{AnalysisConfig, AnalysisRequest, Pipeline};

fn benchmark_analyze_series_n1e5(c: &mut Criterion) {
    let series = hourly_series(100_000);
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        panic!("benchmark series should not be empty");
    };
    let request = AnalysisRequest::new("Boiler", first.timestamp, last.timestamp);
    let pipeline = Pipeline::new(AnalysisConfig::default()).expect("config should be valid");

    c.bench_function("analyze_series_n1e5", |b| {
        b.iter(|| {
            pipeline
                .analyze_series(black_box(series.clone()), black_box(&request))
                .expect("pipeline benchmark should succeed");
        })
    });
}

criterion_group!(benches, benchmark_analyze_series_n1e5);
criterion_main!(benches);
