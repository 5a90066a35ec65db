// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use tsa_bench::hourly_series;
use tsa_preprocess::{ResampleConfig, StratifiedResampler};

fn bench_resample(c: &mut Criterion, case_id: &str, n: usize, target_points: usize) {
    let series = hourly_series(n);
    let resampler = StratifiedResampler::new(ResampleConfig {
        target_points,
        seed: 42,
    })
    .expect("resample config should be valid");

    c.bench_function(case_id, |b| {
        b.iter(|| {
            resampler
                .resample(black_box(&series))
                .expect("resample benchmark should succeed");
        })
    });
}

fn benchmark_resample_n1e5_t2000(c: &mut Criterion) {
    bench_resample(c, "resample_n1e5_t2000", 100_000, 2_000);
}

fn benchmark_resample_n1e6_t2000(c: &mut Criterion) {
    bench_resample(c, "resample_n1e6_t2000", 1_000_000, 2_000);
}

criterion_group!(
    benches,
    benchmark_resample_n1e5_t2000,
    benchmark_resample_n1e6_t2000
);
criterion_main!(benches);
