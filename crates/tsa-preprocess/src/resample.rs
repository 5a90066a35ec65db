// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tsa_core::{Series, SeriesPoint, TsaError};

/// Default point budget for resampling.
pub const DEFAULT_TARGET_POINTS: usize = 2000;
/// Default seed for the per-bucket random pick.
pub const DEFAULT_SEED: u64 = 0;

/// Configuration for [`StratifiedResampler`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResampleConfig {
    pub target_points: usize,
    pub seed: u64,
}

impl Default for ResampleConfig {
    fn default() -> Self {
        Self {
            target_points: DEFAULT_TARGET_POINTS,
            seed: DEFAULT_SEED,
        }
    }
}

impl ResampleConfig {
    pub fn validate(&self) -> Result<(), TsaError> {
        if self.target_points == 0 {
            return Err(TsaError::invalid_request(
                "ResampleConfig.target_points must be >= 1; got 0",
            ));
        }
        Ok(())
    }
}

/// Time-bucketed reduction keeping each bucket's min, max, median and one
/// random member.
///
/// A series longer than `target_points` is cut into `target_points` buckets of
/// equal time width; each non-empty bucket contributes up to four distinct
/// points. Output length is therefore not exactly `target_points`: it usually
/// lands in `[target_points, 4 * target_points]`. The last bucket absorbs every
/// point past the final boundary, so highly irregular spacing can make it
/// arbitrarily large before reduction.
#[derive(Clone, Debug)]
pub struct StratifiedResampler {
    config: ResampleConfig,
}

impl StratifiedResampler {
    pub fn new(config: ResampleConfig) -> Result<Self, TsaError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ResampleConfig {
        &self.config
    }

    /// Resamples with an RNG seeded from the configuration.
    pub fn resample(&self, series: &Series) -> Result<Series, TsaError> {
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        self.resample_with_rng(series, &mut rng)
    }

    /// Resamples drawing the per-bucket random pick from `rng`.
    pub fn resample_with_rng<R: Rng + ?Sized>(
        &self,
        series: &Series,
        rng: &mut R,
    ) -> Result<Series, TsaError> {
        let target = self.config.target_points;
        let points = series.points();
        let (Some(first), Some(last)) = (points.first(), points.last()) else {
            return Ok(series.clone());
        };
        if points.len() <= target {
            return Ok(series.clone());
        }

        let start_ms = first.timestamp.timestamp_millis() as f64;
        let end_ms = last.timestamp.timestamp_millis() as f64;
        let interval = (end_ms - start_ms) / target as f64;

        let mut selected = Vec::with_capacity(points.len().min(target.saturating_mul(4)));
        let mut bucket: Vec<usize> = Vec::new();
        let mut bucket_idx = 0usize;
        let mut bucket_end = start_ms + interval;
        let mut buckets_emitted = 0usize;

        for (idx, point) in points.iter().enumerate() {
            let t = point.timestamp.timestamp_millis() as f64;
            while t >= bucket_end && bucket_idx + 1 < target {
                if !bucket.is_empty() {
                    emit_representatives(points, &bucket, rng, &mut selected);
                    buckets_emitted += 1;
                }
                bucket.clear();
                bucket_idx += 1;
                bucket_end = start_ms + (bucket_idx + 1) as f64 * interval;
            }
            bucket.push(idx);
        }
        if !bucket.is_empty() {
            emit_representatives(points, &bucket, rng, &mut selected);
            buckets_emitted += 1;
        }

        tracing::debug!(
            input = points.len(),
            output = selected.len(),
            target,
            buckets = buckets_emitted,
            "stratified resampling"
        );
        series.select(&selected)
    }
}

/// Appends the bucket's representatives to `out` in original order.
///
/// `bucket` holds contiguous ascending indices into `points`.
fn emit_representatives<R: Rng + ?Sized>(
    points: &[SeriesPoint],
    bucket: &[usize],
    rng: &mut R,
    out: &mut Vec<usize>,
) {
    let value = |idx: usize| points[idx].value;

    let mut min_idx = bucket[0];
    let mut max_idx = bucket[0];
    for &idx in &bucket[1..] {
        if value(idx) < value(min_idx) {
            min_idx = idx;
        }
        if value(idx) > value(max_idx) {
            max_idx = idx;
        }
    }

    let mut by_value = bucket.to_vec();
    by_value.sort_by(|&left, &right| value(left).total_cmp(&value(right)));
    let median_idx = by_value[(by_value.len() - 1) / 2];
    let random_idx = bucket[rng.gen_range(0..bucket.len())];

    let mut picks = [min_idx, max_idx, median_idx, random_idx];
    picks.sort_unstable();
    let mut last = None;
    for idx in picks {
        if last != Some(idx) {
            out.push(idx);
            last = Some(idx);
        }
    }
}
