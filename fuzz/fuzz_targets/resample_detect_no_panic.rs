// SPDX-License-Identifier: MIT OR Apache-2.0

#![no_main]

use libfuzzer_sys::fuzz_target;
use tsa_core::{Series, SeriesPoint, timestamp_from_millis};
use tsa_offline::{ChangePointConfig, ChangePointDetector};
use tsa_preprocess::{ResampleConfig, StratifiedResampler};

const MAX_POINTS: usize = 4_096;

struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn next_u8(&mut self) -> u8 {
        let value = self.data.get(self.pos).copied().unwrap_or(0);
        self.pos = self.pos.saturating_add(1);
        value
    }

    fn next_i16(&mut self) -> i16 {
        i16::from_le_bytes([self.next_u8(), self.next_u8()])
    }

    fn exhausted(&self) -> bool {
        self.pos >= self.data.len()
    }
}

fuzz_target!(|data: &[u8]| {
    let mut cursor = ByteCursor::new(data);
    let target_points = usize::from(cursor.next_u8() % 64) + 1;
    let seed = u64::from(cursor.next_u8());
    let regime_threshold = f64::from(cursor.next_i16()) / 64.0;

    // Irregular gaps, including repeated timestamps, stress the bucket walk.
    let mut millis = 0i64;
    let mut points = Vec::new();
    while !cursor.exhausted() && points.len() < MAX_POINTS {
        let gap = i64::from(cursor.next_u8()) * i64::from(cursor.next_u8());
        millis = millis.saturating_add(gap);
        let value = f64::from(cursor.next_i16()) / 16.0;
        let Ok(timestamp) = timestamp_from_millis(millis) else {
            break;
        };
        points.push(SeriesPoint::new(timestamp, value));
    }
    let Ok(series) = Series::new(points) else {
        return;
    };

    let Ok(resampler) = StratifiedResampler::new(ResampleConfig {
        target_points,
        seed,
    }) else {
        return;
    };
    let Ok(resampled) = resampler.resample(&series) else {
        return;
    };
    assert!(resampled.len() <= series.len());

    let config = ChangePointConfig {
        regime_threshold,
        ..ChangePointConfig::default()
    };
    let Ok(detector) = ChangePointDetector::new(config) else {
        return;
    };
    let values = resampled.values();
    let report = detector.detect(&values);
    assert!(report.merged.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(report.pelt.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(report.pelt.iter().all(|&cp| cp > 0 && cp < values.len()));
});
