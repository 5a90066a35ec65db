// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod scorer;

pub use scorer::{
    ANOMALY_METHOD, AnomalyConfig, AnomalyRecord, AnomalyReport, DEFAULT_ANOMALY_THRESHOLD,
    PointAnomalyScorer,
};
