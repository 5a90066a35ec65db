// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

/// Receives scalar measurements emitted while a request runs.
pub trait TelemetrySink {
    fn record_scalar(&self, key: &'static str, value: f64);
}

/// Forwards every scalar to `tracing` at debug level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingTelemetry;

impl TelemetrySink for TracingTelemetry {
    fn record_scalar(&self, key: &'static str, value: f64) {
        tracing::debug!(target: "tsa::telemetry", key, value, "scalar");
    }
}
