// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod diagnostics;
pub mod error;
pub mod observability;
pub mod series;

pub use diagnostics::{DIAGNOSTICS_SCHEMA_VERSION, Diagnostics};
pub use error::TsaError;
pub use observability::{TelemetrySink, TracingTelemetry};
pub use series::{
    ExcludeRange, Series, SeriesPoint, Timestamp, parse_timestamp, timestamp_from_millis,
};
