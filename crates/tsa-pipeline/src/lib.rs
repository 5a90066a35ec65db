// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod config;
pub mod ingest;
pub mod pipeline;
pub mod report;
pub mod request;
pub mod source;

pub use config::{AnalysisConfig, IngestConfig};
pub use ingest::{IngestReport, Ingested, ingest};
pub use pipeline::Pipeline;
pub use report::{
    AdvancedStats, AnalysisReport, BaselineReport, Metadata, MovingAverage, Period, Region,
    ResampledSeries, SeriesView,
};
pub use request::{AnalysisRequest, DEFAULT_WINDOW_SIZE, parse_exclude_ranges, parse_percentiles};
pub use source::{DataSource, InMemorySource, RowQuery, month_partitions};
