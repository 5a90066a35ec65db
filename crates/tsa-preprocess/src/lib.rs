// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod clean;
pub mod exclude;
pub mod resample;

pub use clean::{CleanReport, RawRow, clean_rows};
pub use exclude::filter_excluded;
pub use resample::{DEFAULT_SEED, DEFAULT_TARGET_POINTS, ResampleConfig, StratifiedResampler};
