// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod binseg;
pub mod config;
pub mod detector;
pub mod merge;
pub mod pelt;
mod prefix;
pub mod regime;
pub mod window;

pub use binseg::binary_segmentation;
pub use config::{ChangePointConfig, DetectionParams};
pub use detector::{ChangePointDetector, ChangePointReport};
pub use merge::{RegionBoundary, merge_change_points, region_boundaries};
pub use pelt::pelt_l1;
pub use regime::threshold_regimes;
pub use window::sliding_window;
