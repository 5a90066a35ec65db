// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use tsa_anomaly::AnomalyConfig;
use tsa_core::TsaError;
use tsa_offline::ChangePointConfig;
use tsa_preprocess::ResampleConfig;
use tsa_stats::{BaselineConfig, TrendConfig};

const DEFAULT_HIGH_WATER_MARK: usize = 1_000_000;

/// Bounds on raw-row ingestion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IngestConfig {
    /// Accumulated row count that triggers an interim exclude-and-resample pass.
    pub high_water_mark: usize,
    /// Drop readings equal to `0`, the sensors' dropout marker.
    pub drop_zero_readings: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            high_water_mark: DEFAULT_HIGH_WATER_MARK,
            drop_zero_readings: true,
        }
    }
}

impl IngestConfig {
    pub fn validate(&self) -> Result<(), TsaError> {
        if self.high_water_mark == 0 {
            return Err(TsaError::invalid_request(
                "IngestConfig.high_water_mark must be >= 1; got 0",
            ));
        }
        Ok(())
    }
}

/// Every tunable of one analysis run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalysisConfig {
    pub ingest: IngestConfig,
    pub resample: ResampleConfig,
    pub change_points: ChangePointConfig,
    pub baseline: BaselineConfig,
    pub anomaly: AnomalyConfig,
    pub trend: TrendConfig,
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), TsaError> {
        self.ingest.validate()?;
        self.resample.validate()?;
        self.change_points.validate()?;
        self.baseline.validate()?;
        self.anomaly.validate()
    }

    /// Parses a JSON document; absent fields keep their defaults.
    pub fn from_json(raw: &str) -> Result<Self, TsaError> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|err| TsaError::invalid_request(format!("invalid analysis config: {err}")))?;
        config.validate()?;
        Ok(config)
    }
}
