// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::descriptive::sorted_values;
use tsa_core::TsaError;

/// Percentile bands reported when the caller does not pick its own.
pub const DEFAULT_PERCENTILES: [u32; 6] = [5, 10, 15, 85, 90, 95];
const RECOMMENDED_LOWER: u32 = 10;
const RECOMMENDED_UPPER: u32 = 90;

/// Baseline calculator settings.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
#[derive(Clone, Debug, PartialEq)]
pub struct BaselineConfig {
    /// Percentiles in `0..=100`, reported in the given order.
    pub percentiles: Vec<u32>,
    /// Measured quantity used in generated text, e.g. `temperature`.
    pub quantity: String,
    /// Unit suffix used in generated text, e.g. `°C`.
    pub unit: String,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            percentiles: DEFAULT_PERCENTILES.to_vec(),
            quantity: "temperature".to_string(),
            unit: "°C".to_string(),
        }
    }
}

impl BaselineConfig {
    pub fn validate(&self) -> Result<(), TsaError> {
        if self.percentiles.is_empty() {
            return Err(TsaError::invalid_request(
                "BaselineConfig.percentiles must not be empty",
            ));
        }
        if let Some(p) = self.percentiles.iter().find(|p| **p > 100) {
            return Err(TsaError::invalid_request(format!(
                "BaselineConfig.percentiles must lie in 0..=100; got {p}"
            )));
        }
        Ok(())
    }
}

/// Which side of the distribution a band guards.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BandSide {
    /// `p <= 50`: alert when readings fall below the value.
    Lower,
    /// `p > 50`: alert when readings rise above the value.
    Upper,
}

impl BandSide {
    pub fn for_percentile(p: u32) -> Self {
        if p <= 50 { Self::Lower } else { Self::Upper }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Clone, Debug, PartialEq)]
pub struct PercentileEntry {
    /// `percentile{p}th`.
    pub key: String,
    pub percentile: u32,
    pub side: BandSide,
    pub value: f64,
    /// Values strictly beyond `value` on the band's side.
    pub count: usize,
    pub percentage_count: f64,
    pub interpretation: String,
    pub description: String,
    pub purpose: String,
    pub alert_condition: String,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RecommendedBand {
    pub lower: f64,
    pub upper: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Clone, Debug, PartialEq)]
pub struct Baseline {
    pub n: usize,
    pub entries: Vec<PercentileEntry>,
    pub recommended: RecommendedBand,
}

impl Baseline {
    pub fn entry(&self, percentile: u32) -> Option<&PercentileEntry> {
        self.entries.iter().find(|e| e.percentile == percentile)
    }
}

/// Nearest-rank percentile: `sorted[max(0, ceil(p/100 * n) - 1)]`.
///
/// `sorted` must be ascending. Returns `None` for an empty slice.
pub fn percentile_of_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let rank = (p * sorted.len() as f64 / 100.0).ceil();
    let idx = if rank >= 1.0 { rank as usize - 1 } else { 0 };
    Some(sorted[idx.min(sorted.len() - 1)])
}

/// Builds labeled percentile bands over a value sequence.
#[derive(Clone, Debug)]
pub struct BaselineCalculator {
    config: BaselineConfig,
}

impl BaselineCalculator {
    pub fn new(config: BaselineConfig) -> Result<Self, TsaError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &BaselineConfig {
        &self.config
    }

    /// Computes one entry per configured percentile plus the 10th/90th
    /// recommended band. Empty input is [`TsaError::NoValidData`].
    pub fn compute(&self, values: &[f64]) -> Result<Baseline, TsaError> {
        if values.is_empty() {
            return Err(TsaError::NoValidData);
        }
        let sorted = sorted_values(values);
        let n = sorted.len();

        let entries = self
            .config
            .percentiles
            .iter()
            .map(|&p| self.entry(&sorted, p))
            .collect();

        let lower = percentile_of_sorted(&sorted, f64::from(RECOMMENDED_LOWER)).unwrap_or(0.0);
        let upper = percentile_of_sorted(&sorted, f64::from(RECOMMENDED_UPPER)).unwrap_or(0.0);

        Ok(Baseline {
            n,
            entries,
            recommended: RecommendedBand { lower, upper },
        })
    }

    fn entry(&self, sorted: &[f64], p: u32) -> PercentileEntry {
        let n = sorted.len();
        let value = percentile_of_sorted(sorted, f64::from(p)).unwrap_or(0.0);
        let side = BandSide::for_percentile(p);
        let count = match side {
            BandSide::Lower => sorted.iter().filter(|v| **v < value).count(),
            BandSide::Upper => sorted.iter().filter(|v| **v > value).count(),
        };
        let percentage_count = count as f64 / n as f64 * 100.0;

        let quantity = &self.config.quantity;
        let unit = &self.config.unit;
        let interpretation = match side {
            BandSide::Lower => {
                format!("{}% of time, {quantity} is above {value:.2}{unit}", 100 - p)
            }
            BandSide::Upper => format!("{p}% of time, {quantity} is below {value:.2}{unit}"),
        };
        let labels = BandLabels::for_percentile(p);
        let subject = capitalize(quantity);
        let alert_condition = match side {
            BandSide::Lower => format!("{subject} below {value:.2}{unit} {}", labels.alert),
            BandSide::Upper => format!("{subject} above {value:.2}{unit} {}", labels.alert),
        };

        PercentileEntry {
            key: format!("percentile{p}th"),
            percentile: p,
            side,
            value,
            count,
            percentage_count,
            interpretation,
            description: labels.description,
            purpose: labels.purpose.replace("{quantity}", quantity),
            alert_condition,
        }
    }
}

struct BandLabels {
    description: String,
    purpose: String,
    alert: String,
}

impl BandLabels {
    fn for_percentile(p: u32) -> Self {
        let fixed = |description: &str, purpose: &str, alert: &str| Self {
            description: description.to_string(),
            purpose: purpose.to_string(),
            alert: alert.to_string(),
        };
        match p {
            5 => fixed(
                "5th Percentile (Very Conservative)",
                "Extreme low {quantity} detection",
                "indicates potential shutdown or extreme cooling",
            ),
            10 => fixed(
                "10th Percentile (Recommended Lower)",
                "Shutdown/Idle Detection",
                "indicates equipment is likely shut down or idle",
            ),
            15 => fixed(
                "15th Percentile (More Inclusive)",
                "Low operation detection",
                "indicates low operation mode",
            ),
            85 => fixed(
                "85th Percentile (Upper Baseline Start)",
                "High operation detection",
                "indicates high operation mode",
            ),
            90 => fixed(
                "90th Percentile (Recommended Upper)",
                "Overheating/High Load Detection",
                "indicates potential overheating or heavy load",
            ),
            95 => fixed(
                "95th Percentile (Very High Threshold)",
                "Extreme high {quantity} detection",
                "indicates a potential overheating emergency",
            ),
            _ => Self {
                description: format!("{p}th Percentile"),
                purpose: "Custom threshold".to_string(),
                alert: format!("is outside the {p}th percentile band"),
            },
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
