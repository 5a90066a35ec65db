// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use std::error::Error as StdError;

/// Errors surfaced by the analysis pipeline.
///
/// Numeric degenerate cases (zero variance, empty denominators) never show up
/// here; they are guarded locally and substitute `0`.
#[derive(Debug, thiserror::Error)]
pub enum TsaError {
    /// A required parameter is missing or unparsable.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Too few points survived cleaning and exclusion.
    #[error("Insufficient data points. Need at least {required} points, but got {actual}")]
    InsufficientData { required: usize, actual: usize },
    /// Nothing left to summarize after filtering.
    #[error("No valid data found")]
    NoValidData,
    /// The data source failed; never retried.
    #[error("{context}: {source}")]
    Upstream {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
    #[error("numerical issue: {0}")]
    NumericalIssue(String),
}

impl TsaError {
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    pub fn insufficient_data(required: usize, actual: usize) -> Self {
        Self::InsufficientData { required, actual }
    }

    pub fn upstream(
        context: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self::Upstream {
            context: context.into(),
            source: source.into(),
        }
    }

    pub fn numerical_issue(msg: impl Into<String>) -> Self {
        Self::NumericalIssue(msg.into())
    }

    /// Stable machine-readable code for error envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::InsufficientData { .. } => "insufficient_data",
            Self::NoValidData => "no_valid_data",
            Self::Upstream { .. } => "upstream_failure",
            Self::NumericalIssue(_) => "numerical_issue",
        }
    }
}
