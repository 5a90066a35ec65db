// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use std::borrow::Cow;

/// Diagnostics schema version for analysis run metadata.
pub const DIAGNOSTICS_SCHEMA_VERSION: u32 = 1;

/// Structured diagnostics captured from one analysis run.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostics {
    pub n: usize,
    pub schema_version: u32,
    pub engine_version: Option<String>,
    pub runtime_ms: Option<u64>,
    pub notes: Vec<String>,
    pub warnings: Vec<String>,
    pub algorithm: Cow<'static, str>,
    pub seed: Option<u64>,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self {
            n: 0,
            schema_version: DIAGNOSTICS_SCHEMA_VERSION,
            engine_version: Some(env!("CARGO_PKG_VERSION").to_string()),
            runtime_ms: None,
            notes: vec![],
            warnings: vec![],
            algorithm: Cow::Borrowed(""),
            seed: None,
        }
    }
}

impl Diagnostics {
    pub fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    pub fn warn(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }
}
