// src/telemetry/mod.rs
//! Running account of field extraction outcomes across one batch.
//!
//! A `Telemetry` is created per batch and passed by `&mut` to every record
//! build. It is never global; call [`Telemetry::reset`] before reusing it.

pub mod report;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use report::{MissingTier, QualityReport};

/// Fields whose extraction outcome is counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackedField {
    Name,
    Location,
    School,
    Concerns,
    SocialMedia,
}

impl TrackedField {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackedField::Name => "name",
            TrackedField::Location => "location",
            TrackedField::School => "school",
            TrackedField::Concerns => "concerns",
            TrackedField::SocialMedia => "social_media",
        }
    }
}

impl std::fmt::Display for TrackedField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCounts {
    pub success_count: u64,
    pub failure_count: u64,
}

impl FieldCounts {
    pub fn total(&self) -> u64 {
        self.success_count + self.failure_count
    }

    /// `None` when nothing was recorded.
    pub fn success_rate(&self) -> Option<f64> {
        match self.total() {
            0 => None,
            total => Some(self.success_count as f64 / total as f64),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub total_records: u64,
    pub per_field: BTreeMap<TrackedField, FieldCounts>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Default)]
pub struct Telemetry {
    state: TelemetrySnapshot,
}

impl Telemetry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one subject section handed to the record builder.
    pub fn record_processed(&mut self) {
        self.state.total_records += 1;
    }

    pub fn record_outcome(&mut self, field: TrackedField, success: bool) {
        let counts = self.state.per_field.entry(field).or_default();
        if success {
            counts.success_count += 1;
        } else {
            counts.failure_count += 1;
        }
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{}", message);
        self.state.warnings.push(message);
    }

    pub fn success_rate(&self, field: TrackedField) -> Option<f64> {
        self.state
            .per_field
            .get(&field)
            .and_then(FieldCounts::success_rate)
    }

    /// A copy of the current counts. Accumulation continues afterwards.
    pub fn snapshot(&self) -> TelemetrySnapshot {
        self.state.clone()
    }

    /// Zeroes every count and clears warnings.
    pub fn reset(&mut self) {
        self.state = TelemetrySnapshot::default();
    }
}
