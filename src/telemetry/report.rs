// src/telemetry/report.rs
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::telemetry::{TelemetrySnapshot, TrackedField};

// Missing-rate cutoffs. Strictly greater-than: exactly 50% is a warning.
const CRITICAL_MISSING_RATE: f64 = 0.5;
const WARNING_MISSING_RATE: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingTier {
    Critical,
    Warning,
    Acceptable,
}

impl MissingTier {
    pub fn from_missing_rate(rate: f64) -> Self {
        if rate > CRITICAL_MISSING_RATE {
            MissingTier::Critical
        } else if rate > WARNING_MISSING_RATE {
            MissingTier::Warning
        } else {
            MissingTier::Acceptable
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRate {
    pub successful: u64,
    pub missing: u64,
    pub total: u64,
    /// `None` reads as "no data".
    pub success_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingData {
    pub missing_count: u64,
    pub missing_rate: f64,
    pub percentage: String,
    pub tier: MissingTier,
}

/// Batch quality summary written next to the extracted records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub total_records_processed: u64,
    pub field_success_rates: BTreeMap<TrackedField, FieldRate>,
    /// Only fields with at least one miss.
    pub missing_data_summary: BTreeMap<TrackedField, MissingData>,
    pub total_warnings: usize,
    pub extraction_warnings: Vec<String>,
    pub recommendations: Vec<String>,
}

impl QualityReport {
    /// Builds the report, keeping the first `warning_limit` warnings.
    pub fn from_snapshot(snapshot: &TelemetrySnapshot, warning_limit: usize) -> Self {
        let mut field_success_rates = BTreeMap::new();
        let mut missing_data_summary = BTreeMap::new();

        for (field, counts) in &snapshot.per_field {
            field_success_rates.insert(
                *field,
                FieldRate {
                    successful: counts.success_count,
                    missing: counts.failure_count,
                    total: counts.total(),
                    success_rate: counts.success_rate(),
                },
            );

            if counts.failure_count > 0 {
                let missing_rate = counts.failure_count as f64 / counts.total() as f64;
                missing_data_summary.insert(
                    *field,
                    MissingData {
                        missing_count: counts.failure_count,
                        missing_rate,
                        percentage: format_percentage(missing_rate),
                        tier: MissingTier::from_missing_rate(missing_rate),
                    },
                );
            }
        }

        let extraction_warnings: Vec<String> = snapshot
            .warnings
            .iter()
            .take(warning_limit)
            .cloned()
            .collect();

        let recommendations = recommendations(
            snapshot,
            &missing_data_summary,
            snapshot.warnings.len() - extraction_warnings.len(),
        );

        Self {
            total_records_processed: snapshot.total_records,
            field_success_rates,
            missing_data_summary,
            total_warnings: snapshot.warnings.len(),
            extraction_warnings,
            recommendations,
        }
    }
}

fn recommendations(
    snapshot: &TelemetrySnapshot,
    missing: &BTreeMap<TrackedField, MissingData>,
    hidden_warnings: usize,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if snapshot.total_records == 0 {
        recommendations.push(
            "No subject sections were found. Check that the reports contain 'Subject of Concern' or 'SOC:' headers."
                .to_string(),
        );
    }

    for (field, data) in missing {
        match data.tier {
            MissingTier::Critical => recommendations.push(format!(
                "'{}' is missing in {} of records. The district layout likely uses a label the extractor does not know.",
                field, data.percentage
            )),
            MissingTier::Warning => recommendations.push(format!(
                "'{}' is missing in {} of records. Spot-check a few source reports.",
                field, data.percentage
            )),
            MissingTier::Acceptable => {}
        }
    }

    if hidden_warnings > 0 {
        recommendations.push(format!(
            "{} more warnings are not shown here; see the log for the full list.",
            hidden_warnings
        ));
    }

    recommendations
}

fn format_percentage(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}
