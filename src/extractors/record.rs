// src/extractors/record.rs
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::document::models::{Document, DocumentFailure};
use crate::extractors::concerns::{Category, ConcernClassifier, ConcernState};
use crate::extractors::fields::FieldExtractor;
use crate::extractors::section::{self, Span};
use crate::extractors::social::{PresenceExtractor, SocialPresence};
use crate::extractors::ExtractorConfig;
use crate::telemetry::{Telemetry, TrackedField};
use crate::utils::error::ExtractError;

/// One subject of concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    pub location: Option<String>,
    pub school: Option<String>,
    pub affiliation: String,
    pub concerns: BTreeMap<Category, ConcernState>,
    pub other_concern: bool,
    pub other_concern_text: String,
    pub social_presences: Vec<SocialPresence>,
}

/// What the engine hands to report generation for one input document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentOutcome {
    pub document_id: String,
    pub district: String,
    pub records: Vec<Record>,
    pub error: Option<DocumentFailure>,
}

/// Split, extract and classify. Holds all compiled patterns; build once per
/// run and reuse for every document.
pub struct RecordExtractor {
    fields: FieldExtractor,
    concerns: ConcernClassifier,
    presences: PresenceExtractor,
}

impl RecordExtractor {
    pub fn new(config: &ExtractorConfig) -> Result<Self, ExtractError> {
        Ok(Self {
            fields: FieldExtractor::new()?,
            concerns: ConcernClassifier::new()?,
            presences: PresenceExtractor::new(&config.platforms)?,
        })
    }

    /// Processes documents strictly in order; a failed document never stops
    /// the batch.
    pub fn process_batch<I>(&self, inputs: I, telemetry: &mut Telemetry) -> Vec<DocumentOutcome>
    where
        I: IntoIterator<Item = Result<Document, DocumentFailure>>,
    {
        let outcomes: Vec<DocumentOutcome> = inputs
            .into_iter()
            .map(|input| self.process_document(input, telemetry))
            .collect();

        let records: usize = outcomes.iter().map(|o| o.records.len()).sum();
        let failed = outcomes.iter().filter(|o| o.error.is_some()).count();
        tracing::info!(
            "Batch finished: {} documents, {} records, {} failed documents",
            outcomes.len(),
            records,
            failed
        );
        outcomes
    }

    /// Upstream failures pass through untouched with no records.
    pub fn process_document(
        &self,
        input: Result<Document, DocumentFailure>,
        telemetry: &mut Telemetry,
    ) -> DocumentOutcome {
        match input {
            Ok(document) => {
                let records = self.extract_records(&document, telemetry);
                tracing::info!("{}: found {} subjects of concern", document.id, records.len());
                DocumentOutcome {
                    district: document.district(),
                    document_id: document.id,
                    records,
                    error: None,
                }
            }
            Err(failure) => {
                tracing::warn!(
                    "{}: skipped ({}: {})",
                    failure.document_id,
                    failure.kind,
                    failure.message
                );
                DocumentOutcome {
                    district: crate::document::district_from_file_name(&failure.document_id),
                    document_id: failure.document_id.clone(),
                    records: Vec::new(),
                    error: Some(failure),
                }
            }
        }
    }

    /// Records in subject-header order. Sections without a name are dropped.
    pub fn extract_records(&self, document: &Document, telemetry: &mut Telemetry) -> Vec<Record> {
        section::split(&document.text)
            .iter()
            .filter_map(|span| self.extract_record(span, &document.id, telemetry))
            .collect()
    }

    /// Builds one record, reporting every tracked field to `telemetry` once.
    pub fn extract_record(
        &self,
        span: &Span<'_>,
        document_id: &str,
        telemetry: &mut Telemetry,
    ) -> Option<Record> {
        telemetry.record_processed();

        let fields = self.fields.extract_fields(span);
        let name = match fields.name {
            Ok(name) => {
                telemetry.record_outcome(TrackedField::Name, true);
                name
            }
            Err(miss) => {
                telemetry.record_outcome(TrackedField::Name, false);
                telemetry.warn(format!(
                    "{}: subject section {} has no name ({:?}); skipped",
                    document_id,
                    span.index + 1,
                    miss
                ));
                return None;
            }
        };

        let concerns = self.concerns.classify(span.text);
        let social_presences = self.presences.extract_presences(span.text);

        let mut missing = fields.missing_fields.clone();
        telemetry.record_outcome(TrackedField::Location, fields.location.is_ok());
        telemetry.record_outcome(TrackedField::School, fields.school.is_ok());
        telemetry.record_outcome(TrackedField::Concerns, concerns.any_present());
        if !concerns.any_present() {
            missing.push(TrackedField::Concerns);
        }
        telemetry.record_outcome(TrackedField::SocialMedia, !social_presences.is_empty());
        if social_presences.is_empty() {
            missing.push(TrackedField::SocialMedia);
        }

        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(TrackedField::as_str).collect();
            telemetry.warn(format!(
                "{}: record '{}' missing fields: {}",
                document_id,
                name,
                names.join(", ")
            ));
        }

        tracing::debug!(
            "{}: extracted '{}' ({} concerns, {} accounts)",
            document_id,
            name,
            concerns.present().count(),
            social_presences.len()
        );

        Some(Record {
            name,
            location: fields.location.ok(),
            school: fields.school.ok(),
            affiliation: fields.affiliation,
            concerns: concerns.concerns,
            other_concern: concerns.other_concern,
            other_concern_text: concerns.other_concern_text,
            social_presences,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::models::DocumentErrorKind;
    use crate::extractors::social::Platform;
    use crate::telemetry::QualityReport;

    fn extractor() -> RecordExtractor {
        RecordExtractor::new(&ExtractorConfig::default()).unwrap()
    }

    const COMPLETE: &str = "SD73 WOB Report\nSubject of Concern: John Doe\nLocation: Vancouver\nSchool: Test High School\nSOC Affiliation: Local Gang ABC\n☒ Gang-Associated Behavior\n☒ Weapons\nInstagram Information Activity\nUsername: johndoe123\nURL: https://instagram.com/johndoe123\n";

    #[test]
    fn test_complete_record() {
        let mut telemetry = Telemetry::new();
        let document = Document::new("SD73 WOB Report - August 2025.txt", COMPLETE);
        let records = extractor().extract_records(&document, &mut telemetry);

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.name, "John Doe");
        assert_eq!(record.location.as_deref(), Some("Vancouver"));
        assert_eq!(record.school.as_deref(), Some("Test High School"));
        assert_eq!(record.affiliation, "Local Gang ABC");
        assert_eq!(record.concerns.len(), Category::ALL.len());
        assert_eq!(record.concerns[&Category::Weapons], ConcernState::Present);
        assert_eq!(record.concerns[&Category::GangAssociatedBehavior], ConcernState::Present);
        assert_eq!(record.concerns[&Category::Firearms], ConcernState::Unspecified);
        assert!(!record.other_concern);
        assert_eq!(record.social_presences.len(), 1);
        assert_eq!(record.social_presences[0].platform, Platform::Instagram);
        assert_eq!(record.social_presences[0].handle.as_deref(), Some("johndoe123"));

        assert!(telemetry.snapshot().warnings.is_empty());
        assert_eq!(telemetry.success_rate(TrackedField::School), Some(1.0));
    }

    #[test]
    fn test_blank_name_discards_record() {
        let mut telemetry = Telemetry::new();
        let text = "Subject of Concern: \nLocation: San Francisco\nSchool: Middle School\n☒ Gang-Associated Behavior\n";
        let records = extractor().extract_records(&Document::new("a.txt", text), &mut telemetry);

        assert!(records.is_empty());
        let snapshot = telemetry.snapshot();
        assert_eq!(snapshot.total_records, 1);
        assert_eq!(snapshot.per_field[&TrackedField::Name].failure_count, 1);
        assert!(!snapshot.per_field.contains_key(&TrackedField::School));
        assert_eq!(snapshot.warnings.len(), 1);
    }

    #[test]
    fn test_partial_miss_keeps_record_and_warns() {
        let mut telemetry = Telemetry::new();
        let text = "Subject of Concern: Bob Johnson\nLocation: Seattle\n☒ Substance Use Concerns\n";
        let records = extractor().extract_records(&Document::new("b.txt", text), &mut telemetry);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].school, None);
        assert_eq!(
            telemetry.snapshot().warnings,
            vec!["b.txt: record 'Bob Johnson' missing fields: school, social_media".to_string()]
        );
        assert_eq!(telemetry.success_rate(TrackedField::School), Some(0.0));
        assert_eq!(telemetry.success_rate(TrackedField::Concerns), Some(1.0));
    }

    #[test]
    fn test_no_concerns_is_a_miss() {
        let mut telemetry = Telemetry::new();
        let text = "SOC: Alice Brown\nLocation: Portland\nSchool: Test Elementary\n☐ Firearms\nInstagram Information Activity\nURL: https://instagram.com/alice\n";
        let records = extractor().extract_records(&Document::new("c.txt", text), &mut telemetry);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].concerns[&Category::Firearms], ConcernState::Absent);
        assert_eq!(telemetry.success_rate(TrackedField::Concerns), Some(0.0));
        assert!(telemetry.snapshot().warnings[0].contains("'Alice Brown'"));
        assert!(telemetry.snapshot().warnings[0].contains("concerns"));
    }

    #[test]
    fn test_batch_passes_failures_through_and_continues() {
        let mut telemetry = Telemetry::new();
        let inputs = vec![
            Err(DocumentFailure {
                document_id: "Dodge County WOB Report - August 2025.txt".to_string(),
                kind: DocumentErrorKind::LockedDocument,
                message: "locked".to_string(),
            }),
            Ok(Document::new("SD73 WOB Report - August 2025.txt", COMPLETE)),
            Ok(Document::new("SD61 WOB Report - August 2025.txt", "No subjects this month.")),
        ];

        let outcomes = extractor().process_batch(inputs, &mut telemetry);

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].district, "Dodge County");
        assert_eq!(
            outcomes[0].error.as_ref().map(|e| e.kind),
            Some(DocumentErrorKind::LockedDocument)
        );
        assert!(outcomes[0].records.is_empty());
        assert_eq!(outcomes[1].records.len(), 1);
        assert_eq!(outcomes[1].district, "SD73");
        assert!(outcomes[2].records.is_empty());
        assert!(outcomes[2].error.is_none());
    }

    #[test]
    fn test_clean_batch_round_trip() {
        let mut telemetry = Telemetry::new();
        let mut text = String::from("Monthly report\n");
        for i in 0..3 {
            text.push_str(&format!(
                "SOC: Subject {i}\nLocation: Town {i}\nSchool: School {i}\n☒ Firearms\nTikTok Username: user{i}\n"
            ));
        }
        let inputs = (0..4).map(|d| Ok(Document::new(format!("SD{d} WOB.txt"), text.clone())));

        let outcomes = extractor().process_batch(inputs, &mut telemetry);
        assert!(outcomes.iter().all(|o| o.records.len() == 3));
        let names: Vec<&str> = outcomes[0].records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Subject 0", "Subject 1", "Subject 2"]);

        let snapshot = telemetry.snapshot();
        assert_eq!(snapshot.total_records, 12);
        for field in snapshot.per_field.keys() {
            assert_eq!(telemetry.success_rate(*field), Some(1.0), "{} not fully resolved", field);
        }
        let report = QualityReport::from_snapshot(&snapshot, 20);
        assert!(report.missing_data_summary.is_empty());
    }
}
