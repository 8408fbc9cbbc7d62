// src/extractors/fields.rs
use crate::extractors::patterns::{first_match, labeled_list, LabelPattern};
use crate::extractors::section::Span;
use crate::telemetry::TrackedField;
use crate::utils::error::ExtractError;
use crate::utils::text::normalize;

// Label alternatives, highest priority first.
const LOCATION_LABELS: &[(&str, &str)] = &[
    ("Location", r"Location"),
    ("City/Town", r"City[ \t]*/[ \t]*Town"),
    ("City", r"City"),
];

const SCHOOL_LABELS: &[(&str, &str)] = &[
    ("School Name", r"School[ \t]+Name"),
    ("School", r"School"),
    ("Institution", r"Institution"),
];

const AFFILIATION_LABELS: &[(&str, &str)] = &[
    ("SOC Affiliation", r"SOC[ \t]+Affiliation"),
    ("Gang Affiliation", r"Gang[ \t]+Affiliation"),
    ("Group Affiliation", r"Group[ \t]+Affiliation"),
    ("Affiliation", r"Affiliation"),
];

/// Why a scalar field came back empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMiss {
    /// None of the label alternatives appear with a value.
    NoLabel,
    /// A label matched but its value was only layout artifacts.
    EmptyValue,
}

pub type FieldResult = Result<String, FieldMiss>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFields {
    pub name: FieldResult,
    pub location: FieldResult,
    pub school: FieldResult,
    pub affiliation: String, // Empty when absent; not a miss
    pub missing_fields: Vec<TrackedField>,
}

pub struct FieldExtractor {
    location: Vec<LabelPattern>,
    school: Vec<LabelPattern>,
    affiliation: Vec<LabelPattern>,
}

impl FieldExtractor {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            location: labeled_list(LOCATION_LABELS)?,
            school: labeled_list(SCHOOL_LABELS)?,
            affiliation: labeled_list(AFFILIATION_LABELS)?,
        })
    }

    /// Pulls the scalar fields out of one subject span.
    pub fn extract_fields(&self, span: &Span<'_>) -> ExtractedFields {
        let name = extract_name(span);
        let location = resolve(&self.location, span.text, "location");
        let school = resolve(&self.school, span.text, "school");
        let affiliation = resolve(&self.affiliation, span.text, "affiliation").unwrap_or_default();

        let missing_fields = [
            (TrackedField::Name, name.is_err()),
            (TrackedField::Location, location.is_err()),
            (TrackedField::School, school.is_err()),
        ]
        .into_iter()
        .filter_map(|(field, missing)| missing.then_some(field))
        .collect();

        ExtractedFields {
            name,
            location,
            school,
            affiliation,
            missing_fields,
        }
    }
}

/// The name sits on the header line itself ("Subject of Concern: Jane Doe").
pub fn extract_name(span: &Span<'_>) -> FieldResult {
    let first_line = span.first_line();
    if first_line.trim().is_empty() {
        tracing::debug!("Span {} has a blank header line", span.index);
        return Err(FieldMiss::NoLabel);
    }
    let name = normalize(first_line);
    if name.is_empty() {
        return Err(FieldMiss::EmptyValue);
    }
    Ok(name)
}

fn resolve(patterns: &[LabelPattern], text: &str, field: &str) -> FieldResult {
    let Some((pattern, raw)) = first_match(patterns, text) else {
        tracing::trace!("No label found for {}", field);
        return Err(FieldMiss::NoLabel);
    };
    let value = normalize(raw);
    if value.is_empty() {
        tracing::debug!("Label '{}' for {} held only layout characters", pattern.label(), field);
        return Err(FieldMiss::EmptyValue);
    }
    tracing::trace!("Resolved {} via '{}': {}", field, pattern.label(), value);
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str) -> Span<'_> {
        Span {
            index: 0,
            offset: 0,
            text,
        }
    }

    #[test]
    fn test_fields_cleaned_of_leaders() {
        let text = " Kiera Triplett ...........................\nLocation: Vancouver ....................\nSchool: Central High School ..........\nSOC Affiliation: Gang ABC .............\n☒ Weapons\n";
        let fields = FieldExtractor::new().unwrap().extract_fields(&span(text));
        assert_eq!(fields.name, Ok("Kiera Triplett".to_string()));
        assert_eq!(fields.location, Ok("Vancouver".to_string()));
        assert_eq!(fields.school, Ok("Central High School".to_string()));
        assert_eq!(fields.affiliation, "Gang ABC");
        assert!(fields.missing_fields.is_empty());
    }

    #[test]
    fn test_alternative_labels() {
        let text = " Charlie Davis\nCity/Town: Los Angeles\nInstitution: Private Academy\nGang Affiliation: Crew 123\n";
        let fields = FieldExtractor::new().unwrap().extract_fields(&span(text));
        assert_eq!(fields.location, Ok("Los Angeles".to_string()));
        assert_eq!(fields.school, Ok("Private Academy".to_string()));
        assert_eq!(fields.affiliation, "Crew 123");

        let text = " Dana\ncity: Surrey\nSchool Name: Elgin Park\nGroup Affiliation: Street Group XYZ\n";
        let fields = FieldExtractor::new().unwrap().extract_fields(&span(text));
        assert_eq!(fields.location, Ok("Surrey".to_string()));
        assert_eq!(fields.school, Ok("Elgin Park".to_string()));
        assert_eq!(fields.affiliation, "Street Group XYZ");
    }

    #[test]
    fn test_label_priority_first_match_wins() {
        let text = " Erin\nCity: Burnaby\nLocation: Vancouver\nAffiliation: Generic\nSOC Affiliation: Specific\n";
        let fields = FieldExtractor::new().unwrap().extract_fields(&span(text));
        assert_eq!(fields.location, Ok("Vancouver".to_string()));
        assert_eq!(fields.affiliation, "Specific");
    }

    #[test]
    fn test_missing_fields_reported_but_not_affiliation() {
        let text = " Jane Smith\nSchool: ..........\n☒ Firearms\n";
        let fields = FieldExtractor::new().unwrap().extract_fields(&span(text));
        assert_eq!(fields.name, Ok("Jane Smith".to_string()));
        assert_eq!(fields.location, Err(FieldMiss::NoLabel));
        assert_eq!(fields.school, Err(FieldMiss::EmptyValue));
        assert_eq!(fields.affiliation, "");
        assert_eq!(
            fields.missing_fields,
            vec![TrackedField::Location, TrackedField::School]
        );
    }

    #[test]
    fn test_blank_first_line_fails_name() {
        let fields = FieldExtractor::new()
            .unwrap()
            .extract_fields(&span(" \nLocation: San Francisco\nSchool: Middle School\n"));
        assert_eq!(fields.name, Err(FieldMiss::NoLabel));
        assert_eq!(fields.location, Ok("San Francisco".to_string()));
        assert_eq!(fields.missing_fields, vec![TrackedField::Name]);

        assert_eq!(extract_name(&span(" ......\nJane")), Err(FieldMiss::EmptyValue));
    }
}
