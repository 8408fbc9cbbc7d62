// src/extractors/concerns.rs
use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::extractors::patterns::{bounded_literal, compile};
use crate::utils::error::ExtractError;
use crate::utils::text::normalize;

// Checkbox encodings seen across district layouts.
pub const CHECKED_MARK: &str = r"(?:[☒☑✓✔]|\[[ \t]*x[ \t]*\])";
pub const UNCHECKED_MARK: &str = r"(?:[☐□]|\[[ \t]*\])";
// Horizontal gap tolerated between a checkbox and its label.
const MARK_GAP: &str = r"[ \t]{0,4}";
// Table rows: "Firearms | X |" or "Firearms | | X".
const TABLE_CHECKED_CELL: &str = r"[ \t]*\|(?:[^\n|]*\|)*?[ \t]*(?:x|[☒☑✓✔])[ \t\r]*(?:\||$)";

/// The closed taxonomy of concern categories, in report column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Mental Health Concerns")]
    MentalHealthConcerns,
    #[serde(rename = "Firearms")]
    Firearms,
    #[serde(rename = "Weapons")]
    Weapons,
    #[serde(rename = "Threat-Related Behavior")]
    ThreatRelatedBehavior,
    #[serde(rename = "Physical Violence")]
    PhysicalViolence,
    #[serde(rename = "Substance Use Concerns")]
    SubstanceUseConcerns,
    #[serde(rename = "Suicidal Ideation")]
    SuicidalIdeation,
    #[serde(rename = "Gang-Associated Behavior")]
    GangAssociatedBehavior,
    #[serde(rename = "Bullying/Cyberbullying")]
    BullyingCyberbullying,
    #[serde(rename = "School Community Concerns")]
    SchoolCommunityConcerns,
    #[serde(rename = "Risk of Sextortion")]
    RiskOfSextortion,
    #[serde(rename = "Sexual Assault")]
    SexualAssault,
    #[serde(rename = "Non-Suicidal Self-Harm")]
    NonSuicidalSelfHarm,
    #[serde(rename = "Negative Digital Climate/Culture")]
    NegativeDigitalClimateCulture,
    #[serde(rename = "Hate/Racism or Radicalization")]
    HateRacismOrRadicalization,
    #[serde(rename = "Illegal Activity Misc.")]
    IllegalActivityMisc,
    #[serde(rename = "Passed Away")]
    PassedAway,
}

impl Category {
    pub const ALL: [Category; 17] = [
        Category::MentalHealthConcerns,
        Category::Firearms,
        Category::Weapons,
        Category::ThreatRelatedBehavior,
        Category::PhysicalViolence,
        Category::SubstanceUseConcerns,
        Category::SuicidalIdeation,
        Category::GangAssociatedBehavior,
        Category::BullyingCyberbullying,
        Category::SchoolCommunityConcerns,
        Category::RiskOfSextortion,
        Category::SexualAssault,
        Category::NonSuicidalSelfHarm,
        Category::NegativeDigitalClimateCulture,
        Category::HateRacismOrRadicalization,
        Category::IllegalActivityMisc,
        Category::PassedAway,
    ];

    /// The label as printed on the report form.
    pub fn label(&self) -> &'static str {
        match self {
            Category::MentalHealthConcerns => "Mental Health Concerns",
            Category::Firearms => "Firearms",
            Category::Weapons => "Weapons",
            Category::ThreatRelatedBehavior => "Threat-Related Behavior",
            Category::PhysicalViolence => "Physical Violence",
            Category::SubstanceUseConcerns => "Substance Use Concerns",
            Category::SuicidalIdeation => "Suicidal Ideation",
            Category::GangAssociatedBehavior => "Gang-Associated Behavior",
            Category::BullyingCyberbullying => "Bullying/Cyberbullying",
            Category::SchoolCommunityConcerns => "School Community Concerns",
            Category::RiskOfSextortion => "Risk of Sextortion",
            Category::SexualAssault => "Sexual Assault",
            Category::NonSuicidalSelfHarm => "Non-Suicidal Self-Harm",
            Category::NegativeDigitalClimateCulture => "Negative Digital Climate/Culture",
            Category::HateRacismOrRadicalization => "Hate/Racism or Radicalization",
            Category::IllegalActivityMisc => "Illegal Activity Misc.",
            Category::PassedAway => "Passed Away",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Tri-state marking. `Absent` means an empty box was printed; `Unspecified`
/// means the category never appeared with a box at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcernState {
    Present,
    Absent,
    Unspecified,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedConcerns {
    /// Always holds every taxonomy category.
    pub concerns: BTreeMap<Category, ConcernState>,
    pub other_concern: bool,
    pub other_concern_text: String,
}

impl ClassifiedConcerns {
    /// True when at least one category or "Other" is marked.
    pub fn any_present(&self) -> bool {
        self.other_concern
            || self
                .concerns
                .values()
                .any(|state| *state == ConcernState::Present)
    }

    pub fn present(&self) -> impl Iterator<Item = Category> + '_ {
        self.concerns
            .iter()
            .filter(|(_, state)| **state == ConcernState::Present)
            .map(|(category, _)| *category)
    }
}

struct CategoryPatterns {
    category: Category,
    checked: Vec<Regex>,
    unchecked: Vec<Regex>,
}

pub struct ConcernClassifier {
    categories: Vec<CategoryPatterns>,
    // Each captures the free text written after "Other".
    other_checked: Vec<Regex>,
}

impl ConcernClassifier {
    pub fn new() -> Result<Self, ExtractError> {
        let categories = Category::ALL
            .iter()
            .map(|category| {
                let name = bounded_literal(category.label());
                Ok(CategoryPatterns {
                    category: *category,
                    checked: vec![
                        compile(category.label(), &format!("(?i){CHECKED_MARK}{MARK_GAP}{name}"))?,
                        compile(category.label(), &format!("(?im){name}{TABLE_CHECKED_CELL}"))?,
                    ],
                    unchecked: vec![compile(
                        category.label(),
                        &format!("(?i){UNCHECKED_MARK}{MARK_GAP}{name}"),
                    )?],
                })
            })
            .collect::<Result<Vec<_>, ExtractError>>()?;

        let other_checked = vec![
            compile(
                "Other",
                &format!(r"(?i){CHECKED_MARK}{MARK_GAP}\bOther\b[ \t]*(?:\([^)\n]*\))?[ \t]*:?([^\n]*)"),
            )?,
            compile(
                "Other",
                r"(?im)\bOther\b[ \t]*\|(?:[^\n|]*\|)*?[ \t]*(?:x|[☒☑✓✔])[ \t\r]*(?:\|([^\n]*)|$)",
            )?,
        ];

        Ok(Self {
            categories,
            other_checked,
        })
    }

    /// Classifies every taxonomy category for one subject span.
    pub fn classify(&self, text: &str) -> ClassifiedConcerns {
        let concerns = self
            .categories
            .iter()
            .map(|patterns| (patterns.category, classify_category(patterns, text)))
            .collect();

        let other_text = self.other_checked.iter().find_map(|re| {
            re.captures(text).map(|caps| {
                caps.get(1)
                    .map(|m| normalize(&m.as_str().replace('|', " ")))
                    .unwrap_or_default()
            })
        });

        // An unchecked "Other" box and a missing one read the same.
        let (other_concern, other_concern_text) = match other_text {
            Some(text) => (true, text),
            None => (false, String::new()),
        };

        ClassifiedConcerns {
            concerns,
            other_concern,
            other_concern_text,
        }
    }
}

fn classify_category(patterns: &CategoryPatterns, text: &str) -> ConcernState {
    if patterns.checked.iter().any(|re| re.is_match(text)) {
        tracing::trace!("Concern marked: {}", patterns.category);
        ConcernState::Present
    } else if patterns.unchecked.iter().any(|re| re.is_match(text)) {
        ConcernState::Absent
    } else {
        ConcernState::Unspecified
    }
}
