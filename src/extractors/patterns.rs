// src/extractors/patterns.rs
use regex::Regex;

use crate::utils::error::ExtractError;

/// One alternative in an ordered label list, e.g. `School Name:`.
///
/// The regex must have exactly one capture group holding the value.
#[derive(Debug, Clone)]
pub struct LabelPattern {
    label: String,
    regex: Regex,
}

impl LabelPattern {
    /// Compiles a raw pattern.
    pub fn new(label: impl Into<String>, pattern: &str) -> Result<Self, ExtractError> {
        let label = label.into();
        let regex = compile(&label, pattern)?;
        Ok(Self { label, regex })
    }

    /// `label_regex` followed by a colon; the value runs to end of line.
    /// Matching is case-insensitive.
    pub fn labeled(label: impl Into<String>, label_regex: &str) -> Result<Self, ExtractError> {
        let pattern = format!(r"(?i)\b(?:{})[ \t]*:[ \t]*([^\n]*)", label_regex);
        Self::new(label, &pattern)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// First occurrence of this label with a non-blank value.
    pub fn capture<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.regex
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .find(|value| !value.trim().is_empty())
    }
}

/// Tries each alternative in order; the first one that captures wins and the
/// rest are not consulted.
pub fn first_match<'p, 't>(
    patterns: &'p [LabelPattern],
    text: &'t str,
) -> Option<(&'p LabelPattern, &'t str)> {
    patterns
        .iter()
        .find_map(|pattern| pattern.capture(text).map(|value| (pattern, value)))
}

/// Compiles a list of `(label, label_regex)` pairs into labeled patterns,
/// preserving their order.
pub fn labeled_list(entries: &[(&str, &str)]) -> Result<Vec<LabelPattern>, ExtractError> {
    entries
        .iter()
        .map(|(label, label_regex)| LabelPattern::labeled(*label, label_regex))
        .collect()
}

/// Compiles a pattern, tagging failures with the label it belongs to.
pub fn compile(label: &str, pattern: &str) -> Result<Regex, ExtractError> {
    Regex::new(pattern).map_err(|source| ExtractError::InvalidPattern {
        label: label.to_string(),
        source,
    })
}

/// Escapes `literal` and adds word boundaries on the sides that start or end
/// with a word character, so "Weapons" cannot match inside "Weaponsmith" and
/// names ending in punctuation ("Illegal Activity Misc.") still match.
pub fn bounded_literal(literal: &str) -> String {
    let mut pattern = String::new();
    if literal.chars().next().is_some_and(|c| c.is_alphanumeric()) {
        pattern.push_str(r"\b");
    }
    pattern.push_str(&regex::escape(literal));
    if literal.chars().last().is_some_and(|c| c.is_alphanumeric()) {
        pattern.push_str(r"\b");
    }
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labeled_captures_to_end_of_line() {
        let pattern = LabelPattern::labeled("Location", "Location").unwrap();
        assert_eq!(pattern.capture("location:  Vancouver ...\nSchool: X"), Some("Vancouver ..."));
        assert_eq!(pattern.capture("Relocation: nowhere"), None);
    }

    #[test]
    fn test_blank_value_does_not_count_as_match() {
        let pattern = LabelPattern::labeled("Location", "Location").unwrap();
        assert_eq!(pattern.capture("Location:\nLocation: Kamloops"), Some("Kamloops"));
        assert_eq!(pattern.capture("Location:   \n"), None);
    }

    #[test]
    fn test_first_match_respects_order() {
        let patterns = labeled_list(&[
            ("SOC Affiliation", r"SOC[ \t]+Affiliation"),
            ("Affiliation", "Affiliation"),
        ])
        .unwrap();
        let text = "Affiliation: Generic\nSOC Affiliation: Specific";
        let (pattern, value) = first_match(&patterns, text).unwrap();
        assert_eq!(pattern.label(), "SOC Affiliation");
        assert_eq!(value, "Specific");
    }

    #[test]
    fn test_bounded_literal() {
        assert_eq!(bounded_literal("Weapons"), r"\bWeapons\b");
        assert_eq!(bounded_literal("Illegal Activity Misc."), r"\bIllegal Activity Misc\.");
        let re = Regex::new(&format!("(?i){}", bounded_literal("Bullying/Cyberbullying"))).unwrap();
        assert!(re.is_match("☒ bullying/cyberbullying"));
    }

    #[test]
    fn test_invalid_pattern_reports_label() {
        let err = LabelPattern::new("broken", "(").unwrap_err();
        assert!(err.to_string().contains("broken"));
    }
}
