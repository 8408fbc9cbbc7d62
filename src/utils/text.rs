// src/utils/text.rs
//! Cleanup of field values copied out of PDF text. Leader dots, underscores
//! and dash rules from form layouts survive text extraction and end up glued
//! to names and schools.

use once_cell::sync::Lazy;
use regex::Regex;

// Any mixture of separator glyphs and whitespace at the end of the value.
static TRAILING_SEPARATORS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.·_\-\s]+$").expect("Failed to compile TRAILING_SEPARATORS_RE"));

// Homogeneous runs of three or more separators inside the value.
static INTERIOR_RUNS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.·]{3,}|_{3,}|-{3,}").expect("Failed to compile INTERIOR_RUNS_RE"));

static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Failed to compile WHITESPACE_RE"));

/// Strips PDF rendering artifacts from an extracted value.
///
/// Trailing leaders are removed, interior runs of 3+ identical separators are
/// deleted outright (`"Part1.......Part2"` becomes `"Part1Part2"`) and
/// whitespace is collapsed. Single periods and apostrophes are kept.
pub fn normalize(raw: &str) -> String {
    let mut value = TRAILING_SEPARATORS_RE.replace(raw, "").into_owned();

    // Deleting one run can join two shorter runs into a new one ("-...--").
    loop {
        let next = INTERIOR_RUNS_RE.replace_all(&value, "");
        if next.len() == value.len() {
            break;
        }
        value = next.into_owned();
    }

    WHITESPACE_RE.replace_all(&value, " ").trim().to_string()
}

/// Trailing-separator stripping only. Interior runs are legal in URLs.
pub fn normalize_url(raw: &str) -> String {
    TRAILING_SEPARATORS_RE.replace(raw, "").trim().to_string()
}
