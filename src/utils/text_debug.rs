// src/utils/text_debug.rs
use std::fs::File;
use std::io::Write;
use std::path::Path;

use regex::Regex;

use crate::utils::error::AppError;

/// Wraps every highlight range in `[[kind:` ... `]]` markers so a reviewer can
/// see where the extractor found structure in a plain-text document.
/// Overlapping ranges are skipped; the earliest one wins.
pub fn annotate_text(text: &str, highlights: &[(usize, usize, &str)]) -> String {
    let mut annotated = String::with_capacity(text.len() + highlights.len() * 16);

    let mut last_pos = 0;
    let mut sorted_highlights = highlights.to_vec();
    sorted_highlights.sort_by_key(|h| (h.0, std::cmp::Reverse(h.1))); // Sort by position

    for (start, end, kind) in sorted_highlights {
        if start < last_pos || end > text.len() {
            continue;
        }
        annotated.push_str(&text[last_pos..start]);
        annotated.push_str(&format!("[[{}:", kind));
        annotated.push_str(&text[start..end]);
        annotated.push_str("]]");
        last_pos = end;
    }

    annotated.push_str(&text[last_pos..]);
    annotated
}

/// Finds all matches for each `(pattern, kind)` pair and annotates them.
pub fn annotate_patterns(text: &str, patterns: &[(&str, &str)]) -> Result<String, AppError> {
    let mut highlights = Vec::new();

    for (pattern, kind) in patterns {
        let re = Regex::new(pattern).map_err(|e| {
            AppError::Config(format!("Invalid regex pattern '{}': {}", pattern, e))
        })?;

        for mat in re.find_iter(text) {
            highlights.push((mat.start(), mat.end(), *kind));
        }
    }

    Ok(annotate_text(text, &highlights))
}

/// Writes the raw document text and an annotated copy side by side.
pub fn save_debug_text(
    text: &str,
    debug_dir: &Path,
    stem: &str,
    patterns: &[(&str, &str)],
) -> Result<(), AppError> {
    std::fs::create_dir_all(debug_dir)?;

    let raw_path = debug_dir.join(format!("{}_raw.txt", stem));
    std::fs::write(&raw_path, text)?;

    let annotated = annotate_patterns(text, patterns)?;
    let annotated_path = debug_dir.join(format!("{}_annotated.txt", stem));
    let mut file = File::create(&annotated_path)?;
    file.write_all(annotated.as_bytes())?;

    tracing::info!("Saved debug text to {}", annotated_path.display());
    Ok(())
}
