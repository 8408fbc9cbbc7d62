// src/extractors/section.rs

// --- Imports ---
use once_cell::sync::Lazy;
use regex::Regex;

// --- Regex Patterns for Subject Headers (Lazy Static) ---
/// Subject header markers, tried as one leftmost-first alternation so the
/// long form wins over the short labels it contains ("Subject of Concern (SOC):").
pub const SUBJECT_MARKER_PATTERN: &str = r"Subject of Concern[^\n]*?:|\bSOC:|\bSubject:";

static SUBJECT_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(SUBJECT_MARKER_PATTERN).expect("Failed to compile SUBJECT_MARKER_RE")
});

// --- Data Structures ---
/// The slice of a document describing one subject, starting right after its
/// header marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span<'a> {
    pub index: usize,  // Ordinal of the subject within the document
    pub offset: usize, // Byte offset of `text` in the document
    pub text: &'a str,
}

impl<'a> Span<'a> {
    /// Remainder of the header line, where the subject's name is written.
    pub fn first_line(&self) -> &'a str {
        self.text.split('\n').next().unwrap_or("")
    }
}

/// Splits a document into one span per subject header. Text before the first
/// header is boilerplate and is dropped. No headers means no spans.
pub fn split(document_text: &str) -> Vec<Span<'_>> {
    let markers: Vec<(usize, usize)> = SUBJECT_MARKER_RE
        .find_iter(document_text)
        .map(|m| (m.start(), m.end()))
        .collect();

    if markers.is_empty() {
        tracing::debug!("No subject markers found in {} bytes of text", document_text.len());
        return Vec::new();
    }

    let spans: Vec<Span<'_>> = markers
        .iter()
        .enumerate()
        .map(|(index, &(_, body_start))| {
            let body_end = markers
                .get(index + 1)
                .map(|&(next_start, _)| next_start)
                .unwrap_or(document_text.len());
            Span {
                index,
                offset: body_start,
                text: &document_text[body_start..body_end],
            }
        })
        .collect();

    tracing::debug!("Split document into {} subject spans", spans.len());
    spans
}
