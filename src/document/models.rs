// src/document/models.rs
use serde::{Deserialize, Serialize};

/// One input report, already reduced to text by the PDF collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: String,   // File name, e.g. "SD73 WOB Report - August 2025.txt"
    pub text: String, // May be empty
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }

    /// Joins page texts in order. A page with no extractable text
    /// contributes nothing.
    pub fn from_pages<I>(id: impl Into<String>, pages: I) -> Self
    where
        I: IntoIterator<Item = Option<String>>,
    {
        let mut text = String::new();
        for page in pages.into_iter().flatten() {
            text.push_str(&page);
            text.push('\n');
        }
        Self { id: id.into(), text }
    }

    pub fn district(&self) -> String {
        district_from_file_name(&self.id)
    }
}

/// Failure reported by the decoding collaborator. Passed through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentErrorKind {
    LockedDocument,
    NoText,
    PermissionDenied,
    ValueError,
    GeneralError,
}

impl DocumentErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentErrorKind::LockedDocument => "locked_document",
            DocumentErrorKind::NoText => "no_text",
            DocumentErrorKind::PermissionDenied => "permission_denied",
            DocumentErrorKind::ValueError => "value_error",
            DocumentErrorKind::GeneralError => "general_error",
        }
    }
}

impl std::fmt::Display for DocumentErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFailure {
    pub document_id: String,
    pub kind: DocumentErrorKind,
    pub message: String,
}

/// Derives the district from a report file name.
///
/// "SD73 WOB Report - January 2025.pdf" gives "SD73",
/// "Dodge County WOB Report - January 2025.pdf" gives "Dodge County".
pub fn district_from_file_name(file_name: &str) -> String {
    if let Some(idx) = file_name.find("SD") {
        if idx < 10 {
            let digits: String = file_name[idx + 2..]
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            if !digits.is_empty() {
                return format!("SD{}", digits);
            }
        }
    }

    if let Some(idx) = file_name.find("WOB") {
        let district = file_name[..idx].trim();
        if !district.is_empty() {
            return district.to_string();
        }
    }

    "Unknown".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_district_from_file_name() {
        assert_eq!(district_from_file_name("SD73 WOB Report - January 2025.pdf"), "SD73");
        assert_eq!(
            district_from_file_name("Dodge County WOB Report - January 2025.txt"),
            "Dodge County"
        );
        assert_eq!(
            district_from_file_name("Palm Springs USD WOB Report - August 2025.txt"),
            "Palm Springs USD"
        );
        assert_eq!(district_from_file_name("report.txt"), "Unknown");
    }

    #[test]
    fn test_from_pages_skips_unavailable_pages() {
        let doc = Document::from_pages(
            "SD73.txt",
            vec![Some("page one".to_string()), None, Some("page three".to_string())],
        );
        assert_eq!(doc.text, "page one\npage three\n");
        assert_eq!(doc.district(), "SD73");
    }
}
