// src/document/loader.rs
//! Reads report text produced by the PDF text-extraction step. Each input is
//! a `.txt` file with pages separated by form feeds (the `pdftotext`
//! convention). Failures are classified into the passthrough error kinds.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::document::models::{Document, DocumentFailure};
use crate::utils::error::LoadError;

const PAGE_SEPARATOR: char = '\u{000C}';

/// Lists report text files in `folder`, optionally restricted to file names
/// containing `month` (e.g. "August 2025"). Sorted by file name so batch
/// order is reproducible.
pub fn find_reports(folder: &Path, month: Option<&str>) -> Result<Vec<PathBuf>, LoadError> {
    let mut reports = Vec::new();

    for entry in std::fs::read_dir(folder)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let is_text = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("txt"))
            .unwrap_or(false);
        if !is_text {
            continue;
        }
        let file_name = file_name_of(&path);
        if let Some(month) = month {
            if !file_name.contains(month) {
                tracing::trace!("Skipping {} (no '{}' in name)", file_name, month);
                continue;
            }
        }
        reports.push(path);
    }

    reports.sort();
    tracing::debug!("Found {} report files in {}", reports.len(), folder.display());
    Ok(reports)
}

/// Loads one document, classifying failures for the batch outcome.
pub fn load_document(path: &Path) -> Result<Document, DocumentFailure> {
    let document_id = file_name_of(path);
    read_document(path).map_err(|e| {
        tracing::warn!("Failed to load {}: {}", document_id, e);
        DocumentFailure {
            document_id: document_id.clone(),
            kind: e.kind(),
            message: e.to_string(),
        }
    })
}

fn read_document(path: &Path) -> Result<Document, LoadError> {
    let document_id = file_name_of(path);

    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::PermissionDenied => LoadError::PermissionDenied {
            path: path.display().to_string(),
            source: e,
        },
        _ => LoadError::Io(e),
    })?;

    // A PDF that was never run through text extraction.
    if bytes.starts_with(b"%PDF") {
        if contains_subslice(&bytes, b"/Encrypt") {
            return Err(LoadError::Locked(document_id));
        }
        return Err(LoadError::Value(format!("{} is an unextracted PDF", document_id)));
    }

    let text = String::from_utf8(bytes)
        .map_err(|e| LoadError::Value(format!("{} is not valid UTF-8: {}", document_id, e)))?;

    let pages: Vec<Option<String>> = text
        .split(PAGE_SEPARATOR)
        .map(|page| {
            if page.trim().is_empty() {
                None
            } else {
                Some(page.to_string())
            }
        })
        .collect();

    let document = Document::from_pages(document_id.clone(), pages);
    if document.text.trim().is_empty() {
        return Err(LoadError::NoText(document_id));
    }

    tracing::debug!("Loaded {} ({} bytes of text)", document.id, document.text.len());
    Ok(document)
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn contains_subslice(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::models::DocumentErrorKind;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "wob_extractor_loader_{}_{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_find_reports_filters_month_and_extension() {
        let dir = scratch_dir("find");
        std::fs::write(dir.join("SD73 WOB Report - August 2025.txt"), "x").unwrap();
        std::fs::write(dir.join("SD73 WOB Report - July 2025.txt"), "x").unwrap();
        std::fs::write(dir.join("Dodge County WOB Report - August 2025.pdf"), "x").unwrap();
        std::fs::write(dir.join("Dodge County WOB Report - August 2025.txt"), "x").unwrap();

        let reports = find_reports(&dir, Some("August 2025")).unwrap();
        let names: Vec<String> = reports.iter().map(|p| file_name_of(p)).collect();
        assert_eq!(
            names,
            vec![
                "Dodge County WOB Report - August 2025.txt".to_string(),
                "SD73 WOB Report - August 2025.txt".to_string(),
            ]
        );

        let all = find_reports(&dir, None).unwrap();
        assert_eq!(all.len(), 3);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_document_classifies_failures() {
        let dir = scratch_dir("load");
        let locked = dir.join("locked.txt");
        std::fs::write(&locked, b"%PDF-1.7\n1 0 obj << /Encrypt 5 0 R >>").unwrap();
        let raw_pdf = dir.join("raw.txt");
        std::fs::write(&raw_pdf, b"%PDF-1.4\n1 0 obj").unwrap();
        let blank = dir.join("blank.txt");
        std::fs::write(&blank, "  \n\u{000C}\n ").unwrap();

        assert_eq!(load_document(&locked).unwrap_err().kind, DocumentErrorKind::LockedDocument);
        assert_eq!(load_document(&raw_pdf).unwrap_err().kind, DocumentErrorKind::ValueError);
        assert_eq!(load_document(&blank).unwrap_err().kind, DocumentErrorKind::NoText);
        let missing = load_document(&dir.join("missing.txt")).unwrap_err();
        assert_eq!(missing.kind, DocumentErrorKind::GeneralError);
        assert_eq!(missing.document_id, "missing.txt");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_document_joins_pages() {
        let dir = scratch_dir("pages");
        let path = dir.join("SD73 WOB Report.txt");
        std::fs::write(&path, "SOC: Jane\n\u{000C}\u{000C}Location: Kamloops\n").unwrap();

        let document = load_document(&path).unwrap();
        assert_eq!(document.id, "SD73 WOB Report.txt");
        assert_eq!(document.text, "SOC: Jane\n\nLocation: Kamloops\n\n");
        let _ = std::fs::remove_dir_all(&dir);
    }
}
