// src/storage/mod.rs
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::extractors::record::DocumentOutcome;
use crate::telemetry::QualityReport;
use crate::utils::error::StorageError;

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Saves one document's records (or its failure) as JSON under
    /// `<base>/<district>/<stem>_records.json`.
    pub fn save_document(&self, outcome: &DocumentOutcome) -> Result<PathBuf, StorageError> {
        let target_dir = self.base_dir.join(sanitize_component(&outcome.district));
        if !target_dir.exists() {
            fs::create_dir_all(&target_dir).map_err(StorageError::IoError)?;
        }

        let stem = Path::new(&outcome.document_id)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| outcome.document_id.clone());
        let file_path = target_dir.join(format!("{}_records.json", sanitize_component(&stem)));

        write_json(&file_path, outcome)?;
        tracing::info!("Saved {} records to {}", outcome.records.len(), file_path.display());

        Ok(file_path)
    }

    /// Saves the batch quality report with a generation timestamp.
    pub fn save_quality_report(
        &self,
        report: &QualityReport,
        month: Option<&str>,
    ) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join("quality_report.json");

        let document = serde_json::json!({
            "month": month,
            "generated_at": chrono::Utc::now().to_rfc3339(),
            "report": report,
        });
        write_json(&file_path, &document)?;
        tracing::info!("Saved quality report to {}", file_path.display());

        Ok(file_path)
    }

    /// Saves a per-document summary of the batch: record counts and errors.
    pub fn save_batch_summary(
        &self,
        outcomes: &[DocumentOutcome],
        month: Option<&str>,
    ) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join("batch_summary.json");

        let documents: Vec<serde_json::Value> = outcomes
            .iter()
            .map(|outcome| {
                serde_json::json!({
                    "document_id": outcome.document_id,
                    "district": outcome.district,
                    "record_count": outcome.records.len(),
                    "error": outcome.error.as_ref().map(|e| e.kind),
                    "error_message": outcome.error.as_ref().map(|e| e.message.as_str()),
                })
            })
            .collect();

        let summary = serde_json::json!({
            "month": month,
            "generated_at": chrono::Utc::now().to_rfc3339(),
            "document_count": outcomes.len(),
            "record_count": outcomes.iter().map(|o| o.records.len()).sum::<usize>(),
            "documents": documents,
        });
        write_json(&file_path, &summary)?;
        tracing::info!("Saved batch summary to {}", file_path.display());

        Ok(file_path)
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StorageError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| StorageError::SerializationError(e.to_string()))?;
    fs::write(path, json).map_err(StorageError::IoError)
}

// District names come from file names; keep them path-safe.
fn sanitize_component(name: &str) -> String {
    name.chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::models::{DocumentErrorKind, DocumentFailure};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "wob_extractor_storage_{}_{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_save_document_layout() {
        let dir = scratch_dir("docs");
        let storage = StorageManager::new(&dir).unwrap();
        let outcome = DocumentOutcome {
            document_id: "SD73 WOB Report - August 2025.txt".to_string(),
            district: "SD73".to_string(),
            records: Vec::new(),
            error: Some(DocumentFailure {
                document_id: "SD73 WOB Report - August 2025.txt".to_string(),
                kind: DocumentErrorKind::NoText,
                message: "empty".to_string(),
            }),
        };

        let path = storage.save_document(&outcome).unwrap();
        assert_eq!(path, dir.join("SD73").join("SD73 WOB Report - August 2025_records.json"));

        let saved: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved["error"]["kind"], "no_text");

        let summary = storage.save_batch_summary(&[outcome], Some("August 2025")).unwrap();
        let saved: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&summary).unwrap()).unwrap();
        assert_eq!(saved["documents"][0]["error"], "no_text");
        assert_eq!(saved["record_count"], 0);
        let _ = fs::remove_dir_all(&dir);
    }
}
