// src/main.rs
use std::path::PathBuf;

use clap::Parser;
use wob_extractor::document::loader;
use wob_extractor::extractors::concerns::{CHECKED_MARK, UNCHECKED_MARK};
use wob_extractor::extractors::section::SUBJECT_MARKER_PATTERN;
use wob_extractor::extractors::social::{self, Platform};
use wob_extractor::extractors::{ExtractorConfig, RecordExtractor};
use wob_extractor::storage::StorageManager;
use wob_extractor::telemetry::{QualityReport, Telemetry};
use wob_extractor::utils::{self, AppError};

/// Command Line Interface for the WOB report extractor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Folder containing report text files (one per PDF, pages separated by form feeds)
    input_dir: PathBuf,

    /// Only process files whose name contains this month, e.g. "August 2025"
    #[arg(short, long)]
    month: Option<String>,

    /// Output directory for extracted records and the quality report
    #[arg(short, long, default_value = "./output")]
    output_dir: PathBuf,

    /// Debug mode - save raw and annotated text for every document
    #[arg(short, long)]
    debug: bool,

    /// Restrict social media extraction to these platforms (repeatable)
    #[arg(long = "platform")]
    platforms: Vec<Platform>,

    /// Number of extraction warnings copied into the quality report
    #[arg(long, env = "WOB_WARNING_LIMIT", default_value_t = 20)]
    warning_limit: usize,
}

fn main() -> Result<(), AppError> {
    // 1. Parse CLI Arguments
    let args = Args::parse();

    // 2. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging(args.debug);
    tracing::info!("Starting processing for args: {:?}", args);

    // 3. Build the engine once for the whole batch
    let config = if args.platforms.is_empty() {
        ExtractorConfig::default()
    } else {
        ExtractorConfig {
            platforms: args.platforms.clone(),
        }
    };
    let extractor = RecordExtractor::new(&config)?;
    let storage = StorageManager::new(&args.output_dir)?;

    // 4. Find report files
    let reports = loader::find_reports(&args.input_dir, args.month.as_deref())?;
    if reports.is_empty() {
        return Err(AppError::Config(format!(
            "No report files found in {} for {}",
            args.input_dir.display(),
            args.month.as_deref().unwrap_or("any month")
        )));
    }
    tracing::info!("Found {} report files", reports.len());

    // 5. Load and extract, one document at a time
    let mut telemetry = Telemetry::new();
    let mut outcomes = Vec::with_capacity(reports.len());

    for path in &reports {
        let input = loader::load_document(path);

        if args.debug {
            if let Ok(document) = &input {
                let checked = format!("(?i){CHECKED_MARK}");
                let unchecked = format!("(?i){UNCHECKED_MARK}");
                let banner = social::banner_pattern(&config.platforms);
                let debug_patterns = [
                    (SUBJECT_MARKER_PATTERN, "subject"),
                    (checked.as_str(), "checked"),
                    (unchecked.as_str(), "unchecked"),
                    (banner.as_str(), "banner"),
                ];
                let debug_dir = storage.base_dir().join("debug");
                let stem = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| document.id.clone());
                if let Err(e) =
                    utils::text_debug::save_debug_text(&document.text, &debug_dir, &stem, &debug_patterns)
                {
                    tracing::warn!("Failed to create debug text: {}", e);
                }
            }
        }

        let outcome = extractor.process_document(input, &mut telemetry);
        match storage.save_document(&outcome) {
            Ok(path) => tracing::debug!("Saved document output to: {}", path.display()),
            Err(e) => tracing::error!("Failed to save records for {}: {}", outcome.document_id, e),
        }
        outcomes.push(outcome);
    }

    // 6. Batch-level artifacts
    let report = QualityReport::from_snapshot(&telemetry.snapshot(), args.warning_limit);
    storage.save_quality_report(&report, args.month.as_deref())?;
    storage.save_batch_summary(&outcomes, args.month.as_deref())?;

    let record_count: usize = outcomes.iter().map(|o| o.records.len()).sum();
    let failure_count = outcomes.iter().filter(|o| o.error.is_some()).count();
    tracing::info!(
        "Processing finished. Documents: {}, Records: {}, Failed documents: {}",
        outcomes.len(),
        record_count,
        failure_count
    );
    for recommendation in &report.recommendations {
        tracing::info!("Recommendation: {}", recommendation);
    }

    Ok(())
}
