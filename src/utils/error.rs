// src/utils/error.rs
use thiserror::Error;

use crate::document::models::DocumentErrorKind;

// Errors raised while building the extraction engine.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Regular expression error in pattern '{label}': {source}")]
    InvalidPattern {
        label: String,
        #[source]
        source: regex::Error,
    },

    #[error("No known platforms configured")]
    NoPlatforms,
}

// Errors from the document collaborator. Each maps onto the passthrough
// error kind that ends up in the document outcome.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Document is locked (encrypted PDF): {0}")]
    Locked(String),

    #[error("No extractable text in document: {0}")]
    NoText(String),

    #[error("Permission denied reading {path}: {source}")]
    PermissionDenied {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Document content is not usable text: {0}")]
    Value(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LoadError {
    pub fn kind(&self) -> DocumentErrorKind {
        match self {
            LoadError::Locked(_) => DocumentErrorKind::LockedDocument,
            LoadError::NoText(_) => DocumentErrorKind::NoText,
            LoadError::PermissionDenied { .. } => DocumentErrorKind::PermissionDenied,
            LoadError::Value(_) => DocumentErrorKind::ValueError,
            LoadError::Io(_) => DocumentErrorKind::GeneralError,
        }
    }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Document loading failed: {0}")]
    Load(#[from] LoadError),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
