// src/document/mod.rs
pub mod loader;
pub mod models;

pub use models::{district_from_file_name, Document, DocumentErrorKind, DocumentFailure};
