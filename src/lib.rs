// src/lib.rs
//! Extraction engine for "Subject of Concern" incident reports.
//!
//! Text goes in, one [`extractors::Record`] per subject comes out, and every
//! field outcome is counted in a [`telemetry::Telemetry`] passed by the caller.

pub mod document;
pub mod extractors;
pub mod storage;
pub mod telemetry;
pub mod utils;
