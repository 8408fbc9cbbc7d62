// src/extractors/mod.rs
pub mod concerns;
pub mod fields;
pub mod patterns;
pub mod record;
pub mod section;
pub mod social;

use crate::extractors::social::Platform;

// Re-export key extraction types for convenience
pub use concerns::{Category, ClassifiedConcerns, ConcernClassifier, ConcernState};
pub use fields::{ExtractedFields, FieldExtractor, FieldMiss};
pub use patterns::LabelPattern;
pub use record::{DocumentOutcome, Record, RecordExtractor};
pub use section::{split, Span};
pub use social::{PresenceExtractor, SocialPresence};

/// Engine settings fixed for the lifetime of a [`RecordExtractor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    /// Platforms recognised when looking for social media accounts.
    pub platforms: Vec<Platform>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            platforms: Platform::ALL.to_vec(),
        }
    }
}
