//! Specimen pairing and temporal windowing for clinical sequencing reports.
//!
//! Subjects with specimens of two complementary categories (blood and tissue
//! by default) are reduced to the records collected inside a bounded time
//! window, and the closest cross-category pair is selected for downstream
//! structured extraction.

pub mod algorithm;
pub mod config;
pub mod error;
pub mod extraction;
pub mod models;
pub mod utils;

// Re-export the most common types for easier use
pub use config::{CategoryPair, PairingConfig, PairingConfigBuilder};
pub use error::{Result, SpecimenPairError};
pub use models::{RawDateTime, SpecimenCategory, SpecimenRecord};

// Pairing engine
pub use algorithm::pairing::{
    IneligibleReason, PairingDecision, PairingPipeline, PairingResult, PairingStats,
    SubjectOutcome,
};
pub use algorithm::preparation::{prepare_records, trim_report};

// Extraction collaborators
pub use extraction::{ExtractionRunner, ExtractionSummary, ReportClassifier, ReportExtractor};

// Utility functions
pub use utils::io::{load_records, read_json_files, write_subject_records};
