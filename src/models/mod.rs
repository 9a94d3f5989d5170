//! Domain models
//!
//! Specimen report rows as they arrive from the export, and the structured
//! results produced for each paired report.

pub mod extraction;
pub mod record;

pub use extraction::{
    CancerCategory, ExtractedFields, ExtractionResults, PrimarySite, SomaticMutation,
    StructuredReport,
};
pub use record::{Categorized, RawDateTime, SpecimenCategory, SpecimenRecord};
