//! Structured extraction of paired reports
//!
//! Field extraction and classification are external collaborators behind
//! [`ReportExtractor`] and [`ReportClassifier`]. The [`runner`] drives them
//! over a directory of paired subjects and persists one structured report
//! per specimen.

pub mod runner;

use crate::error::Result;
use crate::models::extraction::{CancerCategory, ExtractedFields, PrimarySite};

pub use runner::{ExtractionRunner, ExtractionSummary, report_file_name};

/// Parses free report text into raw fields
pub trait ReportExtractor {
    /// Extract the raw fields from one report
    fn extract(&self, report: &str) -> Result<ExtractedFields>;
}

/// Classifies an extracted cancer type
///
/// Implementors return display labels; the provided methods parse them into
/// the closed enumerations and reject anything outside them.
pub trait ReportClassifier {
    /// Label describing whether the tumour is primary or metastatic
    fn source_label(&self, cancer_type: Option<&str>) -> Result<String>;

    /// Label naming the NCCN cancer category
    fn category_label(&self, cancer_type: Option<&str>) -> Result<String>;

    /// Classify the tumour source
    fn classify_source(&self, cancer_type: Option<&str>) -> Result<PrimarySite> {
        Ok(self.source_label(cancer_type)?.parse()?)
    }

    /// Classify the NCCN cancer category
    fn classify_category(&self, cancer_type: Option<&str>) -> Result<CancerCategory> {
        Ok(self.category_label(cancer_type)?.parse()?)
    }
}

impl<T: ReportExtractor + ?Sized> ReportExtractor for &T {
    fn extract(&self, report: &str) -> Result<ExtractedFields> {
        (**self).extract(report)
    }
}

impl<T: ReportClassifier + ?Sized> ReportClassifier for &T {
    fn source_label(&self, cancer_type: Option<&str>) -> Result<String> {
        (**self).source_label(cancer_type)
    }

    fn category_label(&self, cancer_type: Option<&str>) -> Result<String> {
        (**self).category_label(cancer_type)
    }
}
