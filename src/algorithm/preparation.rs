//! Report preparation before pairing
//!
//! Export rows carry the whole report, including boilerplate appendices
//! that add nothing to extraction. This module cuts the report at the first
//! appendix heading and drops rows that cannot be used at all.

use log::{debug, info};

use crate::models::record::SpecimenRecord;

/// Appendix heading used by reports issued in 2024
pub const MARKER_2024: &str = "GUIDE TO STANDARDIZED NOMENCLATURE AND EXPLANATION OF CHANGES:";

/// Interpretation heading used by reports issued from 2025
pub const MARKER_2025: &str = "D.  CLINICAL INTERPRETATION";

/// Counts from a preparation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreparationSummary {
    pub kept: usize,
    pub missing_report: usize,
    pub missing_verify_date: usize,
}

impl PreparationSummary {
    #[must_use]
    pub const fn dropped(&self) -> usize {
        self.missing_report + self.missing_verify_date
    }
}

/// Keep the part of a report before its first appendix heading
///
/// The 2024 heading takes precedence; otherwise the text is cut at the 2025
/// heading, and returned whole when neither is present.
#[must_use]
pub fn trim_report(text: &str) -> &str {
    let marker = if text.contains(MARKER_2024) {
        MARKER_2024
    } else {
        MARKER_2025
    };
    text.split(marker).next().unwrap_or(text)
}

/// Trim every report and drop rows without report text or verify date
pub fn prepare_records(records: Vec<SpecimenRecord>) -> (Vec<SpecimenRecord>, PreparationSummary) {
    let mut summary = PreparationSummary::default();

    let kept: Vec<SpecimenRecord> = records
        .into_iter()
        .filter_map(|mut record| {
            let Some(report) = record.report.take() else {
                summary.missing_report += 1;
                debug!("Dropping specimen {}: no report text", record.specimen_id);
                return None;
            };
            if record.verified_at.is_none() {
                summary.missing_verify_date += 1;
                debug!("Dropping specimen {}: never final-verified", record.specimen_id);
                return None;
            }
            record.report = Some(trim_report(&report).to_string());
            Some(record)
        })
        .collect();

    summary.kept = kept.len();
    info!(
        "Prepared {} records ({} without report, {} without verify date)",
        summary.kept, summary.missing_report, summary.missing_verify_date
    );

    (kept, summary)
}
