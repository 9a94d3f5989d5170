//! Batch driver for report extraction

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use super::{ReportClassifier, ReportExtractor};
use crate::error::Result;
use crate::error::util::ensure_directory;
use crate::models::extraction::{ExtractionResults, StructuredReport};
use crate::models::record::SpecimenRecord;
use crate::utils::io::{read_json_files, write_json};

/// How often progress is logged, in reports
pub const PROGRESS_INTERVAL: usize = 100;

/// Counts from an extraction run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionSummary {
    /// Paired subject files read
    pub subjects: usize,
    /// Records across all subjects
    pub records: usize,
    /// Structured reports written
    pub written: usize,
    /// Records with no report text
    pub missing_report: usize,
    /// Records whose extraction, classification or write failed
    pub failed: usize,
    pub elapsed: Duration,
}

impl fmt::Display for ExtractionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Extraction Summary:")?;
        writeln!(
            f,
            "  {} reports from {} paired subjects",
            self.records, self.subjects
        )?;
        writeln!(f, "  Written: {}", self.written)?;
        writeln!(f, "  Without report text: {}", self.missing_report)?;
        writeln!(f, "  Failed: {}", self.failed)?;
        write!(f, "  Elapsed: {:.2?}", self.elapsed)
    }
}

/// Output file name for the `index`-th report
///
/// Path separators and whitespace in the components are replaced so the
/// name always lands directly in the output directory.
#[must_use]
pub fn report_file_name(index: usize, mrn: &str, mdl_num: &str, assay: &str) -> String {
    fn clean(part: &str) -> String {
        part.trim()
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' => '-',
                c if c.is_whitespace() => '_',
                c => c,
            })
            .collect()
    }
    format!(
        "Report-{index}_MRN-{}_{}_{}.json",
        clean(mrn),
        clean(mdl_num),
        clean(assay)
    )
}

/// Runs extraction and classification over paired records
pub struct ExtractionRunner<E, C> {
    extractor: E,
    classifier: C,
}

impl<E: ReportExtractor, C: ReportClassifier> ExtractionRunner<E, C> {
    pub const fn new(extractor: E, classifier: C) -> Self {
        Self {
            extractor,
            classifier,
        }
    }

    /// Structured results for one record with report text
    pub fn extract_record(
        &self,
        record: &SpecimenRecord,
        report: &str,
    ) -> Result<ExtractionResults> {
        let fields = self.extractor.extract(report)?;
        let cancer_type = fields.cancer_type.as_deref();
        let primary_met = self.classifier.classify_source(cancer_type)?;
        let nccn_category = self.classifier.classify_category(cancer_type)?;

        Ok(ExtractionResults {
            mrn: fields.mrn,
            date: record.collected_at.clone(),
            mdl_num: fields.mdl_num,
            assay: record.category.label().to_string(),
            cancer_type: fields.cancer_type,
            primary_met,
            nccn_category,
            tumor_purity: fields.tumor_purity,
            tmb: fields.tmb,
            msi: fields.msi,
            copy_number: fields.copy_number,
            fusions: fields.fusions,
            somatic_muts: fields.somatic_muts,
        })
    }

    fn process_one(
        &self,
        index: usize,
        record: &SpecimenRecord,
        report: &str,
        output_dir: &Path,
    ) -> Result<PathBuf> {
        let extracts = self.extract_record(record, report)?;
        let path = output_dir.join(report_file_name(
            index,
            &extracts.mrn,
            &extracts.mdl_num,
            &extracts.assay,
        ));
        let structured = StructuredReport {
            report: report.to_string(),
            extracts,
        };
        write_json(&path, &structured)?;
        Ok(path)
    }

    /// Extract every record with report text and write it to `output_dir`
    ///
    /// Failures are logged and counted; only an unusable output directory
    /// aborts the run.
    pub fn run_records(
        &self,
        records: &[SpecimenRecord],
        output_dir: &Path,
    ) -> Result<ExtractionSummary> {
        ensure_directory(output_dir, "structured report output")?;
        let start = Instant::now();
        let mut summary = ExtractionSummary {
            records: records.len(),
            ..ExtractionSummary::default()
        };

        for (index, record) in records.iter().enumerate() {
            if index > 0 && index % PROGRESS_INTERVAL == 0 {
                info!(
                    "Processed {index}/{} reports in {:.2?}",
                    records.len(),
                    start.elapsed()
                );
            }

            let Some(report) = record.report.as_deref() else {
                summary.missing_report += 1;
                debug!("Specimen {} has no report text", record.specimen_id);
                continue;
            };

            match self.process_one(index, record, report, output_dir) {
                Ok(path) => {
                    summary.written += 1;
                    debug!("Wrote {}", path.display());
                }
                Err(e) => {
                    summary.failed += 1;
                    warn!(
                        "Extraction failed for subject {} specimen {}: {e:#}",
                        record.subject_id, record.specimen_id
                    );
                }
            }
        }

        summary.elapsed = start.elapsed();
        info!(
            "Extracted {} of {} reports in {:.2?}",
            summary.written, summary.records, summary.elapsed
        );
        Ok(summary)
    }

    /// Read every paired subject file in `input_dir` and extract its reports
    pub fn run(&self, input_dir: &Path, output_dir: &Path) -> Result<ExtractionSummary> {
        let subjects: Vec<Vec<SpecimenRecord>> = read_json_files(input_dir)?;
        let subject_count = subjects.len();
        let records: Vec<SpecimenRecord> = subjects.into_iter().flatten().collect();
        info!(
            "Extracting {} reports from {} paired subjects",
            records.len(),
            subject_count
        );

        let mut summary = self.run_records(&records, output_dir)?;
        summary.subjects = subject_count;
        Ok(summary)
    }
}
