//! Pairing followed by structured extraction with stand-in collaborators

use std::cell::Cell;
use std::fs;

use specimen_pair::models::{
    CancerCategory, ExtractedFields, PrimarySite, SomaticMutation, StructuredReport,
};
use specimen_pair::utils::io::read_json;
use specimen_pair::{
    ExtractionRunner, ReportClassifier, ReportExtractor, Result, SpecimenPairError,
    write_subject_records,
};

use crate::utils::{blood, date, pipeline, tissue};

/// Reads `MRN:` and `MDL:` lines and counts calls
#[derive(Default)]
struct LineExtractor {
    calls: Cell<usize>,
}

impl ReportExtractor for LineExtractor {
    fn extract(&self, report: &str) -> Result<ExtractedFields> {
        self.calls.set(self.calls.get() + 1);
        let field = |key: &str| {
            report
                .lines()
                .find_map(|line| line.strip_prefix(key))
                .map(|value| value.trim().to_string())
        };
        let mrn = field("MRN:")
            .ok_or_else(|| SpecimenPairError::Extraction("no MRN line".to_string()))?;
        Ok(ExtractedFields {
            mrn,
            mdl_num: field("MDL:").unwrap_or_default(),
            cancer_type: field("DX:"),
            tmb: Some("4 mut/Mb".to_string()),
            somatic_muts: Some(vec![SomaticMutation {
                gene: "KRAS".to_string(),
                dna: "c.35G>A".to_string(),
                protein: "p.G12D".to_string(),
                location: "Exon 2".to_string(),
                vaf: "12%".to_string(),
                variant_type: "Missense".to_string(),
            }]),
            ..ExtractedFields::default()
        })
    }
}

struct TypeClassifier;

impl ReportClassifier for TypeClassifier {
    fn source_label(&self, cancer_type: Option<&str>) -> Result<String> {
        Ok(match cancer_type {
            Some(t) if t.contains("metastatic") => "Metastasis",
            Some(_) => "Primary",
            None => "Unknown",
        }
        .to_string())
    }

    fn category_label(&self, cancer_type: Option<&str>) -> Result<String> {
        Ok(match cancer_type {
            Some(t) if t.contains("pancrea") => "Pancreatic Adenocarcinoma",
            Some(t) if t.contains("colon") => "colon cancer",
            _ => "Unspecified Neoplasm",
        }
        .to_string())
    }
}

#[test]
fn test_pair_then_extract() {
    let paired_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();

    let records = vec![
        blood("11", "b", date(2024, 1, 1))
            .with_report("MRN: 11\nMDL: M-100\nDX: metastatic pancreatic"),
        tissue("11", "t", date(2024, 1, 4)).with_report("MRN: 11\nMDL: M-101\nDX: pancreatic"),
        blood("12", "b", date(2024, 2, 1)).with_report("MDL: M-200"),
        tissue("12", "t", date(2024, 2, 2)).with_report("MRN: 12\nMDL: M-201\nDX: colon"),
        tissue("13", "t", date(2024, 3, 1)).with_report("MRN: 13"),
    ];

    let result = pipeline().run(records);
    for outcome in result.paired() {
        write_subject_records(
            paired_dir.path(),
            &outcome.subject_id,
            outcome.paired_records().unwrap(),
        )
        .unwrap();
    }
    fs::write(paired_dir.path().join("corrupt.json"), "[{").unwrap();

    let extractor = LineExtractor::default();
    let runner = ExtractionRunner::new(&extractor, TypeClassifier);
    let summary = runner.run(paired_dir.path(), out_dir.path()).unwrap();

    assert_eq!(summary.subjects, 2);
    assert_eq!(summary.records, 4);
    assert_eq!(summary.written, 3);
    assert_eq!(summary.failed, 1);
    assert_eq!(extractor.calls.get(), 4);

    let first: StructuredReport = read_json(
        &out_dir.path().join("Report-0_MRN-11_M-100_Blood.json"),
        "test",
    )
    .unwrap();
    assert_eq!(first.extracts.primary_met, PrimarySite::Metastasis);
    assert_eq!(
        first.extracts.nccn_category,
        CancerCategory::PancreaticAdenocarcinoma
    );
    assert_eq!(first.extracts.somatic_muts.as_ref().unwrap()[0].gene, "KRAS");

    let colon: StructuredReport = read_json(
        &out_dir.path().join("Report-3_MRN-12_M-201_Tissue.json"),
        "test",
    )
    .unwrap();
    assert_eq!(colon.extracts.nccn_category, CancerCategory::ColonCancer);
    assert_eq!(colon.extracts.primary_met, PrimarySite::Primary);
    assert!(colon.report.contains("DX: colon"));
}

#[test]
fn test_structured_report_field_names() {
    let out_dir = tempfile::tempdir().unwrap();
    let runner = ExtractionRunner::new(LineExtractor::default(), TypeClassifier);
    let records = vec![tissue("9", "t", date(2024, 1, 1)).with_report("MRN: 9\nMDL: Z-1")];

    let summary = runner.run_records(&records, out_dir.path()).unwrap();
    assert_eq!(summary.written, 1);

    let raw: serde_json::Value =
        read_json(&out_dir.path().join("Report-0_MRN-9_Z-1_Tissue.json"), "test").unwrap();
    assert_eq!(raw["extracts"]["primary_met"], "Cannot be determined");
    assert_eq!(raw["extracts"]["nccn_category"], "Unspecified Neoplasm");
    assert_eq!(raw["extracts"]["assay"], "Tissue");
    assert_eq!(raw["extracts"]["date"], "2024-01-01");
    assert_eq!(raw["extracts"]["somatic_muts"][0]["VAF"], "12%");
}
