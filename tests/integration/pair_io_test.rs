//! Export loading, pairing and per-subject output on disk

use std::fs;
use std::sync::Arc;

use arrow::array::{Date32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use parquet::arrow::ArrowWriter;
use serde_json::json;
use specimen_pair::algorithm::preparation::MARKER_2025;
use specimen_pair::utils::io::json::subject_file_name;
use specimen_pair::{
    PairingConfig, PairingPipeline, RawDateTime, SpecimenCategory, SpecimenRecord, load_records,
    prepare_records, read_json_files, write_subject_records,
};

use crate::utils::{blood, date, pipeline, record, specimen_ids, tissue, write_export};

#[test]
fn test_json_export_to_paired_files() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    let export = json!([
        {"MRN": 1001, "Specimen Name": "B-1", "Specimen Type": "Blood",
         "Collection Date and Time": "01/02/2024 09:15:00", "Accession": "A1"},
        {"MRN": 1001, "Specimen Name": "T-1", "Specimen Type": "Tissue",
         "Collection Date and Time": "2024-01-05", "Accession": "A2"},
        {"MRN": 1001, "Specimen Name": "B-2", "Specimen Type": "Blood",
         "Collection Date and Time": "01/30/2024", "Accession": "A3"},
        {"MRN": "1002", "Specimen Name": "T-9", "Specimen Type": "Tissue",
         "Collection Date and Time": "N/A"},
        {"MRN": 1003.0, "Specimen Name": "B-7", "Specimen Type": "blood",
         "Collection Date and Time": 1_704_067_200_000_i64},
        {"MRN": 1003.0, "Specimen Name": "T-7", "Specimen Type": "TISSUE",
         "Collection Date and Time": "2024-01-01T12:00:00"}
    ]);
    let path = input.path().join("export.json");
    fs::write(&path, serde_json::to_string(&export).unwrap()).unwrap();

    let records = load_records(&path).unwrap();
    assert_eq!(records.len(), 6);
    assert_eq!(records[4].subject_id, "1003");
    assert_eq!(records[4].collected_at, Some(RawDateTime::EpochMillis(1_704_067_200_000)));

    let result = pipeline().run(records);
    assert_eq!(result.stats.subjects, 3);
    assert_eq!(result.stats.paired, 2);
    assert_eq!(result.stats.no_parseable_dates, 1);

    for outcome in result.paired() {
        write_subject_records(
            output.path(),
            &outcome.subject_id,
            outcome.paired_records().unwrap(),
        )
        .unwrap();
    }

    let mut written: Vec<String> = fs::read_dir(output.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    written.sort();
    assert_eq!(written, [subject_file_name("1001"), subject_file_name("1003")]);

    let subjects: Vec<Vec<SpecimenRecord>> = read_json_files(output.path()).unwrap();
    assert_eq!(specimen_ids(&subjects[0]), ["B-1", "T-1"]);
    assert_eq!(subjects[0][0].payload.get("Accession"), Some(&json!("A1")));
    assert_eq!(specimen_ids(&subjects[1]), ["B-7", "T-7"]);
}

#[test]
fn test_non_date_cell_only_affects_its_record() {
    let dir = tempfile::tempdir().unwrap();
    let export = json!([
        {"MRN": 1, "Specimen Name": "B-1", "Specimen Type": "Blood",
         "Collection Date and Time": "2024-01-02"},
        {"MRN": 2, "Specimen Name": "T-2", "Specimen Type": "Tissue",
         "Collection Date and Time": 45292.5},
        {"MRN": 1, "Specimen Name": "T-1", "Specimen Type": "Tissue",
         "Collection Date and Time": "01/04/2024"}
    ]);
    let path = dir.path().join("export.json");
    fs::write(&path, serde_json::to_string(&export).unwrap()).unwrap();

    let records = load_records(&path).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[1].collected_at, Some(RawDateTime::Other(json!(45292.5))));

    let result = pipeline().run(records);
    assert_eq!(result.stats.paired, 1);
    assert_eq!(result.stats.no_parseable_dates, 1);
    let paired: Vec<_> = result.paired().map(|o| o.subject_id.as_str()).collect();
    assert_eq!(paired, ["1"]);
}

#[test]
fn test_paired_output_reloads_identically() {
    let dir = tempfile::tempdir().unwrap();
    let records = vec![
        blood("42", "b", date(2024, 5, 1)).with_field("Accession", json!("X")),
        tissue("42", "t", date(2024, 5, 3)),
    ];

    let path = write_subject_records(dir.path(), "42", &records).unwrap();
    let reloaded = load_records(&path).unwrap();
    assert_eq!(reloaded, records);

    let rerun = pipeline().run(reloaded);
    assert_eq!(rerun.outcomes[0].paired_records().unwrap(), records.as_slice());
}

#[test]
fn test_prepared_export_pairs_trimmed_reports() {
    let dir = tempfile::tempdir().unwrap();
    let verified = RawDateTime::from("2024-02-01");
    let records = vec![
        blood("7", "b", date(2024, 1, 10))
            .with_report(format!("BLOOD FINDINGS{MARKER_2025}appendix"))
            .with_verified_at(verified.clone()),
        tissue("7", "t", date(2024, 1, 12))
            .with_report("TISSUE FINDINGS")
            .with_verified_at(verified),
        tissue("7", "t-unverified", date(2024, 1, 11)).with_report("draft"),
    ];
    let path = write_export(dir.path(), "export.json", &records).unwrap();

    let (prepared, summary) = prepare_records(load_records(&path).unwrap());
    assert_eq!(summary.missing_verify_date, 1);

    let result = pipeline().run(prepared);
    let paired = result.outcomes[0].paired_records().unwrap();
    assert_eq!(specimen_ids(paired), ["b", "t"]);
    assert_eq!(paired[0].report.as_deref(), Some("BLOOD FINDINGS"));
}

#[test]
fn test_config_file_changes_pairing() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("pairing.json");
    fs::write(
        &config_path,
        r#"{"max_span_days": 3, "category_pair": {"first": "Bone Marrow", "second": "Tissue"}}"#,
    )
    .unwrap();

    let config = PairingConfig::from_json_file(&config_path).unwrap();
    assert_eq!(config.max_span_days, 3);
    assert_eq!(
        config.category_pair.first,
        SpecimenCategory::Other("Bone Marrow".to_string())
    );

    let marrow = SpecimenCategory::from("Bone Marrow");
    let records = vec![
        record("8", "m", marrow, date(2024, 3, 1)),
        tissue("8", "t1", date(2024, 3, 2)),
        tissue("8", "t2", date(2024, 3, 9)),
    ];
    let result = PairingPipeline::new(config).unwrap().run(records);
    let outcome = &result.outcomes[0];
    assert_eq!(outcome.excluded_by_window, 1);
    assert_eq!(specimen_ids(outcome.paired_records().unwrap()), ["m", "t1"]);
}

#[test]
fn test_invalid_config_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("pairing.json");
    fs::write(&config_path, r#"{"max_span_days": -1}"#).unwrap();
    assert!(PairingConfig::from_json_file(&config_path).is_err());
}

#[test]
fn test_parquet_export_pairs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.parquet");

    let epoch = date(1970, 1, 1);
    let days = |d: NaiveDate| i32::try_from((d - epoch).num_days()).unwrap();
    let schema = Arc::new(Schema::new(vec![
        Field::new("MRN", DataType::Utf8, false),
        Field::new("Specimen Name", DataType::Utf8, false),
        Field::new("Specimen Type", DataType::Utf8, false),
        Field::new("Collection Date and Time", DataType::Date32, true),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(vec!["5", "5", "5"])),
            Arc::new(StringArray::from(vec!["b1", "t1", "b2"])),
            Arc::new(StringArray::from(vec!["Blood", "Tissue", "Blood"])),
            Arc::new(Date32Array::from(vec![
                Some(days(date(2024, 4, 1))),
                Some(days(date(2024, 4, 20))),
                Some(days(date(2024, 4, 18))),
            ])),
        ],
    )
    .unwrap();
    let file = fs::File::create(&path).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let result = pipeline().run(load_records(&path).unwrap());
    assert_eq!(
        specimen_ids(result.outcomes[0].paired_records().unwrap()),
        ["t1", "b2"]
    );
}
