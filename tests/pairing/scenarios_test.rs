//! Subject-level pairing scenarios run through the whole pipeline

use specimen_pair::algorithm::pairing::select_window;
use specimen_pair::{IneligibleReason, PairingDecision, SpecimenCategory};

use crate::utils::{blood, date, pipeline, pipeline_with_span, specimen_ids, text_record, tissue};

#[test]
fn test_window_excludes_distant_specimen() {
    let dates = [date(2024, 1, 1), date(2024, 1, 3), date(2024, 3, 1)];

    let narrow = select_window(&dates, 7).unwrap();
    assert_eq!((narrow.start, narrow.end), (0, 1));

    // 2024 is a leap year: Jan 1 to Mar 1 is exactly 60 days
    let wide = select_window(&dates, 60).unwrap();
    assert_eq!((wide.start, wide.end), (0, 2));
    let tight = select_window(&dates, 59).unwrap();
    assert_eq!((tight.start, tight.end), (0, 1));
}

#[test]
fn test_subject_window_then_pair() {
    let records = vec![
        blood("X", "b-jan1", date(2024, 1, 1)),
        tissue("X", "t-jan3", date(2024, 1, 3)),
        blood("X", "b-mar1", date(2024, 3, 1)),
    ];

    let result = pipeline_with_span(7).run(records.clone());
    let outcome = &result.outcomes[0];
    assert_eq!(outcome.excluded_by_window, 1);
    assert_eq!(
        specimen_ids(outcome.paired_records().unwrap()),
        ["b-jan1", "t-jan3"]
    );

    let result = pipeline().run(records);
    let outcome = &result.outcomes[0];
    assert_eq!(outcome.excluded_by_window, 0);
    let PairingDecision::Paired {
        records,
        closest,
        farthest,
    } = &outcome.decision
    else {
        panic!("subject X should be paired");
    };
    assert_eq!(specimen_ids(records), ["b-jan1", "t-jan3"]);
    assert_eq!(closest.as_ref().unwrap().time_diff_days, 2);
    assert_eq!(farthest.as_ref().unwrap().first_specimen, "b-mar1");
    assert_eq!(farthest.as_ref().unwrap().time_diff_days, 58);
}

#[test]
fn test_closest_and_farthest_pair() {
    let records = vec![
        blood("Y", "b-jan1", date(2024, 1, 1)),
        blood("Y", "b-jan10", date(2024, 1, 10)),
        tissue("Y", "t-jan5", date(2024, 1, 5)),
    ];

    let result = pipeline().run(records);
    let outcome = &result.outcomes[0];
    let PairingDecision::Paired {
        records,
        closest,
        farthest,
    } = &outcome.decision
    else {
        panic!("subject Y should be paired");
    };

    assert_eq!(specimen_ids(records), ["b-jan1", "t-jan5"]);

    let closest = closest.as_ref().unwrap();
    assert_eq!(closest.first_specimen, "b-jan1");
    assert_eq!(closest.second_specimen, "t-jan5");
    assert_eq!(closest.time_diff_days, 4);

    let farthest = farthest.as_ref().unwrap();
    assert_eq!(farthest.first_specimen, "b-jan10");
    assert_eq!(farthest.second_specimen, "t-jan5");
    assert_eq!(farthest.time_diff_days, 5);

    assert_eq!(result.stats.selected_from_multiple, 1);
}

#[test]
fn test_single_category_subject_not_paired() {
    let records = vec![
        tissue("Z", "t1", date(2024, 2, 1)),
        tissue("Z", "t2", date(2024, 2, 3)),
        blood("P", "b1", date(2024, 2, 1)),
        tissue("P", "t1", date(2024, 2, 2)),
    ];

    let result = pipeline().run(records);
    let z = result
        .outcomes
        .iter()
        .find(|o| o.subject_id == "Z")
        .unwrap();
    assert_eq!(
        z.decision,
        PairingDecision::Ineligible(IneligibleReason::SingleCategory)
    );
    assert_eq!(result.stats.subjects, 2);
    assert_eq!(result.stats.paired, 1);
    assert_eq!(result.stats.single_category, 1);
    let paired: Vec<_> = result.paired().map(|o| o.subject_id.as_str()).collect();
    assert_eq!(paired, ["P"]);
}

#[test]
fn test_unparsable_date_leaves_single_record() {
    let records = vec![
        text_record("W", "w-bad", SpecimenCategory::Blood, "N/A"),
        text_record("W", "w-ok", SpecimenCategory::Tissue, "03/15/2024"),
    ];

    let result = pipeline().run(records);
    let outcome = &result.outcomes[0];
    assert_eq!(outcome.unparsable_records, 1);
    assert!(!outcome.is_paired());
    assert_eq!(
        outcome.decision,
        PairingDecision::Ineligible(IneligibleReason::SingleCategory)
    );
    assert_eq!(result.stats.unparsable_records, 1);
    assert_eq!(result.stats.paired, 0);
}

#[test]
fn test_all_dates_unparsable() {
    let records = vec![
        text_record("V", "v1", SpecimenCategory::Blood, "pending"),
        text_record("V", "v2", SpecimenCategory::Tissue, ""),
    ];

    let result = pipeline().run(records);
    assert_eq!(
        result.outcomes[0].decision,
        PairingDecision::Ineligible(IneligibleReason::NoParseableDates)
    );
    assert_eq!(result.stats.no_parseable_dates, 1);
}

#[test]
fn test_unconfigured_category_pair() {
    let records = vec![
        text_record("M", "m1", SpecimenCategory::from("Bone Marrow"), "2024-01-01"),
        tissue("M", "t1", date(2024, 1, 2)),
        text_record("Q", "q1", SpecimenCategory::from("Saliva"), "2024-01-01"),
        tissue("Q", "t1", date(2024, 1, 2)),
        blood("Q", "b1", date(2024, 1, 3)),
    ];

    let result = pipeline().run(records);
    let reasons: Vec<_> = result
        .outcomes
        .iter()
        .map(|o| (o.subject_id.as_str(), o.decision.clone()))
        .collect();
    assert_eq!(
        reasons,
        [
            (
                "M",
                PairingDecision::Ineligible(IneligibleReason::MissingCategory)
            ),
            (
                "Q",
                PairingDecision::Ineligible(IneligibleReason::ExtraCategories)
            ),
        ]
    );
}

#[test]
fn test_mixed_date_representations() {
    let records = vec![
        text_record("R", "r-us", SpecimenCategory::Blood, "01/02/2024 08:30:00"),
        text_record("R", "r-iso", SpecimenCategory::Tissue, "2024-01-04T10:00:00"),
        blood("R", "r-native", date(2024, 6, 1)),
    ];

    let result = pipeline().run(records);
    let outcome = &result.outcomes[0];
    assert_eq!(outcome.excluded_by_window, 1);
    assert_eq!(
        specimen_ids(outcome.paired_records().unwrap()),
        ["r-us", "r-iso"]
    );
}
