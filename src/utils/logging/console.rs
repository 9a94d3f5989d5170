//! Console output utilities
//!
//! Plain-text rendering of pairing results for the command line.

use std::fmt::Write;

use crate::algorithm::pairing::{PairingDecision, PairingResult, SubjectOutcome};

/// One line describing a subject's outcome
#[must_use]
pub fn format_outcome(outcome: &SubjectOutcome) -> String {
    let mut line = format!("{}: ", outcome.subject_id);
    match &outcome.decision {
        PairingDecision::Paired {
            records, closest, ..
        } => {
            let ids: Vec<&str> = records.iter().map(|r| r.specimen_id.as_str()).collect();
            let _ = write!(line, "paired [{}]", ids.join(", "));
            if let Some(closest) = closest {
                let _ = write!(line, " closest {}", closest.time_diff_days);
                line.push_str(" days");
            }
        }
        PairingDecision::Ineligible(reason) => {
            let _ = write!(line, "not paired ({reason})");
        }
    }
    if outcome.unparsable_records > 0 {
        let _ = write!(line, ", {} unparsable", outcome.unparsable_records);
    }
    if outcome.excluded_by_window > 0 {
        let _ = write!(line, ", {} outside window", outcome.excluded_by_window);
    }
    line
}

/// Print the batch summary and, optionally, one line per subject
pub fn print_pairing_result(result: &PairingResult, per_subject: bool) {
    if per_subject {
        for outcome in &result.outcomes {
            println!("{}", format_outcome(outcome));
        }
        println!();
    }
    println!("{}", result.stats);
    println!("Processed in {:.2?}", result.elapsed);
}
