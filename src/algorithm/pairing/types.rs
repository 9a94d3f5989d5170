//! Type definitions for the pairing algorithm
//!
//! This module contains the transient views and the per-subject outcomes
//! shared by the pairing stages.

use std::fmt;
use std::time::Duration;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::record::{Categorized, SpecimenCategory, SpecimenRecord};

/// Anything with a canonical collection date
pub trait Dated {
    /// Collection date at day granularity
    fn date(&self) -> NaiveDate;
}

/// A record whose collection date has been coerced
#[derive(Debug, Clone)]
pub struct DatedRecord {
    /// Coerced collection date
    pub date: NaiveDate,
    /// Position of the record in the subject's input order
    pub position: usize,
    /// The record itself
    pub record: SpecimenRecord,
}

impl Dated for DatedRecord {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Categorized for DatedRecord {
    fn category(&self) -> &SpecimenCategory {
        &self.record.category
    }
}

/// Identifiers and distance of a selected pair, kept after the records move on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairSummary {
    pub first_specimen: String,
    pub first_date: NaiveDate,
    pub second_specimen: String,
    pub second_date: NaiveDate,
    pub time_diff_days: i64,
}

impl fmt::Display for PairSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) <-> {} ({}): {} days",
            self.first_specimen,
            self.first_date,
            self.second_specimen,
            self.second_date,
            self.time_diff_days
        )
    }
}

/// Why a subject produced no pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IneligibleReason {
    /// Every record had an unparsable collection date
    NoParseableDates,
    /// Only one specimen category remained
    SingleCategory,
    /// Two categories remained, but not the configured pair
    MissingCategory,
    /// More than two categories remained
    ExtraCategories,
}

impl fmt::Display for IneligibleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NoParseableDates => "no parseable collection dates",
            Self::SingleCategory => "single specimen category",
            Self::MissingCategory => "configured category missing",
            Self::ExtraCategories => "more than two specimen categories",
        };
        f.write_str(text)
    }
}

/// Terminal decision for one subject
#[derive(Debug, Clone, PartialEq)]
pub enum PairingDecision {
    /// Records to hand to persistence, in input order
    Paired {
        records: Vec<SpecimenRecord>,
        /// Set when more than one pair was possible
        closest: Option<PairSummary>,
        /// Diagnostic only; never affects the emitted records
        farthest: Option<PairSummary>,
    },
    /// Nothing emitted
    Ineligible(IneligibleReason),
}

/// Everything the pipeline learned about one subject
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectOutcome {
    pub subject_id: String,
    /// Records dropped because their date could not be coerced
    pub unparsable_records: usize,
    /// Records dropped because they fell outside the selected window
    pub excluded_by_window: usize,
    pub decision: PairingDecision,
}

impl SubjectOutcome {
    /// Emitted records, if the subject was paired
    #[must_use]
    pub fn paired_records(&self) -> Option<&[SpecimenRecord]> {
        match &self.decision {
            PairingDecision::Paired { records, .. } => Some(records),
            PairingDecision::Ineligible(_) => None,
        }
    }

    #[must_use]
    pub const fn is_paired(&self) -> bool {
        matches!(self.decision, PairingDecision::Paired { .. })
    }
}

/// Aggregate counts over a batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PairingStats {
    pub subjects: usize,
    pub paired: usize,
    /// Paired subjects that needed closest-pair selection
    pub selected_from_multiple: usize,
    pub no_parseable_dates: usize,
    pub single_category: usize,
    pub missing_category: usize,
    pub extra_categories: usize,
    pub unparsable_records: usize,
    pub excluded_by_window: usize,
}

impl PairingStats {
    /// Fold one subject into the totals
    pub fn record(&mut self, outcome: &SubjectOutcome) {
        self.subjects += 1;
        self.unparsable_records += outcome.unparsable_records;
        self.excluded_by_window += outcome.excluded_by_window;

        match &outcome.decision {
            PairingDecision::Paired { closest, .. } => {
                self.paired += 1;
                if closest.is_some() {
                    self.selected_from_multiple += 1;
                }
            }
            PairingDecision::Ineligible(reason) => match reason {
                IneligibleReason::NoParseableDates => self.no_parseable_dates += 1,
                IneligibleReason::SingleCategory => self.single_category += 1,
                IneligibleReason::MissingCategory => self.missing_category += 1,
                IneligibleReason::ExtraCategories => self.extra_categories += 1,
            },
        }
    }

    /// Subjects that did not produce a pair
    #[must_use]
    pub const fn ineligible(&self) -> usize {
        self.subjects - self.paired
    }
}

impl<'a> FromIterator<&'a SubjectOutcome> for PairingStats {
    fn from_iter<I: IntoIterator<Item = &'a SubjectOutcome>>(iter: I) -> Self {
        let mut stats = Self::default();
        for outcome in iter {
            stats.record(outcome);
        }
        stats
    }
}

impl fmt::Display for PairingStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pairing Summary:")?;
        writeln!(
            f,
            "  {} subjects paired out of {} candidates",
            self.paired, self.subjects
        )?;
        writeln!(f, "  Closest-pair selections: {}", self.selected_from_multiple)?;
        writeln!(f, "  No parseable dates: {}", self.no_parseable_dates)?;
        writeln!(f, "  Single category: {}", self.single_category)?;
        writeln!(f, "  Missing configured category: {}", self.missing_category)?;
        writeln!(f, "  Extra categories: {}", self.extra_categories)?;
        writeln!(f, "  Unparsable records dropped: {}", self.unparsable_records)?;
        write!(f, "  Records outside window: {}", self.excluded_by_window)
    }
}

/// Result of running the pipeline over a batch
#[derive(Debug, Clone)]
pub struct PairingResult {
    /// One outcome per subject, ordered by subject id
    pub outcomes: Vec<SubjectOutcome>,
    pub stats: PairingStats,
    pub elapsed: Duration,
}

impl PairingResult {
    /// Outcomes that produced records to persist
    pub fn paired(&self) -> impl Iterator<Item = &SubjectOutcome> {
        self.outcomes.iter().filter(|o| o.is_paired())
    }
}
