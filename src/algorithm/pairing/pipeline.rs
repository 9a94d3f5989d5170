//! Per-subject pairing pipeline
//!
//! This module implements the `PairingPipeline`, which runs every subject
//! through coercion, windowing, partitioning and pair selection.

use std::time::Instant;

use indicatif::ProgressBar;
use log::{debug, info, warn};
use rayon::prelude::*;
use rustc_hash::FxHashSet;

use crate::algorithm::pairing::coercion::coerce_date;
use crate::algorithm::pairing::partition::{RecordGroup, group_by_subject, partition_by_category};
use crate::algorithm::pairing::selector::{PairSelection, cross_product_size, select_pairs};
use crate::algorithm::pairing::types::{
    DatedRecord, IneligibleReason, PairSummary, PairingDecision, PairingResult, PairingStats,
    SubjectOutcome,
};
use crate::algorithm::pairing::window::select_window;
use crate::config::PairingConfig;
use crate::error::Result;
use crate::models::record::SpecimenRecord;
use crate::utils::logging::progress;

/// Pairs specimens of complementary categories per subject
#[derive(Debug, Clone)]
pub struct PairingPipeline {
    config: PairingConfig,
}

impl PairingPipeline {
    /// Batches with at least this many subjects go to the rayon pool
    pub const PARALLEL_THRESHOLD: usize = 1000;

    /// Create a pipeline, rejecting an unusable configuration
    pub fn new(config: PairingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &PairingConfig {
        &self.config
    }

    /// Run the whole batch: group by subject and process every group
    pub fn run(&self, records: Vec<SpecimenRecord>) -> PairingResult {
        let start_time = Instant::now();
        let record_count = records.len();
        let groups = group_by_subject(records);

        info!(
            "Pairing {} records across {} subjects ({})",
            record_count,
            groups.len(),
            self.config.category_pair
        );

        let use_parallel = self.config.use_parallel && groups.len() >= Self::PARALLEL_THRESHOLD;
        let pb = if self.config.show_progress {
            progress::create_main_progress_bar(groups.len() as u64, Some("Pairing subjects"))
        } else {
            ProgressBar::hidden()
        };

        let outcomes: Vec<SubjectOutcome> = if use_parallel {
            info!("Using parallel processing for {} subjects", groups.len());
            groups
                .into_par_iter()
                .map(|group| {
                    let outcome = self.process_group(group);
                    pb.inc(1);
                    outcome
                })
                .collect()
        } else {
            groups
                .into_iter()
                .map(|group| {
                    let outcome = self.process_group(group);
                    pb.inc(1);
                    outcome
                })
                .collect()
        };

        progress::finish_progress_bar(&pb, Some("Pairing complete"));

        let stats: PairingStats = outcomes.iter().collect();
        let elapsed = start_time.elapsed();

        info!(
            "Pairing complete: {} subjects paired out of {} candidates in {:.2?}",
            stats.paired, stats.subjects, elapsed
        );
        if stats.unparsable_records > 0 {
            warn!(
                "{} records dropped for unparsable collection dates",
                stats.unparsable_records
            );
        }

        PairingResult {
            outcomes,
            stats,
            elapsed,
        }
    }

    /// Process one subject from raw records to a terminal decision
    #[must_use]
    pub fn process_group(&self, group: RecordGroup) -> SubjectOutcome {
        let RecordGroup {
            subject_id,
            records,
        } = group;

        let (mut dated, unparsable_records) = normalize(records);
        if unparsable_records > 0 {
            debug!("Subject {subject_id}: {unparsable_records} records with unparsable dates");
        }

        if dated.is_empty() {
            return SubjectOutcome {
                subject_id,
                unparsable_records,
                excluded_by_window: 0,
                decision: PairingDecision::Ineligible(IneligibleReason::NoParseableDates),
            };
        }

        let excluded_by_window = if dated.len() > 2 {
            self.restrict_to_window(&mut dated)
        } else {
            0
        };

        let decision = self.decide(&subject_id, dated);
        if let PairingDecision::Ineligible(reason) = &decision {
            debug!("Subject {subject_id} not paired: {reason}");
        }

        SubjectOutcome {
            subject_id,
            unparsable_records,
            excluded_by_window,
            decision,
        }
    }

    /// Keep only the selected window; returns how many records were dropped
    fn restrict_to_window(&self, dated: &mut Vec<DatedRecord>) -> usize {
        let dates: Vec<_> = dated.iter().map(|d| d.date).collect();
        let Some(window) = select_window(&dates, self.config.max_span_days) else {
            return 0;
        };

        let kept: Vec<_> = dated.drain(window.range()).collect();
        let excluded = dated.len();
        *dated = kept;
        excluded
    }

    fn decide(&self, subject_id: &str, dated: Vec<DatedRecord>) -> PairingDecision {
        let selection = match self.select(subject_id, &dated) {
            Ok(selection) => selection,
            Err(reason) => return PairingDecision::Ineligible(reason),
        };

        let (records, closest, farthest) = match selection {
            None => (dated, None, None),
            Some(Selected {
                keep,
                closest,
                farthest,
            }) => {
                let keep: FxHashSet<usize> = keep.into_iter().collect();
                let records = dated
                    .into_iter()
                    .filter(|d| keep.contains(&d.position))
                    .collect();
                (records, Some(closest), Some(farthest))
            }
        };

        PairingDecision::Paired {
            records: in_input_order(records),
            closest,
            farthest,
        }
    }

    /// Check eligibility and, when more than one pair is possible, pick one
    ///
    /// `Ok(None)` means the records already form the only possible pair.
    fn select(
        &self,
        subject_id: &str,
        dated: &[DatedRecord],
    ) -> std::result::Result<Option<Selected>, IneligibleReason> {
        let pair = &self.config.category_pair;
        let partitions = partition_by_category(dated);

        match partitions.len() {
            0 | 1 => return Err(IneligibleReason::SingleCategory),
            2 => {}
            _ => return Err(IneligibleReason::ExtraCategories),
        }

        let (Some(first), Some(second)) = (partitions.get(&pair.first), partitions.get(&pair.second))
        else {
            return Err(IneligibleReason::MissingCategory);
        };

        if dated.len() == 2 {
            return Ok(None);
        }

        let pairs = cross_product_size(first.len(), second.len());
        if pairs > self.config.cross_product_warn_threshold {
            warn!(
                "Subject {subject_id} has {} x {} specimens ({pairs} candidate pairs)",
                first.len(),
                second.len()
            );
        }

        // Both partitions are non-empty here
        let PairSelection { closest, farthest } =
            select_pairs(first, second).ok_or(IneligibleReason::MissingCategory)?;

        let selected = Selected {
            keep: [closest.first.position, closest.second.position],
            closest: summarize(closest.first, closest.second, closest.time_diff_days),
            farthest: summarize(farthest.first, farthest.second, farthest.time_diff_days),
        };
        debug!(
            "Subject {subject_id}: closest {}, farthest {}",
            selected.closest, selected.farthest
        );

        Ok(Some(selected))
    }
}

/// Positions and summaries of a closest-pair selection
struct Selected {
    keep: [usize; 2],
    closest: PairSummary,
    farthest: PairSummary,
}

fn in_input_order(mut dated: Vec<DatedRecord>) -> Vec<SpecimenRecord> {
    dated.sort_by_key(|d| d.position);
    dated.into_iter().map(|d| d.record).collect()
}

/// Coerce every record's date, dropping unparsable ones, sorted by date
///
/// The sort is stable, so records sharing a date keep their input order.
fn normalize(records: Vec<SpecimenRecord>) -> (Vec<DatedRecord>, usize) {
    let total = records.len();
    let mut dated: Vec<DatedRecord> = records
        .into_iter()
        .enumerate()
        .filter_map(|(position, record)| {
            coerce_date(record.collected_at.as_ref())
                .date()
                .map(|date| DatedRecord {
                    date,
                    position,
                    record,
                })
        })
        .collect();
    dated.sort_by_key(|d| d.date);
    let unparsable = total - dated.len();
    (dated, unparsable)
}

fn summarize(first: &DatedRecord, second: &DatedRecord, time_diff_days: i64) -> PairSummary {
    PairSummary {
        first_specimen: first.record.specimen_id.clone(),
        first_date: first.date,
        second_specimen: second.record.specimen_id.clone(),
        second_date: second.date,
        time_diff_days,
    }
}
