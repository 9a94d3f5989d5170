//! Subject grouping and category partitioning
//!
//! Grouping is deterministic: subjects come out ordered by identifier,
//! categories ordered by `SpecimenCategory`, and records keep their input
//! order inside each category.

use std::collections::BTreeMap;

use smallvec::SmallVec;

use crate::models::record::{Categorized, SpecimenCategory, SpecimenRecord};

/// Records of one category; subjects rarely have more than a handful
pub type Partition<'a, T> = SmallVec<[&'a T; 4]>;

/// Category -> records of that category
pub type CategoryPartitions<'a, T> = BTreeMap<SpecimenCategory, Partition<'a, T>>;

/// All records sharing a subject identifier
#[derive(Debug, Clone, PartialEq)]
pub struct RecordGroup {
    pub subject_id: String,
    /// Records in input order
    pub records: Vec<SpecimenRecord>,
}

impl RecordGroup {
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Group owned records by subject, ordered by subject identifier
#[must_use]
pub fn group_by_subject(records: Vec<SpecimenRecord>) -> Vec<RecordGroup> {
    let mut groups: BTreeMap<String, Vec<SpecimenRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.subject_id.clone())
            .or_default()
            .push(record);
    }

    groups
        .into_iter()
        .map(|(subject_id, records)| RecordGroup {
            subject_id,
            records,
        })
        .collect()
}

/// Split items by category, preserving their order within each category
#[must_use]
pub fn partition_by_category<T: Categorized>(items: &[T]) -> CategoryPartitions<'_, T> {
    let mut partitions: CategoryPartitions<'_, T> = BTreeMap::new();
    for item in items {
        partitions
            .entry(item.category().clone())
            .or_default()
            .push(item);
    }
    partitions
}

/// Subject -> category -> records, borrowing from `records`
///
/// Subjects with a single category are included unchanged; deciding
/// eligibility is the pipeline's job.
#[must_use]
pub fn partition(
    records: &[SpecimenRecord],
) -> BTreeMap<&str, CategoryPartitions<'_, SpecimenRecord>> {
    let mut subjects: BTreeMap<&str, CategoryPartitions<'_, SpecimenRecord>> = BTreeMap::new();
    for record in records {
        subjects
            .entry(record.subject_id.as_str())
            .or_default()
            .entry(record.category.clone())
            .or_default()
            .push(record);
    }
    subjects
}
