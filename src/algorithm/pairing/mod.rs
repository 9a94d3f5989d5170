//! Specimen pairing and temporal windowing
//!
//! This module selects, per subject, the specimens that go forward to
//! structured extraction:
//!
//! 1. Collection date coercion from heterogeneous representations
//! 2. Longest time-bounded window over a subject's sorted dates
//! 3. Grouping by subject and partitioning by specimen category
//! 4. Closest (and farthest) cross-category pair selection
//!
//! The `PairingPipeline` runs these stages once per subject. Subjects are
//! independent, so a large batch can be spread over the rayon pool without
//! changing the result.

pub mod coercion;
pub mod partition;
pub mod pipeline;
pub mod selector;
pub mod types;
pub mod window;

// Re-export key types
pub use coercion::{CoercedDate, coerce, coerce_date};
pub use partition::{RecordGroup, group_by_subject, partition, partition_by_category};
pub use pipeline::PairingPipeline;
pub use selector::{PairSelection, SpecimenPair, select_pairs};
pub use types::{
    Dated, IneligibleReason, PairSummary, PairingDecision, PairingResult, PairingStats,
    SubjectOutcome,
};
pub use window::{Window, select_window};
