//! Closest and farthest cross-category pair selection
//!
//! Every record of the first partition is paired with every record of the
//! second. The cross product is quadratic, which is fine for the handful of
//! specimens a subject has; the pipeline warns when a subject is unusually
//! large.

use itertools::Itertools;

use crate::algorithm::pairing::types::Dated;

/// Two records from different partitions and the days between them
#[derive(Debug, PartialEq, Eq)]
pub struct SpecimenPair<'a, T> {
    /// Record from the first partition
    pub first: &'a T,
    /// Record from the second partition
    pub second: &'a T,
    /// Absolute distance between the two collection dates, in days
    pub time_diff_days: i64,
}

impl<T> Clone for SpecimenPair<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SpecimenPair<'_, T> {}

/// Closest and farthest pair of a cross product
#[derive(Debug, PartialEq, Eq)]
pub struct PairSelection<'a, T> {
    pub closest: SpecimenPair<'a, T>,
    pub farthest: SpecimenPair<'a, T>,
}

/// Select the minimum- and maximum-distance pairs of `first × second`
///
/// Enumeration is first-major. Ties keep the earliest pair in that order for
/// both the closest and the farthest pair. Returns `None` when either side is
/// empty.
#[must_use]
pub fn select_pairs<'a, T: Dated>(
    first: &[&'a T],
    second: &[&'a T],
) -> Option<PairSelection<'a, T>> {
    let mut pairs = first
        .iter()
        .cartesian_product(second.iter())
        .map(|(a, b)| SpecimenPair {
            first: *a,
            second: *b,
            time_diff_days: (b.date() - a.date()).num_days().abs(),
        });

    let seed = pairs.next()?;
    let (closest, farthest) = pairs.fold((seed, seed), |(closest, farthest), pair| {
        (
            if pair.time_diff_days < closest.time_diff_days { pair } else { closest },
            if pair.time_diff_days > farthest.time_diff_days { pair } else { farthest },
        )
    });

    Some(PairSelection { closest, farthest })
}

/// Number of pairs `select_pairs` would enumerate
#[must_use]
pub const fn cross_product_size(first: usize, second: usize) -> usize {
    first.saturating_mul(second)
}
