//! Time-bounded window selection
//!
//! Finds the densest cluster of collection dates: the longest contiguous run
//! of an ascending date sequence whose first and last dates are at most
//! `max_span_days` apart.

use std::ops::RangeInclusive;

use chrono::NaiveDate;

/// Inclusive index range over a date-sorted sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// First index in the window
    pub start: usize,
    /// Last index in the window (inclusive)
    pub end: usize,
}

impl Window {
    /// Number of elements covered
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Windows always cover at least one element
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Indices covered, for slicing or draining the sorted sequence
    #[must_use]
    pub const fn range(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }

    /// Days between the first and last date of the window
    #[must_use]
    pub fn span_days(&self, dates: &[NaiveDate]) -> i64 {
        (dates[self.end] - dates[self.start]).num_days()
    }
}

/// Select the longest window whose span does not exceed `max_span_days`
///
/// `dates` must be ascending. Two pointers walk forward only: for each right
/// index the left index advances until the span fits, and the best window is
/// replaced only on a strictly longer run, so the earliest of several
/// equal-length windows is kept.
///
/// Returns `None` for an empty sequence.
#[must_use]
pub fn select_window(dates: &[NaiveDate], max_span_days: i64) -> Option<Window> {
    if dates.is_empty() {
        return None;
    }
    debug_assert!(
        dates.windows(2).all(|w| w[0] <= w[1]),
        "dates must be sorted ascending"
    );
    // A negative span would walk the left pointer past the right one
    let max_span_days = max_span_days.max(0);

    let mut i = 0;
    let mut best = Window { start: 0, end: 0 };

    for j in 0..dates.len() {
        while (dates[j] - dates[i]).num_days() > max_span_days {
            i += 1;
        }
        if j - i > best.end - best.start {
            best = Window { start: i, end: j };
        }
    }

    Some(best)
}
