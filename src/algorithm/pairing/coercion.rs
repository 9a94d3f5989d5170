//! Collection date coercion
//!
//! Turns whatever the export carried in a date column into a calendar date.
//! Time of day is always discarded; window and pair comparisons work on
//! whole days only.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::models::record::RawDateTime;

/// Layouts accepted by the direct cast, tried before the US layouts
const ISO_DATE_FORMAT: &str = "%Y-%m-%d";
const ISO_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// US month/day/year, as typed into the collection column
pub const US_DATE_FORMAT: &str = "%m/%d/%Y";

/// US month/day/year with a 24h time, as exported with a timestamp
pub const US_DATETIME_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// Outcome of coercing one raw value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoercedDate {
    /// The value resolved to this calendar date
    Parsed(NaiveDate),
    /// No supported representation matched
    Unparsable,
}

impl CoercedDate {
    /// The parsed date, if any
    #[must_use]
    pub const fn date(self) -> Option<NaiveDate> {
        match self {
            Self::Parsed(date) => Some(date),
            Self::Unparsable => None,
        }
    }

    #[must_use]
    pub const fn is_parsed(self) -> bool {
        matches!(self, Self::Parsed(_))
    }
}

impl From<Option<NaiveDate>> for CoercedDate {
    fn from(date: Option<NaiveDate>) -> Self {
        date.map_or(Self::Unparsable, Self::Parsed)
    }
}

/// Coerce an optional raw value; a missing value is unparsable
#[must_use]
pub fn coerce_date(value: Option<&RawDateTime>) -> CoercedDate {
    value.map_or(CoercedDate::Unparsable, coerce)
}

/// Coerce one raw value to a calendar date
///
/// Native values are truncated to their date. Text is trimmed and tried
/// against, in order: an ISO date or date-time, `%m/%d/%Y`, and
/// `%m/%d/%Y %H:%M:%S`. The first layout that parses wins.
#[must_use]
pub fn coerce(value: &RawDateTime) -> CoercedDate {
    match value {
        RawDateTime::Date(date) => CoercedDate::Parsed(*date),
        RawDateTime::DateTime(datetime) => CoercedDate::Parsed(datetime.date()),
        RawDateTime::EpochMillis(ms) => {
            DateTime::from_timestamp_millis(*ms).map(|dt| dt.date_naive()).into()
        }
        RawDateTime::Text(text) => parse_date_text(text).into(),
        RawDateTime::Other(_) => CoercedDate::Unparsable,
    }
}

/// Parse a date string with the fixed fallback order
#[must_use]
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }

    cast_iso(s)
        .or_else(|| NaiveDate::parse_from_str(s, US_DATE_FORMAT).ok())
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, US_DATETIME_FORMAT)
                .ok()
                .map(|dt| dt.date())
        })
}

fn cast_iso(s: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(s, ISO_DATE_FORMAT) {
        return Some(date);
    }
    ISO_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .map(|dt| dt.date())
}
