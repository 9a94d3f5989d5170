//! Specimen report record model
//!
//! One `SpecimenRecord` is one row of the sequencing-report export: a single
//! specimen collected from a subject, its category, its raw collection
//! timestamp and the free-text report. Field names on the wire are the
//! export's column headers.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Type of biological sample a report was produced from
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SpecimenCategory {
    /// Peripheral blood (liquid biopsy)
    Blood,
    /// Solid tissue
    Tissue,
    /// Any other label, kept verbatim
    Other(String),
}

impl SpecimenCategory {
    /// Label as written in the export
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Blood => "Blood",
            Self::Tissue => "Tissue",
            Self::Other(label) => label,
        }
    }
}

impl From<&str> for SpecimenCategory {
    fn from(s: &str) -> Self {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "blood" => Self::Blood,
            "tissue" => Self::Tissue,
            _ => Self::Other(trimmed.to_string()),
        }
    }
}

impl From<String> for SpecimenCategory {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<SpecimenCategory> for String {
    fn from(category: SpecimenCategory) -> Self {
        category.label().to_string()
    }
}

impl FromStr for SpecimenCategory {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for SpecimenCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A point in time as it arrives from the export, before coercion
///
/// Exports mix native temporal values with text in several layouts.
/// Variants are tried in declaration order when deserializing, so ISO dates
/// land in `Date`, ISO date-times in `DateTime`, integers in `EpochMillis`
/// and other strings in `Text`. Any remaining JSON value (a spreadsheet
/// serial such as `45292.5`, a boolean, an object) is kept in `Other` so
/// that one bad cell never fails the whole export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawDateTime {
    /// Calendar date
    Date(NaiveDate),
    /// Date with time of day
    DateTime(NaiveDateTime),
    /// Milliseconds since the Unix epoch
    EpochMillis(i64),
    /// Free text in an unknown layout
    Text(String),
    /// Any other value; never coerces to a date
    Other(Value),
}

impl From<NaiveDate> for RawDateTime {
    fn from(date: NaiveDate) -> Self {
        Self::Date(date)
    }
}

impl From<NaiveDateTime> for RawDateTime {
    fn from(datetime: NaiveDateTime) -> Self {
        Self::DateTime(datetime)
    }
}

impl From<&str> for RawDateTime {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl fmt::Display for RawDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(d) => write!(f, "{d}"),
            Self::DateTime(dt) => write!(f, "{dt}"),
            Self::EpochMillis(ms) => write!(f, "{ms}ms"),
            Self::Text(s) => f.write_str(s),
            Self::Other(v) => write!(f, "{v}"),
        }
    }
}

/// Anything that belongs to a specimen category
pub trait Categorized {
    /// The specimen category
    fn category(&self) -> &SpecimenCategory;
}

/// One specimen report row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecimenRecord {
    /// Subject identifier (medical record number)
    #[serde(rename = "MRN", deserialize_with = "deserialize_identifier")]
    pub subject_id: String,

    /// Specimen identifier, unique within a subject
    #[serde(rename = "Specimen Name", deserialize_with = "deserialize_identifier")]
    pub specimen_id: String,

    /// Specimen category
    #[serde(rename = "Specimen Type")]
    pub category: SpecimenCategory,

    /// When the specimen was collected
    #[serde(rename = "Collection Date and Time", default)]
    pub collected_at: Option<RawDateTime>,

    /// When the report was first final-verified
    #[serde(
        rename = "First Final Verify Date and Time",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub verified_at: Option<RawDateTime>,

    /// Free-text sequencing report
    #[serde(
        rename = "ngs_report",
        alias = "Value",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub report: Option<String>,

    /// Remaining export columns, carried through untouched
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl SpecimenRecord {
    /// Create a record with no report, verify date or payload
    #[must_use]
    pub fn new(
        subject_id: impl Into<String>,
        specimen_id: impl Into<String>,
        category: SpecimenCategory,
        collected_at: Option<RawDateTime>,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            specimen_id: specimen_id.into(),
            category,
            collected_at,
            verified_at: None,
            report: None,
            payload: Map::new(),
        }
    }

    /// Attach report text
    #[must_use]
    pub fn with_report(mut self, report: impl Into<String>) -> Self {
        self.report = Some(report.into());
        self
    }

    /// Attach the final-verify timestamp
    #[must_use]
    pub fn with_verified_at(mut self, verified_at: RawDateTime) -> Self {
        self.verified_at = Some(verified_at);
        self
    }

    /// Attach an extra payload column
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.payload.insert(name.into(), value);
        self
    }
}

impl Categorized for SpecimenRecord {
    fn category(&self) -> &SpecimenCategory {
        &self.category
    }
}

/// Identifiers are exported as text or as numbers depending on the sheet
fn deserialize_identifier<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Identifier {
        Text(String),
        Integer(i64),
        Float(f64),
    }

    Ok(match Identifier::deserialize(deserializer)? {
        Identifier::Text(s) => s.trim().to_string(),
        Identifier::Integer(n) => n.to_string(),
        Identifier::Float(f) if f.fract() == 0.0 => format!("{f:.0}"),
        Identifier::Float(f) => f.to_string(),
    })
}
