//! Parquet input
//!
//! Reads a specimen export stored as Parquet into [`SpecimenRecord`]s.
//! The identifier, category and date columns are decoded explicitly; every
//! other column is carried through as payload.

use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use arrow::array::{
    Array, ArrayRef, AsArray, Date32Array, Date64Array, StringArray, TimestampMillisecondArray,
};
use arrow::compute::cast;
use arrow::datatypes::{
    DataType, Date32Type, Date64Type, Float32Type, Float64Type, Int32Type, Int64Type, TimeUnit,
    TimestampMillisecondType,
};
use arrow::record_batch::RecordBatch;
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map, Value};

use crate::error::util::safe_open_file;
use crate::error::{Result, SpecimenPairError};
use crate::models::record::{RawDateTime, SpecimenCategory, SpecimenRecord};
use crate::utils::logging::{log_operation_complete, log_operation_start, log_warning};

/// Default batch size for Parquet reading
pub const DEFAULT_BATCH_SIZE: usize = 16384;

const SUBJECT_COLUMN: &str = "MRN";
const SPECIMEN_COLUMN: &str = "Specimen Name";
const CATEGORY_COLUMN: &str = "Specimen Type";
const COLLECTED_COLUMN: &str = "Collection Date and Time";
const VERIFIED_COLUMN: &str = "First Final Verify Date and Time";
const REPORT_COLUMNS: [&str; 2] = ["ngs_report", "Value"];

/// Batch size, overridable through `PARQUET_BATCH_SIZE`
#[must_use]
pub fn get_batch_size() -> usize {
    std::env::var("PARQUET_BATCH_SIZE")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(DEFAULT_BATCH_SIZE)
}

/// Read every row of a Parquet specimen export
pub fn read_records_parquet(path: &Path) -> Result<Vec<SpecimenRecord>> {
    let start = Instant::now();
    log_operation_start("Reading parquet file", path);

    let file = safe_open_file(path, "reading specimen records")?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(SpecimenPairError::Parquet)
        .with_context(|| format!("Failed to read parquet metadata from {}", path.display()))?
        .with_batch_size(get_batch_size())
        .build()
        .map_err(SpecimenPairError::Parquet)
        .with_context(|| format!("Failed to build parquet reader for {}", path.display()))?;

    let mut records = Vec::new();
    for batch in reader {
        let batch = batch
            .map_err(SpecimenPairError::Arrow)
            .with_context(|| format!("Failed to read record batch from {}", path.display()))?;
        records.extend(
            batch_to_records(&batch)
                .with_context(|| format!("Failed to decode rows from {}", path.display()))?,
        );
    }

    log_operation_complete("loaded", "records", path, records.len(), Some(start.elapsed()));
    Ok(records)
}

/// Decode one record batch
///
/// Rows with a null subject or specimen identifier are skipped with a
/// warning; a null category becomes an empty `Other` category.
pub fn batch_to_records(batch: &RecordBatch) -> Result<Vec<SpecimenRecord>> {
    let subject = text_column(batch, SUBJECT_COLUMN)?;
    let specimen = text_column(batch, SPECIMEN_COLUMN)?;
    let category = text_column(batch, CATEGORY_COLUMN)?;
    let collected = optional_date_column(batch, COLLECTED_COLUMN)?;
    let verified = optional_date_column(batch, VERIFIED_COLUMN)?;

    let report_name = REPORT_COLUMNS
        .iter()
        .copied()
        .find(|name| batch.schema().index_of(name).is_ok());
    let report = report_name
        .map(|name| text_column(batch, name))
        .transpose()?;

    let schema = batch.schema();
    let payload_columns: Vec<(&str, &ArrayRef)> = schema
        .fields()
        .iter()
        .zip(batch.columns())
        .map(|(field, column)| (field.name().as_str(), column))
        .filter(|(name, _)| !is_decoded_column(name, report_name))
        .collect();

    let mut records = Vec::with_capacity(batch.num_rows());
    for row in 0..batch.num_rows() {
        let (Some(subject_id), Some(specimen_id)) =
            (text_value(&subject, row), text_value(&specimen, row))
        else {
            log::warn!("Skipping row {row}: missing subject or specimen identifier");
            continue;
        };

        let mut payload = Map::new();
        for (name, column) in &payload_columns {
            payload.insert((*name).to_string(), json_value(column, row)?);
        }

        records.push(SpecimenRecord {
            subject_id: subject_id.to_string(),
            specimen_id: specimen_id.to_string(),
            category: SpecimenCategory::from(text_value(&category, row).unwrap_or_default()),
            collected_at: collected.as_ref().and_then(|c| c.value(row)),
            verified_at: verified.as_ref().and_then(|c| c.value(row)),
            report: report
                .as_ref()
                .and_then(|r| text_value(r, row))
                .map(str::to_string),
            payload,
        });
    }

    Ok(records)
}

fn is_decoded_column(name: &str, report_name: Option<&str>) -> bool {
    [
        SUBJECT_COLUMN,
        SPECIMEN_COLUMN,
        CATEGORY_COLUMN,
        COLLECTED_COLUMN,
        VERIFIED_COLUMN,
    ]
    .contains(&name)
        || report_name == Some(name)
}

fn required_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    batch
        .column_by_name(name)
        .ok_or_else(|| SpecimenPairError::MissingColumn(name.to_string()).into())
}

/// Any column rendered as UTF-8; identifiers may arrive as numbers
fn text_column(batch: &RecordBatch, name: &str) -> Result<StringArray> {
    let column = required_column(batch, name)?;
    let utf8 = match column.data_type() {
        DataType::Utf8 => column.clone(),
        _ => cast(column, &DataType::Utf8).map_err(SpecimenPairError::Arrow)?,
    };
    Ok(utf8.as_string::<i32>().clone())
}

fn text_value(column: &StringArray, row: usize) -> Option<&str> {
    (!column.is_null(row)).then(|| column.value(row))
}

/// A date-like column in whichever physical type the export used
enum DateColumn {
    Date32(Date32Array),
    Date64(Date64Array),
    Timestamp(TimestampMillisecondArray),
    Text(StringArray),
}

impl DateColumn {
    fn try_new(name: &str, column: &ArrayRef) -> Result<Self> {
        let decoded = match column.data_type() {
            DataType::Date32 => Self::Date32(column.as_primitive::<Date32Type>().clone()),
            DataType::Date64 => Self::Date64(column.as_primitive::<Date64Type>().clone()),
            DataType::Timestamp(_, _) => {
                let millis = cast(column, &DataType::Timestamp(TimeUnit::Millisecond, None))
                    .map_err(SpecimenPairError::Arrow)?;
                Self::Timestamp(millis.as_primitive::<TimestampMillisecondType>().clone())
            }
            DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => {
                let text = cast(column, &DataType::Utf8).map_err(SpecimenPairError::Arrow)?;
                Self::Text(text.as_string::<i32>().clone())
            }
            other => {
                return Err(SpecimenPairError::UnsupportedColumnType {
                    column: name.to_string(),
                    data_type: other.to_string(),
                }
                .into());
            }
        };
        Ok(decoded)
    }

    fn value(&self, row: usize) -> Option<RawDateTime> {
        match self {
            Self::Date32(a) if a.is_valid(row) => a.value_as_date(row).map(RawDateTime::Date),
            Self::Date64(a) if a.is_valid(row) => {
                a.value_as_datetime(row).map(RawDateTime::DateTime)
            }
            Self::Timestamp(a) if a.is_valid(row) => {
                a.value_as_datetime(row).map(RawDateTime::DateTime)
            }
            Self::Text(a) if a.is_valid(row) => Some(RawDateTime::Text(a.value(row).to_string())),
            _ => None,
        }
    }
}

/// A date column, or `None` when it is absent or not date-like
///
/// A column of an unsupported type (spreadsheet serials stored as floats,
/// for instance) leaves every row without a date instead of failing the file.
fn optional_date_column(batch: &RecordBatch, name: &str) -> Result<Option<DateColumn>> {
    match batch.column_by_name(name) {
        Some(column) => match DateColumn::try_new(name, column) {
            Ok(decoded) => Ok(Some(decoded)),
            Err(err)
                if matches!(
                    err.downcast_ref::<SpecimenPairError>(),
                    Some(SpecimenPairError::UnsupportedColumnType { .. })
                ) =>
            {
                log_warning(&format!("{err}; all dates unparsable"), None);
                Ok(None)
            }
            Err(err) => Err(err),
        },
        None => {
            if name == COLLECTED_COLUMN {
                log_warning(&format!("Column '{name}' absent; all dates unparsable"), None);
            }
            Ok(None)
        }
    }
}

/// Payload cell as JSON, keeping numbers and booleans typed
fn json_value(column: &ArrayRef, row: usize) -> Result<Value> {
    if column.is_null(row) {
        return Ok(Value::Null);
    }
    let value = match column.data_type() {
        DataType::Boolean => Value::Bool(column.as_boolean().value(row)),
        DataType::Int32 => Value::from(column.as_primitive::<Int32Type>().value(row)),
        DataType::Int64 => Value::from(column.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => Value::from(column.as_primitive::<Float32Type>().value(row)),
        DataType::Float64 => Value::from(column.as_primitive::<Float64Type>().value(row)),
        _ => Value::String(
            array_value_to_string(column.as_ref(), row).map_err(SpecimenPairError::Arrow)?,
        ),
    };
    Ok(value)
}
