//! Payload decoding: JSON arrays into raw work orders and quality results

use contracts::{QualityRecord, RawRecord};
use serde_json::Value;
use tracing::warn;

use crate::error::IngestionError;

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Split a JSON array payload into raw records
///
/// Elements that are not objects are skipped with a warning.
pub fn records_from_value(value: Value) -> Result<Vec<RawRecord>, IngestionError> {
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(IngestionError::NotAnArray {
                found: kind_of(&other),
            })
        }
    };

    let total = items.len();
    let records: Vec<RawRecord> = items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect();

    if records.len() < total {
        warn!(
            skipped = total - records.len(),
            "non-object entries skipped in work order payload"
        );
    }
    Ok(records)
}

/// Decode a JSON array of quality results, skipping malformed entries
pub(crate) fn quality_from_value(value: Value) -> Result<Vec<QualityRecord>, IngestionError> {
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(IngestionError::NotAnArray {
                found: kind_of(&other),
            })
        }
    };

    let total = items.len();
    let records: Vec<QualityRecord> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<QualityRecord>(item).ok())
        .map(|mut record| {
            record.result = record.result.trim().to_lowercase();
            record
        })
        .collect();

    if records.len() < total {
        warn!(
            skipped = total - records.len(),
            "malformed quality entries skipped"
        );
    }
    Ok(records)
}
