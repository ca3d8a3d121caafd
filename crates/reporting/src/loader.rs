//! Artifact loaders
//!
//! The `load_*_csv` / `load_json` helpers used by the generator are lenient:
//! unreadable files read as empty and unparsable rows are skipped.

use std::path::Path;

use contracts::{Dataset, ProcessedOrder, QualityRecord, RawRecord};
use serde::de::DeserializeOwned;
use serde_json::{Number, Value};
use tracing::{error, info, warn};

use crate::error::ReportError;

fn load_rows<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    let mut reader = match csv::Reader::from_path(path) {
        Ok(reader) => reader,
        Err(e) => {
            error!(path = %path.display(), error = %e, "Error loading CSV");
            return Vec::new();
        }
    };

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for record in reader.deserialize::<T>() {
        match record {
            Ok(row) => rows.push(row),
            Err(_) => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!(path = %path.display(), skipped, "unparsable CSV rows skipped");
    }
    info!(path = %path.display(), rows = rows.len(), "Loaded CSV data");
    rows
}

/// Processed orders from an `orders_*.csv` export
pub fn load_orders_csv(path: &Path) -> Vec<ProcessedOrder> {
    load_rows(path)
}

/// Quality results from a `quality_*.csv` export
pub fn load_quality_csv(path: &Path) -> Vec<QualityRecord> {
    load_rows(path)
}

/// Any JSON document, `None` when missing or malformed
pub fn load_json(path: &Path) -> Option<Value> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            error!(path = %path.display(), error = %e, "File not readable");
            return None;
        }
    };
    match serde_json::from_str(&content) {
        Ok(value) => {
            info!(path = %path.display(), "Loaded JSON data");
            Some(value)
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "Error parsing JSON");
            None
        }
    }
}

/// Load an arbitrary CSV file as a Dataset
///
/// The header becomes the schema. Empty cells are null, numeric cells become
/// numbers, everything else stays text.
pub fn load_dataset_csv(path: &Path) -> Result<Dataset, ReportError> {
    let csv_err = |source| ReportError::Csv {
        path: path.display().to_string(),
        source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;
    let columns: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(String::from)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        let row: RawRecord = columns
            .iter()
            .zip(record.iter())
            .map(|(col, cell)| (col.clone(), cell_value(cell)))
            .collect();
        rows.push(row);
    }

    Ok(Dataset::with_columns(columns, rows))
}

fn cell_value(cell: &str) -> Value {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if let Ok(v) = trimmed.parse::<i64>() {
        return Value::from(v);
    }
    if let Some(n) = trimmed.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(n);
    }
    Value::String(cell.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_dataset_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.csv");
        fs::write(&path, "order_id,quantity,status\nA,5,pending\nB,,\n").unwrap();

        let ds = load_dataset_csv(&path).unwrap();
        assert_eq!(ds.columns(), &["order_id", "quantity", "status"]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.cell(&ds.rows()[0], "quantity"), &Value::from(5));
        assert!(ds.cell(&ds.rows()[1], "status").is_null());
    }

    #[test]
    fn test_load_orders_csv_skips_bad_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders_x.csv");
        let header = ProcessedOrder::COLUMNS.join(",");
        fs::write(
            &path,
            format!(
                "{header}\nA,L1,Widget,10,5,in_progress,high,,,50.0,3\nB,L1,Widget,lots,5,pending,,,,,\n"
            ),
        )
        .unwrap();

        let orders = load_orders_csv(&path);
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].quantity_produced, 5);
        assert_eq!(orders[0].completion_percentage, Some(50.0));
    }

    #[test]
    fn test_missing_files_read_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_orders_csv(&dir.path().join("none.csv")).is_empty());
        assert!(load_json(&dir.path().join("none.json")).is_none());
    }
}
