//! Data Quality Validator
//!
//! Informational only. `is_valid` flips on an empty dataset or missing
//! required columns; duplicates and nulls are reported but never invalidate.

use std::collections::{BTreeMap, HashSet};

use contracts::{Dataset, ValidationReport};
use tracing::info;

/// Check a dataset against a required-column schema
pub fn validate(dataset: &Dataset, required_columns: &[String]) -> ValidationReport {
    let mut report = ValidationReport {
        is_valid: true,
        row_count: dataset.len(),
        column_count: dataset.column_count(),
        ..Default::default()
    };

    if dataset.is_empty() {
        report.is_valid = false;
        report.issues.push("dataset is empty".to_string());
        return report;
    }

    let missing: Vec<String> = required_columns
        .iter()
        .filter(|col| !dataset.has_column(col))
        .cloned()
        .collect();
    if !missing.is_empty() {
        report.is_valid = false;
        report
            .issues
            .push(format!("missing required columns: {}", missing.join(", ")));
        report.missing_columns = missing;
    }

    report.null_counts = null_counts(dataset);

    report.duplicate_count = duplicate_count(dataset);
    if report.duplicate_count > 0 {
        report
            .issues
            .push(format!("found {} duplicate rows", report.duplicate_count));
    }

    info!(
        rows = report.row_count,
        issues = report.issues.len(),
        "data validation completed: {}",
        if report.is_valid { "PASSED" } else { "FAILED" }
    );
    report
}

fn null_counts(dataset: &Dataset) -> BTreeMap<String, u64> {
    dataset
        .columns()
        .iter()
        .map(|col| {
            let nulls = dataset
                .rows()
                .iter()
                .filter(|row| dataset.cell(row, col).is_null())
                .count() as u64;
            (col.clone(), nulls)
        })
        .collect()
}

/// Rows equal in every column to an earlier row
fn duplicate_count(dataset: &Dataset) -> u64 {
    let mut seen = HashSet::new();
    let mut duplicates = 0;
    for row in dataset.rows() {
        let key: Vec<String> = dataset
            .columns()
            .iter()
            .map(|col| dataset.cell(row, col).to_string())
            .collect();
        if !seen.insert(key) {
            duplicates += 1;
        }
    }
    duplicates
}
