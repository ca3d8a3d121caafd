//! ValidationReport - Data Quality Validator output

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Data quality report, informational only
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// False only for an empty dataset or missing required columns
    pub is_valid: bool,
    pub row_count: usize,
    pub column_count: usize,
    pub missing_columns: Vec<String>,
    /// Column -> null cell count
    pub null_counts: BTreeMap<String, u64>,
    /// Rows that fully repeat an earlier row
    pub duplicate_count: u64,
    pub issues: Vec<String>,
}
