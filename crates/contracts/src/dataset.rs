//! Dataset - column-aware table of loosely-typed rows
//!
//! Gives the validator a schema (column list in first-seen order) and rows
//! whose cells may be missing or null.

use serde::Serialize;
use serde_json::Value;

use crate::{ContractError, RawRecord};

static NULL: Value = Value::Null;

/// Tabular dataset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<RawRecord>,
}

impl Dataset {
    /// Build from rows; the schema is the union of keys in first-seen order
    pub fn from_records(rows: Vec<RawRecord>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for key in row.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
        Self { columns, rows }
    }

    /// Build with an explicit schema (e.g. a CSV header)
    pub fn with_columns(columns: Vec<String>, rows: Vec<RawRecord>) -> Self {
        Self { columns, rows }
    }

    /// Build from any row type that serializes to a JSON object
    pub fn from_serializable<T: Serialize>(items: &[T]) -> Result<Self, ContractError> {
        let rows = items
            .iter()
            .map(|item| match serde_json::to_value(item) {
                Ok(Value::Object(map)) => Ok(map),
                Ok(other) => Err(ContractError::Other(format!(
                    "row does not serialize to an object: {other}"
                ))),
                Err(e) => Err(ContractError::Other(format!("row serialize error: {e}"))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_records(rows))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[RawRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Cell value; a key absent from the row reads as null
    pub fn cell<'a>(&'a self, row: &'a RawRecord, column: &str) -> &'a Value {
        row.get(column).unwrap_or(&NULL)
    }
}
