//! KPI summary types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Status -> record count
pub type StatusCounts = BTreeMap<String, u64>;

/// Single KPI value: a count or a rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KpiValue {
    Count(u64),
    Rate(f64),
}

impl KpiValue {
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Count(v) => *v as f64,
            Self::Rate(v) => *v,
        }
    }
}

/// Named metric -> value, valid only for the snapshot it was computed from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KpiSummary(BTreeMap<String, KpiValue>);

impl KpiSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_count(&mut self, name: impl Into<String>, value: u64) {
        self.0.insert(name.into(), KpiValue::Count(value));
    }

    /// Insert a rate rounded to 2 decimal places
    pub fn insert_rate(&mut self, name: impl Into<String>, value: f64) {
        self.0.insert(name.into(), KpiValue::Rate(round2(value)));
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).map(KpiValue::as_f64)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &KpiValue)> {
        self.0.iter()
    }
}

/// Round to 2 decimal places; non-finite input becomes 0
pub fn round2(value: f64) -> f64 {
    if value.is_finite() {
        (value * 100.0).round() / 100.0
    } else {
        0.0
    }
}

/// `numerator / denominator * 100`, defined as 0 when the denominator is 0
pub fn percentage(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        round2(numerator / denominator * 100.0)
    } else {
        0.0
    }
}
