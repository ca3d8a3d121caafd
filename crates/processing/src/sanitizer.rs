//! Record Sanitizer
//!
//! Lenient cleaning: rows with a null required field are dropped without an
//! error, non-numeric quantities become 0. Survivors keep their input order.

use chrono::{DateTime, NaiveDateTime};
use contracts::{default_required_fields, OrderRecord, Priority, RawRecord};
use serde_json::Value;
use tracing::{debug, instrument};

/// Field name -> accepted alternative spellings in raw payloads
const ALIASES: &[(&str, &[&str])] = &[
    ("item_name", &["product_name"]),
    ("quantity", &["quantity_planned"]),
    ("quantity_planned", &["quantity"]),
];

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Record Sanitizer with a configurable required-field schema
#[derive(Debug, Clone)]
pub struct Sanitizer {
    required_fields: Vec<String>,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new(default_required_fields())
    }
}

impl Sanitizer {
    pub fn new(required_fields: Vec<String>) -> Self {
        Self { required_fields }
    }

    /// Sanitize a raw snapshot
    ///
    /// Callers that need the number of dropped rows diff the lengths.
    #[instrument(name = "sanitize", skip_all, fields(input = raw.len()))]
    pub fn sanitize(&self, raw: &[RawRecord]) -> Vec<OrderRecord> {
        let clean: Vec<OrderRecord> = raw.iter().filter_map(|r| self.sanitize_one(r)).collect();
        debug!(kept = clean.len(), "sanitized records");
        clean
    }

    /// Sanitize a single record, `None` when it has to be dropped
    pub fn sanitize_one(&self, raw: &RawRecord) -> Option<OrderRecord> {
        if self
            .required_fields
            .iter()
            .any(|field| lookup(raw, field).is_none())
        {
            return None;
        }

        let order_id = lookup(raw, "order_id").and_then(text)?;
        if order_id.is_empty() {
            return None;
        }

        Some(OrderRecord {
            order_id,
            line_id: lookup(raw, "line_id").and_then(text),
            item_name: lookup(raw, "item_name").and_then(text).unwrap_or_default(),
            quantity_planned: lookup(raw, "quantity_planned")
                .map(coerce_quantity)
                .unwrap_or(0),
            quantity_produced: lookup(raw, "quantity_produced")
                .map(coerce_quantity)
                .unwrap_or(0),
            status: lookup(raw, "status")
                .and_then(text)
                .map(|s| s.to_lowercase())
                .unwrap_or_default(),
            priority: lookup(raw, "priority")
                .and_then(Value::as_str)
                .and_then(Priority::parse),
            start_time: lookup(raw, "start_time").and_then(parse_timestamp),
            end_time: lookup(raw, "end_time").and_then(parse_timestamp),
        })
    }
}

/// Sanitize with the default required-field schema
pub fn sanitize(raw: &[RawRecord]) -> Vec<OrderRecord> {
    Sanitizer::default().sanitize(raw)
}

/// Value under the field name, or under an alias when the name is absent
///
/// A key that is present but null shadows its aliases.
fn lookup<'a>(raw: &'a RawRecord, field: &str) -> Option<&'a Value> {
    let aliases = ALIASES
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, aliases)| *aliases)
        .unwrap_or(&[]);

    std::iter::once(field)
        .chain(aliases.iter().copied())
        .find_map(|key| raw.get(key))
        .filter(|value| !value.is_null())
}

/// Trimmed text form of a scalar
fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Coerce a loosely-typed quantity into a non-negative integer
///
/// Floats are truncated, negatives clamp to 0, anything non-numeric is 0.
pub fn coerce_quantity(value: &Value) -> u64 {
    match value {
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                v
            } else if n.as_i64().is_some() {
                0
            } else {
                n.as_f64().map(truncate).unwrap_or(0)
            }
        }
        Value::String(s) => {
            let s = s.trim();
            if let Ok(v) = s.parse::<i64>() {
                v.max(0) as u64
            } else {
                s.parse::<f64>().map(truncate).unwrap_or(0)
            }
        }
        _ => 0,
    }
}

fn truncate(v: f64) -> u64 {
    if v.is_finite() && v > 0.0 {
        v.trunc() as u64
    } else {
        0
    }
}

fn parse_timestamp(value: &Value) -> Option<NaiveDateTime> {
    let s = value.as_str()?.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}
