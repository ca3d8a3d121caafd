//! Order and quality record shapes
//!
//! `RawRecord` is what the Work Order Source hands over. `OrderRecord` is the
//! validated shape that only the sanitizer produces, `ProcessedOrder` adds the
//! derived columns that get exported.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Untyped record as received from a source (JSON object)
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Work order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    InProgress,
    Completed,
    OnHold,
}

impl OrderStatus {
    /// Parse a normalized (trimmed, lower-cased) status string
    pub fn parse(status: &str) -> Option<Self> {
        match status {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "on_hold" => Some(Self::OnHold),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::OnHold => "on_hold",
        }
    }

    /// Dashboard ordering rank (completed first)
    pub fn rank(&self) -> u8 {
        match self {
            Self::Completed => 4,
            Self::InProgress => 3,
            Self::Pending => 2,
            Self::OnHold => 1,
        }
    }
}

/// Work order priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Case-insensitive parse, `None` for unknown values
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "urgent" => Some(Self::Urgent),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

/// Anything carrying a normalized status string
pub trait StatusRecord {
    fn status(&self) -> &str;
}

/// Sanitized manufacturing work order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Identity key, never empty
    pub order_id: String,

    /// Production line
    #[serde(default)]
    pub line_id: Option<String>,

    /// Item / product name
    #[serde(alias = "product_name")]
    pub item_name: String,

    /// Planned quantity
    #[serde(alias = "quantity")]
    pub quantity_planned: u64,

    /// Produced quantity, may exceed planned
    #[serde(default)]
    pub quantity_produced: u64,

    /// Trimmed, lower-cased status. Kept as text so unknown statuses survive.
    pub status: String,

    #[serde(default)]
    pub priority: Option<Priority>,

    #[serde(default)]
    pub start_time: Option<NaiveDateTime>,

    #[serde(default)]
    pub end_time: Option<NaiveDateTime>,
}

impl OrderRecord {
    /// Minimal record, remaining fields defaulted
    pub fn new(
        order_id: impl Into<String>,
        item_name: impl Into<String>,
        quantity_planned: u64,
        status: impl Into<String>,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            line_id: None,
            item_name: item_name.into(),
            quantity_planned,
            quantity_produced: 0,
            status: status.into(),
            priority: None,
            start_time: None,
            end_time: None,
        }
    }
}

impl StatusRecord for OrderRecord {
    fn status(&self) -> &str {
        &self.status
    }
}

/// Order with derived dashboard columns
///
/// Flat on purpose: this is the row shape of the tabular export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedOrder {
    pub order_id: String,
    #[serde(default)]
    pub line_id: Option<String>,
    pub item_name: String,
    pub quantity_planned: u64,
    #[serde(default)]
    pub quantity_produced: u64,
    pub status: String,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub start_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub end_time: Option<NaiveDateTime>,

    /// produced / planned * 100, rounded to 2 decimals; absent when planned is 0
    #[serde(default)]
    pub completion_percentage: Option<f64>,

    /// Rank of a known status, absent otherwise
    #[serde(default)]
    pub status_priority: Option<u8>,
}

impl ProcessedOrder {
    /// Column order of the tabular export
    pub const COLUMNS: [&'static str; 11] = [
        "order_id",
        "line_id",
        "item_name",
        "quantity_planned",
        "quantity_produced",
        "status",
        "priority",
        "start_time",
        "end_time",
        "completion_percentage",
        "status_priority",
    ];

    pub fn from_order(
        order: OrderRecord,
        completion_percentage: Option<f64>,
        status_priority: Option<u8>,
    ) -> Self {
        Self {
            order_id: order.order_id,
            line_id: order.line_id,
            item_name: order.item_name,
            quantity_planned: order.quantity_planned,
            quantity_produced: order.quantity_produced,
            status: order.status,
            priority: order.priority,
            start_time: order.start_time,
            end_time: order.end_time,
            completion_percentage,
            status_priority,
        }
    }
}

impl StatusRecord for ProcessedOrder {
    fn status(&self) -> &str {
        &self.status
    }
}

/// Quality test result attached to an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityRecord {
    #[serde(default)]
    pub metric_id: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub test_type: Option<String>,
    /// `pass` or `fail`
    pub result: String,
    #[serde(default)]
    pub measurement: Option<f64>,
    #[serde(default)]
    pub specification_min: Option<f64>,
    #[serde(default)]
    pub specification_max: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl QualityRecord {
    /// Column order of the tabular export
    pub const COLUMNS: [&'static str; 8] = [
        "metric_id",
        "order_id",
        "test_type",
        "result",
        "measurement",
        "specification_min",
        "specification_max",
        "timestamp",
    ];

    pub fn new(result: impl Into<String>) -> Self {
        Self {
            metric_id: None,
            order_id: None,
            test_type: None,
            result: result.into(),
            measurement: None,
            specification_min: None,
            specification_max: None,
            timestamp: None,
        }
    }

    pub fn passed(&self) -> bool {
        self.result.trim().eq_ignore_ascii_case("pass")
    }
}
