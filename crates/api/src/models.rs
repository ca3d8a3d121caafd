//! Request bodies

use contracts::{OrderRecord, Priority};
use serde::Deserialize;
use validator::{Validate, ValidationError};

/// `POST /api/v1/workorders` 请求体
///
/// Accepts both the store's field names and the short form
/// (`quantity`, `product_name`).
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[validate(custom(function = "not_blank"))]
    pub order_id: String,

    #[serde(default)]
    pub line_id: Option<String>,

    #[serde(alias = "product_name")]
    #[validate(custom(function = "not_blank"))]
    pub item_name: String,

    #[serde(alias = "quantity_planned")]
    pub quantity: u64,

    #[serde(default)]
    pub quantity_produced: u64,

    #[validate(custom(function = "not_blank"))]
    pub status: String,

    #[serde(default)]
    pub priority: Option<String>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

impl CreateOrderRequest {
    /// Normalized record, same text rules as the sanitizer
    pub fn into_record(self) -> OrderRecord {
        let mut order = OrderRecord::new(
            self.order_id.trim(),
            self.item_name.trim(),
            self.quantity,
            self.status.trim().to_lowercase(),
        );
        order.line_id = self
            .line_id
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());
        order.quantity_produced = self.quantity_produced;
        order.priority = self.priority.as_deref().and_then(Priority::parse);
        order
    }
}
