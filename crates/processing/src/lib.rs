//! # Processing
//!
//! Pure transformations applied to one fetched snapshot.
//!
//! 负责：
//! - Record Sanitizer：丢弃缺字段的行、数量强制转换、状态规范化
//! - 派生字段：`completion_percentage` / `status_priority`
//! - KPI Aggregator
//! - Data Quality Validator
//!
//! ## 使用示例
//!
//! ```ignore
//! use processing::{calculate_kpis, enrich, Sanitizer};
//!
//! let sanitizer = Sanitizer::new(blueprint.sanitize.required_fields.clone());
//! let orders = enrich(sanitizer.sanitize(&raw));
//! let kpis = calculate_kpis(&orders, &[]);
//! ```

mod enrich;
mod kpi;
mod sanitizer;
mod validator;

pub use enrich::{completion_percentage, enrich, status_priority};
pub use kpi::{api_kpis, calculate_kpis, compute_kpis, production_stats};
pub use sanitizer::{coerce_quantity, sanitize, Sanitizer};
pub use validator::validate;
