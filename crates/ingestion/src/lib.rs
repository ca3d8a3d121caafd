//! # Ingestion
//!
//! Work Order Source implementations.
//!
//! Responsibilities:
//! - Fetch raw work orders, upstream KPIs and quality results
//! - Map network failures to `Transport`, malformed payloads to `Decode`
//! - Hand records over untyped (`RawRecord`); typing is the sanitizer's job
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::HttpWorkOrderSource;
//! use contracts::WorkOrderSource;
//!
//! let source = HttpWorkOrderSource::new(blueprint.source.clone())?;
//! let raw = source.fetch_orders().await?;
//! ```
//!
//! ## Mock Testing
//!
//! ```ignore
//! use ingestion::MockWorkOrderSource;
//!
//! let source = MockWorkOrderSource::from_json_file("data/sample_orders.json")?;
//! ```

mod decode;
mod error;
mod http;
mod mock;

// Re-exports
pub use contracts::{RawRecord, WorkOrderSource};
pub use decode::records_from_value;
pub use error::IngestionError;
pub use http::HttpWorkOrderSource;
pub use mock::MockWorkOrderSource;
