//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the MES pipeline.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Record Model
//! - Raw records cross the source boundary as untyped JSON maps (`RawRecord`)
//! - Only the sanitizer produces typed `OrderRecord`s
//! - Derived values (`ProcessedOrder`, `KpiSummary`, `ValidationReport`) are
//!   recomputed per run and never treated as authoritative state

mod artifact;
mod blueprint;
mod dataset;
mod error;
mod kpi;
mod pipeline_state;
mod record;
mod sink;
mod source;
mod store;
mod validation;

pub use artifact::*;
pub use blueprint::*;
pub use dataset::Dataset;
pub use error::*;
pub use kpi::*;
pub use pipeline_state::PipelineState;
pub use record::*;
pub use sink::*;
pub use source::{LocalWorkOrderSource, WorkOrderSource};
pub use store::OrderStore;
pub use validation::ValidationReport;
