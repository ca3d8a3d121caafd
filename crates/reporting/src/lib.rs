//! # Reporting
//!
//! Report Generator: finds the latest exported artifacts in a directory and
//! composes a timestamped summary bundle from them.
//!
//! Discovery goes by file name pattern and modification time. That is
//! best-effort: a file being written while the generator runs may be picked
//! up half-written, in which case its unreadable rows are skipped.

mod discovery;
mod error;
mod generator;
mod loader;

pub use discovery::{latest_artifact, DiscoveredArtifacts};
pub use error::ReportError;
pub use generator::{generate_summary, DataFreshness, DataSources, ReportGenerator, SummaryReport};
pub use loader::{load_dataset_csv, load_json, load_orders_csv, load_quality_csv};
