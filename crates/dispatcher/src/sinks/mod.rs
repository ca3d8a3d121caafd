//! Sink implementations
//!
//! Contains CsvSink, JsonSink, and LogSink.

mod csv;
mod json;
mod log;

pub use self::csv::CsvSink;
pub use self::json::JsonSink;
pub use self::log::LogSink;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Output directory from the `base_path` param, falling back to the export directory
pub(crate) fn base_path(params: &HashMap<String, String>, default_dir: &Path) -> PathBuf {
    params
        .get("base_path")
        .map(PathBuf::from)
        .unwrap_or_else(|| default_dir.to_path_buf())
}

/// Boolean param, accepting `true/false/1/0/yes/no`
pub(crate) fn flag(params: &HashMap<String, String>, key: &str, default: bool) -> bool {
    match params.get(key).map(|v| v.trim().to_lowercase()) {
        Some(v) if matches!(v.as_str(), "true" | "1" | "yes") => true,
        Some(v) if matches!(v.as_str(), "false" | "0" | "no") => false,
        _ => default,
    }
}
