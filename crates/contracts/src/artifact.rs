//! Export artifact naming
//!
//! Artifacts are named `{category}_{YYYYMMDD_HHMMSS}.{ext}`. The Report
//! Generator relies on the prefix and on file modification time to find the
//! latest artifact of each category.

use chrono::{DateTime, Local};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Timestamp tag format used in artifact file names
pub const TIMESTAMP_TAG_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Category of an exported file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactCategory {
    /// Processed work orders (csv)
    Orders,
    /// Quality test results (csv)
    Quality,
    /// KPI summary computed by the pipeline (json)
    Kpis,
    /// Statistics reported by the upstream KPI endpoint (json)
    ProductionStats,
    /// Report Generator bundle (json)
    SummaryReport,
}

impl ArtifactCategory {
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Orders => "orders",
            Self::Quality => "quality",
            Self::Kpis => "kpis",
            Self::ProductionStats => "production_stats",
            Self::SummaryReport => "summary_report",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Orders | Self::Quality => "csv",
            Self::Kpis | Self::ProductionStats | Self::SummaryReport => "json",
        }
    }

    /// File name for a given timestamp tag
    pub fn file_name(&self, tag: &str) -> String {
        format!("{}_{}.{}", self.prefix(), tag, self.extension())
    }

    /// Glob pattern (relative) matching every artifact of this category
    pub fn glob_pattern(&self) -> String {
        format!("{}_*.{}", self.prefix(), self.extension())
    }
}

/// Format a generation time as an artifact tag
pub fn timestamp_tag(at: &DateTime<Local>) -> String {
    at.format(TIMESTAMP_TAG_FORMAT).to_string()
}

/// Create a new artifact file, never overwriting an existing one
///
/// Two writes within the same second get `_1`, `_2`, ... appended to the tag.
pub fn create_artifact(
    dir: &Path,
    category: ArtifactCategory,
    tag: &str,
) -> io::Result<(PathBuf, File)> {
    std::fs::create_dir_all(dir)?;

    let mut attempt = 0u32;
    loop {
        let name = if attempt == 0 {
            category.file_name(tag)
        } else {
            category.file_name(&format!("{tag}_{attempt}"))
        };
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_file_name() {
        let at = Local.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
        let tag = timestamp_tag(&at);
        assert_eq!(tag, "20240305_140709");
        assert_eq!(
            ArtifactCategory::Orders.file_name(&tag),
            "orders_20240305_140709.csv"
        );
        assert_eq!(
            ArtifactCategory::ProductionStats.glob_pattern(),
            "production_stats_*.json"
        );
    }

    #[test]
    fn test_create_artifact_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let (first, _) = create_artifact(dir.path(), ArtifactCategory::Kpis, "20240101_000000")
            .unwrap();
        let (second, _) = create_artifact(dir.path(), ArtifactCategory::Kpis, "20240101_000000")
            .unwrap();
        assert_ne!(first, second);
        assert!(second
            .file_name()
            .unwrap()
            .to_string_lossy()
            .ends_with("_1.json"));
    }
}
