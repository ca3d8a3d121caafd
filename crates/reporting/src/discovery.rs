//! Latest-artifact discovery

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use contracts::ArtifactCategory;
use tracing::{debug, warn};

use crate::error::ReportError;

/// Most recent artifact per category read by the generator
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoveredArtifacts {
    pub orders: Option<PathBuf>,
    pub quality: Option<PathBuf>,
    pub stats: Option<PathBuf>,
}

impl DiscoveredArtifacts {
    pub fn discover(dir: &Path) -> Result<Self, ReportError> {
        Ok(Self {
            orders: latest_artifact(dir, ArtifactCategory::Orders)?,
            quality: latest_artifact(dir, ArtifactCategory::Quality)?,
            stats: latest_artifact(dir, ArtifactCategory::ProductionStats)?,
        })
    }
}

/// Most recently modified file of a category, `None` when there is none
///
/// Ties on modification time go to the later timestamp tag, then to the
/// higher `_n` sequence suffix.
pub fn latest_artifact(
    dir: &Path,
    category: ArtifactCategory,
) -> Result<Option<PathBuf>, ReportError> {
    let pattern = format!(
        "{}/{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        category.glob_pattern()
    );

    let mut latest: Option<(SystemTime, (String, u32), PathBuf)> = None;
    for entry in glob::glob(&pattern)? {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                warn!(error = %e, "unreadable artifact skipped");
                continue;
            }
        };
        let Ok(modified) = path.metadata().and_then(|m| m.modified()) else {
            continue;
        };
        let order = sequence_key(&path, category);
        let newer = match &latest {
            None => true,
            Some((t, o, _)) => (modified, &order) > (*t, o),
        };
        if newer {
            latest = Some((modified, order, path));
        }
    }

    let found = latest.map(|(_, _, path)| path);
    debug!(category = category.prefix(), found = ?found, "artifact discovery");
    Ok(found)
}

/// `(timestamp tag, sequence)` from `{prefix}_{YYYYMMDD_HHMMSS}[_n].ext`
///
/// Names that do not follow the convention sort with sequence 0.
fn sequence_key(path: &Path, category: ArtifactCategory) -> (String, u32) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let rest = stem
        .strip_prefix(category.prefix())
        .and_then(|r| r.strip_prefix('_'))
        .unwrap_or(&stem);

    let mut parts = rest.splitn(3, '_');
    let tag = match (parts.next(), parts.next()) {
        (Some(date), Some(time)) => format!("{date}_{time}"),
        (Some(date), None) => date.to_string(),
        _ => String::new(),
    };
    let sequence = parts.next().and_then(|n| n.parse().ok()).unwrap_or(0);
    (tag, sequence)
}
