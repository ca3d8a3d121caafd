//! Summary bundle generation

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use contracts::{create_artifact, timestamp_tag, ArtifactCategory, KpiSummary};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument};

use crate::discovery::DiscoveredArtifacts;
use crate::error::ReportError;
use crate::loader::{load_json, load_orders_csv, load_quality_csv};

/// Source files a summary was computed from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSources {
    pub orders_file: Option<String>,
    pub quality_file: Option<String>,
    pub stats_file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataFreshness {
    pub orders_count: usize,
    pub quality_tests_count: usize,
    pub last_updated: String,
}

/// Persisted report bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub report_timestamp: String,
    pub data_sources: DataSources,
    pub kpis: KpiSummary,
    /// Upstream KPI payload from the latest stats export, `{}` when absent
    pub api_stats: Value,
    pub data_freshness: DataFreshness,
}

/// Report Generator bound to an artifact directory
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    dir: PathBuf,
}

impl ReportGenerator {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Build the summary and persist it as a new `summary_report_*.json`
    #[instrument(name = "generate_summary", skip(self), fields(dir = %self.dir.display()))]
    pub fn generate(&self) -> Result<(SummaryReport, PathBuf), ReportError> {
        let summary = self.build()?;

        let now = Local::now();
        let (path, mut file) =
            create_artifact(&self.dir, ArtifactCategory::SummaryReport, &timestamp_tag(&now))?;
        serde_json::to_writer_pretty(&mut file, &summary)?;
        file.write_all(b"\n")?;

        info!(path = %path.display(), kpis = summary.kpis.len(), "Generated summary report");
        Ok((summary, path))
    }

    /// Build the summary without writing it
    pub fn build(&self) -> Result<SummaryReport, ReportError> {
        let found = DiscoveredArtifacts::discover(&self.dir)?;

        let orders = found
            .orders
            .as_deref()
            .map(load_orders_csv)
            .unwrap_or_default();
        let quality = found
            .quality
            .as_deref()
            .map(load_quality_csv)
            .unwrap_or_default();
        let api_stats = found
            .stats
            .as_deref()
            .and_then(load_json)
            .unwrap_or_else(|| Value::Object(Default::default()));

        let kpis = processing::calculate_kpis(&orders, &quality);
        let now = Local::now().to_rfc3339();
        let display = |p: &Option<PathBuf>| p.as_ref().map(|p| p.display().to_string());

        Ok(SummaryReport {
            report_timestamp: now.clone(),
            data_sources: DataSources {
                orders_file: display(&found.orders),
                quality_file: display(&found.quality),
                stats_file: display(&found.stats),
            },
            kpis,
            api_stats,
            data_freshness: DataFreshness {
                orders_count: orders.len(),
                quality_tests_count: quality.len(),
                last_updated: now,
            },
        })
    }
}

/// Generate and persist a summary for `dir`
pub fn generate_summary(dir: &Path) -> Result<SummaryReport, ReportError> {
    ReportGenerator::new(dir).generate().map(|(summary, _)| summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_empty_dir_gives_default_substitutes() {
        let dir = tempfile::tempdir().unwrap();
        let (summary, path) = ReportGenerator::new(dir.path()).generate().unwrap();

        assert_eq!(summary.data_sources, DataSources::default());
        assert_eq!(summary.api_stats, serde_json::json!({}));
        assert_eq!(summary.data_freshness.orders_count, 0);
        assert_eq!(summary.kpis.get("total_orders"), Some(0.0));
        assert!(path.exists());
    }

    #[test]
    fn test_summaries_are_append_only() {
        let dir = tempfile::tempdir().unwrap();
        let generator = ReportGenerator::new(dir.path());
        let (_, first) = generator.generate().unwrap();
        let (_, second) = generator.generate().unwrap();
        assert_ne!(first, second);

        let count = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_summary_reads_stats_and_quality() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("production_stats_20240101_000000.json"),
            r#"{"efficiency": 87.5}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("quality_20240101_000000.csv"),
            "metric_id,order_id,test_type,result,measurement,specification_min,specification_max,timestamp\n\
             Q1,A,visual,pass,,,,\n\
             Q2,A,visual,fail,,,,\n",
        )
        .unwrap();

        let summary = generate_summary(dir.path()).unwrap();
        assert_eq!(summary.api_stats["efficiency"], 87.5);
        assert_eq!(summary.data_freshness.quality_tests_count, 2);
        assert_eq!(summary.kpis.get("quality_pass_rate"), Some(50.0));
        assert!(summary.data_sources.orders_file.is_none());
        assert!(summary.data_sources.stats_file.is_some());
    }
}
