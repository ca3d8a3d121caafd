//! CsvSink - tabular export of orders and quality results

use contracts::{
    create_artifact, ArtifactCategory, ContractError, ExportBatch, ExportSink, ProcessedOrder,
    QualityRecord,
};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument};

use crate::error::DispatcherError;

/// Configuration for CsvSink
#[derive(Debug, Clone)]
pub struct CsvSinkConfig {
    /// Output directory
    pub base_path: PathBuf,
    /// Also export quality results when the batch has any
    pub include_quality: bool,
}

impl CsvSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>, default_dir: &Path) -> Self {
        Self {
            base_path: super::base_path(params, default_dir),
            include_quality: super::flag(params, "include_quality", true),
        }
    }
}

/// Sink that writes `orders_{ts}.csv` (and `quality_{ts}.csv`)
pub struct CsvSink {
    name: String,
    config: CsvSinkConfig,
}

impl CsvSink {
    /// Create a new CsvSink
    pub fn new(name: impl Into<String>, config: CsvSinkConfig) -> std::io::Result<Self> {
        fs::create_dir_all(&config.base_path)?;
        Ok(Self {
            name: name.into(),
            config,
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
        default_dir: &Path,
    ) -> std::io::Result<Self> {
        Self::new(name, CsvSinkConfig::from_params(params, default_dir))
    }

    /// Paths land in `written` as soon as each file is complete
    fn write_batch(
        &self,
        batch: &ExportBatch,
        written: &mut Vec<PathBuf>,
    ) -> Result<(), DispatcherError> {
        let tag = batch.tag();

        let (path, file) = create_artifact(&self.config.base_path, ArtifactCategory::Orders, &tag)?;
        write_rows(file, &batch.orders, &ProcessedOrder::COLUMNS)?;
        info!(sink = %self.name, path = %path.display(), rows = batch.orders.len(), "Exported orders");
        written.push(path);

        if self.config.include_quality && !batch.quality.is_empty() {
            let (path, file) =
                create_artifact(&self.config.base_path, ArtifactCategory::Quality, &tag)?;
            write_rows(file, &batch.quality, &QualityRecord::COLUMNS)?;
            info!(sink = %self.name, path = %path.display(), rows = batch.quality.len(), "Exported quality results");
            written.push(path);
        }

        Ok(())
    }
}

/// Serialize rows with a header; an empty export still gets the header line
fn write_rows<T: Serialize>(file: File, rows: &[T], columns: &[&str]) -> Result<(), DispatcherError> {
    let mut writer = csv::Writer::from_writer(file);
    if rows.is_empty() {
        writer.write_record(columns)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

impl ExportSink for CsvSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "csv_sink_write",
        skip(self, batch),
        fields(sink = %self.name, orders = batch.orders.len())
    )]
    async fn write(&mut self, batch: &ExportBatch) -> Result<Vec<PathBuf>, ContractError> {
        let mut written = Vec::with_capacity(2);
        match self.write_batch(batch, &mut written) {
            Ok(()) => Ok(written),
            Err(e) => {
                error!(sink = %self.name, error = %e, kept = written.len(), "Write failed");
                Err(ContractError::sink_write_partial(&self.name, e.to_string(), written))
            }
        }
    }

    #[instrument(name = "csv_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        // Each artifact is flushed when written
        Ok(())
    }

    #[instrument(name = "csv_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        debug!(sink = %self.name, "CsvSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{KpiSummary, OrderRecord};

    fn processed(id: &str) -> ProcessedOrder {
        ProcessedOrder::from_order(OrderRecord::new(id, "Widget", 10, "pending"), Some(0.0), Some(2))
    }

    #[tokio::test]
    async fn test_csv_sink_writes_orders_and_quality() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = CsvSink::from_params("csv", &HashMap::new(), dir.path()).unwrap();

        let mut batch = ExportBatch::new(vec![processed("A"), processed("B")], KpiSummary::new());
        batch.quality = vec![QualityRecord::new("pass")];

        let paths = sink.write(&batch).await.unwrap();
        assert_eq!(paths.len(), 2);

        let orders = fs::read_to_string(&paths[0]).unwrap();
        let mut lines = orders.lines();
        assert_eq!(lines.next().unwrap(), ProcessedOrder::COLUMNS.join(","));
        assert_eq!(lines.count(), 2);
        assert!(paths[1]
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("quality_"));
    }

    #[tokio::test]
    async fn test_csv_sink_empty_batch_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let mut params = HashMap::new();
        params.insert("base_path".to_string(), dir.path().join("out").display().to_string());
        let mut sink = CsvSink::from_params("csv", &params, Path::new("unused")).unwrap();

        let batch = ExportBatch::new(Vec::new(), KpiSummary::new());
        let paths = sink.write(&batch).await.unwrap();
        assert_eq!(paths.len(), 1);
        assert!(paths[0].starts_with(dir.path().join("out")));

        let content = fs::read_to_string(&paths[0]).unwrap();
        assert_eq!(content.trim_end(), ProcessedOrder::COLUMNS.join(","));
    }

    #[tokio::test]
    async fn test_csv_sink_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = CsvSink::from_params("csv", &HashMap::new(), dir.path()).unwrap();
        let batch = ExportBatch::new(vec![processed("A")], KpiSummary::new());

        let first = sink.write(&batch).await.unwrap();
        let second = sink.write(&batch).await.unwrap();
        assert_ne!(first[0], second[0]);
    }
}
