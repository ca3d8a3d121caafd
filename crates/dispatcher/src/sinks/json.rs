//! JsonSink - structured export of KPIs and upstream stats

use contracts::{create_artifact, ArtifactCategory, ContractError, ExportBatch, ExportSink};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument};

use crate::error::DispatcherError;

/// Sink that writes `kpis_{ts}.json` (and `production_stats_{ts}.json`)
pub struct JsonSink {
    name: String,
    base_path: PathBuf,
}

impl JsonSink {
    /// Create a new JsonSink
    pub fn new(name: impl Into<String>, base_path: PathBuf) -> std::io::Result<Self> {
        fs::create_dir_all(&base_path)?;
        Ok(Self {
            name: name.into(),
            base_path,
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
        default_dir: &Path,
    ) -> std::io::Result<Self> {
        Self::new(name, super::base_path(params, default_dir))
    }

    fn write_json<T: Serialize>(
        &self,
        category: ArtifactCategory,
        tag: &str,
        value: &T,
    ) -> Result<PathBuf, DispatcherError> {
        let (path, mut file) = create_artifact(&self.base_path, category, tag)?;
        serde_json::to_writer_pretty(&mut file, value)?;
        file.write_all(b"\n")?;
        info!(sink = %self.name, path = %path.display(), "Exported {}", category.prefix());
        Ok(path)
    }

    /// Paths land in `written` as soon as each file is complete
    fn write_batch(
        &self,
        batch: &ExportBatch,
        written: &mut Vec<PathBuf>,
    ) -> Result<(), DispatcherError> {
        let tag = batch.tag();
        written.push(self.write_json(ArtifactCategory::Kpis, &tag, &batch.kpis)?);
        if let Some(stats) = &batch.production_stats {
            written.push(self.write_json(ArtifactCategory::ProductionStats, &tag, stats)?);
        }
        Ok(())
    }
}

impl ExportSink for JsonSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "json_sink_write",
        skip(self, batch),
        fields(sink = %self.name, kpis = batch.kpis.len())
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

    #[instrument(name = "json_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    #[instrument(name = "json_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        debug!(sink = %self.name, "JsonSink closed");
        Ok(())
    }
}
