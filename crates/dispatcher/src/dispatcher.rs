//! Dispatcher - fan-out of one export batch to every sink

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use contracts::{ExportBatch, SinkConfig, SinkType};

use crate::error::DispatcherError;
use crate::handle::{SinkHandle, SinkReport};
use crate::sinks::{CsvSink, JsonSink, LogSink};

/// Dispatcher configuration
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Sink configurations
    pub sinks: Vec<SinkConfig>,
    /// Directory used by file sinks without a `base_path` param
    pub output_dir: PathBuf,
}

/// Builder for creating a Dispatcher
pub struct DispatcherBuilder {
    config: DispatcherConfig,
}

impl DispatcherBuilder {
    /// Create a new DispatcherBuilder
    pub fn new(config: DispatcherConfig) -> Self {
        Self { config }
    }

    /// Build and start the sink workers
    ///
    /// A sink that cannot be created is recorded as failed; the others still start.
    #[instrument(
        name = "dispatcher_builder_build",
        skip(self),
        fields(sink_count = self.config.sinks.len())
    )]
    pub fn build(self) -> Dispatcher {
        let mut handles = Vec::with_capacity(self.config.sinks.len());
        let mut failed = Vec::new();

        for sink_config in &self.config.sinks {
            match create_sink_handle(sink_config, &self.config.output_dir) {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    error!(sink = %sink_config.name, error = %e, "Sink creation failed");
                    failed.push(SinkReport::failed(&sink_config.name, e.to_string()));
                }
            }
        }

        Dispatcher { handles, failed }
    }
}

/// Create a SinkHandle from configuration
#[instrument(
    name = "dispatcher_create_sink_handle",
    skip(config, output_dir),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
fn create_sink_handle(config: &SinkConfig, output_dir: &Path) -> Result<SinkHandle, DispatcherError> {
    match config.sink_type {
        SinkType::Log => {
            let sink = LogSink::new(&config.name);
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
        SinkType::Csv => {
            let sink = CsvSink::from_params(&config.name, &config.params, output_dir)
                .map_err(|e| DispatcherError::sink_creation(&config.name, e.to_string()))?;
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
        SinkType::Json => {
            let sink = JsonSink::from_params(&config.name, &config.params, output_dir)
                .map_err(|e| DispatcherError::sink_creation(&config.name, e.to_string()))?;
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
    }
}

/// Per-sink results of one export
#[derive(Debug, Clone, Default)]
pub struct DispatchOutcome {
    pub reports: Vec<SinkReport>,
}

impl DispatchOutcome {
    /// Every artifact written, in sink order
    pub fn artifacts(&self) -> Vec<PathBuf> {
        self.reports
            .iter()
            .flat_map(|r| r.artifacts.iter().cloned())
            .collect()
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &SinkReport> {
        self.reports.iter().filter(|r| r.succeeded())
    }

    pub fn failed(&self) -> impl Iterator<Item = &SinkReport> {
        self.reports.iter().filter(|r| !r.succeeded())
    }

    /// True when there was at least one sink and none of them succeeded
    pub fn all_failed(&self) -> bool {
        !self.reports.is_empty() && self.succeeded().next().is_none()
    }
}

/// Fans one batch out to isolated sink workers
pub struct Dispatcher {
    handles: Vec<SinkHandle>,
    failed: Vec<SinkReport>,
}

impl Dispatcher {
    /// Create a dispatcher with custom sink handles (for testing)
    pub fn with_handles(handles: Vec<SinkHandle>) -> Self {
        Self {
            handles,
            failed: Vec::new(),
        }
    }

    /// Number of configured sinks, including those that failed to start
    pub fn sink_count(&self) -> usize {
        self.handles.len() + self.failed.len()
    }

    /// Hand the batch to every sink, then wait for all workers to finish
    #[instrument(name = "dispatcher_export", skip(self, batch), fields(tag = %batch.tag()))]
    pub async fn export(self, batch: ExportBatch) -> DispatchOutcome {
        if self.sink_count() == 0 {
            warn!("No sinks configured, nothing exported");
            return DispatchOutcome::default();
        }

        let batch = Arc::new(batch);
        for handle in &self.handles {
            handle.try_send(Arc::clone(&batch));
        }

        let mut reports = self.failed;
        for handle in self.handles {
            reports.push(handle.shutdown().await);
        }

        let outcome = DispatchOutcome { reports };
        info!(
            sinks = outcome.reports.len(),
            succeeded = outcome.succeeded().count(),
            artifacts = outcome.artifacts().len(),
            "Export finished"
        );
        outcome
    }
}

/// Convenience function to create a dispatcher from sink configs
#[instrument(name = "dispatcher_create", skip(sink_configs, output_dir))]
pub fn create_dispatcher(sink_configs: Vec<SinkConfig>, output_dir: &Path) -> Dispatcher {
    let config = DispatcherConfig {
        sinks: sink_configs,
        output_dir: output_dir.to_path_buf(),
    };
    DispatcherBuilder::new(config).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{KpiSummary, OrderRecord, ProcessedOrder};
    use std::collections::HashMap;

    fn batch() -> ExportBatch {
        let order = OrderRecord::new("A", "Widget", 10, "pending");
        let mut kpis = KpiSummary::new();
        kpis.insert_count("total_orders", 1);
        ExportBatch::new(
            vec![ProcessedOrder::from_order(order, Some(0.0), Some(2))],
            kpis,
        )
    }

    #[tokio::test]
    async fn test_dispatcher_fanout() {
        let handles = vec![
            SinkHandle::spawn(LogSink::new("sink1"), 4),
            SinkHandle::spawn(LogSink::new("sink2"), 4),
        ];
        let outcome = Dispatcher::with_handles(handles).export(batch()).await;
        assert_eq!(outcome.reports.len(), 2);
        assert!(!outcome.all_failed());
        assert!(outcome.artifacts().is_empty());
    }

    #[tokio::test]
    async fn test_create_dispatcher_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let configs = vec![
            SinkConfig::new("orders_csv", SinkType::Csv),
            SinkConfig::new("kpis_json", SinkType::Json),
        ];

        let dispatcher = create_dispatcher(configs, dir.path());
        assert_eq!(dispatcher.sink_count(), 2);

        let outcome = dispatcher.export(batch()).await;
        assert_eq!(outcome.succeeded().count(), 2);
        assert_eq!(outcome.artifacts().len(), 2);
        assert!(outcome.artifacts().iter().all(|p| p.exists()));
    }

    #[tokio::test]
    async fn test_one_failing_sink_does_not_block_other() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"file, not a dir").unwrap();

        let mut broken = SinkConfig::new("broken_csv", SinkType::Csv);
        broken.params = HashMap::from([(
            "base_path".to_string(),
            blocker.join("nested").display().to_string(),
        )]);
        let configs = vec![broken, SinkConfig::new("kpis_json", SinkType::Json)];

        let outcome = create_dispatcher(configs, dir.path()).export(batch()).await;
        assert_eq!(outcome.reports.len(), 2);
        assert_eq!(outcome.failed().count(), 1);
        assert_eq!(outcome.failed().next().unwrap().name, "broken_csv");
        assert!(!outcome.all_failed());
        assert_eq!(outcome.artifacts().len(), 1);
    }

    #[tokio::test]
    async fn test_no_sinks() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = create_dispatcher(Vec::new(), dir.path()).export(batch()).await;
        assert!(outcome.reports.is_empty());
        assert!(!outcome.all_failed());
    }
}
