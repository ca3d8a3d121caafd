//! LogSink - logs batch summary via tracing

use contracts::{ContractError, ExportBatch, ExportSink};
use std::path::PathBuf;
use tracing::{info, instrument};

/// Sink that logs batch summaries for debugging
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_batch_summary(&self, batch: &ExportBatch) {
        info!(
            sink = %self.name,
            tag = %batch.tag(),
            orders = batch.orders.len(),
            quality = batch.quality.len(),
            kpis = batch.kpis.len(),
            upstream_stats = batch.production_stats.is_some(),
            "ExportBatch received"
        );
        for (name, value) in batch.kpis.iter() {
            info!(sink = %self.name, kpi = %name, value = value.as_f64(), "KPI");
        }
    }
}

impl ExportSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_write",
        skip(self, batch),
        fields(sink = %self.name)
    )]
    async fn write(&mut self, batch: &ExportBatch) -> Result<Vec<PathBuf>, ContractError> {
        self.log_batch_summary(batch);
        Ok(Vec::new())
    }

    #[instrument(name = "log_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        // Nothing to flush for log sink
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, "LogSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::KpiSummary;

    #[tokio::test]
    async fn test_log_sink_write() {
        let mut sink = LogSink::new("test_log");
        let batch = ExportBatch::new(Vec::new(), KpiSummary::new());

        let result = sink.write(&batch).await;
        assert!(result.unwrap().is_empty());
    }
}
