//! SinkHandle - manages a sink with isolated queue and worker task

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, warn};

use contracts::{ExportBatch, ExportSink};

use crate::metrics::{MetricsSnapshot, SinkMetrics};

/// What a sink worker did before it stopped
#[derive(Debug, Clone, Default)]
pub struct SinkReport {
    /// Sink name
    pub name: String,
    /// Artifact files created
    pub artifacts: Vec<PathBuf>,
    /// Error messages, in order of occurrence
    pub errors: Vec<String>,
    /// Final counters
    pub metrics: MetricsSnapshot,
}

impl SinkReport {
    /// Report for a sink that never started
    pub fn failed(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            errors: vec![error.into()],
            metrics: MetricsSnapshot {
                failure_count: 1,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// At least one write and no failure or drop
    pub fn succeeded(&self) -> bool {
        self.metrics.write_count > 0
            && self.metrics.failure_count == 0
            && self.metrics.dropped_count == 0
    }
}

/// Handle to a running sink worker
pub struct SinkHandle {
    /// Sink name
    name: String,
    /// Channel to send batches to worker
    tx: mpsc::Sender<Arc<ExportBatch>>,
    /// Shared metrics
    metrics: Arc<SinkMetrics>,
    /// Worker task handle
    worker_handle: JoinHandle<SinkReport>,
}

impl SinkHandle {
    /// Create a new SinkHandle and spawn the worker task
    pub fn spawn<S: ExportSink + Send + 'static>(sink: S, queue_capacity: usize) -> Self {
        let name = sink.name().to_string();
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let metrics = Arc::new(SinkMetrics::new());

        let worker_metrics = Arc::clone(&metrics);
        let worker_name = name.clone();

        let worker_handle =
            tokio::spawn(async move { sink_worker(sink, rx, worker_metrics, worker_name).await });

        Self {
            name,
            tx,
            metrics,
            worker_handle,
        }
    }

    /// Send a batch to the sink (non-blocking)
    ///
    /// Returns true if sent, false if queue full (batch dropped)
    pub fn try_send(&self, batch: Arc<ExportBatch>) -> bool {
        match self.tx.try_send(batch) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(b)) => {
                self.metrics.inc_dropped_count();
                warn!(sink = %self.name, tag = %b.tag(), "Queue full, batch dropped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!(sink = %self.name, "Sink worker closed unexpectedly");
                false
            }
        }
    }

    /// Shutdown the sink worker gracefully and collect its report
    #[instrument(name = "sink_handle_shutdown", skip(self), fields(sink = %self.name))]
    pub async fn shutdown(self) -> SinkReport {
        // Drop sender to signal worker to stop
        drop(self.tx);
        let mut report = match self.worker_handle.await {
            Ok(report) => report,
            Err(e) => {
                error!(sink = %self.name, error = ?e, "Worker task panicked");
                SinkReport::failed(&self.name, format!("worker panicked: {e}"))
            }
        };
        // queue drops happen on the sender side
        report.metrics = self.metrics.snapshot();
        if report.errors.is_empty() && report.metrics.dropped_count > 0 {
            report.errors.push("batch dropped: queue full".to_string());
        }
        debug!(sink = %self.name, "SinkHandle shutdown complete");
        report
    }
}

/// Worker task that consumes batches and writes to sink
#[instrument(
    name = "sink_worker_loop",
    skip(sink, rx, metrics),
    fields(sink = %name)
)]
async fn sink_worker<S: ExportSink>(
    mut sink: S,
    mut rx: mpsc::Receiver<Arc<ExportBatch>>,
    metrics: Arc<SinkMetrics>,
    name: String,
) -> SinkReport {
    debug!(sink = %name, "Sink worker started");
    let mut report = SinkReport {
        name: name.clone(),
        ..Default::default()
    };

    while let Some(batch) = rx.recv().await {
        match sink.write(&batch).await {
            Ok(paths) => {
                metrics.inc_write_count();
                metrics.add_artifacts(paths.len());
                report.artifacts.extend(paths);
            }
            Err(e) => {
                metrics.inc_failure_count();
                error!(sink = %name, tag = %batch.tag(), error = %e, "Write failed");
                let kept = e.written_artifacts();
                metrics.add_artifacts(kept.len());
                report.artifacts.extend_from_slice(kept);
                report.errors.push(e.to_string());
                // Continue processing - don't crash on single failure
            }
        }
    }

    // Cleanup
    if let Err(e) = sink.flush().await {
        metrics.inc_failure_count();
        error!(sink = %name, error = %e, "Flush failed on shutdown");
        report.errors.push(e.to_string());
    }
    if let Err(e) = sink.close().await {
        error!(sink = %name, error = %e, "Close failed on shutdown");
        report.errors.push(e.to_string());
    }

    debug!(sink = %name, "Sink worker stopped");
    report
}
