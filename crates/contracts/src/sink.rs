//! ExportSink trait - Dispatcher output interface
//!
//! A sink receives one `ExportBatch` per pipeline run and persists whatever
//! slice of it it is responsible for.

use chrono::{DateTime, Local};
use serde_json::Value;
use std::path::PathBuf;

use crate::{timestamp_tag, ContractError, KpiSummary, ProcessedOrder, QualityRecord};

/// Everything a single run produced, handed to every sink
#[derive(Debug, Clone)]
pub struct ExportBatch {
    /// Generation time, shared by all artifacts of the run
    pub generated_at: DateTime<Local>,

    /// Sanitized and enriched work orders
    pub orders: Vec<ProcessedOrder>,

    /// KPIs computed locally from `orders` and `quality`
    pub kpis: KpiSummary,

    /// Quality test results (empty when not fetched)
    pub quality: Vec<QualityRecord>,

    /// Upstream KPI payload, passed through as-is
    pub production_stats: Option<Value>,
}

impl ExportBatch {
    pub fn new(orders: Vec<ProcessedOrder>, kpis: KpiSummary) -> Self {
        Self {
            generated_at: Local::now(),
            orders,
            kpis,
            quality: Vec::new(),
            production_stats: None,
        }
    }

    /// Timestamp tag used in artifact names
    pub fn tag(&self) -> String {
        timestamp_tag(&self.generated_at)
    }
}

/// Data output trait
///
/// All sink implementations must implement this trait.
#[trait_variant::make(ExportSink: Send)]
pub trait LocalExportSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Write one batch
    ///
    /// Returns the paths of the artifacts created (empty for non-file sinks).
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn write(&mut self, batch: &ExportBatch) -> Result<Vec<PathBuf>, ContractError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Close sink
    async fn close(&mut self) -> Result<(), ContractError>;
}
