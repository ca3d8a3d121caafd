//! WorkOrderSource trait - Ingestion input interface

use serde_json::Value;

use crate::{ContractError, QualityRecord, RawRecord};

/// Upstream system the pipeline pulls from
///
/// Every method either returns the full payload or fails; partial results
/// are never handed out.
#[trait_variant::make(WorkOrderSource: Send)]
pub trait LocalWorkOrderSource {
    /// Source name (used for logging)
    fn name(&self) -> &str;

    /// Fetch the raw work order list
    ///
    /// # Errors
    /// `Transport` when the source is unreachable or answers non-2xx,
    /// `Decode` when the payload is not a JSON array.
    async fn fetch_orders(&self) -> Result<Vec<RawRecord>, ContractError>;

    /// Fetch the upstream KPI payload, `None` when the source has no KPI endpoint
    async fn fetch_kpis(&self) -> Result<Option<Value>, ContractError>;

    /// Fetch quality test results, empty when the source has no quality endpoint
    async fn fetch_quality(&self) -> Result<Vec<QualityRecord>, ContractError>;
}
