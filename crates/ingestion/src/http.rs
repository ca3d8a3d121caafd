//! HTTP Work Order Source
//!
//! One GET per endpoint, no retry.

use std::time::{Duration, Instant};

use contracts::{ContractError, QualityRecord, RawRecord, SourceConfig, WorkOrderSource};
use metrics::histogram;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::decode::{quality_from_value, records_from_value};

/// Work Order Source backed by the MES REST API
#[derive(Debug, Clone)]
pub struct HttpWorkOrderSource {
    config: SourceConfig,
    client: reqwest::Client,
}

impl HttpWorkOrderSource {
    /// Create a client with the configured timeout
    pub fn new(config: SourceConfig) -> Result<Self, ContractError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ContractError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// GET a JSON document
    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, ContractError> {
        let url = self.config.endpoint(path);
        let started = Instant::now();

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| ContractError::transport(&url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = %status, "source answered with an error status");
            return Err(ContractError::transport(
                &url,
                format!("unexpected status {status}"),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ContractError::transport(&url, e.to_string()))?;

        histogram!("mes_etl_source_request_ms", "path" => path.to_string())
            .record(started.elapsed().as_secs_f64() * 1000.0);
        debug!(url = %url, bytes = body.len(), "source responded");

        serde_json::from_str(&body).map_err(|e| ContractError::decode(&url, e.to_string()))
    }
}

impl WorkOrderSource for HttpWorkOrderSource {
    fn name(&self) -> &str {
        &self.config.base_url
    }

    #[instrument(name = "fetch_orders", skip(self), fields(base_url = %self.config.base_url))]
    async fn fetch_orders(&self) -> Result<Vec<RawRecord>, ContractError> {
        let path = &self.config.workorders_path;
        let query: Vec<(&str, &str)> = self
            .config
            .status_filter
            .as_deref()
            .map(|status| vec![("status", status)])
            .unwrap_or_default();

        let value = self.get_json(path, &query).await?;
        let records = records_from_value(value)
            .map_err(|e| e.into_contract(&self.config.endpoint(path)))?;

        info!(count = records.len(), "fetched work orders");
        Ok(records)
    }

    #[instrument(name = "fetch_kpis", skip(self))]
    async fn fetch_kpis(&self) -> Result<Option<Value>, ContractError> {
        let Some(path) = self.config.kpis_path.as_deref() else {
            return Ok(None);
        };
        let value = self.get_json(path, &[]).await?;
        Ok(Some(value))
    }

    #[instrument(name = "fetch_quality", skip(self))]
    async fn fetch_quality(&self) -> Result<Vec<QualityRecord>, ContractError> {
        let Some(path) = self.config.quality_path.as_deref() else {
            return Ok(Vec::new());
        };
        let value = self.get_json(path, &[]).await?;
        let records =
            quality_from_value(value).map_err(|e| e.into_contract(&self.config.endpoint(path)))?;

        info!(count = records.len(), "fetched quality results");
        Ok(records)
    }
}
