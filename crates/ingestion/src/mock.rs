//! Mock Work Order Source
//!
//! 用于无 MES API 环境的测试与离线运行。

use std::path::Path;

use contracts::{ContractError, QualityRecord, RawRecord, WorkOrderSource};
use serde_json::Value;
use tracing::debug;

use crate::decode::records_from_value;
use crate::error::IngestionError;

/// In-memory Work Order Source
#[derive(Debug, Clone, Default)]
pub struct MockWorkOrderSource {
    records: Vec<RawRecord>,
    kpis: Option<Value>,
    quality: Vec<QualityRecord>,
    /// 设置后每次 fetch 都返回 Transport 错误
    failure: Option<String>,
}

impl MockWorkOrderSource {
    /// 创建新的 Mock 源
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self {
            records,
            ..Default::default()
        }
    }

    /// 从 JSON 数组文件加载
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ContractError> {
        let path = path.as_ref();
        let endpoint = path.display().to_string();
        let content = std::fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&content)
            .map_err(|e| IngestionError::from(e).into_contract(&endpoint))?;
        let records = records_from_value(value).map_err(|e| e.into_contract(&endpoint))?;
        debug!(path = %endpoint, count = records.len(), "loaded mock work orders");
        Ok(Self::new(records))
    }

    /// 一个总是不可达的源
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn with_kpis(mut self, kpis: Value) -> Self {
        self.kpis = Some(kpis);
        self
    }

    pub fn with_quality(mut self, quality: Vec<QualityRecord>) -> Self {
        self.quality = quality;
        self
    }

    fn check_reachable(&self) -> Result<(), ContractError> {
        match &self.failure {
            Some(message) => Err(ContractError::transport("mock", message.clone())),
            None => Ok(()),
        }
    }
}

impl WorkOrderSource for MockWorkOrderSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_orders(&self) -> Result<Vec<RawRecord>, ContractError> {
        self.check_reachable()?;
        Ok(self.records.clone())
    }

    async fn fetch_kpis(&self) -> Result<Option<Value>, ContractError> {
        self.check_reachable()?;
        Ok(self.kpis.clone())
    }

    async fn fetch_quality(&self) -> Result<Vec<QualityRecord>, ContractError> {
        self.check_reachable()?;
        Ok(self.quality.clone())
    }
}
