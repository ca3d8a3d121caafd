//! Ingestion 错误类型

use contracts::ContractError;
use thiserror::Error;

/// Payload shape errors
#[derive(Debug, Error)]
pub enum IngestionError {
    /// 顶层不是 JSON 数组
    #[error("expected a JSON array, got {found}")]
    NotAnArray {
        /// 实际类型
        found: &'static str,
    },

    /// JSON 语法错误
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl IngestionError {
    /// Attach the endpoint the payload came from
    pub fn into_contract(self, endpoint: &str) -> ContractError {
        ContractError::decode(endpoint, self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_contract_is_decode() {
        let err = IngestionError::NotAnArray { found: "a string" }.into_contract("http://mes/api");
        assert!(err.is_transport());
        assert_eq!(
            err.to_string(),
            "decode error for 'http://mes/api': expected a JSON array, got a string"
        );
    }
}
