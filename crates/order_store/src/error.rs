//! 仓储层错误类型

use contracts::ContractError;
use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("记录已存在: order_id={0}")]
    Conflict(String),

    #[error("数据库锁获取失败: {0}")]
    Lock(String),

    #[error("数据库错误: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("示例数据读取失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("示例数据解析失败: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for ContractError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(order_id) => ContractError::Conflict { order_id },
            other => ContractError::store(other.to_string()),
        }
    }
}
