//! # Order Store
//!
//! SQLite-backed work order persistence.
//!
//! 职责:
//! - 管理 `orders` / `quality_metrics` 表 (建表、示例数据导入)
//! - 实现 `contracts::OrderStore` (list / get / create / list_quality)
//!
//! 存储位置由 `DB_PATH` 环境变量决定，缺省为 `data/orders.db`。

mod error;
mod sqlite;

pub use contracts::OrderStore;
pub use error::{StoreError, StoreResult};
pub use sqlite::SqliteOrderStore;

use std::path::{Path, PathBuf};

/// Environment variable selecting the store file
pub const DB_PATH_ENV: &str = "DB_PATH";

/// Store path: `DB_PATH` when set, then `configured`, then `data/orders.db`
pub fn resolve_db_path(configured: Option<&Path>) -> PathBuf {
    std::env::var_os(DB_PATH_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| configured.map(Path::to_path_buf))
        .unwrap_or_else(contracts::default_db_path)
}
