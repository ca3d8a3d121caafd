//! SqliteOrderStore - `orders` 表仓储

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDateTime;
use contracts::{ContractError, OrderRecord, OrderStore, Priority, QualityRecord, RawRecord};
use processing::Sanitizer;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::error::{StoreError, StoreResult};

const SELECT_COLUMNS: &str = "order_id, line_id, item_name, quantity_planned, quantity_produced, \
                              status, priority, start_time, end_time";

const QUALITY_COLUMNS: &str = "metric_id, order_id, test_type, result, measurement, \
                               specification_min, specification_max, timestamp";

/// Work order repository over a single SQLite connection
///
/// The connection is serialized behind a mutex, so the store can be shared
/// between request handlers.
#[derive(Clone)]
pub struct SqliteOrderStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteOrderStore {
    /// Open (or create) the database file, creating parent directories
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "opened order store");
        Ok(Self::from_connection(Arc::new(Mutex::new(conn))))
    }

    /// Private in-memory database
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self::from_connection(Arc::new(Mutex::new(conn))))
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Lock(e.to_string()))
    }

    /// Create the `orders` and `quality_metrics` tables if they do not exist
    pub fn initialize(&self) -> StoreResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS orders (
                order_id          TEXT PRIMARY KEY,
                line_id           TEXT,
                item_name         TEXT NOT NULL,
                quantity_planned  INTEGER NOT NULL,
                quantity_produced INTEGER NOT NULL DEFAULT 0,
                status            TEXT NOT NULL,
                priority          TEXT,
                start_time        TEXT,
                end_time          TEXT
            );

            CREATE TABLE IF NOT EXISTS quality_metrics (
                id                INTEGER PRIMARY KEY AUTOINCREMENT,
                metric_id         TEXT UNIQUE,
                order_id          TEXT,
                test_type         TEXT,
                result            TEXT NOT NULL,
                measurement       REAL,
                specification_min REAL,
                specification_max REAL,
                timestamp         TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_quality_order ON quality_metrics(order_id);
            "#,
        )?;
        Ok(())
    }

    /// Seed an empty store from a JSON array of raw orders
    ///
    /// Records go through the sanitizer first, so malformed entries are dropped
    /// the same way the pipeline drops them. Returns the number inserted; a
    /// non-empty store or a missing file inserts nothing.
    #[instrument(name = "load_sample_data", skip(self), fields(path = %path.display()))]
    pub fn load_sample_data(&self, path: &Path) -> StoreResult<usize> {
        if self.count_rows()? > 0 {
            debug!("store already populated, sample data skipped");
            return Ok(0);
        }
        if !path.exists() {
            warn!("sample data file not found");
            return Ok(0);
        }

        let raw: Vec<RawRecord> = read_json_array(path)?
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();

        let orders = Sanitizer::default().sanitize(&raw);
        let mut inserted = 0;
        for order in &orders {
            match self.insert(order) {
                Ok(()) => inserted += 1,
                Err(StoreError::Conflict(id)) => warn!(order_id = %id, "duplicate sample order skipped"),
                Err(e) => return Err(e),
            }
        }

        info!(inserted, dropped = raw.len() - orders.len(), "loaded sample orders");
        Ok(inserted)
    }

    /// Seed an empty quality table from a JSON array of quality results
    ///
    /// Entries without a `result` are skipped. Returns the number inserted.
    #[instrument(name = "load_sample_quality", skip(self), fields(path = %path.display()))]
    pub fn load_sample_quality(&self, path: &Path) -> StoreResult<usize> {
        if self.count_table("quality_metrics")? > 0 {
            debug!("quality table already populated, sample data skipped");
            return Ok(0);
        }
        if !path.exists() {
            warn!("sample quality file not found");
            return Ok(0);
        }

        let mut inserted = 0;
        for item in read_json_array(path)? {
            let record: QualityRecord = match serde_json::from_value(item) {
                Ok(record) => record,
                Err(e) => {
                    warn!(error = %e, "malformed sample quality result skipped");
                    continue;
                }
            };
            match self.add_quality(&record) {
                Ok(()) => inserted += 1,
                Err(StoreError::Conflict(id)) => warn!(metric_id = %id, "duplicate sample metric skipped"),
                Err(e) => return Err(e),
            }
        }

        info!(inserted, "loaded sample quality results");
        Ok(inserted)
    }

    /// Insert one quality result; a repeated `metric_id` is a conflict
    pub fn add_quality(&self, record: &QualityRecord) -> StoreResult<()> {
        let conn = self.get_conn()?;
        let result = conn.execute(
            &format!("INSERT INTO quality_metrics ({QUALITY_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"),
            params![
                record.metric_id,
                record.order_id,
                record.test_type,
                record.result,
                record.measurement,
                record.specification_min,
                record.specification_max,
                record.timestamp,
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(StoreError::Conflict(record.metric_id.clone().unwrap_or_default()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn count_rows(&self) -> StoreResult<usize> {
        self.count_table("orders")
    }

    fn count_table(&self, table: &str) -> StoreResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        Ok(count.max(0) as usize)
    }

    fn insert(&self, order: &OrderRecord) -> StoreResult<()> {
        let conn = self.get_conn()?;
        let result = conn.execute(
            &format!("INSERT INTO orders ({SELECT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"),
            params![
                order.order_id,
                order.line_id,
                order.item_name,
                order.quantity_planned as i64,
                order.quantity_produced as i64,
                order.status,
                order.priority.map(|p| p.as_str()),
                order.start_time,
                order.end_time,
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(StoreError::Conflict(order.order_id.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn query_orders(&self, status: Option<&str>) -> StoreResult<Vec<OrderRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM orders WHERE ?1 IS NULL OR status = ?1 ORDER BY rowid"
        ))?;
        let rows = stmt.query_map(params![status], map_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    fn query_quality(&self, order_id: Option<&str>, limit: usize) -> StoreResult<Vec<QualityRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {QUALITY_COLUMNS} FROM quality_metrics \
             WHERE ?1 IS NULL OR order_id = ?1 ORDER BY id LIMIT ?2"
        ))?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt.query_map(params![order_id, limit], map_quality_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    fn query_one(&self, order_id: &str) -> StoreResult<Option<OrderRecord>> {
        let conn = self.get_conn()?;
        let order = conn
            .query_row(
                &format!("SELECT {SELECT_COLUMNS} FROM orders WHERE order_id = ?1"),
                params![order_id],
                map_row,
            )
            .optional()?;
        Ok(order)
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<OrderRecord> {
    let priority: Option<String> = row.get(6)?;
    Ok(OrderRecord {
        order_id: row.get(0)?,
        line_id: row.get(1)?,
        item_name: row.get(2)?,
        quantity_planned: row.get::<_, i64>(3)?.max(0) as u64,
        quantity_produced: row.get::<_, i64>(4)?.max(0) as u64,
        status: row.get(5)?,
        priority: priority.as_deref().and_then(Priority::parse),
        start_time: row.get::<_, Option<NaiveDateTime>>(7)?,
        end_time: row.get::<_, Option<NaiveDateTime>>(8)?,
    })
}

fn map_quality_row(row: &Row<'_>) -> rusqlite::Result<QualityRecord> {
    Ok(QualityRecord {
        metric_id: row.get(0)?,
        order_id: row.get(1)?,
        test_type: row.get(2)?,
        result: row.get(3)?,
        measurement: row.get(4)?,
        specification_min: row.get(5)?,
        specification_max: row.get(6)?,
        timestamp: row.get(7)?,
    })
}

/// Elements of a top-level JSON array; any other document yields nothing
fn read_json_array(path: &Path) -> StoreResult<Vec<Value>> {
    let content = std::fs::read_to_string(path)?;
    match serde_json::from_str::<Value>(&content)? {
        Value::Array(items) => Ok(items),
        _ => Ok(Vec::new()),
    }
}

impl OrderStore for SqliteOrderStore {
    fn list(&self, status: Option<&str>) -> Result<Vec<OrderRecord>, ContractError> {
        Ok(self.query_orders(status)?)
    }

    fn get(&self, order_id: &str) -> Result<Option<OrderRecord>, ContractError> {
        Ok(self.query_one(order_id)?)
    }

    fn create(&self, order: &OrderRecord) -> Result<(), ContractError> {
        self.insert(order)?;
        debug!(order_id = %order.order_id, "order created");
        Ok(())
    }

    fn list_quality(
        &self,
        order_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<QualityRecord>, ContractError> {
        Ok(self.query_quality(order_id, limit)?)
    }

    fn count(&self) -> Result<usize, ContractError> {
        Ok(self.count_rows()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn store() -> SqliteOrderStore {
        let store = SqliteOrderStore::in_memory().unwrap();
        store.initialize().unwrap();
        store
    }

    #[test]
    fn test_create_get_list() {
        let store = store();
        let mut order = OrderRecord::new("WO-1", "Widget", 100, "in_progress");
        order.line_id = Some("L1".into());
        order.quantity_produced = 40;
        order.priority = Some(Priority::High);
        order.start_time = NaiveDate::from_ymd_opt(2024, 1, 15)
            .and_then(|d| d.and_hms_opt(8, 0, 0));
        store.create(&order).unwrap();
        store
            .create(&OrderRecord::new("WO-2", "Gear", 50, "pending"))
            .unwrap();

        assert_eq!(store.get("WO-1").unwrap(), Some(order));
        assert_eq!(store.get("missing").unwrap(), None);
        assert!(matches!(
            store.require("missing"),
            Err(ContractError::NotFound { ref order_id }) if order_id == "missing"
        ));
        assert_eq!(store.require("WO-2").unwrap().item_name, "Gear");

        let all = store.list(None).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].order_id, "WO-1");

        let pending = store.list(Some("pending")).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].order_id, "WO-2");
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_duplicate_create_conflicts() {
        let store = store();
        let order = OrderRecord::new("WO-1", "Widget", 1, "pending");
        store.create(&order).unwrap();
        let err = store.create(&order).unwrap_err();
        assert!(matches!(err, ContractError::Conflict { ref order_id } if order_id == "WO-1"));
    }

    #[test]
    fn test_load_sample_data_only_when_empty() {
        let dir = tempfile::tempdir().unwrap();
        let sample = dir.path().join("sample.json");
        std::fs::write(
            &sample,
            r#"[
                {"order_id": "S1", "line_id": "L1", "item_name": "Widget", "quantity": 10, "status": "Pending"},
                {"order_id": null, "line_id": "L1", "item_name": "Widget", "quantity": 10, "status": "pending"},
                {"order_id": "S2", "line_id": "L2", "item_name": "Gear", "quantity": "7", "status": "completed"}
            ]"#,
        )
        .unwrap();

        let store = SqliteOrderStore::open(&dir.path().join("db/orders.db")).unwrap();
        store.initialize().unwrap();
        assert_eq!(store.load_sample_data(&sample).unwrap(), 2);
        assert_eq!(store.load_sample_data(&sample).unwrap(), 0);

        let s1 = store.get("S1").unwrap().unwrap();
        assert_eq!(s1.status, "pending");
        assert_eq!(store.get("S2").unwrap().unwrap().quantity_planned, 7);
    }

    #[test]
    fn test_quality_seed_filter_and_limit() {
        let dir = tempfile::tempdir().unwrap();
        let sample = dir.path().join("quality.json");
        std::fs::write(
            &sample,
            r#"[
                {"metric_id": "QM-1", "order_id": "WO-1", "test_type": "dimensional", "result": "pass", "measurement": 10.02, "specification_min": 9.95, "specification_max": 10.05},
                {"metric_id": "QM-2", "order_id": "WO-2", "result": "fail"},
                {"metric_id": "QM-3", "order_id": "WO-1", "result": "pass", "timestamp": "2024-01-15T12:00:00"},
                {"metric_id": "QM-4", "order_id": "WO-1"}
            ]"#,
        )
        .unwrap();

        let store = store();
        assert_eq!(store.load_sample_quality(&sample).unwrap(), 3);
        assert_eq!(store.load_sample_quality(&sample).unwrap(), 0);

        let all = store.list_quality(None, 20).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].metric_id.as_deref(), Some("QM-1"));
        assert_eq!(all[0].measurement, Some(10.02));

        let wo1 = store.list_quality(Some("WO-1"), 20).unwrap();
        assert_eq!(wo1.len(), 2);
        assert!(wo1.iter().all(|q| q.passed()));
        assert_eq!(store.list_quality(None, 1).unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_metric_conflicts() {
        let store = store();
        let mut record = QualityRecord::new("pass");
        record.metric_id = Some("QM-1".into());
        store.add_quality(&record).unwrap();
        assert!(matches!(
            store.add_quality(&record),
            Err(StoreError::Conflict(ref id)) if id == "QM-1"
        ));
    }

    #[test]
    fn test_missing_sample_file() {
        let store = store();
        assert_eq!(
            store.load_sample_data(Path::new("/nonexistent/sample.json")).unwrap(),
            0
        );
    }
}
