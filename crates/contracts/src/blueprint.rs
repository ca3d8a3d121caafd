//! PipelineBlueprint - Config Loader output
//!
//! Describes the whole deployment: source endpoints, cleaning rules, export
//! routing, schedule, order store and REST server. Every section has defaults,
//! so an empty document is a runnable local setup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Full pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineBlueprint {
    #[serde(default)]
    pub version: ConfigVersion,

    /// Work Order Source endpoints
    #[serde(default)]
    pub source: SourceConfig,

    /// Sanitizer rules
    #[serde(default)]
    pub sanitize: SanitizeConfig,

    /// Data quality checks
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Export location
    #[serde(default)]
    pub export: ExportConfig,

    /// Output routing
    #[serde(default = "default_sinks")]
    pub sinks: Vec<SinkConfig>,

    #[serde(default)]
    pub schedule: ScheduleConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for PipelineBlueprint {
    fn default() -> Self {
        Self {
            version: ConfigVersion::default(),
            source: SourceConfig::default(),
            sanitize: SanitizeConfig::default(),
            validation: ValidationConfig::default(),
            export: ExportConfig::default(),
            sinks: default_sinks(),
            schedule: ScheduleConfig::default(),
            store: StoreConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

/// Work Order Source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Work order list path
    #[serde(default = "default_workorders_path")]
    pub workorders_path: String,

    /// Upstream KPI path (None = not fetched)
    #[serde(default = "default_kpis_path")]
    pub kpis_path: Option<String>,

    /// Quality metrics path (None = not fetched)
    #[serde(default)]
    pub quality_path: Option<String>,

    /// Server-side `status` filter
    #[serde(default)]
    pub status_filter: Option<String>,

    /// Request timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            workorders_path: default_workorders_path(),
            kpis_path: default_kpis_path(),
            quality_path: None,
            status_filter: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SourceConfig {
    /// Join the base URL with an endpoint path
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_workorders_path() -> String {
    "/api/v1/workorders".to_string()
}

fn default_kpis_path() -> Option<String> {
    Some("/api/v1/kpis".to_string())
}

fn default_timeout_secs() -> u64 {
    30
}

/// Sanitizer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanitizeConfig {
    /// Rows missing any of these fields (under any alias) are dropped
    #[serde(default = "default_required_fields")]
    pub required_fields: Vec<String>,
}

impl Default for SanitizeConfig {
    fn default() -> Self {
        Self {
            required_fields: default_required_fields(),
        }
    }
}

/// Default sanitizer schema
pub fn default_required_fields() -> Vec<String> {
    ["order_id", "line_id", "item_name", "quantity", "status"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Validator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default = "default_required_columns")]
    pub required_columns: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            required_columns: default_required_columns(),
        }
    }
}

fn default_required_columns() -> Vec<String> {
    [
        "order_id",
        "item_name",
        "quantity_planned",
        "quantity_produced",
        "status",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory receiving every artifact
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data")
}

/// Sink output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink name
    pub name: String,

    /// Sink type
    pub sink_type: SinkType,

    /// Queue capacity
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Type-specific parameters (e.g. `base_path`)
    #[serde(default)]
    pub params: HashMap<String, String>,
}

impl SinkConfig {
    pub fn new(name: impl Into<String>, sink_type: SinkType) -> Self {
        Self {
            name: name.into(),
            sink_type,
            queue_capacity: default_queue_capacity(),
            params: HashMap::new(),
        }
    }
}

fn default_queue_capacity() -> usize {
    8
}

fn default_sinks() -> Vec<SinkConfig> {
    vec![
        SinkConfig::new("orders_csv", SinkType::Csv),
        SinkConfig::new("kpis_json", SinkType::Json),
    ]
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// Tabular export
    Csv,
    /// Structured export
    Json,
    /// Log output
    Log,
}

/// Scheduler settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

fn default_interval_secs() -> u64 {
    60
}

/// Order Store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// JSON array used to seed an empty store
    #[serde(default = "default_sample_data")]
    pub sample_data: Option<PathBuf>,

    /// JSON array of quality results used to seed an empty quality table
    #[serde(default = "default_sample_quality")]
    pub sample_quality: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            sample_data: default_sample_data(),
            sample_quality: default_sample_quality(),
        }
    }
}

/// Conventional local store path
pub fn default_db_path() -> PathBuf {
    PathBuf::from("data/orders.db")
}

fn default_sample_data() -> Option<PathBuf> {
    Some(PathBuf::from("data/sample_orders.json"))
}

fn default_sample_quality() -> Option<PathBuf> {
    Some(PathBuf::from("data/sample_quality.json"))
}

/// REST server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}
