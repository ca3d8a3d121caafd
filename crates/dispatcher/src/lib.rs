//! # Dispatcher
//!
//! 导出分发模块。
//!
//! 负责：
//! - 消费每次运行产生的 `ExportBatch`
//! - Fan-out 到多个 sinks
//! - 隔离失败的 sink，一个 sink 失败不影响其它 sink

pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod sinks;

pub use contracts::{ExportBatch, ExportSink};
pub use dispatcher::{create_dispatcher, DispatchOutcome, Dispatcher, DispatcherBuilder, DispatcherConfig};
pub use error::DispatcherError;
pub use handle::{SinkHandle, SinkReport};
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use sinks::{CsvSink, JsonSink, LogSink};
