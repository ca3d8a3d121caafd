//! # MES ETL
//!
//! Pipeline Orchestrator and scheduler behind the `mes-etl` binary.
//!
//! 一次运行: fetch → sanitize → aggregate → validate → export → summarize。
//! 各次运行相互独立，跨运行的状态只有落盘的导出文件。

pub mod error;
pub mod pipeline;

pub use error::CliError;
pub use pipeline::{Pipeline, PipelineOutcome, PipelineStats, Scheduler};
