//! Pipeline orchestration module.

mod orchestrator;
mod scheduler;
mod stats;

pub use orchestrator::{Pipeline, PipelineOutcome};
pub use scheduler::Scheduler;
pub use stats::PipelineStats;
