//! `schedule` command implementation.

use std::time::Duration;

use anyhow::{Context, Result};
use contracts::{PipelineBlueprint, WorkOrderSource};
use ingestion::{HttpWorkOrderSource, MockWorkOrderSource};
use mes_etl::{Pipeline, Scheduler};
use tracing::info;

use super::{pipeline_blueprint, shutdown_signal};
use crate::cli::ScheduleArgs;

/// Execute the `schedule` command
pub async fn run_schedule(args: &ScheduleArgs) -> Result<()> {
    let blueprint = pipeline_blueprint(&args.pipeline)?;
    let interval_secs = args.interval.unwrap_or(blueprint.schedule.interval_secs);
    if interval_secs == 0 {
        anyhow::bail!("--interval must be greater than 0");
    }
    let scheduler = Scheduler::new(Duration::from_secs(interval_secs)).with_max_runs(args.max_runs);

    println!("Running ETL every {interval_secs} seconds. Press Ctrl+C to stop.");

    match &args.pipeline.source_file {
        Some(path) => {
            let source = MockWorkOrderSource::from_json_file(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            schedule(scheduler, blueprint, source).await
        }
        None => {
            let source = HttpWorkOrderSource::new(blueprint.source.clone())
                .context("Failed to create HTTP source")?;
            schedule(scheduler, blueprint, source).await
        }
    }
}

async fn schedule<S: WorkOrderSource>(
    scheduler: Scheduler,
    blueprint: PipelineBlueprint,
    source: S,
) -> Result<()> {
    let pipeline = Pipeline::new(blueprint, source);
    let history = scheduler.run(&pipeline, shutdown_signal()).await;

    info!(
        runs = history.total_runs,
        completed = history.completed_runs,
        "Scheduler stopped"
    );
    println!("\n{history}");
    Ok(())
}
