//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::{PipelineBlueprint, WorkOrderSource};
use ingestion::{HttpWorkOrderSource, MockWorkOrderSource};
use mes_etl::{CliError, Pipeline};
use tracing::info;

use super::pipeline_blueprint;
use crate::cli::RunArgs;

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    let blueprint = pipeline_blueprint(&args.pipeline)?;

    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    match &args.pipeline.source_file {
        Some(path) => {
            info!(path = %path.display(), "Reading work orders from file");
            let source = MockWorkOrderSource::from_json_file(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            run_once(blueprint, source).await
        }
        None => {
            let source = HttpWorkOrderSource::new(blueprint.source.clone())
                .context("Failed to create HTTP source")?;
            run_once(blueprint, source).await
        }
    }
}

async fn run_once<S: WorkOrderSource>(blueprint: PipelineBlueprint, source: S) -> Result<()> {
    let pipeline = Pipeline::new(blueprint, source);
    let outcome = pipeline.run().await.context("Pipeline execution failed")?;
    outcome.print_summary();

    if let Some(reason) = outcome.abort_reason {
        return Err(CliError::pipeline_aborted(reason).into());
    }
    for path in &outcome.artifacts {
        println!("  -> {}", path.display());
    }
    Ok(())
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &PipelineBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Source:");
    println!(
        "  Work orders: {}",
        blueprint.source.endpoint(&blueprint.source.workorders_path)
    );
    if let Some(ref path) = blueprint.source.kpis_path {
        println!("  KPIs: {}", blueprint.source.endpoint(path));
    }
    if let Some(ref path) = blueprint.source.quality_path {
        println!("  Quality: {}", blueprint.source.endpoint(path));
    }
    if let Some(ref status) = blueprint.source.status_filter {
        println!("  Status filter: {status}");
    }
    println!("\nRequired fields: {}", blueprint.sanitize.required_fields.join(", "));
    println!("Output dir: {}", blueprint.export.output_dir.display());

    println!("\nSinks ({}):", blueprint.sinks.len());
    for sink in &blueprint.sinks {
        println!("  - {} ({:?})", sink.name, sink.sink_type);
    }
    println!();
}
