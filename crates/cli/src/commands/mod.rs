//! Command implementations.

mod check;
mod report;
mod run;
mod schedule;
mod serve;
mod validate;

pub use check::run_check;
pub use report::run_report;
pub use run::run_pipeline;
pub use schedule::run_schedule;
pub use serve::run_serve;
pub use validate::run_validate;

use anyhow::{Context, Result};
use contracts::PipelineBlueprint;
use std::path::Path;
use tracing::{error, info};

use crate::cli::PipelineArgs;

/// Load the configuration file, or the defaults when it does not exist
pub(crate) fn load_blueprint(path: &Path) -> Result<PipelineBlueprint> {
    if !path.exists() {
        info!(config = %path.display(), "Configuration file not found, using defaults");
        return Ok(PipelineBlueprint::default());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    info!(config = %path.display(), sinks = blueprint.sinks.len(), "Configuration loaded");
    Ok(blueprint)
}

/// Load configuration and apply CLI overrides
pub(crate) fn pipeline_blueprint(args: &PipelineArgs) -> Result<PipelineBlueprint> {
    let mut blueprint = load_blueprint(&args.config)?;

    if let Some(ref url) = args.api_url {
        info!(api_url = %url, "Overriding API base URL from CLI");
        blueprint.source.base_url = url.clone();
    }
    if let Some(ref dir) = args.output_dir {
        info!(output_dir = %dir.display(), "Overriding output directory from CLI");
        blueprint.export.output_dir = dir.clone();
    }
    if let Some(ref status) = args.status {
        blueprint.source.status_filter = Some(status.clone());
    }

    config_loader::ConfigLoader::validate(&blueprint)
        .context("Configuration invalid after CLI overrides")?;
    Ok(blueprint)
}

/// Resolve on Ctrl+C or SIGTERM
pub(crate) async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args(config: PathBuf) -> PipelineArgs {
        PipelineArgs {
            config,
            api_url: Some("http://mes.local:9000".into()),
            output_dir: Some(PathBuf::from("/tmp/exports")),
            status: Some("pending".into()),
            source_file: None,
        }
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let blueprint = load_blueprint(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(blueprint.schedule.interval_secs, 60);
    }

    #[test]
    fn test_overrides_applied() {
        let blueprint = pipeline_blueprint(&args(PathBuf::from("/nonexistent.toml"))).unwrap();
        assert_eq!(blueprint.source.base_url, "http://mes.local:9000");
        assert_eq!(blueprint.export.output_dir, PathBuf::from("/tmp/exports"));
        assert_eq!(blueprint.source.status_filter.as_deref(), Some("pending"));
    }

    #[test]
    fn test_invalid_override_rejected() {
        let mut bad = args(PathBuf::from("/nonexistent.toml"));
        bad.api_url = Some("ftp://mes".into());
        assert!(pipeline_blueprint(&bad).is_err());
    }
}
