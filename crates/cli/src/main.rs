//! # MES ETL CLI
//!
//! 命令行接口入口点。
//!
//! 提供：
//! - 配置加载与验证
//! - 单次运行 / 定时调度
//! - 报表生成、数据检查与 REST API 服务

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use observability::ObservabilityConfig;
use tracing::info;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    observability::init_with_config(
        ObservabilityConfig {
            log_format: cli.log_format.into(),
            metrics_port: cli.metrics_port,
            quiet: cli.quiet,
            ..Default::default()
        }
        .with_verbosity(cli.verbose),
    )?;

    info!(version = env!("CARGO_PKG_VERSION"), "MES ETL starting");

    let result = match &cli.command {
        Commands::Run(args) => commands::run_pipeline(args).await,
        Commands::Schedule(args) => commands::run_schedule(args).await,
        Commands::Report(args) => commands::run_report(args),
        Commands::Serve(args) => commands::run_serve(args).await,
        Commands::Check(args) => commands::run_check(args),
        Commands::Validate(args) => commands::run_validate(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}
