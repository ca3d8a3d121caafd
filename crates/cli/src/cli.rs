//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// MES ETL - manufacturing work order pipeline
#[derive(Parser, Debug)]
#[command(
    name = "mes-etl",
    author,
    version,
    about = "Manufacturing work order ETL pipeline",
    long_about = "Fetches work orders from the MES REST API, cleans them, computes KPIs,\n\
                  checks data quality and exports CSV/JSON artifacts for dashboards.\n\n\
                  Also serves the MES API itself over a SQLite order store."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "MES_ETL_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "MES_ETL_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// Prometheus metrics port (disabled when unset)
    #[arg(long, global = true, env = "MES_ETL_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the ETL pipeline once
    Run(RunArgs),

    /// Run the ETL pipeline at a fixed interval
    Schedule(ScheduleArgs),

    /// Build a summary report from exported artifacts
    Report(ReportArgs),

    /// Serve the MES REST API
    Serve(ServeArgs),

    /// Run data quality checks on a CSV file
    Check(CheckArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),
}

/// Options shared by `run` and `schedule`
#[derive(Parser, Debug, Clone)]
pub struct PipelineArgs {
    /// Path to configuration file (TOML or JSON); defaults apply when missing
    #[arg(short, long, default_value = "config.toml", env = "MES_ETL_CONFIG")]
    pub config: PathBuf,

    /// Override the MES API base URL
    #[arg(long, env = "MES_API_URL")]
    pub api_url: Option<String>,

    /// Override the export directory
    #[arg(short, long, env = "MES_ETL_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Only fetch work orders with this status
    #[arg(long)]
    pub status: Option<String>,

    /// Read work orders from a JSON file instead of the API
    #[arg(long)]
    pub source_file: Option<PathBuf>,
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Validate configuration and exit without running pipeline
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `schedule` command
#[derive(Parser, Debug, Clone)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Seconds between runs (overrides configuration)
    #[arg(long, env = "MES_ETL_INTERVAL")]
    pub interval: Option<u64>,

    /// Stop after this many runs (0 = unlimited)
    #[arg(long, default_value = "0")]
    pub max_runs: u64,
}

/// Arguments for the `report` command
#[derive(Parser, Debug)]
pub struct ReportArgs {
    /// Directory holding exported artifacts
    #[arg(short, long, default_value = "data", env = "MES_ETL_OUTPUT_DIR")]
    pub dir: PathBuf,

    /// Print the report without writing a summary file
    #[arg(long)]
    pub no_write: bool,
}

/// Arguments for the `serve` command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", env = "MES_ETL_CONFIG")]
    pub config: PathBuf,

    /// Bind host (overrides configuration)
    #[arg(long, env = "MES_API_HOST")]
    pub host: Option<String>,

    /// Bind port (overrides configuration)
    #[arg(long, env = "MES_API_PORT")]
    pub port: Option<u16>,

    /// SQLite database path (overrides DB_PATH and configuration)
    #[arg(long)]
    pub db_path: Option<PathBuf>,

    /// JSON file used to seed an empty store
    #[arg(long)]
    pub sample_data: Option<PathBuf>,
}

/// Arguments for the `check` command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// CSV file to check
    #[arg(short, long)]
    pub file: PathBuf,

    /// Required columns, comma separated
    #[arg(long, value_delimiter = ',')]
    pub require: Vec<String>,

    /// Output the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_with_overrides() {
        let cli = Cli::try_parse_from([
            "mes-etl",
            "-v",
            "run",
            "--api-url",
            "http://mes:8000",
            "--status",
            "pending",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.pipeline.api_url.as_deref(), Some("http://mes:8000"));
                assert_eq!(args.pipeline.status.as_deref(), Some("pending"));
                assert!(!args.dry_run);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_check_columns() {
        let cli = Cli::try_parse_from([
            "mes-etl",
            "check",
            "--file",
            "orders.csv",
            "--require",
            "order_id,status",
        ])
        .unwrap();
        match cli.command {
            Commands::Check(args) => assert_eq!(args.require, vec!["order_id", "status"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["mes-etl", "-q", "-v", "report"]).is_err());
    }
}
