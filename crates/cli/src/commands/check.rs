//! `check` command implementation.

use anyhow::{Context, Result};
use contracts::ValidationReport;
use mes_etl::CliError;

use crate::cli::CheckArgs;

/// Execute the `check` command
pub fn run_check(args: &CheckArgs) -> Result<()> {
    let dataset = reporting::load_dataset_csv(&args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;
    let report = processing::validate(&dataset, &args.require);
    observability::record_validation(&report);

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{json}");
    } else {
        print_report(&args.file.display().to_string(), &report);
    }

    if report.is_valid {
        Ok(())
    } else {
        Err(CliError::invalid_data(&report.issues).into())
    }
}

fn print_report(file: &str, report: &ValidationReport) {
    let verdict = if report.is_valid { "PASSED" } else { "FAILED" };
    println!("\nData quality check {verdict}: {file}\n");
    println!("  Rows: {}", report.row_count);
    println!("  Columns: {}", report.column_count);
    println!("  Duplicate rows: {}", report.duplicate_count);

    let with_nulls: Vec<_> = report.null_counts.iter().filter(|(_, n)| **n > 0).collect();
    if !with_nulls.is_empty() {
        println!("\n  Null cells:");
        for (column, count) in with_nulls {
            println!("    {column}: {count}");
        }
    }

    if !report.issues.is_empty() {
        println!("\n  Issues:");
        for issue in &report.issues {
            println!("    - {issue}");
        }
    }
    println!();
}
