//! `report` command implementation.

use anyhow::{Context, Result};
use reporting::ReportGenerator;

use crate::cli::ReportArgs;

/// Execute the `report` command
pub fn run_report(args: &ReportArgs) -> Result<()> {
    let generator = ReportGenerator::new(&args.dir);

    let summary = if args.no_write {
        generator.build()
    } else {
        generator.generate().map(|(summary, path)| {
            eprintln!("Summary written to {}", path.display());
            summary
        })
    }
    .with_context(|| format!("Failed to build report for {}", args.dir.display()))?;

    let json = serde_json::to_string_pretty(&summary).context("Failed to serialize report")?;
    println!("{json}");
    Ok(())
}
