//! Pipeline statistics and the end-of-run digest.

use std::time::Duration;

use contracts::{KpiSummary, PipelineState};

/// Counters collected during one pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Raw records returned by the source
    pub fetched_rows: usize,

    /// Records that survived sanitization
    pub clean_rows: usize,

    /// Quality test results fetched
    pub quality_records: usize,

    /// Whether the upstream KPI endpoint answered
    pub upstream_kpis: bool,

    /// Sinks configured for the export
    pub sinks_configured: usize,

    /// Sinks that failed to write
    pub sinks_failed: usize,

    /// Artifact files created
    pub artifacts_written: usize,

    /// Validation issues raised
    pub validation_issues: usize,

    /// Total duration of the run
    pub duration: Duration,
}

impl PipelineStats {
    /// Rows removed by the sanitizer
    pub fn dropped_rows(&self) -> usize {
        self.fetched_rows.saturating_sub(self.clean_rows)
    }

    /// Dropped rows as a percentage of fetched rows
    pub fn drop_rate(&self) -> f64 {
        contracts::percentage(self.dropped_rows() as f64, self.fetched_rows as f64)
    }

    /// Human-readable digest of counts and rates
    pub fn digest(&self, state: PipelineState, kpis: &KpiSummary) -> String {
        let mut out = String::new();
        out.push_str("\n=== Pipeline Summary ===\n\n");
        out.push_str(&format!("State:              {state}\n"));
        out.push_str(&format!(
            "Duration:           {:.2}s\n",
            self.duration.as_secs_f64()
        ));
        out.push_str(&format!("Fetched rows:       {}\n", self.fetched_rows));
        out.push_str(&format!(
            "Clean rows:         {} ({} dropped, {:.2}%)\n",
            self.clean_rows,
            self.dropped_rows(),
            self.drop_rate()
        ));
        out.push_str(&format!("Quality records:    {}\n", self.quality_records));
        out.push_str(&format!("Validation issues:  {}\n", self.validation_issues));
        out.push_str(&format!(
            "Sinks:              {} configured, {} failed\n",
            self.sinks_configured, self.sinks_failed
        ));
        out.push_str(&format!("Artifacts written:  {}\n", self.artifacts_written));

        if !kpis.is_empty() {
            out.push_str("\nKPIs\n");
            for (name, value) in kpis.iter() {
                out.push_str(&format!("  {name:<28} {}\n", value.as_f64()));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dropped_rows() {
        let stats = PipelineStats {
            fetched_rows: 8,
            clean_rows: 6,
            ..Default::default()
        };
        assert_eq!(stats.dropped_rows(), 2);
        assert_eq!(stats.drop_rate(), 25.0);
        assert_eq!(PipelineStats::default().drop_rate(), 0.0);
    }

    #[test]
    fn test_digest_lists_kpis() {
        let stats = PipelineStats {
            fetched_rows: 3,
            clean_rows: 2,
            ..Default::default()
        };
        let mut kpis = KpiSummary::new();
        kpis.insert_rate("completion_rate", 50.0);

        let digest = stats.digest(PipelineState::Done, &kpis);
        assert!(digest.contains("State:              done"));
        assert!(digest.contains("1 dropped, 33.33%"));
        assert!(digest.contains("completion_rate"));
    }
}
