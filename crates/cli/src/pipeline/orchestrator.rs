//! Pipeline orchestrator - drives one run through the state machine.
//!
//! ```text
//! Idle -> Fetching -> Processing -> Exporting -> Summarizing -> Done
//!            |                          |
//!            +--------> Aborted <-------+
//! ```
//!
//! Transport failures and empty fetches abort before anything is written.
//! Export aborts only when every configured sink failed.

use std::path::PathBuf;
use std::time::Instant;

use chrono::Local;
use contracts::{
    timestamp_tag, ContractError, Dataset, ExportBatch, KpiSummary, PipelineBlueprint,
    PipelineState, QualityRecord, RawRecord, ValidationReport, WorkOrderSource,
};
use processing::{calculate_kpis, enrich, validate, Sanitizer};
use serde_json::Value;
use tracing::{debug, info, info_span, warn, Instrument};

use super::PipelineStats;

/// Result of one run
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// Terminal state, `Done` or `Aborted`
    pub state: PipelineState,
    pub stats: PipelineStats,
    /// KPIs computed from the snapshot (empty when aborted during fetch)
    pub kpis: KpiSummary,
    /// Data quality report (None when aborted during fetch)
    pub validation: Option<ValidationReport>,
    /// Files written by the sinks
    pub artifacts: Vec<PathBuf>,
    pub abort_reason: Option<String>,
}

impl PipelineOutcome {
    pub fn is_done(&self) -> bool {
        self.state == PipelineState::Done
    }

    /// Print the digest to stdout
    pub fn print_summary(&self) {
        println!("{}", self.stats.digest(self.state, &self.kpis));
        if let Some(reason) = &self.abort_reason {
            println!("Abort reason: {reason}\n");
        }
    }
}

/// What the fetch stage brought back
struct Snapshot {
    orders: Vec<RawRecord>,
    production_stats: Option<Value>,
    quality: Vec<QualityRecord>,
}

/// Per-run mutable context
struct RunContext {
    state: PipelineState,
    stats: PipelineStats,
    started: Instant,
}

impl RunContext {
    fn new() -> Self {
        Self {
            state: PipelineState::Idle,
            stats: PipelineStats::default(),
            started: Instant::now(),
        }
    }

    fn advance(&mut self, next: PipelineState) -> Result<(), ContractError> {
        self.state = self.state.transition(next)?;
        debug!(state = %self.state, "pipeline state changed");
        Ok(())
    }

    fn finish(
        mut self,
        kpis: KpiSummary,
        validation: Option<ValidationReport>,
        artifacts: Vec<PathBuf>,
        abort_reason: Option<String>,
    ) -> PipelineOutcome {
        self.stats.duration = self.started.elapsed();
        observability::record_run_outcome(
            self.state,
            self.stats.duration.as_secs_f64() * 1000.0,
        );
        PipelineOutcome {
            state: self.state,
            stats: self.stats,
            kpis,
            validation,
            artifacts,
            abort_reason,
        }
    }

    fn abort(mut self, reason: String) -> Result<PipelineOutcome, ContractError> {
        self.advance(PipelineState::Aborted)?;
        warn!(reason = %reason, "Pipeline aborted");
        Ok(self.finish(KpiSummary::new(), None, Vec::new(), Some(reason)))
    }
}

/// Main pipeline orchestrator
///
/// Holds no state between runs, so the scheduler reuses one instance.
pub struct Pipeline<S> {
    blueprint: PipelineBlueprint,
    source: S,
}

impl<S: WorkOrderSource> Pipeline<S> {
    pub fn new(blueprint: PipelineBlueprint, source: S) -> Self {
        Self { blueprint, source }
    }

    /// Run the pipeline once
    ///
    /// Aborted runs are an `Ok` outcome; `Err` means an illegal state
    /// transition was attempted.
    pub async fn run(&self) -> Result<PipelineOutcome, ContractError> {
        let run_tag = timestamp_tag(&Local::now());
        let span = info_span!("pipeline_run", run = %run_tag, source = %self.source.name());
        self.run_inner().instrument(span).await
    }

    async fn run_inner(&self) -> Result<PipelineOutcome, ContractError> {
        let mut ctx = RunContext::new();

        // ===== FETCHING =====
        ctx.advance(PipelineState::Fetching)?;
        let snapshot = match self.fetch().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "Fetch failed");
                return ctx.abort(e.to_string());
            }
        };
        if snapshot.orders.is_empty() {
            return ctx.abort("no data retrieved".to_string());
        }
        ctx.stats.fetched_rows = snapshot.orders.len();
        ctx.stats.quality_records = snapshot.quality.len();
        ctx.stats.upstream_kpis = snapshot.production_stats.is_some();

        // ===== PROCESSING =====
        ctx.advance(PipelineState::Processing)?;
        let sanitizer = Sanitizer::new(self.blueprint.sanitize.required_fields.clone());
        let clean = sanitizer.sanitize(&snapshot.orders);
        ctx.stats.clean_rows = clean.len();
        if ctx.stats.dropped_rows() > 0 {
            info!(
                before = ctx.stats.fetched_rows,
                after = ctx.stats.clean_rows,
                dropped = ctx.stats.dropped_rows(),
                "Sanitizer dropped rows with missing required fields"
            );
        }
        observability::record_rows(ctx.stats.fetched_rows, ctx.stats.clean_rows);

        let processed = enrich(clean);
        let kpis = calculate_kpis(&processed, &snapshot.quality);

        let dataset = Dataset::from_serializable(&processed)?;
        let validation = validate(&dataset, &self.blueprint.validation.required_columns);
        for issue in &validation.issues {
            warn!(issue = %issue, "Data quality issue");
        }
        ctx.stats.validation_issues = validation.issues.len();
        observability::record_validation(&validation);

        // ===== EXPORTING =====
        ctx.advance(PipelineState::Exporting)?;
        let batch = ExportBatch {
            quality: snapshot.quality,
            production_stats: snapshot.production_stats,
            ..ExportBatch::new(processed, kpis.clone())
        };

        let dispatcher = dispatcher::create_dispatcher(
            self.blueprint.sinks.clone(),
            &self.blueprint.export.output_dir,
        );
        ctx.stats.sinks_configured = dispatcher.sink_count();
        let outcome = dispatcher.export(batch).await;

        for report in &outcome.reports {
            let ok = report.succeeded();
            observability::record_sink_report(&report.name, ok, report.artifacts.len());
            if !ok {
                warn!(sink = %report.name, errors = ?report.errors, "Sink failed");
            }
        }
        ctx.stats.sinks_failed = outcome.failed().count();
        let artifacts = outcome.artifacts();
        ctx.stats.artifacts_written = artifacts.len();

        if outcome.all_failed() {
            let reason = format!("all {} sinks failed", outcome.reports.len());
            ctx.advance(PipelineState::Aborted)?;
            warn!(reason = %reason, "Pipeline aborted");
            return Ok(ctx.finish(kpis, Some(validation), artifacts, Some(reason)));
        }

        // ===== SUMMARIZING =====
        ctx.advance(PipelineState::Summarizing)?;
        info!(
            fetched = ctx.stats.fetched_rows,
            clean = ctx.stats.clean_rows,
            dropped = ctx.stats.dropped_rows(),
            total_orders = kpis.get("total_orders").unwrap_or_default(),
            completion_rate = kpis.get("completion_rate").unwrap_or_default(),
            production_efficiency = kpis.get("production_efficiency").unwrap_or_default(),
            artifacts = ctx.stats.artifacts_written,
            valid = validation.is_valid,
            "Pipeline summary"
        );

        ctx.advance(PipelineState::Done)?;
        let outcome = ctx.finish(kpis, Some(validation), artifacts, None);
        info!(
            duration_ms = outcome.stats.duration.as_millis() as u64,
            "Pipeline completed"
        );
        Ok(outcome)
    }

    /// Work orders first, then the optional upstream KPI and quality endpoints
    async fn fetch(&self) -> Result<Snapshot, ContractError> {
        let orders = self.source.fetch_orders().await?;
        if orders.is_empty() {
            return Ok(Snapshot {
                orders,
                production_stats: None,
                quality: Vec::new(),
            });
        }
        let production_stats = self.source.fetch_kpis().await?;
        let quality = self.source.fetch_quality().await?;
        Ok(Snapshot {
            orders,
            production_stats,
            quality,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{QualityRecord, SinkConfig, SinkType};
    use ingestion::MockWorkOrderSource;
    use serde_json::json;

    fn raw(value: Value) -> Vec<RawRecord> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|v| v.as_object().cloned())
                .collect(),
            _ => Vec::new(),
        }
    }

    fn blueprint(dir: &std::path::Path) -> PipelineBlueprint {
        let mut blueprint = PipelineBlueprint::default();
        blueprint.export.output_dir = dir.to_path_buf();
        blueprint
    }

    fn sample_orders() -> Vec<RawRecord> {
        raw(json!([
            {"order_id": "1", "line_id": "L1", "item_name": "Widget", "quantity": "5",
             "quantity_produced": 5, "status": " Completed "},
            {"order_id": null, "line_id": "L1", "item_name": "Widget", "quantity": 3, "status": "pending"},
            {"order_id": "2", "line_id": "L2", "item_name": "Gear", "quantity": 10,
             "quantity_produced": 4, "status": "in_progress"}
        ]))
    }

    fn files_in(dir: &std::path::Path) -> usize {
        std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
    }

    #[tokio::test]
    async fn test_zero_records_aborts_without_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(blueprint(dir.path()), MockWorkOrderSource::new(Vec::new()));

        let outcome = pipeline.run().await.unwrap();
        assert_eq!(outcome.state, PipelineState::Aborted);
        assert_eq!(outcome.abort_reason.as_deref(), Some("no data retrieved"));
        assert!(outcome.artifacts.is_empty());
        assert_eq!(files_in(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_transport_error_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(
            blueprint(dir.path()),
            MockWorkOrderSource::unreachable("connection refused"),
        );

        let outcome = pipeline.run().await.unwrap();
        assert_eq!(outcome.state, PipelineState::Aborted);
        assert!(outcome
            .abort_reason
            .as_deref()
            .unwrap()
            .contains("connection refused"));
        assert!(outcome.validation.is_none());
        assert_eq!(files_in(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_happy_path_exports_orders_and_kpis() {
        let dir = tempfile::tempdir().unwrap();
        let source = MockWorkOrderSource::new(sample_orders())
            .with_kpis(json!({"total_orders": 2}))
            .with_quality(vec![QualityRecord::new("pass"), QualityRecord::new("fail")]);
        let pipeline = Pipeline::new(blueprint(dir.path()), source);

        let outcome = pipeline.run().await.unwrap();
        assert!(outcome.is_done(), "reason: {:?}", outcome.abort_reason);
        assert_eq!(outcome.stats.fetched_rows, 3);
        assert_eq!(outcome.stats.clean_rows, 2);
        assert_eq!(outcome.stats.dropped_rows(), 1);
        assert!(outcome.stats.upstream_kpis);

        assert_eq!(outcome.kpis.get("total_orders"), Some(2.0));
        assert_eq!(outcome.kpis.get("completion_rate"), Some(50.0));
        assert_eq!(outcome.kpis.get("quality_pass_rate"), Some(50.0));
        assert!(outcome.validation.as_ref().unwrap().is_valid);

        // orders + quality csv, kpis + production_stats json
        assert_eq!(outcome.artifacts.len(), 4);
        for path in &outcome.artifacts {
            assert!(path.exists(), "{} missing", path.display());
        }
    }

    #[tokio::test]
    async fn test_all_sinks_failing_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, b"").unwrap();

        let mut blueprint = blueprint(dir.path());
        blueprint.export.output_dir = blocker.join("out");
        blueprint.sinks = vec![SinkConfig::new("orders_csv", SinkType::Csv)];

        let pipeline = Pipeline::new(blueprint, MockWorkOrderSource::new(sample_orders()));
        let outcome = pipeline.run().await.unwrap();
        assert_eq!(outcome.state, PipelineState::Aborted);
        assert_eq!(outcome.abort_reason.as_deref(), Some("all 1 sinks failed"));
        assert_eq!(outcome.stats.sinks_failed, 1);
    }

    #[tokio::test]
    async fn test_no_sinks_still_completes() {
        let dir = tempfile::tempdir().unwrap();
        let mut blueprint = blueprint(dir.path());
        blueprint.sinks.clear();

        let pipeline = Pipeline::new(blueprint, MockWorkOrderSource::new(sample_orders()));
        let outcome = pipeline.run().await.unwrap();
        assert!(outcome.is_done());
        assert!(outcome.artifacts.is_empty());
    }

    #[tokio::test]
    async fn test_runs_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(blueprint(dir.path()), MockWorkOrderSource::new(sample_orders()));

        let first = pipeline.run().await.unwrap();
        let second = pipeline.run().await.unwrap();
        assert!(first.is_done() && second.is_done());
        assert_eq!(first.kpis, second.kpis);
        assert_ne!(first.artifacts, second.artifacts);
    }
}
