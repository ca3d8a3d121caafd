//! 管道运行指标
//!
//! Thin wrappers over the `metrics` facade plus an in-memory [`RunHistory`]
//! the scheduler uses to summarize many runs.

use contracts::{PipelineState, ValidationReport};
use metrics::{counter, gauge, histogram};

/// 记录一次运行的行数: 拉取 / 清洗后 / 丢弃
pub fn record_rows(fetched: usize, clean: usize) {
    let dropped = fetched.saturating_sub(clean);
    counter!("mes_etl_rows_fetched_total").increment(fetched as u64);
    counter!("mes_etl_rows_clean_total").increment(clean as u64);
    counter!("mes_etl_rows_dropped_total").increment(dropped as u64);
    gauge!("mes_etl_last_run_clean_rows").set(clean as f64);
}

/// 记录单个 sink 的导出结果
pub fn record_sink_report(sink_name: &str, success: bool, artifacts: usize) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "mes_etl_sink_exports_total",
        "sink" => sink_name.to_string(),
        "status" => status
    )
    .increment(1);
    counter!("mes_etl_artifacts_written_total", "sink" => sink_name.to_string())
        .increment(artifacts as u64);
}

/// 记录数据质量检查结果
pub fn record_validation(report: &ValidationReport) {
    let result = if report.is_valid { "valid" } else { "invalid" };
    counter!("mes_etl_validations_total", "result" => result).increment(1);
    gauge!("mes_etl_duplicate_rows").set(report.duplicate_count as f64);
    for (column, nulls) in &report.null_counts {
        gauge!("mes_etl_null_cells", "column" => column.clone()).set(*nulls as f64);
    }
}

/// 记录运行终态与耗时
pub fn record_run_outcome(state: PipelineState, duration_ms: f64) {
    counter!("mes_etl_runs_total", "state" => state.as_str()).increment(1);
    histogram!("mes_etl_run_duration_ms").record(duration_ms);
}

/// 多次运行的聚合统计
#[derive(Debug, Clone, Default)]
pub struct RunHistory {
    pub total_runs: u64,
    pub completed_runs: u64,
    pub aborted_runs: u64,
    /// Runs that returned an error instead of reaching a terminal state
    pub failed_runs: u64,
    pub duration_ms: RunningStats,
    pub clean_rows: RunningStats,
}

impl RunHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次到达终态的运行
    pub fn record(&mut self, state: PipelineState, duration_ms: f64, clean_rows: usize) {
        self.total_runs += 1;
        match state {
            PipelineState::Done => self.completed_runs += 1,
            PipelineState::Aborted => self.aborted_runs += 1,
            _ => {}
        }
        self.duration_ms.push(duration_ms);
        self.clean_rows.push(clean_rows as f64);
    }

    /// 记录一次出错的运行
    pub fn record_failure(&mut self) {
        self.total_runs += 1;
        self.failed_runs += 1;
    }

    pub fn success_rate(&self) -> f64 {
        contracts::percentage(self.completed_runs as f64, self.total_runs as f64)
    }
}

impl std::fmt::Display for RunHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Scheduler Summary ===")?;
        writeln!(
            f,
            "Runs: {} (done {}, aborted {}, failed {})",
            self.total_runs, self.completed_runs, self.aborted_runs, self.failed_runs
        )?;
        writeln!(f, "Success rate: {:.2}%", self.success_rate())?;
        writeln!(f, "Duration (ms): {}", StatsSummary::from(&self.duration_ms))?;
        writeln!(f, "Clean rows: {}", StatsSummary::from(&self.clean_rows))
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.1}, max={:.1}, mean={:.1}, std={:.1} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            self.m2 += delta * (value - self.mean);
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            stats.push(v);
        }

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_run_history() {
        let mut history = RunHistory::new();
        history.record(PipelineState::Done, 120.0, 10);
        history.record(PipelineState::Aborted, 30.0, 0);
        history.record_failure();
        history.record(PipelineState::Done, 90.0, 12);

        assert_eq!(history.total_runs, 4);
        assert_eq!(history.completed_runs, 2);
        assert_eq!(history.aborted_runs, 1);
        assert_eq!(history.failed_runs, 1);
        assert_eq!(history.success_rate(), 50.0);
        assert_eq!(history.duration_ms.count(), 3);

        let output = history.to_string();
        assert!(output.contains("Runs: 4 (done 2, aborted 1, failed 1)"));
        assert!(output.contains("50.00%"));
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_rows(5, 3);
        record_sink_report("orders_csv", true, 1);
        record_run_outcome(PipelineState::Done, 1.0);
        record_validation(&ValidationReport::default());
    }
}
