//! Fixed-interval scheduler.
//!
//! Runs are sequential: the next tick is awaited only after the previous run
//! finished, so two runs never overlap. A failed or aborted run is logged and
//! the loop keeps going.

use std::future::Future;
use std::time::Duration;

use contracts::WorkOrderSource;
use observability::RunHistory;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use super::Pipeline;

#[derive(Debug, Clone)]
pub struct Scheduler {
    interval: Duration,
    max_runs: Option<u64>,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_runs: None,
        }
    }

    /// Stop after `max_runs` runs (0 = unlimited)
    pub fn with_max_runs(mut self, max_runs: u64) -> Self {
        self.max_runs = (max_runs > 0).then_some(max_runs);
        self
    }

    /// Run until `shutdown` resolves or the run limit is reached
    ///
    /// The first run starts immediately. A shutdown request never interrupts a
    /// run in progress; it is honoured before the next one starts.
    pub async fn run<S, F>(&self, pipeline: &Pipeline<S>, shutdown: F) -> RunHistory
    where
        S: WorkOrderSource,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut history = RunHistory::new();

        info!(
            interval_secs = self.interval.as_secs_f64(),
            max_runs = ?self.max_runs,
            "Scheduler started"
        );

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown requested, scheduler stopping");
                    break;
                }
                _ = ticker.tick() => {}
            }

            match pipeline.run().await {
                Ok(outcome) => {
                    if !outcome.is_done() {
                        warn!(reason = ?outcome.abort_reason, "Scheduled run aborted");
                    }
                    history.record(
                        outcome.state,
                        outcome.stats.duration.as_secs_f64() * 1000.0,
                        outcome.stats.clean_rows,
                    );
                }
                Err(e) => {
                    error!(error = %e, "Scheduled run failed");
                    history.record_failure();
                }
            }

            if self.max_runs.is_some_and(|max| history.total_runs >= max) {
                info!(runs = history.total_runs, "Reached max runs limit");
                break;
            }
        }

        history
    }
}
