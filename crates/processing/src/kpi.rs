//! KPI Aggregator
//!
//! Every ratio goes through `contracts::percentage`, so a zero denominator
//! yields 0 and never NaN.

use contracts::{
    percentage, round2, KpiSummary, OrderRecord, OrderStatus, ProcessedOrder, QualityRecord,
    StatusCounts, StatusRecord,
};
use tracing::debug;

/// Count records per distinct status
///
/// The counts always sum to `records.len()`; empty input gives an empty map.
pub fn compute_kpis<T: StatusRecord>(records: &[T]) -> StatusCounts {
    let mut counts = StatusCounts::new();
    for record in records {
        *counts.entry(record.status().to_string()).or_insert(0) += 1;
    }
    counts
}

/// Extended KPI set for the dashboard export
///
/// Quality KPIs are only present when quality records were supplied.
pub fn calculate_kpis(orders: &[ProcessedOrder], quality: &[QualityRecord]) -> KpiSummary {
    let mut kpis = KpiSummary::new();

    for (status, count) in compute_kpis(orders) {
        kpis.insert_count(format!("{}_orders", status_key(&status)), count);
    }

    let total_orders = orders.len() as u64;
    let completed_orders = orders
        .iter()
        .filter(|o| o.status == OrderStatus::Completed.as_str())
        .count() as u64;
    kpis.insert_count("total_orders", total_orders);
    kpis.insert_count("completed_orders", completed_orders);
    kpis.insert_rate(
        "completion_rate",
        percentage(completed_orders as f64, total_orders as f64),
    );

    let defined: Vec<f64> = orders
        .iter()
        .filter_map(|o| o.completion_percentage)
        .collect();
    let avg_completion = if defined.is_empty() {
        0.0
    } else {
        defined.iter().sum::<f64>() / defined.len() as f64
    };
    kpis.insert_rate("avg_completion_percentage", avg_completion);

    let planned: u64 = orders.iter().map(|o| o.quantity_planned).sum();
    let produced: u64 = orders.iter().map(|o| o.quantity_produced).sum();
    kpis.insert_count("total_planned_quantity", planned);
    kpis.insert_count("total_produced_quantity", produced);
    kpis.insert_rate(
        "production_efficiency",
        percentage(produced as f64, planned as f64),
    );

    if !quality.is_empty() {
        let total = quality.len() as u64;
        let passed = quality.iter().filter(|q| q.passed()).count() as u64;
        let pass_rate = percentage(passed as f64, total as f64);
        kpis.insert_count("total_quality_tests", total);
        kpis.insert_count("passed_tests", passed);
        kpis.insert_rate("quality_pass_rate", pass_rate);
        kpis.insert_rate("defect_rate", round2(100.0 - pass_rate));
    }

    debug!(count = kpis.len(), "calculated KPIs");
    kpis
}

/// KPI set served by the REST API
pub fn api_kpis(orders: &[OrderRecord]) -> KpiSummary {
    let counts = compute_kpis(orders);
    let count_of = |status: OrderStatus| counts.get(status.as_str()).copied().unwrap_or(0);

    let total = orders.len() as u64;
    let completed = count_of(OrderStatus::Completed);
    let planned: u64 = orders.iter().map(|o| o.quantity_planned).sum();
    let produced: u64 = orders.iter().map(|o| o.quantity_produced).sum();

    let mut kpis = KpiSummary::new();
    kpis.insert_count("total_orders", total);
    kpis.insert_count("completed_orders", completed);
    kpis.insert_count("in_progress_orders", count_of(OrderStatus::InProgress));
    kpis.insert_count("pending_orders", count_of(OrderStatus::Pending));
    kpis.insert_rate("completion_rate", percentage(completed as f64, total as f64));
    kpis.insert_rate("efficiency", percentage(produced as f64, planned as f64));
    kpis
}

/// Plant-wide production statistics served next to the work order list
///
/// `defect_rate` is 0 when there are no quality results.
pub fn production_stats(orders: &[OrderRecord], quality: &[QualityRecord]) -> KpiSummary {
    let counts = compute_kpis(orders);
    let count_of = |status: OrderStatus| counts.get(status.as_str()).copied().unwrap_or(0);

    let planned: u64 = orders.iter().map(|o| o.quantity_planned).sum();
    let produced: u64 = orders.iter().map(|o| o.quantity_produced).sum();
    let failed = quality.iter().filter(|q| !q.passed()).count();

    let mut kpis = KpiSummary::new();
    kpis.insert_count("total_orders", orders.len() as u64);
    kpis.insert_count("completed_orders", count_of(OrderStatus::Completed));
    kpis.insert_count("active_orders", count_of(OrderStatus::InProgress));
    kpis.insert_rate(
        "overall_efficiency",
        percentage(produced as f64, planned as f64),
    );
    kpis.insert_rate(
        "defect_rate",
        percentage(failed as f64, quality.len() as f64),
    );
    kpis
}

fn status_key(status: &str) -> String {
    status.split_whitespace().collect::<Vec<_>>().join("_")
}
