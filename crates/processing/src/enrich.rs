//! Derived dashboard columns

use contracts::{round2, OrderRecord, OrderStatus, ProcessedOrder};

/// `produced / planned * 100` rounded to 2 decimals, `None` when nothing was planned
pub fn completion_percentage(quantity_planned: u64, quantity_produced: u64) -> Option<f64> {
    if quantity_planned == 0 {
        return None;
    }
    Some(round2(
        quantity_produced as f64 / quantity_planned as f64 * 100.0,
    ))
}

/// Ranking of a known status, `None` for anything else
pub fn status_priority(status: &str) -> Option<u8> {
    OrderStatus::parse(status).map(|s| s.rank())
}

/// Attach the derived columns to every order
pub fn enrich(orders: Vec<OrderRecord>) -> Vec<ProcessedOrder> {
    orders
        .into_iter()
        .map(|order| {
            let cp = completion_percentage(order.quantity_planned, order.quantity_produced);
            let sp = status_priority(&order.status);
            ProcessedOrder::from_order(order, cp, sp)
        })
        .collect()
}
