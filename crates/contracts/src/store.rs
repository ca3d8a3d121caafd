//! OrderStore trait - persistence behind the REST API

use crate::{ContractError, OrderRecord, QualityRecord};

/// Work order persistence
///
/// Implementations are shared across request handlers, hence `Send + Sync`.
pub trait OrderStore: Send + Sync {
    /// All orders, optionally restricted to one status
    fn list(&self, status: Option<&str>) -> Result<Vec<OrderRecord>, ContractError>;

    /// Lookup by identifier
    fn get(&self, order_id: &str) -> Result<Option<OrderRecord>, ContractError>;

    /// Lookup that treats a miss as an error
    ///
    /// # Errors
    /// `NotFound` when no order has this identifier.
    fn require(&self, order_id: &str) -> Result<OrderRecord, ContractError> {
        self.get(order_id)?.ok_or_else(|| ContractError::NotFound {
            order_id: order_id.to_string(),
        })
    }

    /// Insert a new order
    ///
    /// # Errors
    /// `Conflict` when an order with the same identifier exists.
    fn create(&self, order: &OrderRecord) -> Result<(), ContractError>;

    /// Quality results in insertion order, at most `limit`, optionally for one order
    fn list_quality(
        &self,
        order_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<QualityRecord>, ContractError>;

    /// Number of stored orders
    fn count(&self) -> Result<usize, ContractError> {
        Ok(self.list(None)?.len())
    }
}
