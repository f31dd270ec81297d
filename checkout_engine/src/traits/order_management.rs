use crate::{
    checkout_api::order_objects::OrderQueryFilter,
    db_types::{Order, OrderLine},
};

use super::LedgerError;

/// The read-side contract for an order-ledger backend.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, LedgerError>;

    async fn fetch_order_by_reference(&self, reference: &str) -> Result<Option<Order>, LedgerError>;

    async fn fetch_order_lines(&self, order_id: i64) -> Result<Vec<OrderLine>, LedgerError>;

    /// Returns orders matching the filter, newest first.
    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, LedgerError>;
}
