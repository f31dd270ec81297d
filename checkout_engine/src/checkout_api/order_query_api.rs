use log::trace;

use crate::{
    checkout_api::{errors::OrderFlowError, order_flow_api::Requester, order_objects::OrderQueryFilter},
    db_types::{Order, OrderWithLines},
    traits::OrderManagement,
};

/// Read-only order queries, with ownership checks applied before any data leaves the ledger.
#[derive(Debug, Clone)]
pub struct OrderQueryApi<B> {
    db: B,
}

impl<B: OrderManagement> OrderQueryApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Fetches an order and its line snapshot. Customers only see their own orders; everyone
    /// else gets a `Forbidden` rather than an existence hint.
    pub async fn order_with_lines(&self, order_id: i64, requester: &Requester) -> Result<OrderWithLines, OrderFlowError> {
        let order = self.db.fetch_order(order_id).await?.ok_or(OrderFlowError::NotFound)?;
        if !requester.may_act_for(&order.customer_id) {
            return Err(OrderFlowError::Forbidden("you may only view your own orders".to_string()));
        }
        let lines = self.db.fetch_order_lines(order_id).await?;
        Ok(OrderWithLines { order, lines })
    }

    /// Searches the ledger. Non-admin requesters are always pinned to their own customer id,
    /// regardless of what the filter asks for.
    pub async fn search(&self, mut filter: OrderQueryFilter, requester: &Requester) -> Result<Vec<Order>, OrderFlowError> {
        if !requester.is_admin {
            filter.customer_id = Some(requester.customer_id.clone());
        }
        trace!("🔍️ Searching orders: {filter}");
        let orders = self.db.search_orders(filter).await?;
        Ok(orders)
    }
}
