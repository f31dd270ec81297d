//! `SqliteDatabase` is a concrete implementation of a checkout engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the
//! [`crate::traits`] module.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{cart, catalog, customers, db_url, new_pool, orders};
use crate::{
    checkout_api::order_objects::OrderQueryFilter,
    db_types::{CartLine, CustomerProfile, NewOrder, Order, OrderLine, OrderStatus},
    traits::{CheckoutDatabase, LedgerError, OrderManagement, PaymentSettlement, SettlementOutcome},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new connection pool to the database at `SCS_DATABASE_URL` and returns a new
    /// instance of `SqliteDatabase`.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        Self::new_with_url(&url, max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl CheckoutDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn fetch_customer(&self, customer_id: &str) -> Result<Option<CustomerProfile>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let profile = customers::fetch_customer(customer_id, &mut conn).await?;
        Ok(profile)
    }

    async fn fetch_cart(&self, customer_id: &str) -> Result<Vec<CartLine>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let lines = cart::fetch_cart_lines(customer_id, &mut conn).await?;
        Ok(lines)
    }

    async fn shipping_address_exists(&self, customer_id: &str, address_id: i64) -> Result<bool, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let exists = customers::shipping_address_exists(customer_id, address_id, &mut conn).await?;
        Ok(exists)
    }

    /// Takes a new order and, in a single atomic transaction,
    /// * reserves stock for every line, failing the whole order if any line cannot be covered,
    /// * inserts the order row with a freshly allocated order number,
    /// * inserts the denormalised line snapshot,
    /// * clears the ordered variants from the customer's cart.
    async fn create_order(&self, order: NewOrder) -> Result<Order, LedgerError> {
        if order.lines.is_empty() {
            return Err(LedgerError::EmptyOrder);
        }
        let mut tx = self.pool.begin().await?;
        for line in &order.lines {
            catalog::reserve_stock(line.variant_id, line.quantity, &mut tx).await?;
        }
        let saved = orders::insert_order_with_unique_number(&order, &mut tx).await?;
        orders::insert_order_lines(saved.id, &order.lines, &mut tx).await?;
        let variant_ids = order.lines.iter().map(|l| l.variant_id).collect::<Vec<i64>>();
        let cleared = cart::clear_lines_for_variants(&order.customer_id, &variant_ids, &mut tx).await?;
        tx.commit().await?;
        debug!(
            "🗃️ Order {} saved with {} lines for [{}]. {cleared} cart lines cleared.",
            saved.order_number,
            order.lines.len(),
            order.customer_id
        );
        Ok(saved)
    }

    async fn set_payment_reference(&self, order_id: i64, reference: &str) -> Result<Order, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::set_payment_reference(order_id, reference, &mut conn).await?;
        debug!("🗃️ Payment reference {reference} recorded for order {}", order.order_number);
        Ok(order)
    }

    async fn settle_payment(&self, settlement: PaymentSettlement) -> Result<SettlementOutcome, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        orders::settle_payment(settlement, &mut conn).await
    }

    async fn update_order_status(
        &self,
        order_id: i64,
        new_status: OrderStatus,
        notes: Option<String>,
    ) -> Result<Order, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::update_order_status(order_id, new_status, notes, &mut conn).await?;
        info!("🗃️ Order {} moved to {}", order.order_number, order.status);
        Ok(order)
    }

    /// Cancels the order and, in the same transaction, returns every reserved line to stock.
    async fn cancel_order(
        &self,
        order_id: i64,
        reason: &str,
        allowed_from: &[OrderStatus],
    ) -> Result<Order, LedgerError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::cancel_order(order_id, reason, allowed_from, &mut tx).await?;
        let lines = orders::fetch_order_lines(order_id, &mut tx).await?;
        for line in &lines {
            catalog::restock(line.variant_id, line.quantity, &mut tx).await?;
        }
        tx.commit().await?;
        info!("🗃️ Order {} cancelled ({reason}). {} lines restocked.", order.order_number, lines.len());
        Ok(order)
    }
}

impl OrderManagement for SqliteDatabase {
    async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_by_reference(&self, reference: &str) -> Result<Option<Order>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_reference(reference, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_lines(&self, order_id: i64) -> Result<Vec<OrderLine>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let lines = orders::fetch_order_lines(order_id, &mut conn).await?;
        Ok(lines)
    }

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::search_orders(query, &mut conn).await?;
        Ok(orders)
    }
}
