use crate::db_types::{CartLine, CustomerProfile, NewOrder, Order, OrderStatus};

use super::{LedgerError, PaymentSettlement, SettlementOutcome};

/// The write-side contract for an order-ledger backend.
///
/// Implementations must uphold two invariants:
/// * [`create_order`](Self::create_order) is all-or-nothing: the order row, its lines, the stock
///   decrements and the cart clear commit together or not at all.
/// * [`settle_payment`](Self::settle_payment) applies at most once per order, no matter how many
///   times it is called for the same reference.
#[allow(async_fn_in_trait)]
pub trait CheckoutDatabase {
    /// The database URL for the backend.
    fn url(&self) -> &str;

    async fn fetch_customer(&self, customer_id: &str) -> Result<Option<CustomerProfile>, LedgerError>;

    /// Fetches the customer's cart joined against the live catalogue.
    async fn fetch_cart(&self, customer_id: &str) -> Result<Vec<CartLine>, LedgerError>;

    /// Checks that the given shipping address exists and belongs to the customer.
    async fn shipping_address_exists(&self, customer_id: &str, address_id: i64) -> Result<bool, LedgerError>;

    /// Atomically inserts the order and its lines, reserves stock for every line, and clears the
    /// ordered lines from the customer's cart. Fails the whole transaction if any line has
    /// insufficient stock or refers to an inactive product.
    async fn create_order(&self, order: NewOrder) -> Result<Order, LedgerError>;

    /// Records the payment reference for a freshly created order. The reference is write-once:
    /// setting the same value again is a no-op, setting a different one is an error.
    async fn set_payment_reference(&self, order_id: i64, reference: &str) -> Result<Order, LedgerError>;

    /// Applies a gateway verdict to the order identified by the settlement's reference.
    /// Idempotent; see [`SettlementOutcome`].
    async fn settle_payment(&self, settlement: PaymentSettlement) -> Result<SettlementOutcome, LedgerError>;

    /// Moves the order to `new_status`, enforcing the fulfillment transition table.
    async fn update_order_status(
        &self,
        order_id: i64,
        new_status: OrderStatus,
        notes: Option<String>,
    ) -> Result<Order, LedgerError>;

    /// Cancels the order if its current status is one of `allowed_from`, recording the reason
    /// and returning reserved stock to the catalogue.
    async fn cancel_order(&self, order_id: i64, reason: &str, allowed_from: &[OrderStatus]) -> Result<Order, LedgerError>;
}
