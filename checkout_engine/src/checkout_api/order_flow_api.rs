//! The heart of the engine: turning a cart snapshot into a durable order and reconciling the
//! payment gateway's verdict back into the ledger.

use std::{fmt::Debug, sync::Arc};

use log::*;
use scs_common::Money;
use serde::{Deserialize, Serialize};

use crate::{
    checkout_api::{
        eligibility,
        errors::OrderFlowError,
        shipping::{FlatRateShipping, ShippingFeePolicy},
    },
    db_types::{NewOrder, NewOrderLine, Order, OrderStatus, PaymentStatus},
    helpers::new_payment_reference,
    traits::{
        CheckoutDatabase,
        NewPaymentSession,
        OrderManagement,
        PaymentGateway,
        PaymentSession,
        PaymentSettlement,
        SettlementOutcome,
    },
};

/// Gateway events that trigger a reconciliation. Anything else is acknowledged and dropped.
const RECONCILED_EVENTS: [&str; 2] = ["charge.success", "charge.failed"];

/// The authenticated identity on whose behalf an API call is made. The HTTP layer builds this
/// from the access token; tests build it directly.
#[derive(Debug, Clone)]
pub struct Requester {
    pub customer_id: String,
    pub is_admin: bool,
}

impl Requester {
    pub fn customer(customer_id: &str) -> Self {
        Self { customer_id: customer_id.to_string(), is_admin: false }
    }

    pub fn admin(customer_id: &str) -> Self {
        Self { customer_id: customer_id.to_string(), is_admin: true }
    }

    pub fn may_act_for(&self, customer_id: &str) -> bool {
        self.is_admin || self.customer_id == customer_id
    }
}

/// The client-supplied portion of a checkout request.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub shipping_address_id: i64,
    pub notes: Option<String>,
    /// Where the gateway should send the customer after payment. Optional; the gateway's
    /// configured default applies otherwise.
    pub callback_url: Option<String>,
}

/// Everything the client needs after a successful checkout: the durable order, the payment
/// reference to poll on, and the hosted-payment session if the gateway could be reached.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutResult {
    pub order: Order,
    pub payment_reference: String,
    /// `None` when the gateway was unavailable. The order is still created; payment can be
    /// retried against the same reference.
    pub payment_session: Option<PaymentSession>,
}

/// `OrderFlowApi` provides the main checkout flow of the engine.
///
/// It is responsible for:
/// * creating orders from cart snapshots, including eligibility checks, stock reservation and
///   total calculation,
/// * opening hosted-payment sessions with the payment gateway,
/// * reconciling gateway verdicts (delivered via webhook or client poll) into the ledger,
///   exactly once per order,
/// * fulfillment transitions and cancellations.
pub struct OrderFlowApi<B, G> {
    db: B,
    gateway: G,
    shipping: Arc<dyn ShippingFeePolicy>,
}

impl<B: Debug, G> Debug for OrderFlowApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi ({:?})", self.db)
    }
}

impl<B, G> OrderFlowApi<B, G>
where
    B: CheckoutDatabase + OrderManagement,
    G: PaymentGateway,
{
    pub fn new(db: B, gateway: G) -> Self {
        Self { db, gateway, shipping: Arc::new(FlatRateShipping(Money::zero())) }
    }

    pub fn with_shipping_policy(mut self, policy: Arc<dyn ShippingFeePolicy>) -> Self {
        self.shipping = policy;
        self
    }

    /// Creates a durable order from the customer's current cart and opens a payment session for
    /// it.
    ///
    /// The order row, its line snapshot, the stock reservation and the cart clear commit in one
    /// transaction. Only after that commit is the gateway contacted; if the gateway is down the
    /// order survives as `pending`/`pending` and the returned `payment_session` is `None`.
    pub async fn create_order_from_cart(
        &self,
        customer_id: &str,
        req: CheckoutRequest,
    ) -> Result<CheckoutResult, OrderFlowError> {
        let profile = self
            .db
            .fetch_customer(customer_id)
            .await?
            .ok_or_else(|| OrderFlowError::UnknownCustomer(customer_id.to_string()))?;
        let cart = self.db.fetch_cart(customer_id).await?;
        if cart.is_empty() {
            return Err(OrderFlowError::EmptyCart);
        }
        if !self.db.shipping_address_exists(customer_id, req.shipping_address_id).await? {
            return Err(crate::traits::LedgerError::ShippingAddressNotFound(req.shipping_address_id).into());
        }
        for line in &cart {
            eligibility::check_line(&profile, line).map_err(|denial| OrderFlowError::PurchaseNotAllowed {
                slug: line.product_slug.clone(),
                denial,
            })?;
        }
        let mut subtotal = 0i64;
        for line in &cart {
            let line_total = line.line_total().ok_or(OrderFlowError::AmountOverflow)?;
            subtotal = subtotal.checked_add(line_total.value()).ok_or(OrderFlowError::AmountOverflow)?;
        }
        let subtotal = Money::from_minor_units(subtotal);
        let shipping_fee = self.shipping.fee_for(&cart, subtotal);
        let total = subtotal
            .value()
            .checked_add(shipping_fee.value())
            .map(Money::from_minor_units)
            .ok_or(OrderFlowError::AmountOverflow)?;
        let new_order = NewOrder {
            customer_id: customer_id.to_string(),
            shipping_address_id: req.shipping_address_id,
            subtotal,
            shipping_fee,
            total,
            notes: req.notes,
            lines: cart.iter().map(NewOrderLine::from).collect(),
        };
        let order = self.db.create_order(new_order).await?;
        let reference = new_payment_reference();
        let order = self.db.set_payment_reference(order.id, &reference).await?;
        info!("🔄️ Order {} created for [{customer_id}]. Total: {}", order.order_number, order.total);
        let session = NewPaymentSession {
            customer_email: profile.email,
            amount: order.total,
            reference: reference.clone(),
            callback_url: req.callback_url,
        };
        let payment_session = match self.gateway.initialize_session(session).await {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(
                    "🔄️ Could not open a payment session for order {}. The order remains pending and payment can \
                     be retried against reference {reference}. {e}",
                    order.order_number
                );
                None
            },
        };
        Ok(CheckoutResult { order, payment_reference: reference, payment_session })
    }

    /// Reconciles the order carrying `reference` against the gateway on behalf of a client
    /// poll. The caller must own the order or be an admin. If the payment is already settled
    /// the recorded order is returned without contacting the gateway.
    pub async fn verify_payment(&self, reference: &str, requester: &Requester) -> Result<Order, OrderFlowError> {
        let order = self
            .db
            .fetch_order_by_reference(reference)
            .await?
            .ok_or(OrderFlowError::NotFound)?;
        if !requester.may_act_for(&order.customer_id) {
            return Err(OrderFlowError::Forbidden("you may only verify your own payments".to_string()));
        }
        if order.payment_status.is_settled() {
            trace!("🔄️ Payment {reference} is already settled as {}. Skipping verification.", order.payment_status);
            return Ok(order);
        }
        self.reconcile(reference).await
    }

    /// Handles a webhook event from the payment gateway. The signature has already been checked
    /// by the transport layer; the payload itself is still not trusted, so reconciliation
    /// re-verifies the transaction with the gateway before touching the ledger.
    pub async fn process_gateway_event(&self, event: &str, reference: &str) -> Result<Order, OrderFlowError> {
        if !RECONCILED_EVENTS.contains(&event) {
            debug!("🔄️ Ignoring gateway event {event} for reference {reference}");
            return Err(OrderFlowError::UnsupportedEvent(event.to_string()));
        }
        self.reconcile(reference).await
    }

    /// Fetches the authoritative transaction state from the gateway and applies it to the
    /// ledger. Settlement is conditional in the database, so concurrent webhook and poll calls
    /// for the same reference cannot double-apply.
    async fn reconcile(&self, reference: &str) -> Result<Order, OrderFlowError> {
        let result = self.gateway.verify_transaction(reference).await?;
        let status = if result.success { PaymentStatus::Paid } else { PaymentStatus::Failed };
        let settlement =
            PaymentSettlement { reference: reference.to_string(), status, transaction_id: result.transaction_id };
        match self.db.settle_payment(settlement).await? {
            SettlementOutcome::Applied(order) => {
                info!(
                    "🔄️ Payment {reference} settled as {} for order {} (gateway status: {})",
                    order.payment_status, order.order_number, result.gateway_status
                );
                Ok(order)
            },
            SettlementOutcome::AlreadySettled(order) => {
                debug!(
                    "🔄️ Payment {reference} was already settled as {} for order {}. No changes made.",
                    order.payment_status, order.order_number
                );
                Ok(order)
            },
        }
    }

    /// Moves an order through the fulfillment state machine. Admin only; cancellation goes
    /// through [`cancel_order`](Self::cancel_order) so that stock is returned and a reason is
    /// recorded.
    pub async fn update_order_status(
        &self,
        order_id: i64,
        new_status: OrderStatus,
        notes: Option<String>,
        requester: &Requester,
    ) -> Result<Order, OrderFlowError> {
        if !requester.is_admin {
            return Err(OrderFlowError::Forbidden("only administrators may update fulfillment status".to_string()));
        }
        if new_status == OrderStatus::Cancelled {
            return Err(OrderFlowError::InvalidRequest(
                "use the cancellation endpoint to cancel an order".to_string(),
            ));
        }
        let order = self.db.update_order_status(order_id, new_status, notes).await?;
        Ok(order)
    }

    /// Cancels an order, recording the reason and restocking its lines. Customers may only
    /// cancel their own orders, and only while still `pending`; admins may cancel any order
    /// that has not been delivered or already cancelled.
    pub async fn cancel_order(
        &self,
        order_id: i64,
        reason: &str,
        requester: &Requester,
    ) -> Result<Order, OrderFlowError> {
        let order = self.db.fetch_order(order_id).await?.ok_or(OrderFlowError::NotFound)?;
        let allowed_from: &[OrderStatus] = if requester.is_admin {
            &[OrderStatus::Pending, OrderStatus::Processing, OrderStatus::Shipped]
        } else {
            if order.customer_id != requester.customer_id {
                return Err(OrderFlowError::Forbidden("you may only cancel your own orders".to_string()));
            }
            &[OrderStatus::Pending]
        };
        let order = self.db.cancel_order(order_id, reason, allowed_from).await?;
        Ok(order)
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
