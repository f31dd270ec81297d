//! Data objects stored in, or retrieved from, the order ledger.

use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use scs_common::Money;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;

//--------------------------------------     ConversionError     ---------------------------------------------

#[derive(Debug, Clone, Error)]
#[error("Cannot convert {0}")]
pub struct ConversionError(pub String);

//--------------------------------------      OrderStatus        ---------------------------------------------

/// The fulfillment state of an order. Fulfillment is tracked independently of payment; see
/// [`PaymentStatus`].
///
/// Legal transitions:
/// * `pending` → `processing` or `cancelled`
/// * `processing` → `shipped` or `cancelled`
/// * `shipped` → `delivered`
///
/// `delivered` and `cancelled` are terminal. Every other pair is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn allowed_next(&self) -> &'static [OrderStatus] {
        use OrderStatus::*;
        match self {
            Pending => &[Processing, Cancelled],
            Processing => &[Shipped, Cancelled],
            Shipped => &[Delivered],
            Delivered | Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        self.allowed_next().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_next().is_empty()
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------     PaymentStatus       ---------------------------------------------

/// The payment state of an order. An order starts `pending` and is settled exactly once, to
/// `paid` or `failed`, by whichever reconciliation path (webhook or poll) lands first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            s => Err(ConversionError(format!("Invalid payment status: {s}"))),
        }
    }
}

//--------------------------------------        Order            ---------------------------------------------

/// A single row in the `orders` ledger. Money columns are stored as integer minor units and all
/// three are snapshots taken at creation time; they never change after the row is inserted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: i64,
    pub order_number: String,
    pub customer_id: String,
    pub shipping_address_id: i64,
    pub subtotal: Money,
    pub shipping_fee: Money,
    pub total: Money,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_reference: Option<String>,
    pub payment_id: Option<String>,
    pub notes: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancelled_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn is_cancellable_by_owner(&self) -> bool {
        matches!(self.status, OrderStatus::Pending)
    }
}

impl Display for Order {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Order {} for [{}]. {} ({}/{})",
            self.order_number, self.customer_id, self.total, self.status, self.payment_status
        )
    }
}

//--------------------------------------      OrderLine          ---------------------------------------------

/// A denormalised order line. Product details are copied from the catalogue when the order is
/// created so that later catalogue edits cannot alter what the customer agreed to buy.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrderLine {
    pub id: i64,
    pub order_id: i64,
    pub variant_id: i64,
    pub product_name: String,
    pub product_slug: String,
    pub pack_size: String,
    pub unit_price: Money,
    pub quantity: i64,
}

impl OrderLine {
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price.checked_times(self.quantity)
    }
}

/// An order together with its line snapshot, as returned by the order detail query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderWithLines {
    #[serde(flatten)]
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

//--------------------------------------      NewOrder           ---------------------------------------------

/// The payload for inserting a new order. The order number, timestamps and id are assigned by
/// the backend.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: String,
    pub shipping_address_id: i64,
    pub subtotal: Money,
    pub shipping_fee: Money,
    pub total: Money,
    pub notes: Option<String>,
    pub lines: Vec<NewOrderLine>,
}

#[derive(Debug, Clone)]
pub struct NewOrderLine {
    pub variant_id: i64,
    pub product_name: String,
    pub product_slug: String,
    pub pack_size: String,
    pub unit_price: Money,
    pub quantity: i64,
}

impl From<&CartLine> for NewOrderLine {
    fn from(line: &CartLine) -> Self {
        Self {
            variant_id: line.variant_id,
            product_name: line.product_name.clone(),
            product_slug: line.product_slug.clone(),
            pack_size: line.pack_size.clone(),
            unit_price: line.unit_price,
            quantity: line.quantity,
        }
    }
}

//--------------------------------------      CartLine           ---------------------------------------------

/// One line of a customer's cart, joined against the live catalogue. This is the raw material
/// for an order; the eligibility and stock fields are read at snapshot time and re-checked
/// atomically when the order is inserted.
#[derive(Debug, Clone, FromRow)]
pub struct CartLine {
    pub variant_id: i64,
    pub product_name: String,
    pub product_slug: String,
    pub pack_size: String,
    pub unit_price: Money,
    pub quantity: i64,
    pub stock_on_hand: i64,
    pub is_active: bool,
    pub requires_approval: bool,
}

impl CartLine {
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price.checked_times(self.quantity)
    }
}

//--------------------------------------   VerificationStatus    ---------------------------------------------

/// The review state of a customer's purchasing credential (prescription, licence, or similar).
/// Only `approved` unlocks restricted products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "lowercase")]
pub enum VerificationStatus {
    Unverified,
    Pending,
    Approved,
    Rejected,
}

impl Display for VerificationStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unverified => "unverified",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        };
        write!(f, "{s}")
    }
}

//--------------------------------------    CustomerProfile      ---------------------------------------------

/// The slice of the customer record the checkout flow needs: where to send the payment session,
/// and the flags the eligibility rules run against.
#[derive(Debug, Clone, FromRow)]
pub struct CustomerProfile {
    pub id: String,
    pub email: String,
    pub identity_verified: bool,
    pub credential_status: VerificationStatus,
}

//--------------------------------------        Tests            ---------------------------------------------
