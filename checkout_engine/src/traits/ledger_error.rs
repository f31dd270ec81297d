use thiserror::Error;

use crate::db_types::OrderStatus;

/// Errors that the ledger backends can return. Variants other than `DatabaseError` represent
/// business-rule violations and map to client faults at the HTTP layer.
#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order {0} does not exist")]
    OrderNotFound(i64),
    #[error("No order carries the payment reference {0}")]
    ReferenceNotFound(String),
    #[error("Customer {0} does not exist")]
    CustomerNotFound(String),
    #[error("Shipping address {0} does not belong to this customer")]
    ShippingAddressNotFound(i64),
    #[error("An order must contain at least one line")]
    EmptyOrder,
    #[error("Insufficient stock for {slug}: requested {requested}, available {available}")]
    InsufficientStock { slug: String, requested: i64, available: i64 },
    #[error("{slug} is no longer available for purchase")]
    ProductNotActive { slug: String },
    #[error("Could not allocate a unique order number after {0} attempts")]
    OrderNumberExhausted(u32),
    #[error("Order {0} already has a different payment reference")]
    PaymentReferenceAlreadySet(i64),
    #[error("Cannot change order status from {from} to {to}. Allowed next states: {}", allowed_next_list(.from))]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("Order cannot be cancelled: {0}")]
    CancellationForbidden(String),
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

fn allowed_next_list(from: &OrderStatus) -> String {
    let next = from.allowed_next();
    if next.is_empty() {
        "none".to_string()
    } else {
        next.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    }
}
