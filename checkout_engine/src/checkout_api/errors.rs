use thiserror::Error;

use crate::{
    checkout_api::eligibility::EligibilityDenial,
    traits::{GatewayError, LedgerError},
};

/// Errors returned by the order flow and query APIs. The HTTP layer maps these onto status
/// codes and machine-readable error codes.
#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("Cannot create an order from an empty cart")]
    EmptyCart,
    #[error("Purchase not allowed for {slug}: {denial}")]
    PurchaseNotAllowed { slug: String, denial: EligibilityDenial },
    #[error("Customer {0} does not have a profile")]
    UnknownCustomer(String),
    #[error("Not permitted: {0}")]
    Forbidden(String),
    #[error("Order not found")]
    NotFound,
    #[error("The order total overflows the supported amount range")]
    AmountOverflow,
    #[error("Unsupported gateway event: {0}")]
    UnsupportedEvent(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
