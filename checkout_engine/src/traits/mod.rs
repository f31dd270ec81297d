//! The traits that backends and payment gateways must implement to drive the checkout engine.
//!
//! [`CheckoutDatabase`] covers the write path (order creation, settlement, fulfillment), while
//! [`OrderManagement`] covers reads. [`PaymentGateway`] abstracts the external payment provider
//! so that the reconciliation logic can be tested against a scripted double.

mod checkout_database;
mod data_objects;
mod ledger_error;
mod order_management;
mod payment_gateway;

pub use checkout_database::CheckoutDatabase;
pub use data_objects::{PaymentSettlement, SettlementOutcome};
pub use ledger_error::LedgerError;
pub use order_management::OrderManagement;
pub use payment_gateway::{GatewayError, GatewayPaymentResult, NewPaymentSession, PaymentGateway, PaymentSession};
