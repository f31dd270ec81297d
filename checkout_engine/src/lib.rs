//! Storefront Checkout Engine
//!
//! This library owns the order ledger and the payment reconciliation flow for the storefront.
//! It is split into two main sections:
//! 1. Database management and control ([`mod@sqlite`]). You should never need to access the
//!    database directly; use the public API instead. The exception is the data types used in the
//!    database, which are defined in [`db_types`] and are public.
//! 2. The public engine API ([`mod@checkout_api`]). [`OrderFlowApi`] drives order creation from a
//!    cart snapshot and reconciles payment-gateway results (from webhooks or client polls) into
//!    ledger transitions. [`OrderQueryApi`] serves read queries. Backends implement the traits in
//!    [`mod@traits`]; the payment gateway is likewise injected behind [`traits::PaymentGateway`]
//!    so it can be replaced with a test double.

pub mod db_types;
pub mod helpers;
mod checkout_api;
mod sqlite;
pub mod traits;

pub use checkout_api::{
    eligibility,
    errors::OrderFlowError,
    order_flow_api::{CheckoutRequest, CheckoutResult, OrderFlowApi, Requester},
    order_objects,
    order_query_api::OrderQueryApi,
    shipping::{FlatRateShipping, ShippingFeePolicy},
};
pub use sqlite::SqliteDatabase;
