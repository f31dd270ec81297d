//! A thin wrapper around the Paystack REST API.
//!
//! The checkout server uses exactly two remote operations: initializing a transaction (which
//! returns the hosted-payment redirect for the customer) and verifying a transaction by its
//! merchant-assigned reference. Both are implemented here over a shared [`reqwest::Client`].
//!
//! The crate also owns [`helpers::signature_matches`], the HMAC-SHA512 check applied to inbound
//! webhook payloads before they are processed.

mod api;
mod config;
mod data_objects;
mod error;
pub mod helpers;

pub use api::PaystackApi;
pub use config::PaystackConfig;
pub use data_objects::{ApiEnvelope, InitializeTransaction, PaymentSessionData, TransactionData, WebhookEvent};
pub use error::PaystackApiError;
