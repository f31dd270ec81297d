use scs_common::Money;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors a payment gateway client can surface to the engine. The engine treats all of these as
/// upstream faults; none of them change the ledger.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("The payment gateway could not be reached: {0}")]
    Unreachable(String),
    #[error("The payment gateway rejected the request: {0}")]
    Rejected(String),
    #[error("The payment gateway returned a malformed response: {0}")]
    MalformedResponse(String),
}

/// A request to open a hosted-payment session for an order.
#[derive(Debug, Clone)]
pub struct NewPaymentSession {
    pub customer_email: String,
    pub amount: Money,
    pub reference: String,
    pub callback_url: Option<String>,
}

/// A live hosted-payment session. The customer completes payment at `redirect_url`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSession {
    pub redirect_url: String,
    pub access_code: String,
    pub reference: String,
}

/// The authoritative outcome of a transaction, as reported by the gateway's verify endpoint.
#[derive(Debug, Clone)]
pub struct GatewayPaymentResult {
    pub reference: String,
    pub success: bool,
    /// The gateway's own status string, recorded in logs only.
    pub gateway_status: String,
    pub transaction_id: Option<String>,
    pub amount: Money,
}

/// The seam between the engine and the external payment provider. The production implementation
/// wraps the provider's REST API; tests substitute a scripted double.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway {
    async fn initialize_session(&self, session: NewPaymentSession) -> Result<PaymentSession, GatewayError>;

    /// Fetches the authoritative state of the transaction with the given reference. Webhook
    /// payloads are never trusted directly; reconciliation always goes through this call.
    async fn verify_transaction(&self, reference: &str) -> Result<GatewayPaymentResult, GatewayError>;
}
