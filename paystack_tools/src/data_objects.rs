use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Every Paystack REST response wraps its payload in this envelope. `status` is the *request*
/// outcome; transaction state lives inside `data`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub status: bool,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

/// Request body for `POST /transaction/initialize`. Amounts are integer minor units, per the
/// Paystack wire format.
#[derive(Debug, Clone, Serialize)]
pub struct InitializeTransaction {
    pub email: String,
    pub amount: i64,
    pub reference: String,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// The hosted-payment session returned by a successful initialize call. `authorization_url` is
/// where the customer is redirected to complete payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSessionData {
    pub authorization_url: String,
    pub access_code: String,
    pub reference: String,
}

/// The transaction record returned by `GET /transaction/verify/{reference}` and carried in
/// webhook events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionData {
    pub id: i64,
    pub status: String,
    pub reference: String,
    pub amount: i64,
    #[serde(default)]
    pub gateway_response: Option<String>,
    #[serde(default)]
    pub paid_at: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

impl TransactionData {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// An inbound webhook payload. Only the event name and the embedded transaction are relevant;
/// unknown fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    pub data: TransactionData,
}
