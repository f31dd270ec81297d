use std::fmt::Display;

use checkout_engine::db_types::OrderStatus;
use serde::{Deserialize, Serialize};

/// The standard response body for webhook calls. Webhook responses are always HTTP 200 once the
/// signature checks out; `success` tells the gateway's dashboard whether we did anything with
/// the event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: OrderStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelRequest {
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyPaymentQuery {
    pub reference: String,
}
