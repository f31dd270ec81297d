//! Glue between the engine's [`PaymentGateway`] seam and the Paystack REST client.

use checkout_engine::traits::{GatewayError, GatewayPaymentResult, NewPaymentSession, PaymentGateway, PaymentSession};
use paystack_tools::{InitializeTransaction, PaystackApi, PaystackApiError, PaystackConfig};
use scs_common::Money;

use crate::errors::ServerError;

/// The production [`PaymentGateway`] implementation, backed by [`PaystackApi`].
#[derive(Clone, Debug)]
pub struct PaystackGateway {
    api: PaystackApi,
}

impl PaystackGateway {
    pub fn new(config: PaystackConfig) -> Result<Self, ServerError> {
        let api = PaystackApi::new(config).map_err(|e| ServerError::InitializeError(e.to_string()))?;
        Ok(Self { api })
    }
}

fn to_gateway_error(e: PaystackApiError) -> GatewayError {
    match e {
        PaystackApiError::Initialization(s) | PaystackApiError::RestResponseError(s) => GatewayError::Unreachable(s),
        PaystackApiError::JsonError(s) => GatewayError::MalformedResponse(s),
        PaystackApiError::EmptyResponse => GatewayError::MalformedResponse("empty response envelope".to_string()),
        PaystackApiError::Declined(s) => GatewayError::Rejected(s),
        PaystackApiError::QueryError { status, message } => {
            GatewayError::Rejected(format!("HTTP {status}: {message}"))
        },
    }
}

impl PaymentGateway for PaystackGateway {
    async fn initialize_session(&self, session: NewPaymentSession) -> Result<PaymentSession, GatewayError> {
        let request = InitializeTransaction {
            email: session.customer_email,
            amount: session.amount.value(),
            reference: session.reference,
            currency: self.api.config().currency.clone(),
            callback_url: session.callback_url,
            metadata: None,
        };
        let data = self.api.initialize_transaction(request).await.map_err(to_gateway_error)?;
        Ok(PaymentSession {
            redirect_url: data.authorization_url,
            access_code: data.access_code,
            reference: data.reference,
        })
    }

    async fn verify_transaction(&self, reference: &str) -> Result<GatewayPaymentResult, GatewayError> {
        let tx = self.api.verify_transaction(reference).await.map_err(to_gateway_error)?;
        Ok(GatewayPaymentResult {
            reference: tx.reference.clone(),
            success: tx.is_success(),
            gateway_status: tx.status,
            transaction_id: Some(tx.id.to_string()),
            amount: Money::from_minor_units(tx.amount),
        })
    }
}
