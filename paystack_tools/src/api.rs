use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    config::PaystackConfig,
    data_objects::{ApiEnvelope, InitializeTransaction, PaymentSessionData, TransactionData},
    PaystackApiError,
};

/// The Paystack REST client. Cheap to clone; the underlying [`Client`] and its connection pool
/// are shared.
#[derive(Clone)]
pub struct PaystackApi {
    config: PaystackConfig,
    client: Arc<Client>,
}

impl std::fmt::Debug for PaystackApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaystackApi({})", self.config.api_url)
    }
}

impl PaystackApi {
    pub fn new(config: PaystackConfig) -> Result<Self, PaystackApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let bearer = format!("Bearer {}", config.secret_key.reveal());
        let val = HeaderValue::from_str(&bearer).map_err(|e| PaystackApiError::Initialization(e.to_string()))?;
        headers.insert("Authorization", val);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| PaystackApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &PaystackConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url)
    }

    async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, PaystackApiError> {
        let url = self.url(path);
        trace!("Sending REST query: {url}");
        let mut req = self.client.request(method, url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| PaystackApiError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            let envelope =
                response.json::<ApiEnvelope<T>>().await.map_err(|e| PaystackApiError::JsonError(e.to_string()))?;
            if !envelope.status {
                return Err(PaystackApiError::Declined(envelope.message));
            }
            envelope.data.ok_or(PaystackApiError::EmptyResponse)
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| PaystackApiError::RestResponseError(e.to_string()))?;
            Err(PaystackApiError::QueryError { status, message })
        }
    }

    /// Creates a hosted-payment session for the given amount (in minor units) and
    /// merchant-assigned reference. The customer completes payment at the returned
    /// `authorization_url`.
    pub async fn initialize_transaction(
        &self,
        request: InitializeTransaction,
    ) -> Result<PaymentSessionData, PaystackApiError> {
        debug!("Initializing payment session for reference {}", request.reference);
        let session =
            self.rest_query::<PaymentSessionData, _>(Method::POST, "/transaction/initialize", Some(request)).await?;
        info!("Payment session created for reference {}", session.reference);
        Ok(session)
    }

    /// Fetches the authoritative state of a transaction by its reference.
    pub async fn verify_transaction(&self, reference: &str) -> Result<TransactionData, PaystackApiError> {
        debug!("Verifying transaction {reference}");
        let path = format!("/transaction/verify/{reference}");
        let tx = self.rest_query::<TransactionData, ()>(Method::GET, &path, None).await?;
        info!("Transaction {reference} verified. Gateway status: {}", tx.status);
        Ok(tx)
    }
}
