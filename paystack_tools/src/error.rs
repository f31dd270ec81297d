use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum PaystackApiError {
    #[error("Could not initialize the Paystack API client. {0}")]
    Initialization(String),
    #[error("Error sending request to Paystack, or reading its response. {0}")]
    RestResponseError(String),
    #[error("Could not deserialize Paystack response. {0}")]
    JsonError(String),
    #[error("Paystack returned an error response. Status {status}: {message}")]
    QueryError { status: u16, message: String },
    #[error("Paystack rejected the request. {0}")]
    Declined(String),
    #[error("Paystack response was missing the expected data payload")]
    EmptyResponse,
}
