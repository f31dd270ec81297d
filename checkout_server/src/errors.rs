use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use checkout_engine::{traits::LedgerError, OrderFlowError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("Could not serialize access token. {0}")]
    CouldNotSerializeAccessToken(String),
    #[error("{0}")]
    OrderFlow(#[from] OrderFlowError),
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("No access token provided.")]
    MissingToken,
    #[error("Access token signature is invalid. {0}")]
    ValidationError(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
}

impl ServerError {
    /// The machine-readable error code included in every error response body.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequestBody(_) => "invalid_request",
            Self::AuthenticationError(AuthError::InsufficientPermissions(_)) => "forbidden",
            Self::AuthenticationError(_) => "unauthorized",
            Self::OrderFlow(e) => match e {
                OrderFlowError::EmptyCart => "empty_cart",
                OrderFlowError::PurchaseNotAllowed { .. } => "purchase_not_allowed",
                OrderFlowError::UnknownCustomer(_) | OrderFlowError::Forbidden(_) => "forbidden",
                OrderFlowError::NotFound => "not_found",
                OrderFlowError::AmountOverflow |
                OrderFlowError::UnsupportedEvent(_) |
                OrderFlowError::InvalidRequest(_) => "invalid_request",
                OrderFlowError::Gateway(_) => "payment_gateway",
                OrderFlowError::Ledger(e) => match e {
                    LedgerError::InsufficientStock { .. } => "insufficient_stock",
                    LedgerError::ProductNotActive { .. } => "product_unavailable",
                    LedgerError::InvalidTransition { .. } => "invalid_transition",
                    LedgerError::CancellationForbidden(_) => "cancellation_forbidden",
                    LedgerError::EmptyOrder => "invalid_request",
                    LedgerError::OrderNotFound(_) |
                    LedgerError::ReferenceNotFound(_) |
                    LedgerError::ShippingAddressNotFound(_) => "not_found",
                    _ => "internal",
                },
            },
            _ => "internal",
        }
    }
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::MissingToken => StatusCode::UNAUTHORIZED,
                AuthError::ValidationError(_) => StatusCode::UNAUTHORIZED,
                AuthError::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            },
            Self::OrderFlow(e) => match e {
                OrderFlowError::EmptyCart => StatusCode::BAD_REQUEST,
                OrderFlowError::PurchaseNotAllowed { .. } => StatusCode::FORBIDDEN,
                OrderFlowError::UnknownCustomer(_) | OrderFlowError::Forbidden(_) => StatusCode::FORBIDDEN,
                OrderFlowError::NotFound => StatusCode::NOT_FOUND,
                OrderFlowError::AmountOverflow |
                OrderFlowError::UnsupportedEvent(_) |
                OrderFlowError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
                OrderFlowError::Gateway(_) => StatusCode::BAD_GATEWAY,
                OrderFlowError::Ledger(e) => match e {
                    LedgerError::InsufficientStock { .. } |
                    LedgerError::ProductNotActive { .. } |
                    LedgerError::InvalidTransition { .. } |
                    LedgerError::CancellationForbidden(_) |
                    LedgerError::EmptyOrder => StatusCode::BAD_REQUEST,
                    LedgerError::OrderNotFound(_) |
                    LedgerError::ReferenceNotFound(_) |
                    LedgerError::ShippingAddressNotFound(_) => StatusCode::NOT_FOUND,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                },
            },
            Self::InitializeError(_) |
            Self::BackendError(_) |
            Self::IOError(_) |
            Self::CouldNotSerializeAccessToken(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "code": self.code(), "error": self.to_string() }).to_string())
    }
}
