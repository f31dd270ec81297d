use std::env;

use log::*;
use scs_common::Secret;

pub const DEFAULT_PAYSTACK_API_URL: &str = "https://api.paystack.co";

#[derive(Clone, Debug, Default)]
pub struct PaystackConfig {
    /// The base URL of the Paystack API. Overridable so tests can point the client at a local
    /// stand-in server.
    pub api_url: String,
    /// The secret key used both as the REST bearer token and as the webhook HMAC key.
    pub secret_key: Secret<String>,
    /// ISO currency code sent with every initialize call.
    pub currency: String,
}

impl PaystackConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = env::var("SCS_PAYSTACK_API_URL").ok().unwrap_or_else(|| DEFAULT_PAYSTACK_API_URL.to_string());
        let secret_key = env::var("SCS_PAYSTACK_SECRET_KEY").ok().unwrap_or_else(|| {
            error!(
                "🪛️ SCS_PAYSTACK_SECRET_KEY is not set. Payment sessions cannot be created and webhook signatures \
                 will never validate. Set it to your Paystack secret key."
            );
            String::default()
        });
        let currency = env::var("SCS_PAYSTACK_CURRENCY").ok().unwrap_or_else(|| "NGN".to_string());
        Self { api_url, secret_key: Secret::new(secret_key), currency }
    }
}
