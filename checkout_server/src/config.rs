use std::env;

use log::*;
use paystack_tools::PaystackConfig;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use scs_common::{parse_boolean_flag, Money, Secret};

const DEFAULT_SCS_HOST: &str = "127.0.0.1";
const DEFAULT_SCS_PORT: u16 = 8360;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    /// The flat shipping fee applied to every order, in major units (e.g. "5.00").
    pub shipping_fee: Money,
    /// When false, webhook signature checks are skipped. Local development only.
    pub webhook_signature_checks: bool,
    /// Payment gateway configuration.
    pub paystack_config: PaystackConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SCS_HOST.to_string(),
            port: DEFAULT_SCS_PORT,
            database_url: String::default(),
            auth: AuthConfig::default(),
            shipping_fee: Money::zero(),
            webhook_signature_checks: true,
            paystack_config: PaystackConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SCS_HOST").ok().unwrap_or_else(|| DEFAULT_SCS_HOST.into());
        let port = env::var("SCS_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for SCS_PORT. {e} Using the default, {DEFAULT_SCS_PORT}, instead."
                    );
                    DEFAULT_SCS_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_SCS_PORT);
        let database_url = env::var("SCS_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ SCS_DATABASE_URL is not set. Please set it to the URL for the checkout database.");
            String::default()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to \
                 the default configuration."
            );
            AuthConfig::default()
        });
        let shipping_fee = env::var("SCS_SHIPPING_FEE")
            .ok()
            .map(|s| {
                s.parse::<Money>().unwrap_or_else(|e| {
                    error!("🪛️ {s} is not a valid amount for SCS_SHIPPING_FEE. {e} Shipping will be free.");
                    Money::zero()
                })
            })
            .unwrap_or_else(Money::zero);
        let webhook_signature_checks =
            !parse_boolean_flag(env::var("SCS_DISABLE_WEBHOOK_SIGNATURE_CHECKS").ok(), false);
        if !webhook_signature_checks {
            warn!(
                "🪛️ Webhook signature checks are DISABLED. Anyone can post payment events to this server. Do not \
                 run like this in production."
            );
        }
        let paystack_config = PaystackConfig::new_from_env_or_default();
        Self { host, port, database_url, auth, shipping_fee, webhook_signature_checks, paystack_config }
    }
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The symmetric secret used to sign and verify access tokens (HS256).
    pub jwt_secret: Secret<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🪛️ Generating a random JWT secret. Tokens will not survive a restart and will not validate against \
             other instances. Set SCS_JWT_SECRET to fix this."
        );
        let secret: String = thread_rng().sample_iter(&Alphanumeric).take(64).map(char::from).collect();
        Self { jwt_secret: Secret::new(secret) }
    }
}

impl AuthConfig {
    pub fn try_from_env() -> Result<Self, String> {
        let secret = env::var("SCS_JWT_SECRET").map_err(|_| "SCS_JWT_SECRET is not set".to_string())?;
        if secret.len() < 32 {
            return Err("SCS_JWT_SECRET must be at least 32 characters long".to_string());
        }
        Ok(Self { jwt_secret: Secret::new(secret) })
    }
}
