//! Access-token handling.
//!
//! Tokens are HS256 JWTs signed with the shared `SCS_JWT_SECRET`. The identity service that
//! issues customer tokens lives elsewhere; this module verifies tokens and exposes the claims
//! as an actix extractor, so any handler can simply take a [`JwtClaims`] argument.

use std::future::{ready, Ready};

use actix_web::{web, FromRequest, HttpRequest};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use checkout_engine::Requester;

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// The customer id of the token holder.
    pub sub: String,
    pub roles: Vec<Role>,
    /// Expiry, as a unix timestamp. Checked by [`jsonwebtoken`]'s default validation.
    pub exp: i64,
}

impl JwtClaims {
    pub fn new(sub: &str, roles: Vec<Role>) -> Self {
        let exp = (Utc::now() + Duration::hours(24)).timestamp();
        Self { sub: sub.to_string(), roles, exp }
    }

    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }

    pub fn requester(&self) -> Requester {
        Requester { customer_id: self.sub.clone(), is_admin: self.is_admin() }
    }
}

/// Signs and verifies access tokens. A single instance is shared with the app as
/// [`web::Data`], which is how the [`FromRequest`] impl below finds the verification key.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.reveal().as_bytes();
        Self { encoding_key: EncodingKey::from_secret(secret), decoding_key: DecodingKey::from_secret(secret) }
    }

    pub fn issue(&self, claims: &JwtClaims) -> Result<String, ServerError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| ServerError::CouldNotSerializeAccessToken(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<JwtClaims, AuthError> {
        let data = decode::<JwtClaims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
            .map_err(|e| AuthError::ValidationError(e.to_string()))?;
        Ok(data.claims)
    }
}

fn bearer_token(req: &HttpRequest) -> Result<&str, AuthError> {
    let header = req.headers().get("Authorization").ok_or(AuthError::MissingToken)?;
    let value = header.to_str().map_err(|_| AuthError::MissingToken)?;
    value.strip_prefix("Bearer ").ok_or(AuthError::MissingToken)
}

impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let result = req
            .app_data::<web::Data<TokenIssuer>>()
            .ok_or_else(|| AuthError::ValidationError("Token issuer is not configured".to_string()))
            .and_then(|issuer| bearer_token(req).and_then(|token| issuer.verify(token)))
            .map_err(ServerError::AuthenticationError);
        ready(result)
    }
}
