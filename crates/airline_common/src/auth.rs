// --- File: crates/airline_common/src/auth.rs ---
//! Bearer-token handling shared by every service.
//!
//! Tokens are HS256 JWTs signed with the shared `jwt.secret`. The `sub` claim holds the
//! user id; older clients sent it as a number, so both encodings are accepted.

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use airline_config::JwtConfig;

use crate::error::{internal_error, unauthorized, AirlineError};

pub const CREDENTIALS_ERROR: &str = "Could not validate credentials";

/// The `sub` claim, either `"42"` or `42` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Subject {
    Text(String),
    Number(i64),
}

impl Subject {
    /// The user id carried by the claim, if it is one.
    pub fn user_id(&self) -> Option<i64> {
        match self {
            Subject::Text(s) => s.trim().parse().ok(),
            Subject::Number(n) => Some(*n),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Subject,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
}

/// Signing and verification keys derived from the shared secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiration: Duration,
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtKeys")
            .field("expiration", &self.expiration)
            .finish_non_exhaustive()
    }
}

impl JwtKeys {
    pub fn new(secret: &str, expiration_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expiration: Duration::hours(expiration_hours),
        }
    }

    pub fn from_config(config: &JwtConfig) -> Self {
        Self::new(&config.secret, config.expiration_hours)
    }

    /// Issues a token for `user_id`, valid for the configured number of hours.
    pub fn issue(&self, user_id: i64) -> Result<String, AirlineError> {
        let now = Utc::now();
        let claims = Claims {
            sub: Subject::Text(user_id.to_string()),
            exp: (now + self.expiration).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| internal_error(format!("failed to sign token: {}", e)))
    }

    /// Checks signature and expiry and returns the user id from `sub`.
    pub fn verify(&self, token: &str) -> Result<i64, AirlineError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            debug!("rejected token: {}", e);
            unauthorized(CREDENTIALS_ERROR)
        })?;

        data.claims
            .sub
            .user_id()
            .ok_or_else(|| unauthorized(CREDENTIALS_ERROR))
    }
}

/// Pulls the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(parts: &Parts) -> Result<&str, AirlineError> {
    let value = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| unauthorized("Not authenticated"))?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or_else(|| unauthorized("Not authenticated"))?;
    if !scheme.eq_ignore_ascii_case("bearer") || token.trim().is_empty() {
        return Err(unauthorized("Not authenticated"));
    }
    Ok(token.trim())
}

/// Service state that can verify bearer tokens.
pub trait HasJwt {
    fn jwt(&self) -> &JwtKeys;
}

impl<T: HasJwt> HasJwt for Arc<T> {
    fn jwt(&self) -> &JwtKeys {
        (**self).jwt()
    }
}

/// The authenticated caller, extracted from the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: HasJwt + Send + Sync,
{
    type Rejection = AirlineError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let user_id = state.jwt().verify(token)?;
        Ok(AuthUser { user_id })
    }
}
