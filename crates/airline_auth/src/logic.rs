// --- File: crates/airline_auth/src/logic.rs ---
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use airline_common::JwtKeys;
use airline_db::models::{NewUser, ProfileChanges, User};
use airline_db::UserRepository;

use crate::error::AuthError;

// --- Request / response types ---

#[derive(Deserialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ProfileUpdateRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: User,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct VerifyResponse {
    pub valid: bool,
    pub user_id: i64,
    pub is_admin: bool,
}

// --- Helpers ---

/// Lightweight address check: one `@`, a non-empty local part and a dotted domain.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split('.')
            .filter(|label| !label.is_empty())
            .count()
            >= 2
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Hashes a password into a PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Checks a password against a stored PHC string. A malformed hash never matches.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!("Stored password hash is malformed: {}", e);
            false
        }
    }
}

// Argon2 is CPU-bound; run it on the blocking pool.
async fn hash_blocking(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
}

async fn verify_blocking(password: String, stored_hash: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

fn token_response(jwt: &JwtKeys, user: User) -> Result<TokenResponse, AuthError> {
    Ok(TokenResponse {
        access_token: jwt.issue(user.id)?,
        token_type: "bearer".to_string(),
        user,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// --- Operations ---

pub async fn register<R: UserRepository>(
    users: &R,
    jwt: &JwtKeys,
    request: RegisterRequest,
) -> Result<TokenResponse, AuthError> {
    let email = request.email.trim().to_string();
    if !is_valid_email(&email) {
        return Err(AuthError::InvalidEmail);
    }
    if request.password.is_empty() {
        return Err(AuthError::InvalidInput(
            "Password must not be empty".to_string(),
        ));
    }
    if users.find_by_email(&email).await?.is_some() {
        return Err(AuthError::EmailTaken);
    }

    let password_hash = hash_blocking(request.password).await?;
    let created = users
        .create(NewUser {
            email,
            password_hash,
            first_name: request.first_name,
            last_name: request.last_name,
            phone: non_blank(request.phone),
        })
        .await;

    let user = match created {
        Ok(user) => user,
        // Lost a race against a concurrent registration of the same address.
        Err(e) if e.is_unique_violation() => return Err(AuthError::EmailTaken),
        Err(e) => return Err(e.into()),
    };

    info!("Registered user {}", user.id);
    token_response(jwt, user)
}

pub async fn login<R: UserRepository>(
    users: &R,
    jwt: &JwtKeys,
    request: LoginRequest,
) -> Result<TokenResponse, AuthError> {
    let Some(user) = users.find_by_email(request.email.trim()).await? else {
        return Err(AuthError::InvalidCredentials);
    };
    if !verify_blocking(request.password, user.password_hash.clone()).await? {
        return Err(AuthError::InvalidCredentials);
    }
    token_response(jwt, user)
}

pub async fn update_profile<R: UserRepository>(
    users: &R,
    jwt: &JwtKeys,
    user_id: i64,
    request: ProfileUpdateRequest,
) -> Result<Option<TokenResponse>, AuthError> {
    let changes = ProfileChanges {
        first_name: request.first_name,
        last_name: request.last_name,
        phone: request.phone,
    };
    match users.update_profile(user_id, changes).await? {
        Some(user) => Ok(Some(token_response(jwt, user)?)),
        None => Ok(None),
    }
}
