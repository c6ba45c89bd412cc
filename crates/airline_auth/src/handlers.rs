// --- File: crates/airline_auth/src/handlers.rs ---
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use airline_common::auth::CREDENTIALS_ERROR;
use airline_common::error::unauthorized;
use airline_common::{AirlineError, AuthUser, HasJwt, JwtKeys};
use airline_config::AppConfig;
use airline_db::models::User;
use airline_db::{DbClient, SqlUserRepository, UserRepository};

use crate::logic::{
    self, LoginRequest, ProfileUpdateRequest, RegisterRequest, TokenResponse, VerifyResponse,
};

// --- State for Auth Handlers ---
pub struct AuthState {
    pub config: Arc<AppConfig>,
    pub jwt: JwtKeys,
    pub users: SqlUserRepository,
}

impl AuthState {
    pub fn new(config: Arc<AppConfig>, db: DbClient) -> Self {
        Self {
            jwt: JwtKeys::from_config(&config.jwt),
            users: SqlUserRepository::new(db),
            config,
        }
    }

    /// The account behind a verified token; a deleted account invalidates its tokens.
    async fn current_user(&self, auth: AuthUser) -> Result<User, AirlineError> {
        self.users
            .find_by_id(auth.user_id)
            .await?
            .ok_or_else(|| unauthorized(CREDENTIALS_ERROR))
    }
}

impl HasJwt for AuthState {
    fn jwt(&self) -> &JwtKeys {
        &self.jwt
    }
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = TokenResponse),
        (status = 400, description = "Invalid email or email already registered")
    ),
    tag = "Auth"
))]
pub async fn register_handler(
    State(state): State<Arc<AuthState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), AirlineError> {
    let response = logic::register(&state.users, &state.jwt, payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = TokenResponse),
        (status = 401, description = "Incorrect email or password")
    ),
    tag = "Auth"
))]
pub async fn login_handler(
    State(state): State<Arc<AuthState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AirlineError> {
    let response = logic::login(&state.users, &state.jwt, payload).await?;
    Ok(Json(response))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "The authenticated user", body = User),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer" = [])),
    tag = "Auth"
))]
pub async fn me_handler(
    State(state): State<Arc<AuthState>>,
    auth: AuthUser,
) -> Result<Json<User>, AirlineError> {
    Ok(Json(state.current_user(auth).await?))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/auth/profile",
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Profile updated, fresh token issued", body = TokenResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer" = [])),
    tag = "Auth"
))]
pub async fn update_profile_handler(
    State(state): State<Arc<AuthState>>,
    auth: AuthUser,
    Json(payload): Json<ProfileUpdateRequest>,
) -> Result<Json<TokenResponse>, AirlineError> {
    logic::update_profile(&state.users, &state.jwt, auth.user_id, payload)
        .await?
        .map(Json)
        .ok_or_else(|| unauthorized(CREDENTIALS_ERROR))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/auth/verify",
    responses(
        (status = 200, description = "Token is valid", body = VerifyResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer" = [])),
    tag = "Auth"
))]
pub async fn verify_handler(
    State(state): State<Arc<AuthState>>,
    auth: AuthUser,
) -> Result<Json<VerifyResponse>, AirlineError> {
    let user = state.current_user(auth).await?;
    Ok(Json(VerifyResponse {
        valid: true,
        user_id: user.id,
        is_admin: user.is_admin,
    }))
}
