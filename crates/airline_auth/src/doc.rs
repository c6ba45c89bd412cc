// --- File: crates/airline_auth/src/doc.rs ---
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::logic::{
    LoginRequest, ProfileUpdateRequest, RegisterRequest, TokenResponse, VerifyResponse,
};
use airline_db::models::User;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::register_handler,
        crate::handlers::login_handler,
        crate::handlers::me_handler,
        crate::handlers::update_profile_handler,
        crate::handlers::verify_handler
    ),
    components(
        schemas(
            RegisterRequest, LoginRequest, ProfileUpdateRequest,
            TokenResponse, VerifyResponse, User
        )
    ),
    tags(
        (name = "Auth", description = "Accounts and bearer tokens")
    )
)]
pub struct AuthApiDoc;
