// --- File: crates/airline_auth/src/routes.rs ---

use crate::handlers::{
    login_handler, me_handler, register_handler, update_profile_handler, verify_handler,
    AuthState,
};
use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

/// Creates a router containing all routes for the auth service.
pub fn routes(state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/me", get(me_handler))
        .route("/auth/profile", put(update_profile_handler))
        .route("/auth/verify", get(verify_handler))
        .with_state(state)
}
