// --- File: crates/airline_admin/src/auth.rs ---

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tracing::warn;

use airline_common::error::forbidden;
use airline_common::{AirlineError, AuthUser};
use airline_db::UserRepository;

use crate::handlers::AdminState;

/// A caller whose token is valid and whose user row carries `is_admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminUser {
    pub user_id: i64,
}

impl FromRequestParts<Arc<AdminState>> for AdminUser {
    type Rejection = AirlineError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AdminState>,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser { user_id } = AuthUser::from_request_parts(parts, state).await?;
        match state.users.find_by_id(user_id).await? {
            Some(user) if user.is_admin => Ok(AdminUser { user_id }),
            _ => {
                warn!("User {} tried to reach the admin API", user_id);
                Err(forbidden("Admin access required"))
            }
        }
    }
}
