// --- File: crates/airline_notification/src/auth.rs ---

use std::sync::Arc;

use axum::{
    body::Body as AxumBody,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use constant_time_eq::constant_time_eq;
use tracing::{debug, warn};

use airline_common::error::unauthorized;
use airline_common::http::INTERNAL_AUTH_HEADER;

use crate::handlers::NotificationState;

/// Guards the internal notification endpoints with the shared secret from
/// `notification.internal_secret`. An unset or empty secret leaves them open.
pub async fn internal_auth_middleware(
    State(state): State<Arc<NotificationState>>,
    req: Request<AxumBody>,
    next: Next,
) -> Response {
    let Some(expected) = state
        .config
        .notification
        .internal_secret
        .as_deref()
        .filter(|s| !s.is_empty())
    else {
        return next.run(req).await;
    };

    let provided = req
        .headers()
        .get(INTERNAL_AUTH_HEADER)
        .and_then(|value| value.to_str().ok());

    match provided {
        Some(secret) if constant_time_eq(secret.as_bytes(), expected.as_bytes()) => {
            debug!("Internal request authenticated");
            next.run(req).await
        }
        Some(_) => {
            warn!("Internal request with an invalid secret");
            unauthorized("Invalid internal credentials").into_response()
        }
        None => {
            warn!("Internal request without the {} header", INTERNAL_AUTH_HEADER);
            unauthorized(format!("Missing {} header", INTERNAL_AUTH_HEADER)).into_response()
        }
    }
}
