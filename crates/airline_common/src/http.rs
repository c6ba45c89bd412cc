// --- File: crates/airline_common/src/http.rs ---
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::error::{AirlineError, HttpStatusCode};

// Include the client module
pub mod client;

/// Header carrying the shared secret on service-to-service calls.
pub const INTERNAL_AUTH_HEADER: &str = "X-Internal-Auth-Secret";

/// Extension trait for AirlineError to convert it to an Axum HTTP response.
pub trait IntoHttpResponse {
    /// Converts the error into an Axum HTTP response.
    fn into_http_response(self) -> Response;
}

impl IntoHttpResponse for AirlineError {
    fn into_http_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.is_server_error() {
            error!("request failed: {}", self);
        }

        let body = Json(json!({ "detail": self.detail() }));
        let mut response = (status_code, body).into_response();

        if status_code == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

/// Implement IntoResponse for AirlineError so handlers can return `Result<_, AirlineError>`.
impl IntoResponse for AirlineError {
    fn into_response(self) -> Response {
        self.into_http_response()
    }
}
