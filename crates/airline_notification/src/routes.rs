// --- File: crates/airline_notification/src/routes.rs ---

use crate::auth::internal_auth_middleware;
use crate::handlers::{
    baggage_status_handler, booking_cancelled_handler, booking_confirmed_handler,
    flight_change_handler, mail_status_handler, payment_completed_handler, send_email_handler,
    NotificationState,
};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Internal delivery endpoints sit behind the shared-secret check; the status probe does not.
pub fn routes(state: Arc<NotificationState>) -> Router {
    Router::new()
        .route("/notifications/booking-confirmed", post(booking_confirmed_handler))
        .route("/notifications/booking-cancelled", post(booking_cancelled_handler))
        .route("/notifications/payment-completed", post(payment_completed_handler))
        .route("/notifications/baggage-status", post(baggage_status_handler))
        .route("/notifications/flight-change", post(flight_change_handler))
        .route("/notifications/email", post(send_email_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            internal_auth_middleware,
        ))
        .route("/notifications/status", get(mail_status_handler))
        .with_state(state)
}
