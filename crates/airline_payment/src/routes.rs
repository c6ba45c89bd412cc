// --- File: crates/airline_payment/src/routes.rs ---

use crate::handlers::{
    booking_payment_handler, create_payment_handler, get_payment_handler, list_payments_handler,
    refund_payment_handler, PaymentState,
};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Creates a router containing all routes for the payment service.
pub fn routes(state: Arc<PaymentState>) -> Router {
    Router::new()
        .route(
            "/payments",
            get(list_payments_handler).post(create_payment_handler),
        )
        .route("/payments/booking/{booking_id}", get(booking_payment_handler))
        .route("/payments/{payment_id}", get(get_payment_handler))
        .route("/payments/{payment_id}/refund", post(refund_payment_handler))
        .with_state(state)
}
