// --- File: crates/airline_baggage/src/routes.rs ---

use crate::handlers::{
    booking_baggage_handler, check_in_handler, my_baggage_handler, status_handler,
    update_baggage_handler, BaggageState,
};
use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

pub fn routes(state: Arc<BaggageState>) -> Router {
    Router::new()
        .route("/baggage", post(check_in_handler))
        .route("/baggage/my", get(my_baggage_handler))
        .route("/baggage/status/{baggage_tag}", get(status_handler))
        .route("/baggage/booking/{booking_id}", get(booking_baggage_handler))
        .route("/baggage/{baggage_id}", put(update_baggage_handler))
        .with_state(state)
}
