// --- File: crates/airline_admin/src/routes.rs ---

use crate::handlers::{
    create_airline_handler, create_flight_handler, delete_flight_handler, list_airlines_handler,
    list_bookings_handler, list_flights_handler, statistics_handler, update_booking_handler,
    AdminState,
};
use axum::{
    routing::{delete, get, put},
    Router,
};
use std::sync::Arc;

pub fn routes(state: Arc<AdminState>) -> Router {
    Router::new()
        .route(
            "/admin/airlines",
            get(list_airlines_handler).post(create_airline_handler),
        )
        .route(
            "/admin/flights",
            get(list_flights_handler).post(create_flight_handler),
        )
        .route("/admin/flights/{flight_id}", delete(delete_flight_handler))
        .route("/admin/bookings", get(list_bookings_handler))
        .route("/admin/bookings/{booking_id}", put(update_booking_handler))
        .route("/admin/statistics", get(statistics_handler))
        .with_state(state)
}
