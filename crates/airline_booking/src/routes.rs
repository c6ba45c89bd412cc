// --- File: crates/airline_booking/src/routes.rs ---

use crate::handlers::{
    booked_seats_handler, cancel_booking_handler, create_booking_handler, get_booking_handler,
    get_flight_handler, list_bookings_handler, search_flights_handler, BookingState,
};
use axum::{routing::get, Router};
use std::sync::Arc;

/// Flight search is public; every `/bookings` route needs a bearer token.
pub fn routes(state: Arc<BookingState>) -> Router {
    Router::new()
        .route("/flights", get(search_flights_handler))
        .route("/flights/{flight_id}", get(get_flight_handler))
        .route("/flights/{flight_id}/booked-seats", get(booked_seats_handler))
        .route(
            "/bookings",
            get(list_bookings_handler).post(create_booking_handler),
        )
        .route(
            "/bookings/{booking_id}",
            get(get_booking_handler).delete(cancel_booking_handler),
        )
        .with_state(state)
}
