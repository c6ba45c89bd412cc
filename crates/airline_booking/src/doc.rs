// --- File: crates/airline_booking/src/doc.rs ---
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::logic::{BookedSeatsResponse, BookingDetails, CreateBookingRequest};
use airline_db::models::{Booking, BookingStatus, Flight};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::search_flights_handler,
        crate::handlers::get_flight_handler,
        crate::handlers::booked_seats_handler,
        crate::handlers::create_booking_handler,
        crate::handlers::list_bookings_handler,
        crate::handlers::get_booking_handler,
        crate::handlers::cancel_booking_handler
    ),
    components(
        schemas(
            Flight, Booking, BookingStatus, BookingDetails,
            CreateBookingRequest, BookedSeatsResponse
        )
    ),
    tags(
        (name = "Flights", description = "Public flight search and seat maps"),
        (name = "Bookings", description = "Seat reservations for the signed-in user")
    )
)]
pub struct BookingApiDoc;
