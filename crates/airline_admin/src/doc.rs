// --- File: crates/airline_admin/src/doc.rs ---
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::logic::{BookingStatusUpdate, CreateAirlineRequest, CreateFlightRequest};
use airline_db::models::{Airline, Booking, BookingOverview, BookingStatus, Flight, Statistics};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::create_airline_handler,
        crate::handlers::list_airlines_handler,
        crate::handlers::create_flight_handler,
        crate::handlers::list_flights_handler,
        crate::handlers::delete_flight_handler,
        crate::handlers::list_bookings_handler,
        crate::handlers::update_booking_handler,
        crate::handlers::statistics_handler
    ),
    components(
        schemas(
            Airline,
            Flight,
            Booking,
            BookingOverview,
            BookingStatus,
            Statistics,
            CreateAirlineRequest,
            CreateFlightRequest,
            BookingStatusUpdate
        )
    ),
    tags(
        (name = "Admin", description = "Back-office management, admin accounts only")
    )
)]
pub struct AdminApiDoc;
