// --- File: crates/airline_booking/src/handlers.rs ---
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use airline_common::error::not_found;
use airline_common::{AirlineError, AuthUser, HasJwt, JwtKeys, Notifier};
use airline_config::AppConfig;
use airline_db::models::{Booking, Flight};
use airline_db::{
    BookingRepository, DbClient, FlightRepository, SqlBookingRepository, SqlFlightRepository,
};

use crate::logic::{
    self, BookedSeatsResponse, BookingDetails, CreateBookingRequest, FlightSearchQuery,
};

// --- State for Booking Handlers ---
pub struct BookingState {
    pub config: Arc<AppConfig>,
    pub jwt: JwtKeys,
    pub flights: SqlFlightRepository,
    pub bookings: SqlBookingRepository,
    pub notifier: Arc<dyn Notifier>,
}

impl BookingState {
    pub fn new(config: Arc<AppConfig>, db: DbClient, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            jwt: JwtKeys::from_config(&config.jwt),
            flights: SqlFlightRepository::new(db.clone()),
            bookings: SqlBookingRepository::new(db),
            notifier,
            config,
        }
    }
}

impl HasJwt for BookingState {
    fn jwt(&self) -> &JwtKeys {
        &self.jwt
    }
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/flights",
    params(FlightSearchQuery),
    responses(
        (status = 200, description = "Flights with free seats, earliest departure first", body = [Flight])
    ),
    tag = "Flights"
))]
pub async fn search_flights_handler(
    State(state): State<Arc<BookingState>>,
    Query(query): Query<FlightSearchQuery>,
) -> Result<Json<Vec<Flight>>, AirlineError> {
    let date = logic::parse_departure_date(query.departure_date.as_deref());
    let flights = state.flights.search(date).await?;
    Ok(Json(logic::filter_flights(flights, &query)))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/flights/{flight_id}",
    params(("flight_id" = i64, Path, description = "Flight id")),
    responses(
        (status = 200, description = "Flight details", body = Flight),
        (status = 404, description = "Flight not found")
    ),
    tag = "Flights"
))]
pub async fn get_flight_handler(
    State(state): State<Arc<BookingState>>,
    Path(flight_id): Path<i64>,
) -> Result<Json<Flight>, AirlineError> {
    state
        .flights
        .find_by_id(flight_id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found("Flight not found"))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/flights/{flight_id}/booked-seats",
    params(("flight_id" = i64, Path, description = "Flight id")),
    responses(
        (status = 200, description = "Seats held by confirmed bookings", body = BookedSeatsResponse)
    ),
    tag = "Flights"
))]
pub async fn booked_seats_handler(
    State(state): State<Arc<BookingState>>,
    Path(flight_id): Path<i64>,
) -> Result<Json<BookedSeatsResponse>, AirlineError> {
    let booked_seats = state.flights.booked_seats(flight_id).await?;
    Ok(Json(BookedSeatsResponse { booked_seats }))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Seat reserved", body = Booking),
        (status = 400, description = "No available seats or seat already booked"),
        (status = 404, description = "Flight not found")
    ),
    security(("bearer" = [])),
    tag = "Bookings"
))]
pub async fn create_booking_handler(
    State(state): State<Arc<BookingState>>,
    auth: AuthUser,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AirlineError> {
    let booking = logic::create_booking(
        &state.bookings,
        state.notifier.as_ref(),
        auth.user_id,
        payload,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/bookings",
    responses(
        (status = 200, description = "The caller's bookings, newest first", body = [BookingDetails])
    ),
    security(("bearer" = [])),
    tag = "Bookings"
))]
pub async fn list_bookings_handler(
    State(state): State<Arc<BookingState>>,
    auth: AuthUser,
) -> Result<Json<Vec<BookingDetails>>, AirlineError> {
    let bookings = state.bookings.list_for_user(auth.user_id).await?;
    Ok(Json(bookings.into_iter().map(BookingDetails::from).collect()))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/bookings/{booking_id}",
    params(("booking_id" = i64, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Booking with its flight", body = BookingDetails),
        (status = 404, description = "Booking not found")
    ),
    security(("bearer" = [])),
    tag = "Bookings"
))]
pub async fn get_booking_handler(
    State(state): State<Arc<BookingState>>,
    auth: AuthUser,
    Path(booking_id): Path<i64>,
) -> Result<Json<BookingDetails>, AirlineError> {
    let booking = state
        .bookings
        .find_owned(booking_id, auth.user_id)
        .await?
        .ok_or_else(|| not_found("Booking not found"))?;
    let flight = state.flights.find_by_id(booking.flight_id).await?;
    Ok(Json(BookingDetails { booking, flight }))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/bookings/{booking_id}",
    params(("booking_id" = i64, Path, description = "Booking id")),
    responses(
        (status = 204, description = "Booking cancelled and seat released"),
        (status = 400, description = "Booking already cancelled"),
        (status = 404, description = "Booking not found")
    ),
    security(("bearer" = [])),
    tag = "Bookings"
))]
pub async fn cancel_booking_handler(
    State(state): State<Arc<BookingState>>,
    auth: AuthUser,
    Path(booking_id): Path<i64>,
) -> Result<StatusCode, AirlineError> {
    logic::cancel_booking(
        &state.bookings,
        state.notifier.as_ref(),
        auth.user_id,
        booking_id,
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}
