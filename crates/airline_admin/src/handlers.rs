// --- File: crates/airline_admin/src/handlers.rs ---
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use airline_common::{AirlineError, HasJwt, JwtKeys, Notifier};
use airline_config::AppConfig;
use airline_db::models::{Airline, Booking, BookingOverview, Flight, Statistics};
use airline_db::{
    AirlineRepository, BookingRepository, DbClient, FlightRepository, SqlAirlineRepository,
    SqlBookingRepository, SqlFlightRepository, SqlStatisticsRepository, SqlUserRepository,
    StatisticsRepository,
};

use crate::auth::AdminUser;
use crate::logic::{self, BookingStatusUpdate, CreateAirlineRequest, CreateFlightRequest};

// --- State for Admin Handlers ---
pub struct AdminState {
    pub config: Arc<AppConfig>,
    pub jwt: JwtKeys,
    pub users: SqlUserRepository,
    pub airlines: SqlAirlineRepository,
    pub flights: SqlFlightRepository,
    pub bookings: SqlBookingRepository,
    pub statistics: SqlStatisticsRepository,
    pub notifier: Arc<dyn Notifier>,
}

impl AdminState {
    pub fn new(config: Arc<AppConfig>, db: DbClient, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            jwt: JwtKeys::from_config(&config.jwt),
            users: SqlUserRepository::new(db.clone()),
            airlines: SqlAirlineRepository::new(db.clone()),
            flights: SqlFlightRepository::new(db.clone()),
            bookings: SqlBookingRepository::new(db.clone()),
            statistics: SqlStatisticsRepository::new(db),
            notifier,
            config,
        }
    }
}

impl HasJwt for AdminState {
    fn jwt(&self) -> &JwtKeys {
        &self.jwt
    }
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/admin/airlines",
    request_body = CreateAirlineRequest,
    responses(
        (status = 201, description = "Airline created", body = Airline),
        (status = 400, description = "Airline code already exists"),
        (status = 403, description = "Admin access required")
    ),
    security(("bearer" = [])),
    tag = "Admin"
))]
pub async fn create_airline_handler(
    State(state): State<Arc<AdminState>>,
    _admin: AdminUser,
    Json(payload): Json<CreateAirlineRequest>,
) -> Result<(StatusCode, Json<Airline>), AirlineError> {
    let airline = logic::create_airline(&state.airlines, payload).await?;
    Ok((StatusCode::CREATED, Json(airline)))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/admin/airlines",
    responses(
        (status = 200, description = "All airlines by name", body = [Airline]),
        (status = 403, description = "Admin access required")
    ),
    security(("bearer" = [])),
    tag = "Admin"
))]
pub async fn list_airlines_handler(
    State(state): State<Arc<AdminState>>,
    _admin: AdminUser,
) -> Result<Json<Vec<Airline>>, AirlineError> {
    Ok(Json(state.airlines.list_all().await?))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/admin/flights",
    request_body = CreateFlightRequest,
    responses(
        (status = 201, description = "Flight scheduled with every seat available", body = Flight),
        (status = 400, description = "Invalid seats, price or times"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Airline not found")
    ),
    security(("bearer" = [])),
    tag = "Admin"
))]
pub async fn create_flight_handler(
    State(state): State<Arc<AdminState>>,
    admin: AdminUser,
    Json(payload): Json<CreateFlightRequest>,
) -> Result<(StatusCode, Json<Flight>), AirlineError> {
    let flight = logic::create_flight(&state.airlines, &state.flights, payload).await?;
    info!("Admin {} created flight {}", admin.user_id, flight.id);
    Ok((StatusCode::CREATED, Json(flight)))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/admin/flights",
    responses(
        (status = 200, description = "All flights, latest departure first", body = [Flight]),
        (status = 403, description = "Admin access required")
    ),
    security(("bearer" = [])),
    tag = "Admin"
))]
pub async fn list_flights_handler(
    State(state): State<Arc<AdminState>>,
    _admin: AdminUser,
) -> Result<Json<Vec<Flight>>, AirlineError> {
    Ok(Json(state.flights.list_all().await?))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/admin/flights/{flight_id}",
    params(("flight_id" = i64, Path, description = "Flight id")),
    responses(
        (status = 204, description = "Flight deleted, its bookings cancelled and passengers notified"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Flight not found")
    ),
    security(("bearer" = [])),
    tag = "Admin"
))]
pub async fn delete_flight_handler(
    State(state): State<Arc<AdminState>>,
    admin: AdminUser,
    Path(flight_id): Path<i64>,
) -> Result<StatusCode, AirlineError> {
    logic::delete_flight(&state.flights, state.notifier.as_ref(), flight_id).await?;
    info!("Admin {} deleted flight {}", admin.user_id, flight_id);
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/admin/bookings",
    responses(
        (status = 200, description = "Every booking with passenger and flight number, newest first", body = [BookingOverview]),
        (status = 403, description = "Admin access required")
    ),
    security(("bearer" = [])),
    tag = "Admin"
))]
pub async fn list_bookings_handler(
    State(state): State<Arc<AdminState>>,
    _admin: AdminUser,
) -> Result<Json<Vec<BookingOverview>>, AirlineError> {
    Ok(Json(state.bookings.list_overview().await?))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/admin/bookings/{booking_id}",
    params(("booking_id" = i64, Path, description = "Booking id")),
    request_body = BookingStatusUpdate,
    responses(
        (status = 200, description = "Booking with its new status", body = Booking),
        (status = 400, description = "The seat cannot be taken back"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Booking not found")
    ),
    security(("bearer" = [])),
    tag = "Admin"
))]
pub async fn update_booking_handler(
    State(state): State<Arc<AdminState>>,
    _admin: AdminUser,
    Path(booking_id): Path<i64>,
    Json(payload): Json<BookingStatusUpdate>,
) -> Result<Json<Booking>, AirlineError> {
    let booking = logic::set_booking_status(&state.bookings, booking_id, payload.status).await?;
    Ok(Json(booking))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/admin/statistics",
    responses(
        (status = 200, description = "Dashboard totals", body = Statistics),
        (status = 403, description = "Admin access required")
    ),
    security(("bearer" = [])),
    tag = "Admin"
))]
pub async fn statistics_handler(
    State(state): State<Arc<AdminState>>,
    _admin: AdminUser,
) -> Result<Json<Statistics>, AirlineError> {
    Ok(Json(state.statistics.totals().await?))
}
