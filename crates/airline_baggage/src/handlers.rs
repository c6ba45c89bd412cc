// --- File: crates/airline_baggage/src/handlers.rs ---
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use airline_common::{AirlineError, AuthUser, HasJwt, JwtKeys, Notifier};
use airline_config::AppConfig;
use airline_db::models::Baggage;
use airline_db::{BaggageRepository, DbClient, SqlBaggageRepository, SqlBookingRepository};

use crate::logic::{self, BaggageStatusResponse, BaggageUpdateRequest, CheckInRequest};

// --- State for Baggage Handlers ---
pub struct BaggageState {
    pub config: Arc<AppConfig>,
    pub jwt: JwtKeys,
    pub baggage: SqlBaggageRepository,
    pub bookings: SqlBookingRepository,
    pub notifier: Arc<dyn Notifier>,
}

impl BaggageState {
    pub fn new(config: Arc<AppConfig>, db: DbClient, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            jwt: JwtKeys::from_config(&config.jwt),
            baggage: SqlBaggageRepository::new(db.clone()),
            bookings: SqlBookingRepository::new(db),
            notifier,
            config,
        }
    }
}

impl HasJwt for BaggageState {
    fn jwt(&self) -> &JwtKeys {
        &self.jwt
    }
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/baggage",
    request_body = CheckInRequest,
    responses(
        (status = 201, description = "Bag checked in and tagged", body = Baggage),
        (status = 404, description = "Booking not found or does not belong to you")
    ),
    security(("bearer" = [])),
    tag = "Baggage"
))]
pub async fn check_in_handler(
    State(state): State<Arc<BaggageState>>,
    auth: AuthUser,
    Json(payload): Json<CheckInRequest>,
) -> Result<(StatusCode, Json<Baggage>), AirlineError> {
    let baggage = logic::check_in(&state.baggage, &state.bookings, auth.user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(baggage)))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/baggage/status/{baggage_tag}",
    params(("baggage_tag" = String, Path, description = "Tag printed on the bag, e.g. KXQ042917")),
    responses(
        (status = 200, description = "Current status", body = BaggageStatusResponse),
        (status = 403, description = "The bag belongs to another passenger"),
        (status = 404, description = "Baggage not found")
    ),
    security(("bearer" = [])),
    tag = "Baggage"
))]
pub async fn status_handler(
    State(state): State<Arc<BaggageState>>,
    auth: AuthUser,
    Path(baggage_tag): Path<String>,
) -> Result<Json<BaggageStatusResponse>, AirlineError> {
    let status = logic::status_by_tag(&state.baggage, auth.user_id, &baggage_tag).await?;
    Ok(Json(status))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/baggage/booking/{booking_id}",
    params(("booking_id" = i64, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Bags checked in on the booking", body = [Baggage]),
        (status = 404, description = "Booking not found or does not belong to you")
    ),
    security(("bearer" = [])),
    tag = "Baggage"
))]
pub async fn booking_baggage_handler(
    State(state): State<Arc<BaggageState>>,
    auth: AuthUser,
    Path(booking_id): Path<i64>,
) -> Result<Json<Vec<Baggage>>, AirlineError> {
    let bags =
        logic::list_for_booking(&state.baggage, &state.bookings, auth.user_id, booking_id).await?;
    Ok(Json(bags))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/baggage/my",
    responses(
        (status = 200, description = "All of the caller's bags, newest first", body = [Baggage])
    ),
    security(("bearer" = [])),
    tag = "Baggage"
))]
pub async fn my_baggage_handler(
    State(state): State<Arc<BaggageState>>,
    auth: AuthUser,
) -> Result<Json<Vec<Baggage>>, AirlineError> {
    Ok(Json(state.baggage.list_for_user(auth.user_id).await?))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/baggage/{baggage_id}",
    params(("baggage_id" = i64, Path, description = "Baggage id")),
    request_body = BaggageUpdateRequest,
    responses(
        (status = 200, description = "Updated bag", body = Baggage),
        (status = 403, description = "The bag belongs to another passenger"),
        (status = 404, description = "Baggage not found")
    ),
    security(("bearer" = [])),
    tag = "Baggage"
))]
pub async fn update_baggage_handler(
    State(state): State<Arc<BaggageState>>,
    auth: AuthUser,
    Path(baggage_id): Path<i64>,
    Json(payload): Json<BaggageUpdateRequest>,
) -> Result<Json<Baggage>, AirlineError> {
    let updated = logic::update(
        &state.baggage,
        state.notifier.as_ref(),
        auth.user_id,
        baggage_id,
        payload,
    )
    .await?;
    Ok(Json(updated))
}
