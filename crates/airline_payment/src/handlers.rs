// --- File: crates/airline_payment/src/handlers.rs ---
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use airline_common::error::not_found;
use airline_common::{AirlineError, AuthUser, HasJwt, JwtKeys, Notifier};
use airline_config::AppConfig;
use airline_db::models::Payment;
use airline_db::{
    DbClient, PaymentRepository, SqlBookingRepository, SqlFlightRepository, SqlPaymentRepository,
};

use crate::logic::{self, CreatePaymentRequest, PaymentDeps, RefundResponse};
use crate::service::PaymentGateway;

// --- State for Payment Handlers ---
pub struct PaymentState {
    pub config: Arc<AppConfig>,
    pub jwt: JwtKeys,
    pub payments: SqlPaymentRepository,
    pub bookings: SqlBookingRepository,
    pub flights: SqlFlightRepository,
    pub gateway: Arc<dyn PaymentGateway>,
    pub notifier: Arc<dyn Notifier>,
}

impl PaymentState {
    pub fn new(
        config: Arc<AppConfig>,
        db: DbClient,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            jwt: JwtKeys::from_config(&config.jwt),
            payments: SqlPaymentRepository::new(db.clone()),
            bookings: SqlBookingRepository::new(db.clone()),
            flights: SqlFlightRepository::new(db),
            gateway,
            notifier,
            config,
        }
    }

    fn deps(
        &self,
    ) -> PaymentDeps<'_, SqlPaymentRepository, SqlBookingRepository, SqlFlightRepository> {
        PaymentDeps {
            payments: &self.payments,
            bookings: &self.bookings,
            flights: &self.flights,
            gateway: self.gateway.as_ref(),
            notifier: self.notifier.as_ref(),
        }
    }
}

impl HasJwt for PaymentState {
    fn jwt(&self) -> &JwtKeys {
        &self.jwt
    }
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/payments",
    request_body = CreatePaymentRequest,
    responses(
        (status = 201, description = "Payment recorded; status tells whether the charge went through", body = Payment),
        (status = 400, description = "Already paid or amount mismatch"),
        (status = 404, description = "Booking not found or does not belong to you")
    ),
    security(("bearer" = [])),
    tag = "Payments"
))]
pub async fn create_payment_handler(
    State(state): State<Arc<PaymentState>>,
    auth: AuthUser,
    Json(payload): Json<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<Payment>), AirlineError> {
    let payment = logic::create_payment(state.deps(), auth.user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/payments",
    responses(
        (status = 200, description = "The caller's payments, newest first", body = [Payment])
    ),
    security(("bearer" = [])),
    tag = "Payments"
))]
pub async fn list_payments_handler(
    State(state): State<Arc<PaymentState>>,
    auth: AuthUser,
) -> Result<Json<Vec<Payment>>, AirlineError> {
    Ok(Json(state.payments.list_for_user(auth.user_id).await?))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/payments/{payment_id}",
    params(("payment_id" = String, Path, description = "Public payment id, e.g. PAY-3F9A0C1B2D4E")),
    responses(
        (status = 200, description = "Payment details", body = Payment),
        (status = 404, description = "Payment not found")
    ),
    security(("bearer" = [])),
    tag = "Payments"
))]
pub async fn get_payment_handler(
    State(state): State<Arc<PaymentState>>,
    auth: AuthUser,
    Path(payment_id): Path<String>,
) -> Result<Json<Payment>, AirlineError> {
    state
        .payments
        .find_owned(&payment_id, auth.user_id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found("Payment not found"))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/payments/booking/{booking_id}",
    params(("booking_id" = i64, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Latest payment for the booking, or null", body = Option<Payment>),
        (status = 404, description = "Booking not found or does not belong to you")
    ),
    security(("bearer" = [])),
    tag = "Payments"
))]
pub async fn booking_payment_handler(
    State(state): State<Arc<PaymentState>>,
    auth: AuthUser,
    Path(booking_id): Path<i64>,
) -> Result<Json<Option<Payment>>, AirlineError> {
    let payment =
        logic::payment_for_booking(&state.payments, &state.bookings, auth.user_id, booking_id)
            .await?;
    Ok(Json(payment))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/payments/{payment_id}/refund",
    params(("payment_id" = String, Path, description = "Public payment id")),
    responses(
        (status = 200, description = "Refund processed", body = RefundResponse),
        (status = 400, description = "Payment already refunded or not completed"),
        (status = 404, description = "Payment not found")
    ),
    security(("bearer" = [])),
    tag = "Payments"
))]
pub async fn refund_payment_handler(
    State(state): State<Arc<PaymentState>>,
    auth: AuthUser,
    Path(payment_id): Path<String>,
) -> Result<Json<RefundResponse>, AirlineError> {
    let response = logic::refund_payment(
        &state.payments,
        state.gateway.as_ref(),
        auth.user_id,
        &payment_id,
    )
    .await?;
    Ok(Json(response))
}
