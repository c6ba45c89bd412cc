// --- File: crates/airline_notification/src/handlers.rs ---
use std::sync::Arc;

use axum::{extract::State, Json};
use tracing::info;

use airline_common::models::{
    BaggageStatusChanged, BookingCancelled, BookingConfirmed, EmailMessage, FlightChanged,
    PaymentCompleted,
};
use airline_common::AirlineError;
use airline_config::AppConfig;
use airline_db::{DbClient, SqlUserRepository};

use crate::logic::{self, BroadcastResponse, MailStatusResponse, NotificationResponse};
use crate::mailer::{deliver, mailer_from_config, Mailer};

// --- State for Notification Handlers ---
pub struct NotificationState {
    pub config: Arc<AppConfig>,
    pub users: SqlUserRepository,
    pub mailer: Arc<dyn Mailer>,
}

impl NotificationState {
    pub fn new(config: Arc<AppConfig>, db: DbClient) -> Self {
        let mailer = mailer_from_config(&config);
        Self::with_mailer(config, db, mailer)
    }

    pub fn with_mailer(config: Arc<AppConfig>, db: DbClient, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            users: SqlUserRepository::new(db),
            mailer,
            config,
        }
    }
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/notifications/booking-confirmed",
    request_body = BookingConfirmed,
    responses(
        (status = 200, description = "Confirmation mailed", body = NotificationResponse),
        (status = 401, description = "Missing or invalid internal secret"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Failed to send email")
    ),
    tag = "Notifications"
))]
pub async fn booking_confirmed_handler(
    State(state): State<Arc<NotificationState>>,
    Json(event): Json<BookingConfirmed>,
) -> Result<Json<NotificationResponse>, AirlineError> {
    let response = logic::notify_user(
        &state.users,
        &state.mailer,
        event.user_id,
        "Booking notification sent",
        |user| logic::booking_confirmed_email(user, &event),
    )
    .await?;
    Ok(Json(response))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/notifications/booking-cancelled",
    request_body = BookingCancelled,
    responses(
        (status = 200, description = "Cancellation mailed", body = NotificationResponse),
        (status = 404, description = "User not found"),
        (status = 500, description = "Failed to send email")
    ),
    tag = "Notifications"
))]
pub async fn booking_cancelled_handler(
    State(state): State<Arc<NotificationState>>,
    Json(event): Json<BookingCancelled>,
) -> Result<Json<NotificationResponse>, AirlineError> {
    let response = logic::notify_user(
        &state.users,
        &state.mailer,
        event.user_id,
        "Cancellation notification sent",
        |user| logic::booking_cancelled_email(user, &event),
    )
    .await?;
    Ok(Json(response))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/notifications/payment-completed",
    request_body = PaymentCompleted,
    responses(
        (status = 200, description = "Receipt mailed", body = NotificationResponse),
        (status = 404, description = "User not found"),
        (status = 500, description = "Failed to send email")
    ),
    tag = "Notifications"
))]
pub async fn payment_completed_handler(
    State(state): State<Arc<NotificationState>>,
    Json(event): Json<PaymentCompleted>,
) -> Result<Json<NotificationResponse>, AirlineError> {
    let response = logic::notify_user(
        &state.users,
        &state.mailer,
        event.user_id,
        "Payment notification sent",
        |user| logic::payment_completed_email(user, &event),
    )
    .await?;
    Ok(Json(response))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/notifications/baggage-status",
    request_body = BaggageStatusChanged,
    responses(
        (status = 200, description = "Status update mailed", body = NotificationResponse),
        (status = 404, description = "User not found"),
        (status = 500, description = "Failed to send email")
    ),
    tag = "Notifications"
))]
pub async fn baggage_status_handler(
    State(state): State<Arc<NotificationState>>,
    Json(event): Json<BaggageStatusChanged>,
) -> Result<Json<NotificationResponse>, AirlineError> {
    let response = logic::notify_user(
        &state.users,
        &state.mailer,
        event.user_id,
        "Baggage notification sent",
        |user| logic::baggage_status_email(user, &event),
    )
    .await?;
    Ok(Json(response))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/notifications/flight-change",
    request_body = FlightChanged,
    responses(
        (status = 200, description = "Number of passengers mailed", body = BroadcastResponse)
    ),
    tag = "Notifications"
))]
pub async fn flight_change_handler(
    State(state): State<Arc<NotificationState>>,
    Json(event): Json<FlightChanged>,
) -> Result<Json<BroadcastResponse>, AirlineError> {
    let response = logic::broadcast_flight_change(&state.users, &state.mailer, &event).await?;
    Ok(Json(response))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/notifications/email",
    request_body = EmailMessage,
    responses(
        (status = 200, description = "Message sent", body = NotificationResponse),
        (status = 500, description = "Failed to send email")
    ),
    tag = "Notifications"
))]
pub async fn send_email_handler(
    State(state): State<Arc<NotificationState>>,
    Json(message): Json<EmailMessage>,
) -> Result<Json<NotificationResponse>, AirlineError> {
    let to = message.to.clone();
    deliver(state.mailer.clone(), message).await?;
    info!("Raw email delivered to {}", to);
    Ok(Json(NotificationResponse {
        message: "Email sent".to_string(),
        to,
    }))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/notifications/status",
    responses(
        (status = 200, description = "Mail transport configuration", body = MailStatusResponse)
    ),
    tag = "Notifications"
))]
pub async fn mail_status_handler(
    State(state): State<Arc<NotificationState>>,
) -> Json<MailStatusResponse> {
    let smtp = state
        .config
        .smtp
        .as_ref()
        .filter(|smtp| smtp.is_configured());
    Json(MailStatusResponse {
        smtp_configured: smtp.is_some(),
        smtp_host: smtp.map(|smtp| smtp.host.clone()),
    })
}
