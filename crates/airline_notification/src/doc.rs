// --- File: crates/airline_notification/src/doc.rs ---
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::logic::{BroadcastResponse, MailStatusResponse, NotificationResponse};
use airline_common::models::{
    BaggageStatusChanged, BookingCancelled, BookingConfirmed, EmailMessage, FlightChangeType,
    FlightChanged, PaymentCompleted,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::booking_confirmed_handler,
        crate::handlers::booking_cancelled_handler,
        crate::handlers::payment_completed_handler,
        crate::handlers::baggage_status_handler,
        crate::handlers::flight_change_handler,
        crate::handlers::send_email_handler,
        crate::handlers::mail_status_handler
    ),
    components(
        schemas(
            BookingConfirmed,
            BookingCancelled,
            PaymentCompleted,
            BaggageStatusChanged,
            FlightChanged,
            FlightChangeType,
            EmailMessage,
            NotificationResponse,
            BroadcastResponse,
            MailStatusResponse
        )
    ),
    tags(
        (name = "Notifications", description = "Internal e-mail delivery for the other services")
    )
)]
pub struct NotificationApiDoc;
