// --- File: crates/airline_common/src/services.rs ---
//! Service abstractions for calls between airline services.
//!
//! Business services never talk to the notification service directly; they hold an
//! `Arc<dyn Notifier>` so tests can swap the HTTP client for a recorder.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use airline_config::AppConfig;

use crate::error::{external_service_error, AirlineError};
use crate::http::{client::HTTP_CLIENT, INTERNAL_AUTH_HEADER};
use crate::models::{
    BaggageStatusChanged, BookingCancelled, BookingConfirmed, FlightChanged, PaymentCompleted,
};

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// An event the notification service knows how to turn into mail.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NotificationEvent {
    BookingConfirmed(BookingConfirmed),
    BookingCancelled(BookingCancelled),
    PaymentCompleted(PaymentCompleted),
    BaggageStatusChanged(BaggageStatusChanged),
    FlightChanged(FlightChanged),
}

impl NotificationEvent {
    /// Path of the receiving endpoint, relative to the notification service base URL.
    pub fn path(&self) -> &'static str {
        match self {
            NotificationEvent::BookingConfirmed(_) => "/api/notifications/booking-confirmed",
            NotificationEvent::BookingCancelled(_) => "/api/notifications/booking-cancelled",
            NotificationEvent::PaymentCompleted(_) => "/api/notifications/payment-completed",
            NotificationEvent::BaggageStatusChanged(_) => "/api/notifications/baggage-status",
            NotificationEvent::FlightChanged(_) => "/api/notifications/flight-change",
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            NotificationEvent::BookingConfirmed(_) => "booking_confirmed",
            NotificationEvent::BookingCancelled(_) => "booking_cancelled",
            NotificationEvent::PaymentCompleted(_) => "payment_completed",
            NotificationEvent::BaggageStatusChanged(_) => "baggage_status",
            NotificationEvent::FlightChanged(_) => "flight_change",
        }
    }
}

/// A trait for notification delivery.
pub trait Notifier: Send + Sync {
    /// Hands the event to the notification service.
    fn notify(&self, event: NotificationEvent) -> BoxFuture<'_, (), AirlineError>;
}

/// Delivers events with `reqwest` to the notification service.
#[derive(Debug, Clone)]
pub struct HttpNotifier {
    base_url: String,
    internal_secret: Option<String>,
    request_timeout: Duration,
    broadcast_timeout: Duration,
}

impl HttpNotifier {
    pub fn new(
        base_url: impl Into<String>,
        internal_secret: Option<String>,
        request_timeout: Duration,
        broadcast_timeout: Duration,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            internal_secret,
            request_timeout,
            broadcast_timeout,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.services.notification_url.clone(),
            config.notification.internal_secret.clone(),
            Duration::from_secs(config.notification.request_timeout_secs),
            Duration::from_secs(config.notification.broadcast_timeout_secs),
        )
    }

    fn timeout_for(&self, event: &NotificationEvent) -> Duration {
        match event {
            NotificationEvent::FlightChanged(_) => self.broadcast_timeout,
            _ => self.request_timeout,
        }
    }
}

impl Notifier for HttpNotifier {
    fn notify(&self, event: NotificationEvent) -> BoxFuture<'_, (), AirlineError> {
        Box::pin(async move {
            let url = format!("{}{}", self.base_url, event.path());
            debug!("posting {} notification to {}", event.kind(), url);

            let mut request = HTTP_CLIENT
                .post(&url)
                .timeout(self.timeout_for(&event))
                .json(&event);
            if let Some(secret) = &self.internal_secret {
                request = request.header(INTERNAL_AUTH_HEADER, secret);
            }

            let response = request.send().await?;
            if !response.status().is_success() {
                return Err(external_service_error(
                    "Notification service",
                    format!("{} returned {}", url, response.status()),
                ));
            }
            Ok(())
        })
    }
}

/// Sends the event and logs failures instead of returning them.
pub async fn notify_quietly(notifier: &dyn Notifier, event: NotificationEvent) {
    let kind = event.kind();
    if let Err(e) = notifier.notify(event).await {
        warn!("{} notification not delivered: {}", kind, e);
    }
}
