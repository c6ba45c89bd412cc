// --- File: crates/airline_common/src/models.rs ---
//! Payloads exchanged between the business services and the notification service.

use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BookingConfirmed {
    pub user_id: i64,
    #[serde(default)]
    pub booking_id: Option<i64>,
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    pub departure_time: String,
    pub seat_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BookingCancelled {
    pub user_id: i64,
    pub booking_id: i64,
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    pub departure_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct PaymentCompleted {
    pub user_id: i64,
    pub payment_id: String,
    pub amount: f64,
    pub currency: String,
    pub payment_method: String,
    pub booking_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flight_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BaggageStatusChanged {
    pub user_id: i64,
    pub baggage_tag: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum FlightChangeType {
    Cancelled,
    Rescheduled,
}

/// A flight was cancelled or moved. Flight details and recipients are captured by the
/// sender, so the flight row may already be gone when this is delivered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct FlightChanged {
    pub flight_id: i64,
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    pub departure_time: String,
    pub change_type: FlightChangeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_departure_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_arrival_time: Option<String>,
    #[serde(default)]
    pub user_ids: Vec<i64>,
}

/// A raw message handed to the mailer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}
