//! Rows of the shared schema, as the services see them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::error::DbError;

/// Formats a timestamp the way it is stored (`2030-01-31T08:15:00Z`).
pub fn to_db_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Reads a stored timestamp. Rows written by older tooling use the
/// `YYYY-MM-DD HH:MM:SS` form and are taken as UTC.
pub fn parse_db_time(value: &str) -> Result<DateTime<Utc>, DbError> {
    if let Ok(time) = DateTime::parse_from_rfc3339(value) {
        return Ok(time.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| DbError::DecodeError(format!("invalid timestamp: {}", value)))
}

macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[cfg_attr(feature = "openapi", derive(ToSchema))]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = DbError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($text => Ok($name::$variant),)+
                    other => Err(DbError::DecodeError(format!(
                        "unknown {} value: {}",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }
    };
}

text_enum!(
    /// Lifecycle of a seat reservation.
    BookingStatus {
        Confirmed => "confirmed",
        Cancelled => "cancelled",
    }
);

text_enum!(
    PaymentStatus {
        Pending => "pending",
        Completed => "completed",
        Failed => "failed",
        Refunded => "refunded",
    }
);

text_enum!(
    /// Where a checked bag is in its journey.
    BaggageStatus {
        CheckedIn => "checked_in",
        Loaded => "loaded",
        InTransit => "in_transit",
        Unloaded => "unloaded",
        Delivered => "delivered",
        Lost => "lost",
    }
);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
}

/// Partial profile update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Airline {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAirline {
    pub name: String,
    pub code: String,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Flight {
    pub id: i64,
    pub airline_id: i64,
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub total_seats: i64,
    pub available_seats: i64,
    pub price: f64,
}

#[derive(Debug, Clone)]
pub struct NewFlight {
    pub airline_id: i64,
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub total_seats: i64,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Booking {
    pub id: i64,
    pub user_id: i64,
    pub flight_id: i64,
    pub seat_number: String,
    pub booking_date: DateTime<Utc>,
    pub status: BookingStatus,
}

/// A booking joined with its passenger and flight number, for the admin listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BookingOverview {
    pub id: i64,
    pub user_id: i64,
    pub user_email: Option<String>,
    pub user_name: Option<String>,
    pub flight_id: i64,
    pub flight_number: Option<String>,
    pub seat_number: String,
    pub booking_date: DateTime<Utc>,
    pub status: BookingStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Payment {
    pub id: i64,
    pub booking_id: i64,
    pub user_id: i64,
    pub payment_id: String,
    pub amount: f64,
    pub currency: String,
    pub payment_method: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub refund_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub booking_id: i64,
    pub user_id: i64,
    pub payment_id: String,
    pub amount: f64,
    pub currency: String,
    pub payment_method: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Baggage {
    pub id: i64,
    pub booking_id: i64,
    pub baggage_tag: String,
    pub weight: Option<f64>,
    pub status: BaggageStatus,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A bag together with the user owning its booking.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnedBaggage {
    pub baggage: Baggage,
    pub owner_id: i64,
}

#[derive(Debug, Clone)]
pub struct NewBaggage {
    pub booking_id: i64,
    pub baggage_tag: String,
    pub weight: Option<f64>,
    pub location: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Statistics {
    pub total_users: i64,
    pub total_flights: i64,
    pub total_bookings: i64,
    pub total_baggage: i64,
}
