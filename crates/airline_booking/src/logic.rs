// --- File: crates/airline_booking/src/logic.rs ---
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

#[cfg(feature = "openapi")]
use utoipa::{IntoParams, ToSchema};

use airline_common::error::{not_found, validation_error};
use airline_common::models::{BookingCancelled, BookingConfirmed};
use airline_common::{notify_quietly, AirlineError, NotificationEvent, Notifier};
use airline_db::models::{to_db_time, Booking, Flight};
use airline_db::{BookingRepository, BookingWithFlight, CancelOutcome, ReserveOutcome};

// --- Request / response types ---

#[derive(Deserialize, Debug, Clone, Default)]
#[cfg_attr(feature = "openapi", derive(ToSchema, IntoParams))]
pub struct FlightSearchQuery {
    pub origin: Option<String>,
    pub destination: Option<String>,
    /// `YYYY-MM-DD`; any other value is ignored.
    pub departure_date: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateBookingRequest {
    pub flight_id: i64,
    pub seat_number: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BookedSeatsResponse {
    pub booked_seats: Vec<String>,
}

/// A booking with its flight inlined; `flight` is null once the flight is deleted.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BookingDetails {
    #[serde(flatten)]
    pub booking: Booking,
    pub flight: Option<Flight>,
}

impl From<BookingWithFlight> for BookingDetails {
    fn from(value: BookingWithFlight) -> Self {
        Self {
            booking: value.booking,
            flight: value.flight,
        }
    }
}

// --- City matching ---

const CITY_ALIASES: &[(&str, &str)] = &[
    ("кишинев", "Chișinău"),
    ("кишинеу", "Chișinău"),
    ("кишинева", "Chișinău"),
    ("кишиневе", "Chișinău"),
    ("chisinau", "Chișinău"),
    ("chishinau", "Chișinău"),
    ("париж", "Paris"),
    ("paris", "Paris"),
    ("москва", "Moscova"),
    ("moscow", "Moscova"),
    ("moscova", "Moscova"),
    ("бухарест", "București"),
    ("bucharest", "București"),
    ("bucuresti", "București"),
    ("истанбул", "Istanbul"),
    ("istanbul", "Istanbul"),
    ("лондон", "London"),
    ("london", "London"),
    ("милан", "Milano"),
    ("милано", "Milano"),
    ("milano", "Milano"),
    ("milan", "Milano"),
    ("вена", "Viena"),
    ("viena", "Viena"),
    ("vienna", "Viena"),
    ("прага", "Praga"),
    ("praga", "Praga"),
    ("prague", "Praga"),
    ("берлин", "Berlin"),
    ("berlin", "Berlin"),
];

/// Maps a user-typed city (Russian, English or ASCII Romanian) to the spelling stored
/// in the flights table. Unknown names come back trimmed but otherwise unchanged.
pub fn normalize_city_name(city: &str) -> String {
    let trimmed = city.trim();
    let lower = trimmed.to_lowercase();
    CITY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

/// Lowercases and strips Romanian diacritics (both comma and cedilla forms).
pub fn fold_diacritics(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| match c {
            'ă' | 'â' => 'a',
            'î' => 'i',
            'ș' | 'ş' => 's',
            'ț' | 'ţ' => 't',
            other => other,
        })
        .collect()
}

/// Case-insensitive substring match of `query` against a stored city name, trying the
/// raw query, its canonical alias and their diacritic-free forms.
pub fn city_matches(stored: &str, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return true;
    }
    let stored_lower = stored.to_lowercase();
    let stored_folded = fold_diacritics(stored);
    let canonical = normalize_city_name(query);

    [query, canonical.as_str()].iter().any(|candidate| {
        stored_lower.contains(&candidate.to_lowercase())
            || stored_folded.contains(&fold_diacritics(candidate))
    })
}

/// Parses the `departure_date` filter. Anything that is not `YYYY-MM-DD` disables it.
pub fn parse_departure_date(value: Option<&str>) -> Option<NaiveDate> {
    value.and_then(|v| NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d").ok())
}

pub fn filter_flights(flights: Vec<Flight>, query: &FlightSearchQuery) -> Vec<Flight> {
    flights
        .into_iter()
        .filter(|f| {
            query
                .origin
                .as_deref()
                .map_or(true, |origin| city_matches(&f.origin, origin))
                && query
                    .destination
                    .as_deref()
                    .map_or(true, |destination| city_matches(&f.destination, destination))
        })
        .collect()
}

// --- Booking operations ---

pub async fn create_booking<R: BookingRepository>(
    bookings: &R,
    notifier: &dyn Notifier,
    user_id: i64,
    request: CreateBookingRequest,
) -> Result<Booking, AirlineError> {
    let seat_number = request.seat_number.trim().to_string();
    if seat_number.is_empty() {
        return Err(validation_error("Seat number is required"));
    }

    let (booking, flight) = match bookings
        .reserve(user_id, request.flight_id, &seat_number)
        .await?
    {
        ReserveOutcome::Reserved { booking, flight } => (booking, flight),
        ReserveOutcome::FlightNotFound => return Err(not_found("Flight not found")),
        ReserveOutcome::NoSeatsLeft => {
            return Err(validation_error("No available seats on this flight"))
        }
        ReserveOutcome::SeatTaken => return Err(validation_error("Seat already booked")),
    };

    info!(
        "User {} booked seat {} on {}",
        user_id, booking.seat_number, flight.flight_number
    );

    notify_quietly(
        notifier,
        NotificationEvent::BookingConfirmed(BookingConfirmed {
            user_id,
            booking_id: Some(booking.id),
            flight_number: flight.flight_number.clone(),
            origin: flight.origin.clone(),
            destination: flight.destination.clone(),
            departure_time: to_db_time(&flight.departure_time),
            seat_number: booking.seat_number.clone(),
        }),
    )
    .await;

    Ok(booking)
}

pub async fn cancel_booking<R: BookingRepository>(
    bookings: &R,
    notifier: &dyn Notifier,
    user_id: i64,
    booking_id: i64,
) -> Result<(), AirlineError> {
    let (booking, flight) = match bookings.cancel(booking_id, user_id).await? {
        CancelOutcome::Cancelled { booking, flight } => (booking, flight),
        CancelOutcome::NotFound => return Err(not_found("Booking not found")),
        CancelOutcome::AlreadyCancelled => {
            return Err(validation_error("Booking already cancelled"))
        }
    };

    // Without the flight there is nothing meaningful to tell the passenger.
    if let Some(flight) = flight {
        notify_quietly(
            notifier,
            NotificationEvent::BookingCancelled(BookingCancelled {
                user_id,
                booking_id: booking.id,
                flight_number: flight.flight_number,
                origin: flight.origin,
                destination: flight.destination,
                departure_time: to_db_time(&flight.departure_time),
            }),
        )
        .await;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn flight(origin: &str, destination: &str) -> Flight {
        let departure = Utc.with_ymd_and_hms(2030, 3, 1, 6, 0, 0).unwrap();
        Flight {
            id: 1,
            airline_id: 1,
            flight_number: "9U101".to_string(),
            origin: origin.to_string(),
            destination: destination.to_string(),
            departure_time: departure,
            arrival_time: departure,
            total_seats: 10,
            available_seats: 10,
            price: 99.0,
        }
    }

    #[test]
    fn aliases_resolve_to_stored_spelling() {
        assert_eq!(normalize_city_name("  Москва "), "Moscova");
        assert_eq!(normalize_city_name("CHISINAU"), "Chișinău");
        assert_eq!(normalize_city_name("Tokyo"), "Tokyo");
    }

    #[test]
    fn folding_strips_romanian_diacritics() {
        assert_eq!(fold_diacritics("Chișinău"), "chisinau");
        assert_eq!(fold_diacritics("BUCUREȘTI"), "bucuresti");
        assert_eq!(fold_diacritics("Timişoara"), "timisoara");
    }

    #[test]
    fn city_matching_covers_alias_substring_and_ascii_forms() {
        assert!(city_matches("Chișinău", "кишинев"));
        assert!(city_matches("Chișinău", "chisin"));
        assert!(city_matches("București", "Bucuresti"));
        assert!(city_matches("Moscova", "moscow"));
        assert!(city_matches("London", ""));
        assert!(!city_matches("Paris", "Berlin"));
    }

    #[test]
    fn filter_applies_both_ends() {
        let flights = vec![
            flight("Chișinău", "Moscova"),
            flight("Chișinău", "Paris"),
            flight("Berlin", "Moscova"),
        ];
        let query = FlightSearchQuery {
            origin: Some("кишинев".to_string()),
            destination: Some("moscow".to_string()),
            departure_date: None,
        };
        let result = filter_flights(flights, &query);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].destination, "Moscova");
    }

    #[test]
    fn malformed_dates_disable_the_filter() {
        assert_eq!(
            parse_departure_date(Some("2030-03-01")),
            NaiveDate::from_ymd_opt(2030, 3, 1)
        );
        assert_eq!(parse_departure_date(Some("01.03.2030")), None);
        assert_eq!(parse_departure_date(Some("")), None);
        assert_eq!(parse_departure_date(None), None);
    }
}
