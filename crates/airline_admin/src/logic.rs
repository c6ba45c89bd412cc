// --- File: crates/airline_admin/src/logic.rs ---
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, warn};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use airline_common::error::{not_found, validation_error};
use airline_common::models::{FlightChangeType, FlightChanged};
use airline_common::{notify_quietly, AirlineError, NotificationEvent, Notifier};
use airline_db::models::{
    to_db_time, Airline, Booking, BookingStatus, Flight, NewAirline, NewFlight,
};
use airline_db::{AirlineRepository, BookingRepository, FlightRepository, StatusChange};

#[derive(Deserialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateAirlineRequest {
    #[cfg_attr(feature = "openapi", schema(example = "Air Moldova"))]
    pub name: String,
    #[cfg_attr(feature = "openapi", schema(example = "9U"))]
    pub code: String,
    pub country: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateFlightRequest {
    pub airline_id: i64,
    #[cfg_attr(feature = "openapi", schema(example = "9U101"))]
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub total_seats: i64,
    pub price: f64,
}

#[derive(Deserialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BookingStatusUpdate {
    pub status: BookingStatus,
}

fn required(value: &str, field: &str) -> Result<String, AirlineError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(validation_error(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

// --- Airlines ---

pub async fn create_airline<A: AirlineRepository>(
    airlines: &A,
    request: CreateAirlineRequest,
) -> Result<Airline, AirlineError> {
    let name = required(&request.name, "Name")?;
    let code = required(&request.code, "Code")?;
    let country = request
        .country
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    if airlines.find_by_code(&code).await?.is_some() {
        return Err(validation_error("Airline code already exists"));
    }

    match airlines.create(NewAirline { name, code, country }).await {
        Ok(airline) => {
            info!("Airline {} ({}) created", airline.name, airline.code);
            Ok(airline)
        }
        // Lost a race with a concurrent insert of the same code.
        Err(e) if e.is_unique_violation() => Err(validation_error("Airline code already exists")),
        Err(e) => Err(e.into()),
    }
}

// --- Flights ---

/// Checks the request and turns it into a row with every seat free.
pub fn validate_flight(request: CreateFlightRequest) -> Result<NewFlight, AirlineError> {
    let flight_number = required(&request.flight_number, "Flight number")?;
    let origin = required(&request.origin, "Origin")?;
    let destination = required(&request.destination, "Destination")?;

    if request.total_seats <= 0 {
        return Err(validation_error("Total seats must be positive"));
    }
    if request.price < 0.0 || !request.price.is_finite() {
        return Err(validation_error("Price cannot be negative"));
    }
    if request.arrival_time <= request.departure_time {
        return Err(validation_error("Arrival time must be after departure time"));
    }

    Ok(NewFlight {
        airline_id: request.airline_id,
        flight_number,
        origin,
        destination,
        departure_time: request.departure_time,
        arrival_time: request.arrival_time,
        total_seats: request.total_seats,
        price: request.price,
    })
}

pub async fn create_flight<A, F>(
    airlines: &A,
    flights: &F,
    request: CreateFlightRequest,
) -> Result<Flight, AirlineError>
where
    A: AirlineRepository,
    F: FlightRepository,
{
    let new_flight = validate_flight(request)?;
    airlines
        .find_by_id(new_flight.airline_id)
        .await?
        .ok_or_else(|| not_found("Airline not found"))?;

    let flight = flights.create(new_flight).await?;
    info!(
        "Flight {} scheduled {} → {} with {} seats",
        flight.flight_number, flight.origin, flight.destination, flight.total_seats
    );
    Ok(flight)
}

/// Deletes the flight, cancelling its confirmed bookings, then tells the passengers.
pub async fn delete_flight<F: FlightRepository>(
    flights: &F,
    notifier: &dyn Notifier,
    flight_id: i64,
) -> Result<(), AirlineError> {
    let removed = flights
        .delete_with_bookings(flight_id)
        .await?
        .ok_or_else(|| not_found("Flight not found"))?;

    let flight = removed.flight;
    if removed.affected_user_ids.is_empty() {
        info!("Flight {} had no confirmed passengers", flight.flight_number);
    }
    notify_quietly(
        notifier,
        NotificationEvent::FlightChanged(FlightChanged {
            flight_id: flight.id,
            flight_number: flight.flight_number,
            origin: flight.origin,
            destination: flight.destination,
            departure_time: to_db_time(&flight.departure_time),
            change_type: FlightChangeType::Cancelled,
            new_departure_time: None,
            new_arrival_time: None,
            user_ids: removed.affected_user_ids,
        }),
    )
    .await;
    Ok(())
}

// --- Bookings ---

pub async fn set_booking_status<B: BookingRepository>(
    bookings: &B,
    booking_id: i64,
    status: BookingStatus,
) -> Result<Booking, AirlineError> {
    match bookings.set_status(booking_id, status).await? {
        StatusChange::Updated(booking) => Ok(booking),
        StatusChange::NotFound => Err(not_found("Booking not found")),
        StatusChange::FlightGone => {
            warn!("Booking {} cannot be confirmed, its flight is gone", booking_id);
            Err(validation_error("Flight no longer exists"))
        }
        StatusChange::SeatTaken => Err(validation_error("Seat already booked")),
        StatusChange::NoSeatsLeft => Err(validation_error("No available seats on this flight")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn request() -> CreateFlightRequest {
        let departure = Utc.with_ymd_and_hms(2030, 6, 1, 8, 0, 0).unwrap();
        CreateFlightRequest {
            airline_id: 1,
            flight_number: " 9U101 ".to_string(),
            origin: "Chișinău".to_string(),
            destination: "Paris".to_string(),
            departure_time: departure,
            arrival_time: departure + Duration::hours(3),
            total_seats: 120,
            price: 0.0,
        }
    }

    fn detail(result: Result<NewFlight, AirlineError>) -> String {
        result.unwrap_err().detail()
    }

    #[test]
    fn valid_flight_is_trimmed() {
        let flight = validate_flight(request()).unwrap();
        assert_eq!(flight.flight_number, "9U101");
        assert_eq!(flight.total_seats, 120);
    }

    #[test]
    fn seats_price_and_times_are_checked() {
        let mut r = request();
        r.total_seats = 0;
        assert_eq!(detail(validate_flight(r)), "Total seats must be positive");

        let mut r = request();
        r.price = -1.0;
        assert_eq!(detail(validate_flight(r)), "Price cannot be negative");

        let mut r = request();
        r.arrival_time = r.departure_time;
        assert_eq!(detail(validate_flight(r)), "Arrival time must be after departure time");

        let mut r = request();
        r.origin = "  ".to_string();
        assert_eq!(detail(validate_flight(r)), "Origin is required");
    }

    #[test]
    fn status_update_rejects_unknown_values() {
        let update: BookingStatusUpdate = serde_json::from_str(r#"{"status":"cancelled"}"#).unwrap();
        assert_eq!(update.status, BookingStatus::Cancelled);
        assert!(serde_json::from_str::<BookingStatusUpdate>(r#"{"status":"pending"}"#).is_err());
    }
}
