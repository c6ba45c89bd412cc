//! Repository for flights

use std::future::Future;

use chrono::NaiveDate;
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, info};

use crate::error::{query_error, DbError};
use crate::models::{parse_db_time, to_db_time, BookingStatus, Flight, NewFlight};
use crate::DbClient;

pub(crate) const FLIGHT_COLUMNS: &str = "id, airline_id, flight_number, origin, destination, \
     departure_time, arrival_time, total_seats, available_seats, price";

/// A deleted flight and the passengers whose confirmed bookings it cancelled.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedFlight {
    pub flight: Flight,
    pub affected_user_ids: Vec<i64>,
}

pub trait FlightRepository {
    /// Flights with free seats, earliest departure first, optionally limited to one
    /// departure day (UTC).
    fn search(
        &self,
        departure_date: Option<NaiveDate>,
    ) -> impl Future<Output = Result<Vec<Flight>, DbError>> + Send;

    fn find_by_id(&self, id: i64) -> impl Future<Output = Result<Option<Flight>, DbError>> + Send;

    /// Seat numbers held by confirmed bookings.
    fn booked_seats(
        &self,
        flight_id: i64,
    ) -> impl Future<Output = Result<Vec<String>, DbError>> + Send;

    /// Inserts a flight with every seat available.
    fn create(&self, flight: NewFlight) -> impl Future<Output = Result<Flight, DbError>> + Send;

    /// Every flight, latest departure first.
    fn list_all(&self) -> impl Future<Output = Result<Vec<Flight>, DbError>> + Send;

    /// Cancels the flight's confirmed bookings and deletes it, atomically.
    /// Returns `None` if there is no such flight.
    fn delete_with_bookings(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Option<RemovedFlight>, DbError>> + Send;
}

#[derive(Debug, Clone)]
pub struct SqlFlightRepository {
    db_client: DbClient,
}

impl SqlFlightRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

pub(crate) fn flight_from_row(row: &AnyRow) -> Result<Flight, DbError> {
    let departure_time: String = row.try_get("departure_time")?;
    let arrival_time: String = row.try_get("arrival_time")?;
    Ok(Flight {
        id: row.try_get("id")?,
        airline_id: row.try_get("airline_id")?,
        flight_number: row.try_get("flight_number")?,
        origin: row.try_get("origin")?,
        destination: row.try_get("destination")?,
        departure_time: parse_db_time(&departure_time)?,
        arrival_time: parse_db_time(&arrival_time)?,
        total_seats: row.try_get("total_seats")?,
        available_seats: row.try_get("available_seats")?,
        price: row.try_get("price")?,
    })
}

impl FlightRepository for SqlFlightRepository {
    async fn search(&self, departure_date: Option<NaiveDate>) -> Result<Vec<Flight>, DbError> {
        debug!("Searching flights, departure date: {:?}", departure_date);
        let rows = match departure_date {
            Some(date) => {
                let query = format!(
                    "SELECT {} FROM flights \
                     WHERE available_seats > 0 AND substr(departure_time, 1, 10) = $1 \
                     ORDER BY departure_time",
                    FLIGHT_COLUMNS
                );
                sqlx::query(&query)
                    .bind(date.format("%Y-%m-%d").to_string())
                    .fetch_all(self.db_client.pool())
                    .await
            }
            None => {
                let query = format!(
                    "SELECT {} FROM flights WHERE available_seats > 0 ORDER BY departure_time",
                    FLIGHT_COLUMNS
                );
                sqlx::query(&query).fetch_all(self.db_client.pool()).await
            }
        }
        .map_err(query_error)?;

        rows.iter().map(flight_from_row).collect()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Flight>, DbError> {
        let query = format!("SELECT {} FROM flights WHERE id = $1", FLIGHT_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(query_error)?;
        row.as_ref().map(flight_from_row).transpose()
    }

    async fn booked_seats(&self, flight_id: i64) -> Result<Vec<String>, DbError> {
        let seats = sqlx::query_scalar(
            "SELECT seat_number FROM bookings WHERE flight_id = $1 AND status = $2 ORDER BY seat_number",
        )
        .bind(flight_id)
        .bind(BookingStatus::Confirmed.as_str())
        .fetch_all(self.db_client.pool())
        .await
        .map_err(query_error)?;
        Ok(seats)
    }

    async fn create(&self, flight: NewFlight) -> Result<Flight, DbError> {
        let query = format!(
            "INSERT INTO flights (airline_id, flight_number, origin, destination, departure_time, \
                 arrival_time, total_seats, available_seats, price) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {}",
            FLIGHT_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(flight.airline_id)
            .bind(&flight.flight_number)
            .bind(&flight.origin)
            .bind(&flight.destination)
            .bind(to_db_time(&flight.departure_time))
            .bind(to_db_time(&flight.arrival_time))
            .bind(flight.total_seats)
            .bind(flight.total_seats)
            .bind(flight.price)
            .fetch_one(self.db_client.pool())
            .await
            .map_err(query_error)?;

        let created = flight_from_row(&row)?;
        info!("Flight {} ({}) created", created.flight_number, created.id);
        Ok(created)
    }

    async fn list_all(&self) -> Result<Vec<Flight>, DbError> {
        let query = format!(
            "SELECT {} FROM flights ORDER BY departure_time DESC",
            FLIGHT_COLUMNS
        );
        let rows = sqlx::query(&query)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(query_error)?;
        rows.iter().map(flight_from_row).collect()
    }

    async fn delete_with_bookings(&self, id: i64) -> Result<Option<RemovedFlight>, DbError> {
        let mut tx = self.db_client.begin().await?;

        let query = format!("SELECT {} FROM flights WHERE id = $1", FLIGHT_COLUMNS);
        let Some(row) = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(query_error)?
        else {
            return Ok(None);
        };
        let flight = flight_from_row(&row)?;

        let affected_user_ids: Vec<i64> = sqlx::query_scalar(
            "SELECT DISTINCT user_id FROM bookings WHERE flight_id = $1 AND status = $2 ORDER BY user_id",
        )
        .bind(id)
        .bind(BookingStatus::Confirmed.as_str())
        .fetch_all(&mut *tx)
        .await
        .map_err(query_error)?;

        sqlx::query("UPDATE bookings SET status = $1 WHERE flight_id = $2 AND status = $3")
            .bind(BookingStatus::Cancelled.as_str())
            .bind(id)
            .bind(BookingStatus::Confirmed.as_str())
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;

        sqlx::query("DELETE FROM flights WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionError(e.to_string()))?;

        info!(
            "Flight {} deleted, {} passenger(s) affected",
            flight.flight_number,
            affected_user_ids.len()
        );
        Ok(Some(RemovedFlight {
            flight,
            affected_user_ids,
        }))
    }
}
