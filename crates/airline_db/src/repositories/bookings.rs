//! Repository for bookings
//!
//! Seat accounting lives here. Reserving and releasing a seat always happens in the same
//! transaction as the booking row change, and the decrement is conditional, so two
//! concurrent reservations can never push `available_seats` below zero.

use std::future::Future;

use chrono::Utc;
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, info, warn};

use crate::client::DbTransaction;
use crate::error::{query_error, DbError};
use crate::models::{parse_db_time, to_db_time, Booking, BookingOverview, BookingStatus, Flight};
use crate::repositories::flights::{flight_from_row, FLIGHT_COLUMNS};
use crate::repositories::opt_column;
use crate::DbClient;

const BOOKING_COLUMNS: &str = "id, user_id, flight_id, seat_number, booking_date, status";

/// Result of a reservation attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ReserveOutcome {
    Reserved { booking: Booking, flight: Flight },
    FlightNotFound,
    NoSeatsLeft,
    SeatTaken,
}

/// Result of a passenger cancelling their own booking.
#[derive(Debug, Clone, PartialEq)]
pub enum CancelOutcome {
    Cancelled {
        booking: Booking,
        flight: Option<Flight>,
    },
    NotFound,
    AlreadyCancelled,
}

/// Result of an administrative status change.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusChange {
    Updated(Booking),
    NotFound,
    /// Re-confirming failed because the flight no longer exists.
    FlightGone,
    SeatTaken,
    NoSeatsLeft,
}

/// A booking with the flight it refers to, which may have been deleted since.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingWithFlight {
    pub booking: Booking,
    pub flight: Option<Flight>,
}

pub trait BookingRepository {
    /// Reserves `seat_number` on the flight and records a confirmed booking.
    fn reserve(
        &self,
        user_id: i64,
        flight_id: i64,
        seat_number: &str,
    ) -> impl Future<Output = Result<ReserveOutcome, DbError>> + Send;

    fn find_by_id(&self, id: i64)
        -> impl Future<Output = Result<Option<Booking>, DbError>> + Send;

    /// The booking, if it exists and belongs to `user_id`.
    fn find_owned(
        &self,
        id: i64,
        user_id: i64,
    ) -> impl Future<Output = Result<Option<Booking>, DbError>> + Send;

    /// The caller's bookings, newest first, each with its flight.
    fn list_for_user(
        &self,
        user_id: i64,
    ) -> impl Future<Output = Result<Vec<BookingWithFlight>, DbError>> + Send;

    /// Cancels an owned booking and gives its seat back.
    fn cancel(
        &self,
        id: i64,
        user_id: i64,
    ) -> impl Future<Output = Result<CancelOutcome, DbError>> + Send;

    /// Every booking with passenger and flight number, newest first.
    fn list_overview(&self) -> impl Future<Output = Result<Vec<BookingOverview>, DbError>> + Send;

    /// Moves a booking to `status`, adjusting the flight's free seats when it moves
    /// between confirmed and cancelled.
    fn set_status(
        &self,
        id: i64,
        status: BookingStatus,
    ) -> impl Future<Output = Result<StatusChange, DbError>> + Send;
}

#[derive(Debug, Clone)]
pub struct SqlBookingRepository {
    db_client: DbClient,
}

impl SqlBookingRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

pub(crate) fn booking_from_row(row: &AnyRow) -> Result<Booking, DbError> {
    let booking_date: String = row.try_get("booking_date")?;
    let status: String = row.try_get("status")?;
    Ok(Booking {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        flight_id: row.try_get("flight_id")?,
        seat_number: row.try_get("seat_number")?,
        booking_date: parse_db_time(&booking_date)?,
        status: status.parse()?,
    })
}

fn overview_from_row(row: &AnyRow) -> Result<BookingOverview, DbError> {
    let booking_date: String = row.try_get("booking_date")?;
    let status: String = row.try_get("status")?;
    let first_name: Option<String> = opt_column(row, "first_name")?;
    let last_name: Option<String> = opt_column(row, "last_name")?;
    let user_name = match (first_name, last_name) {
        (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
        (first, last) => first.or(last),
    };
    Ok(BookingOverview {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        user_email: opt_column(row, "email")?,
        user_name,
        flight_id: row.try_get("flight_id")?,
        flight_number: opt_column(row, "flight_number")?,
        seat_number: row.try_get("seat_number")?,
        booking_date: parse_db_time(&booking_date)?,
        status: status.parse()?,
    })
}

async fn fetch_flight(tx: &mut DbTransaction<'_>, id: i64) -> Result<Option<Flight>, DbError> {
    let query = format!("SELECT {} FROM flights WHERE id = $1", FLIGHT_COLUMNS);
    let row = sqlx::query(&query)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(query_error)?;
    row.as_ref().map(flight_from_row).transpose()
}

async fn fetch_booking(tx: &mut DbTransaction<'_>, id: i64) -> Result<Option<Booking>, DbError> {
    let query = format!("SELECT {} FROM bookings WHERE id = $1", BOOKING_COLUMNS);
    let row = sqlx::query(&query)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(query_error)?;
    row.as_ref().map(booking_from_row).transpose()
}

/// Takes one seat if any is left. Returns false when the flight is full.
async fn take_seat(tx: &mut DbTransaction<'_>, flight_id: i64) -> Result<bool, DbError> {
    let result = sqlx::query(
        "UPDATE flights SET available_seats = available_seats - 1 \
         WHERE id = $1 AND available_seats > 0",
    )
    .bind(flight_id)
    .execute(&mut **tx)
    .await
    .map_err(query_error)?;
    Ok(result.rows_affected() == 1)
}

/// Gives one seat back, never beyond the flight's capacity. A deleted flight is a no-op.
async fn release_seat(tx: &mut DbTransaction<'_>, flight_id: i64) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE flights SET available_seats = available_seats + 1 \
         WHERE id = $1 AND available_seats < total_seats",
    )
    .bind(flight_id)
    .execute(&mut **tx)
    .await
    .map_err(query_error)?;
    Ok(())
}

async fn seat_is_held(
    tx: &mut DbTransaction<'_>,
    flight_id: i64,
    seat_number: &str,
) -> Result<bool, DbError> {
    let held: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM bookings WHERE flight_id = $1 AND seat_number = $2 AND status = $3",
    )
    .bind(flight_id)
    .bind(seat_number)
    .bind(BookingStatus::Confirmed.as_str())
    .fetch_one(&mut **tx)
    .await
    .map_err(query_error)?;
    Ok(held > 0)
}

async fn write_status(
    tx: &mut DbTransaction<'_>,
    id: i64,
    status: BookingStatus,
) -> Result<Booking, DbError> {
    let query = format!(
        "UPDATE bookings SET status = $1 WHERE id = $2 RETURNING {}",
        BOOKING_COLUMNS
    );
    let row = sqlx::query(&query)
        .bind(status.as_str())
        .bind(id)
        .fetch_one(&mut **tx)
        .await
        .map_err(query_error)?;
    booking_from_row(&row)
}

async fn commit(tx: DbTransaction<'_>) -> Result<(), DbError> {
    tx.commit()
        .await
        .map_err(|e| DbError::TransactionError(e.to_string()))
}

impl BookingRepository for SqlBookingRepository {
    async fn reserve(
        &self,
        user_id: i64,
        flight_id: i64,
        seat_number: &str,
    ) -> Result<ReserveOutcome, DbError> {
        debug!(
            "Reserving seat {} on flight {} for user {}",
            seat_number, flight_id, user_id
        );
        let mut tx = self.db_client.begin().await?;

        // The decrement comes first so the transaction holds the write lock before it reads.
        // Concurrent reservations then queue instead of failing on a lock upgrade, and an
        // early return rolls the decrement back.
        if !take_seat(&mut tx, flight_id).await? {
            return Ok(match fetch_flight(&mut tx, flight_id).await? {
                Some(_) => ReserveOutcome::NoSeatsLeft,
                None => ReserveOutcome::FlightNotFound,
            });
        }
        if seat_is_held(&mut tx, flight_id, seat_number).await? {
            return Ok(ReserveOutcome::SeatTaken);
        }

        let query = format!(
            "INSERT INTO bookings (user_id, flight_id, seat_number, booking_date, status) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            BOOKING_COLUMNS
        );
        let inserted = sqlx::query(&query)
            .bind(user_id)
            .bind(flight_id)
            .bind(seat_number)
            .bind(to_db_time(&Utc::now()))
            .bind(BookingStatus::Confirmed.as_str())
            .fetch_one(&mut *tx)
            .await
            .map_err(query_error);

        // A concurrent reservation of the same seat trips the partial unique index.
        let row = match inserted {
            Ok(row) => row,
            Err(e) if e.is_unique_violation() => {
                warn!("Seat {} on flight {} taken concurrently", seat_number, flight_id);
                return Ok(ReserveOutcome::SeatTaken);
            }
            Err(e) => return Err(e),
        };
        let booking = booking_from_row(&row)?;
        let Some(flight) = fetch_flight(&mut tx, flight_id).await? else {
            return Ok(ReserveOutcome::FlightNotFound);
        };
        commit(tx).await?;

        info!("Booking {} confirmed", booking.id);
        Ok(ReserveOutcome::Reserved { booking, flight })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Booking>, DbError> {
        let query = format!("SELECT {} FROM bookings WHERE id = $1", BOOKING_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(query_error)?;
        row.as_ref().map(booking_from_row).transpose()
    }

    async fn find_owned(&self, id: i64, user_id: i64) -> Result<Option<Booking>, DbError> {
        let query = format!(
            "SELECT {} FROM bookings WHERE id = $1 AND user_id = $2",
            BOOKING_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(query_error)?;
        row.as_ref().map(booking_from_row).transpose()
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<BookingWithFlight>, DbError> {
        // Flight columns are aliased so they do not collide with the booking's.
        let query = "SELECT b.id, b.user_id, b.flight_id, b.seat_number, b.booking_date, b.status, \
                 f.id AS f_id, f.airline_id AS f_airline_id, f.flight_number AS f_flight_number, \
                 f.origin AS f_origin, f.destination AS f_destination, \
                 f.departure_time AS f_departure_time, f.arrival_time AS f_arrival_time, \
                 f.total_seats AS f_total_seats, f.available_seats AS f_available_seats, \
                 f.price AS f_price \
             FROM bookings b LEFT JOIN flights f ON f.id = b.flight_id \
             WHERE b.user_id = $1 ORDER BY b.booking_date DESC, b.id DESC";
        let rows = sqlx::query(query)
            .bind(user_id)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(query_error)?;

        rows.iter()
            .map(|row| {
                let booking = booking_from_row(row)?;
                let flight_id: Option<i64> = opt_column(row, "f_id")?;
                let flight = match flight_id {
                    Some(id) => {
                        let departure_time: String = row.try_get("f_departure_time")?;
                        let arrival_time: String = row.try_get("f_arrival_time")?;
                        Some(Flight {
                            id,
                            airline_id: row.try_get("f_airline_id")?,
                            flight_number: row.try_get("f_flight_number")?,
                            origin: row.try_get("f_origin")?,
                            destination: row.try_get("f_destination")?,
                            departure_time: parse_db_time(&departure_time)?,
                            arrival_time: parse_db_time(&arrival_time)?,
                            total_seats: row.try_get("f_total_seats")?,
                            available_seats: row.try_get("f_available_seats")?,
                            price: row.try_get("f_price")?,
                        })
                    }
                    None => None,
                };
                Ok(BookingWithFlight { booking, flight })
            })
            .collect()
    }

    async fn cancel(&self, id: i64, user_id: i64) -> Result<CancelOutcome, DbError> {
        let mut tx = self.db_client.begin().await?;

        let booking = match fetch_booking(&mut tx, id).await? {
            Some(booking) if booking.user_id == user_id => booking,
            _ => return Ok(CancelOutcome::NotFound),
        };
        if booking.status == BookingStatus::Cancelled {
            return Ok(CancelOutcome::AlreadyCancelled);
        }

        let booking = write_status(&mut tx, id, BookingStatus::Cancelled).await?;
        release_seat(&mut tx, booking.flight_id).await?;
        let flight = fetch_flight(&mut tx, booking.flight_id).await?;
        commit(tx).await?;

        info!("Booking {} cancelled by user {}", id, user_id);
        Ok(CancelOutcome::Cancelled { booking, flight })
    }

    async fn list_overview(&self) -> Result<Vec<BookingOverview>, DbError> {
        let rows = sqlx::query(
            "SELECT b.id, b.user_id, b.flight_id, b.seat_number, b.booking_date, b.status, \
                 u.email, u.first_name, u.last_name, f.flight_number \
             FROM bookings b \
             LEFT JOIN users u ON u.id = b.user_id \
             LEFT JOIN flights f ON f.id = b.flight_id \
             ORDER BY b.booking_date DESC, b.id DESC",
        )
        .fetch_all(self.db_client.pool())
        .await
        .map_err(query_error)?;
        rows.iter().map(overview_from_row).collect()
    }

    async fn set_status(&self, id: i64, status: BookingStatus) -> Result<StatusChange, DbError> {
        let mut tx = self.db_client.begin().await?;

        let Some(current) = fetch_booking(&mut tx, id).await? else {
            return Ok(StatusChange::NotFound);
        };
        if current.status == status {
            return Ok(StatusChange::Updated(current));
        }

        match status {
            BookingStatus::Cancelled => release_seat(&mut tx, current.flight_id).await?,
            BookingStatus::Confirmed => {
                if fetch_flight(&mut tx, current.flight_id).await?.is_none() {
                    return Ok(StatusChange::FlightGone);
                }
                if seat_is_held(&mut tx, current.flight_id, &current.seat_number).await? {
                    return Ok(StatusChange::SeatTaken);
                }
                if !take_seat(&mut tx, current.flight_id).await? {
                    return Ok(StatusChange::NoSeatsLeft);
                }
            }
        }

        let updated = write_status(&mut tx, id, status).await?;
        commit(tx).await?;

        info!("Booking {} moved to {}", id, status);
        Ok(StatusChange::Updated(updated))
    }
}
