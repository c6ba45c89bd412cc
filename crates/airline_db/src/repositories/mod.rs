//! Repository modules for database access
//!
//! One trait per table plus its SQL implementation over [`crate::DbClient`].

use sqlx::any::AnyRow;
use sqlx::{Any, Decode, Row, Type, ValueRef};

use crate::error::DbError;

pub mod airlines;
pub mod baggage;
pub mod bookings;
pub mod flights;
pub mod payments;
pub mod statistics;
pub mod users;

pub use airlines::{AirlineRepository, SqlAirlineRepository};
pub use baggage::{BaggageRepository, SqlBaggageRepository};
pub use bookings::{
    BookingRepository, BookingWithFlight, CancelOutcome, ReserveOutcome, SqlBookingRepository,
    StatusChange,
};
pub use flights::{FlightRepository, RemovedFlight, SqlFlightRepository};
pub use payments::{PaymentRepository, SqlPaymentRepository};
pub use statistics::{SqlStatisticsRepository, StatisticsRepository};
pub use users::{SqlUserRepository, UserRepository};

/// Reads a nullable column.
///
/// The `Any` driver refuses to decode SQLite `NULL` into `Option<T>`, so the raw value
/// is checked before decoding.
pub(crate) fn opt_column<'r, T>(row: &'r AnyRow, name: &str) -> Result<Option<T>, DbError>
where
    T: Decode<'r, Any> + Type<Any>,
{
    if row.try_get_raw(name)?.is_null() {
        return Ok(None);
    }
    Ok(Some(row.try_get(name)?))
}
