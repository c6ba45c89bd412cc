//! Table definitions shared by every service.
//!
//! Timestamps are RFC 3339 `TEXT`, so the same rows decode through the `Any` driver on
//! both SQLite and PostgreSQL. `bookings.flight_id` carries no foreign key: bookings
//! outlive a deleted flight and are reported with `flight: null`.

use crate::client::{DbClient, Dialect};
use crate::error::DbError;
use tracing::{debug, info};

const SQLITE_TABLES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        phone TEXT,
        is_admin INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS airlines (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        code TEXT NOT NULL UNIQUE,
        country TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS flights (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        airline_id INTEGER NOT NULL REFERENCES airlines(id),
        flight_number TEXT NOT NULL,
        origin TEXT NOT NULL,
        destination TEXT NOT NULL,
        departure_time TEXT NOT NULL,
        arrival_time TEXT NOT NULL,
        total_seats INTEGER NOT NULL,
        available_seats INTEGER NOT NULL CHECK (available_seats >= 0),
        price REAL NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS bookings (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users(id),
        flight_id INTEGER NOT NULL,
        seat_number TEXT NOT NULL,
        booking_date TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'confirmed'
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS payments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        booking_id INTEGER NOT NULL REFERENCES bookings(id),
        user_id INTEGER NOT NULL REFERENCES users(id),
        payment_id TEXT NOT NULL UNIQUE,
        amount REAL NOT NULL,
        currency TEXT NOT NULL DEFAULT 'USD',
        payment_method TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'pending',
        created_at TEXT NOT NULL,
        completed_at TEXT,
        refund_id TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS baggage (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        booking_id INTEGER NOT NULL REFERENCES bookings(id),
        baggage_tag TEXT NOT NULL UNIQUE,
        weight REAL,
        status TEXT NOT NULL DEFAULT 'checked_in',
        location TEXT,
        created_at TEXT NOT NULL
    )
    "#,
];

const POSTGRES_TABLES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        phone TEXT,
        is_admin BIGINT NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS airlines (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        code TEXT NOT NULL UNIQUE,
        country TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS flights (
        id BIGSERIAL PRIMARY KEY,
        airline_id BIGINT NOT NULL REFERENCES airlines(id),
        flight_number TEXT NOT NULL,
        origin TEXT NOT NULL,
        destination TEXT NOT NULL,
        departure_time TEXT NOT NULL,
        arrival_time TEXT NOT NULL,
        total_seats BIGINT NOT NULL,
        available_seats BIGINT NOT NULL CHECK (available_seats >= 0),
        price DOUBLE PRECISION NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS bookings (
        id BIGSERIAL PRIMARY KEY,
        user_id BIGINT NOT NULL REFERENCES users(id),
        flight_id BIGINT NOT NULL,
        seat_number TEXT NOT NULL,
        booking_date TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'confirmed'
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS payments (
        id BIGSERIAL PRIMARY KEY,
        booking_id BIGINT NOT NULL REFERENCES bookings(id),
        user_id BIGINT NOT NULL REFERENCES users(id),
        payment_id TEXT NOT NULL UNIQUE,
        amount DOUBLE PRECISION NOT NULL,
        currency TEXT NOT NULL DEFAULT 'USD',
        payment_method TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'pending',
        created_at TEXT NOT NULL,
        completed_at TEXT,
        refund_id TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS baggage (
        id BIGSERIAL PRIMARY KEY,
        booking_id BIGINT NOT NULL REFERENCES bookings(id),
        baggage_tag TEXT NOT NULL UNIQUE,
        weight DOUBLE PRECISION,
        status TEXT NOT NULL DEFAULT 'checked_in',
        location TEXT,
        created_at TEXT NOT NULL
    )
    "#,
];

// Same syntax on both dialects.
const INDEXES: &[&str] = &[
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_bookings_confirmed_seat \
     ON bookings (flight_id, seat_number) WHERE status = 'confirmed'",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_payments_completed_booking \
     ON payments (booking_id) WHERE status = 'completed'",
    "CREATE INDEX IF NOT EXISTS idx_bookings_user ON bookings (user_id)",
    "CREATE INDEX IF NOT EXISTS idx_flights_departure ON flights (departure_time)",
    "CREATE INDEX IF NOT EXISTS idx_payments_booking ON payments (booking_id)",
    "CREATE INDEX IF NOT EXISTS idx_baggage_booking ON baggage (booking_id)",
];

/// Creates every table and index that does not exist yet.
pub async fn init_schema(db_client: &DbClient) -> Result<(), DbError> {
    let tables = match db_client.dialect() {
        Dialect::Sqlite => SQLITE_TABLES,
        Dialect::Postgres => POSTGRES_TABLES,
    };
    debug!("Initializing {:?} schema", db_client.dialect());

    for statement in tables.iter().chain(INDEXES) {
        db_client.execute(statement).await?;
    }

    info!("Database schema initialized successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn init_schema_is_idempotent() {
        let client = DbClient::from_url("sqlite::memory:").await.unwrap();
        init_schema(&client).await.unwrap();
        init_schema(&client).await.unwrap();

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(client.pool())
        .await
        .unwrap();
        assert_eq!(
            tables,
            vec!["airlines", "baggage", "bookings", "flights", "payments", "users"]
        );
    }
}
