//! Aggregate counts for the admin dashboard

use std::future::Future;

use crate::error::{query_error, DbError};
use crate::models::{BookingStatus, Statistics};
use crate::DbClient;

pub trait StatisticsRepository {
    fn totals(&self) -> impl Future<Output = Result<Statistics, DbError>> + Send;
}

#[derive(Debug, Clone)]
pub struct SqlStatisticsRepository {
    db_client: DbClient,
}

impl SqlStatisticsRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    async fn count(&self, query: &str) -> Result<i64, DbError> {
        sqlx::query_scalar(query)
            .fetch_one(self.db_client.pool())
            .await
            .map_err(query_error)
    }
}

impl StatisticsRepository for SqlStatisticsRepository {
    async fn totals(&self) -> Result<Statistics, DbError> {
        let total_bookings: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE status = $1")
                .bind(BookingStatus::Confirmed.as_str())
                .fetch_one(self.db_client.pool())
                .await
                .map_err(query_error)?;

        Ok(Statistics {
            total_users: self.count("SELECT COUNT(*) FROM users").await?,
            total_flights: self.count("SELECT COUNT(*) FROM flights").await?,
            total_bookings,
            total_baggage: self.count("SELECT COUNT(*) FROM baggage").await?,
        })
    }
}
