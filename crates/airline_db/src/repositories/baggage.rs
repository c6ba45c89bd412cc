//! Repository for checked baggage

use std::future::Future;

use chrono::Utc;
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::info;

use crate::error::{query_error, DbError};
use crate::models::{
    parse_db_time, to_db_time, Baggage, BaggageStatus, NewBaggage, OwnedBaggage,
};
use crate::repositories::opt_column;
use crate::DbClient;

const OWNED_BAGGAGE_SELECT: &str = "SELECT g.id, g.booking_id, g.baggage_tag, g.weight, \
     g.status, g.location, g.created_at, b.user_id AS owner_id \
     FROM baggage g JOIN bookings b ON b.id = g.booking_id";

pub trait BaggageRepository {
    fn tag_exists(&self, tag: &str) -> impl Future<Output = Result<bool, DbError>> + Send;

    /// Inserts a bag in `checked_in` state.
    fn create(&self, baggage: NewBaggage) -> impl Future<Output = Result<Baggage, DbError>> + Send;

    fn find_by_tag(
        &self,
        tag: &str,
    ) -> impl Future<Output = Result<Option<OwnedBaggage>, DbError>> + Send;

    fn find_by_id(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Option<OwnedBaggage>, DbError>> + Send;

    fn list_for_booking(
        &self,
        booking_id: i64,
    ) -> impl Future<Output = Result<Vec<Baggage>, DbError>> + Send;

    /// Bags across all of the user's bookings, newest first.
    fn list_for_user(&self, user_id: i64)
        -> impl Future<Output = Result<Vec<Baggage>, DbError>> + Send;

    /// Applies the given status and location; `None` keeps the stored value.
    fn update(
        &self,
        id: i64,
        status: Option<BaggageStatus>,
        location: Option<String>,
    ) -> impl Future<Output = Result<Baggage, DbError>> + Send;
}

#[derive(Debug, Clone)]
pub struct SqlBaggageRepository {
    db_client: DbClient,
}

impl SqlBaggageRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

fn baggage_from_row(row: &AnyRow) -> Result<Baggage, DbError> {
    let status: String = row.try_get("status")?;
    let created_at: String = row.try_get("created_at")?;
    Ok(Baggage {
        id: row.try_get("id")?,
        booking_id: row.try_get("booking_id")?,
        baggage_tag: row.try_get("baggage_tag")?,
        weight: opt_column(row, "weight")?,
        status: status.parse()?,
        location: opt_column(row, "location")?,
        created_at: parse_db_time(&created_at)?,
    })
}

fn owned_from_row(row: &AnyRow) -> Result<OwnedBaggage, DbError> {
    Ok(OwnedBaggage {
        baggage: baggage_from_row(row)?,
        owner_id: row.try_get("owner_id")?,
    })
}

impl BaggageRepository for SqlBaggageRepository {
    async fn tag_exists(&self, tag: &str) -> Result<bool, DbError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM baggage WHERE baggage_tag = $1")
            .bind(tag)
            .fetch_one(self.db_client.pool())
            .await
            .map_err(query_error)?;
        Ok(count > 0)
    }

    async fn create(&self, baggage: NewBaggage) -> Result<Baggage, DbError> {
        let row = sqlx::query(
            "INSERT INTO baggage (booking_id, baggage_tag, weight, status, location, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, booking_id, baggage_tag, weight, status, location, created_at",
        )
        .bind(baggage.booking_id)
        .bind(&baggage.baggage_tag)
        .bind(baggage.weight)
        .bind(BaggageStatus::CheckedIn.as_str())
        .bind(&baggage.location)
        .bind(to_db_time(&Utc::now()))
        .fetch_one(self.db_client.pool())
        .await
        .map_err(query_error)?;

        let created = baggage_from_row(&row)?;
        info!(
            "Baggage {} checked in for booking {}",
            created.baggage_tag, created.booking_id
        );
        Ok(created)
    }

    async fn find_by_tag(&self, tag: &str) -> Result<Option<OwnedBaggage>, DbError> {
        let query = format!("{} WHERE g.baggage_tag = $1", OWNED_BAGGAGE_SELECT);
        let row = sqlx::query(&query)
            .bind(tag)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(query_error)?;
        row.as_ref().map(owned_from_row).transpose()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<OwnedBaggage>, DbError> {
        let query = format!("{} WHERE g.id = $1", OWNED_BAGGAGE_SELECT);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(query_error)?;
        row.as_ref().map(owned_from_row).transpose()
    }

    async fn list_for_booking(&self, booking_id: i64) -> Result<Vec<Baggage>, DbError> {
        let rows = sqlx::query(
            "SELECT id, booking_id, baggage_tag, weight, status, location, created_at \
             FROM baggage WHERE booking_id = $1 ORDER BY id",
        )
        .bind(booking_id)
        .fetch_all(self.db_client.pool())
        .await
        .map_err(query_error)?;
        rows.iter().map(baggage_from_row).collect()
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Baggage>, DbError> {
        let query = format!(
            "{} WHERE b.user_id = $1 ORDER BY g.created_at DESC, g.id DESC",
            OWNED_BAGGAGE_SELECT
        );
        let rows = sqlx::query(&query)
            .bind(user_id)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(query_error)?;
        rows.iter().map(baggage_from_row).collect()
    }

    async fn update(
        &self,
        id: i64,
        status: Option<BaggageStatus>,
        location: Option<String>,
    ) -> Result<Baggage, DbError> {
        let row = sqlx::query(
            "UPDATE baggage SET status = COALESCE(CAST($1 AS TEXT), status), \
                 location = COALESCE(CAST($2 AS TEXT), location) \
             WHERE id = $3 \
             RETURNING id, booking_id, baggage_tag, weight, status, location, created_at",
        )
        .bind(status.map(|s| s.as_str().to_string()))
        .bind(location)
        .bind(id)
        .fetch_one(self.db_client.pool())
        .await
        .map_err(query_error)?;
        baggage_from_row(&row)
    }
}
