//! Repository for airlines

use std::future::Future;

use chrono::Utc;
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::info;

use crate::error::{query_error, DbError};
use crate::models::{parse_db_time, to_db_time, Airline, NewAirline};
use crate::repositories::opt_column;
use crate::DbClient;

pub trait AirlineRepository {
    fn find_by_id(&self, id: i64)
        -> impl Future<Output = Result<Option<Airline>, DbError>> + Send;

    fn find_by_code(
        &self,
        code: &str,
    ) -> impl Future<Output = Result<Option<Airline>, DbError>> + Send;

    fn create(&self, airline: NewAirline) -> impl Future<Output = Result<Airline, DbError>> + Send;

    /// All airlines ordered by name.
    fn list_all(&self) -> impl Future<Output = Result<Vec<Airline>, DbError>> + Send;
}

#[derive(Debug, Clone)]
pub struct SqlAirlineRepository {
    db_client: DbClient,
}

impl SqlAirlineRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

fn airline_from_row(row: &AnyRow) -> Result<Airline, DbError> {
    let created_at: String = row.try_get("created_at")?;
    Ok(Airline {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        code: row.try_get("code")?,
        country: opt_column(row, "country")?,
        created_at: parse_db_time(&created_at)?,
    })
}

impl AirlineRepository for SqlAirlineRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Airline>, DbError> {
        let row = sqlx::query("SELECT id, name, code, country, created_at FROM airlines WHERE id = $1")
            .bind(id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(query_error)?;
        row.as_ref().map(airline_from_row).transpose()
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Airline>, DbError> {
        let row =
            sqlx::query("SELECT id, name, code, country, created_at FROM airlines WHERE code = $1")
                .bind(code)
                .fetch_optional(self.db_client.pool())
                .await
                .map_err(query_error)?;
        row.as_ref().map(airline_from_row).transpose()
    }

    async fn create(&self, airline: NewAirline) -> Result<Airline, DbError> {
        let row = sqlx::query(
            "INSERT INTO airlines (name, code, country, created_at) VALUES ($1, $2, $3, $4) \
             RETURNING id, name, code, country, created_at",
        )
        .bind(&airline.name)
        .bind(&airline.code)
        .bind(airline.country.clone())
        .bind(to_db_time(&Utc::now()))
        .fetch_one(self.db_client.pool())
        .await
        .map_err(query_error)?;

        let created = airline_from_row(&row)?;
        info!("Airline {} ({}) created", created.code, created.id);
        Ok(created)
    }

    async fn list_all(&self) -> Result<Vec<Airline>, DbError> {
        let rows = sqlx::query("SELECT id, name, code, country, created_at FROM airlines ORDER BY name")
            .fetch_all(self.db_client.pool())
            .await
            .map_err(query_error)?;
        rows.iter().map(airline_from_row).collect()
    }
}
