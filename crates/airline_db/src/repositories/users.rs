//! Repository for user accounts

use std::future::Future;

use chrono::Utc;
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, error, info};

use crate::error::{query_error, DbError};
use crate::repositories::opt_column;
use crate::models::{parse_db_time, to_db_time, NewUser, ProfileChanges, User};
use crate::DbClient;

const USER_COLUMNS: &str =
    "id, email, password_hash, first_name, last_name, phone, is_admin, created_at";

/// Repository for user accounts
pub trait UserRepository {
    fn find_by_id(&self, id: i64) -> impl Future<Output = Result<Option<User>, DbError>> + Send;

    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<User>, DbError>> + Send;

    /// Inserts a non-admin user. A duplicate email surfaces as a unique violation.
    fn create(&self, user: NewUser) -> impl Future<Output = Result<User, DbError>> + Send;

    /// Applies the given changes and returns the stored row, or `None` if the user is gone.
    fn update_profile(
        &self,
        id: i64,
        changes: ProfileChanges,
    ) -> impl Future<Output = Result<Option<User>, DbError>> + Send;

    fn set_admin(
        &self,
        id: i64,
        is_admin: bool,
    ) -> impl Future<Output = Result<bool, DbError>> + Send;
}

/// SQL implementation of the user repository
#[derive(Debug, Clone)]
pub struct SqlUserRepository {
    db_client: DbClient,
}

impl SqlUserRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

pub(crate) fn user_from_row(row: &AnyRow) -> Result<User, DbError> {
    let created_at: String = row.try_get("created_at")?;
    let is_admin: i64 = row.try_get("is_admin")?;
    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        phone: opt_column(row, "phone")?,
        is_admin: is_admin != 0,
        created_at: parse_db_time(&created_at)?,
    })
}

impl UserRepository for SqlUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DbError> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(query_error)?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let row = sqlx::query(&query)
            .bind(email)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(query_error)?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn create(&self, user: NewUser) -> Result<User, DbError> {
        debug!("Creating user {}", user.email);
        let query = format!(
            "INSERT INTO users (email, password_hash, first_name, last_name, phone, is_admin, created_at) \
             VALUES ($1, $2, $3, $4, $5, 0, $6) RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(user.phone.clone())
            .bind(to_db_time(&Utc::now()))
            .fetch_one(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to create user: {}", e);
                query_error(e)
            })?;

        let created = user_from_row(&row)?;
        info!("User {} created", created.id);
        Ok(created)
    }

    async fn update_profile(
        &self,
        id: i64,
        changes: ProfileChanges,
    ) -> Result<Option<User>, DbError> {
        let query = format!(
            "UPDATE users SET \
                 first_name = COALESCE(CAST($1 AS TEXT), first_name), \
                 last_name = COALESCE(CAST($2 AS TEXT), last_name), \
                 phone = COALESCE(CAST($3 AS TEXT), phone) \
             WHERE id = $4 RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(changes.first_name)
            .bind(changes.last_name)
            .bind(changes.phone)
            .bind(id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(query_error)?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn set_admin(&self, id: i64, is_admin: bool) -> Result<bool, DbError> {
        let result = sqlx::query("UPDATE users SET is_admin = $1 WHERE id = $2")
            .bind(i64::from(is_admin))
            .bind(id)
            .execute(self.db_client.pool())
            .await
            .map_err(query_error)?;
        Ok(result.rows_affected() == 1)
    }
}
