//! Database client for the airline services
//!
//! This module provides a database client that is designed to be database agnostic,
//! using the SQLx `Any` driver underneath. SQLite and PostgreSQL URLs are accepted.

use crate::error::DbError;
use airline_config::{AppConfig, DatabaseConfig};
use sqlx::any::AnyConnectOptions;
use sqlx::pool::PoolOptions;
use sqlx::{Pool, Transaction};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, error, info};

/// Type alias for a database transaction
pub type DbTransaction<'a> = Transaction<'a, sqlx::Any>;

/// SQL flavour behind the pool; only the schema DDL differs between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Sqlite,
    Postgres,
}

impl Dialect {
    pub fn from_url(db_url: &str) -> Result<Self, DbError> {
        if db_url.starts_with("sqlite:") {
            Ok(Dialect::Sqlite)
        } else if db_url.starts_with("postgres://") || db_url.starts_with("postgresql://") {
            Ok(Dialect::Postgres)
        } else {
            Err(DbError::UrlError(format!(
                "unsupported database URL scheme: {}",
                db_url.split(':').next().unwrap_or_default()
            )))
        }
    }
}

/// Database client shared by every service.
#[derive(Debug, Clone)]
pub struct DbClient {
    /// The database connection pool
    pool: Pool<sqlx::Any>,
    dialect: Dialect,
}

impl DbClient {
    /// Create a new database client from the application configuration.
    ///
    /// # Errors
    ///
    /// Fails when the `database` section is missing, the URL is empty or the
    /// connection cannot be established.
    pub async fn new(config: &AppConfig) -> Result<Self, DbError> {
        let db_config = config
            .database
            .as_ref()
            .ok_or_else(|| DbError::ConfigError("Database configuration is missing".to_string()))?;

        Self::from_config(db_config).await
    }

    /// Create a new database client from a database configuration
    pub async fn from_config(db_config: &DatabaseConfig) -> Result<Self, DbError> {
        if db_config.url.is_empty() {
            return Err(DbError::ConfigError("Database URL is empty".to_string()));
        }
        Self::connect(&db_config.url, db_config.max_connections).await
    }

    /// Create a new database client from a database URL
    ///
    /// Mostly used by tests with `sqlite::memory:`.
    pub async fn from_url(db_url: &str) -> Result<Self, DbError> {
        if db_url.is_empty() {
            return Err(DbError::UrlError("Database URL is empty".to_string()));
        }
        Self::connect(db_url, 5).await
    }

    async fn connect(db_url: &str, max_connections: u32) -> Result<Self, DbError> {
        let dialect = Dialect::from_url(db_url)?;
        let pool = Self::create_pool(db_url, dialect, max_connections).await?;
        Ok(Self { pool, dialect })
    }

    async fn create_pool(
        db_url: &str,
        dialect: Dialect,
        max_connections: u32,
    ) -> Result<Pool<sqlx::Any>, DbError> {
        debug!("Creating database pool for {:?}", dialect);

        // Register the compiled-in drivers with the "any" driver
        sqlx::any::install_default_drivers();

        let in_memory = dialect == Dialect::Sqlite && db_url.contains(":memory:");

        // Every new connection to an in-memory SQLite database opens a fresh, empty
        // database, so the pool is pinned to a single connection that never expires.
        let pool_options = if in_memory {
            PoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            PoolOptions::new()
                .max_connections(max_connections.max(1))
                .acquire_timeout(Duration::from_secs(3))
                .idle_timeout(Duration::from_secs(600))
        };

        if dialect == Dialect::Sqlite && !in_memory {
            Self::ensure_sqlite_file(db_url)?;
        }

        let pool = pool_options
            .connect_with(AnyConnectOptions::from_str(db_url)?)
            .await
            .map_err(|e| {
                error!("Failed to create database pool: {}", e);
                DbError::PoolError(e.to_string())
            })?;

        info!("Database pool created successfully");
        Ok(pool)
    }

    /// `AnyConnectOptions` cannot set `create_if_missing`, so the file and its
    /// directory are created up front.
    fn ensure_sqlite_file(db_url: &str) -> Result<(), DbError> {
        let db_path = db_url
            .strip_prefix("sqlite://")
            .or_else(|| db_url.strip_prefix("sqlite:"))
            .unwrap_or(db_url);
        let db_path = db_path.split('?').next().unwrap_or(db_path);
        if db_path.is_empty() {
            return Ok(());
        }

        let path = Path::new(db_path);
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                debug!("Creating directory for SQLite database: {:?}", dir);
                std::fs::create_dir_all(dir).map_err(|e| {
                    error!("Failed to create directory for SQLite database: {}", e);
                    DbError::PoolError(format!("Failed to create directory: {}", e))
                })?;
            }
        }

        if !path.exists() {
            debug!("Creating empty SQLite database file: {}", db_path);
            std::fs::File::create(path).map_err(|e| {
                error!("Failed to create SQLite database file: {}", e);
                DbError::PoolError(format!("Failed to create database file: {}", e))
            })?;
        }
        Ok(())
    }

    /// Get the database connection pool
    pub fn pool(&self) -> &Pool<sqlx::Any> {
        &self.pool
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Begin a transaction
    pub async fn begin(&self) -> Result<DbTransaction<'_>, DbError> {
        self.pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionError(e.to_string()))
    }

    /// Execute a statement that returns no rows, yielding the number of rows affected
    pub async fn execute(&self, query: &str) -> Result<u64, DbError> {
        sqlx::query(query)
            .execute(&self.pool)
            .await
            .map(|r| r.rows_affected())
            .map_err(|e| DbError::QueryError(e.to_string()))
    }

    /// Check if the database answers `SELECT 1`
    pub async fn is_healthy(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

impl std::fmt::Display for DbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DbClient({:?})", self.dialect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialect_follows_url_scheme() {
        assert_eq!(Dialect::from_url("sqlite::memory:").unwrap(), Dialect::Sqlite);
        assert_eq!(
            Dialect::from_url("postgresql://airline@localhost/airline").unwrap(),
            Dialect::Postgres
        );
        assert!(matches!(
            Dialect::from_url("mysql://localhost/airline"),
            Err(DbError::UrlError(_))
        ));
    }

    #[tokio::test]
    async fn in_memory_client_is_healthy() {
        let client = DbClient::from_url("sqlite::memory:").await.unwrap();
        assert!(client.is_healthy().await);
        assert_eq!(client.dialect(), Dialect::Sqlite);
    }
}
