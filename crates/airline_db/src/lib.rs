//! Database integration for the airline services
//!
//! Every service works on the same relational schema. This crate owns the connection
//! pool, the table definitions and one repository per table. SQL goes through the
//! SQLx `Any` driver, so the same code runs on SQLite (default) and PostgreSQL
//! (`postgres` feature).
//!
//! # Example
//!
//! ```rust,no_run
//! use airline_db::{init_schema, DbClient};
//!
//! async fn setup_db() -> Result<DbClient, airline_db::DbError> {
//!     let db_client = DbClient::from_url("sqlite://data/airline.db").await?;
//!     init_schema(&db_client).await?;
//!     Ok(db_client)
//! }
//! ```

pub mod client;
pub mod error;
pub mod models;
pub mod repositories;
pub mod schema;

pub use client::{DbClient, DbTransaction, Dialect};
pub use error::DbError;
pub use schema::init_schema;

pub use repositories::*;
