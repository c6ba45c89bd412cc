//! Repository for payments

use std::future::Future;

use chrono::{DateTime, Utc};
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, info};

use crate::error::{query_error, DbError};
use crate::repositories::opt_column;
use crate::models::{parse_db_time, to_db_time, NewPayment, Payment, PaymentStatus};
use crate::DbClient;

const PAYMENT_COLUMNS: &str = "id, booking_id, user_id, payment_id, amount, currency, \
     payment_method, status, created_at, completed_at, refund_id";

pub trait PaymentRepository {
    /// True if the booking already has a payment in `completed` state.
    fn has_completed(&self, booking_id: i64)
        -> impl Future<Output = Result<bool, DbError>> + Send;

    /// Inserts a `pending` payment.
    fn create_pending(
        &self,
        payment: NewPayment,
    ) -> impl Future<Output = Result<Payment, DbError>> + Send;

    /// Marks the payment completed at `completed_at`. A second completed payment for the
    /// same booking surfaces as a unique violation.
    fn mark_completed(
        &self,
        id: i64,
        completed_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<Payment, DbError>> + Send;

    fn mark_failed(&self, id: i64) -> impl Future<Output = Result<Payment, DbError>> + Send;

    fn mark_refunded(
        &self,
        id: i64,
        refund_id: &str,
    ) -> impl Future<Output = Result<Payment, DbError>> + Send;

    /// The caller's payments, newest first.
    fn list_for_user(&self, user_id: i64)
        -> impl Future<Output = Result<Vec<Payment>, DbError>> + Send;

    /// Looks a payment up by its public `PAY-...` id, restricted to its owner.
    fn find_owned(
        &self,
        payment_id: &str,
        user_id: i64,
    ) -> impl Future<Output = Result<Option<Payment>, DbError>> + Send;

    /// The most recent payment recorded against a booking.
    fn latest_for_booking(
        &self,
        booking_id: i64,
    ) -> impl Future<Output = Result<Option<Payment>, DbError>> + Send;
}

#[derive(Debug, Clone)]
pub struct SqlPaymentRepository {
    db_client: DbClient,
}

impl SqlPaymentRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    async fn update_returning(
        &self,
        set_clause: &str,
        id: i64,
        status: PaymentStatus,
        value: Option<String>,
    ) -> Result<Payment, DbError> {
        let query = format!(
            "UPDATE payments SET status = $1{} WHERE id = $2 RETURNING {}",
            set_clause, PAYMENT_COLUMNS
        );
        let mut statement = sqlx::query(&query).bind(status.as_str()).bind(id);
        if let Some(value) = value {
            statement = statement.bind(value);
        }
        let row = statement
            .fetch_one(self.db_client.pool())
            .await
            .map_err(query_error)?;
        payment_from_row(&row)
    }
}

fn payment_from_row(row: &AnyRow) -> Result<Payment, DbError> {
    let status: String = row.try_get("status")?;
    let created_at: String = row.try_get("created_at")?;
    let completed_at: Option<String> = opt_column(row, "completed_at")?;
    Ok(Payment {
        id: row.try_get("id")?,
        booking_id: row.try_get("booking_id")?,
        user_id: row.try_get("user_id")?,
        payment_id: row.try_get("payment_id")?,
        amount: row.try_get("amount")?,
        currency: row.try_get("currency")?,
        payment_method: row.try_get("payment_method")?,
        status: status.parse()?,
        created_at: parse_db_time(&created_at)?,
        completed_at: completed_at.as_deref().map(parse_db_time).transpose()?,
        refund_id: opt_column(row, "refund_id")?,
    })
}

impl PaymentRepository for SqlPaymentRepository {
    async fn has_completed(&self, booking_id: i64) -> Result<bool, DbError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM payments WHERE booking_id = $1 AND status = $2")
                .bind(booking_id)
                .bind(PaymentStatus::Completed.as_str())
                .fetch_one(self.db_client.pool())
                .await
                .map_err(query_error)?;
        Ok(count > 0)
    }

    async fn create_pending(&self, payment: NewPayment) -> Result<Payment, DbError> {
        debug!(
            "Recording payment {} for booking {}",
            payment.payment_id, payment.booking_id
        );
        let query = format!(
            "INSERT INTO payments (booking_id, user_id, payment_id, amount, currency, \
                 payment_method, status, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            PAYMENT_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(payment.booking_id)
            .bind(payment.user_id)
            .bind(&payment.payment_id)
            .bind(payment.amount)
            .bind(&payment.currency)
            .bind(&payment.payment_method)
            .bind(PaymentStatus::Pending.as_str())
            .bind(to_db_time(&Utc::now()))
            .fetch_one(self.db_client.pool())
            .await
            .map_err(query_error)?;
        payment_from_row(&row)
    }

    async fn mark_completed(&self, id: i64, completed_at: DateTime<Utc>) -> Result<Payment, DbError> {
        let payment = self
            .update_returning(
                ", completed_at = $3",
                id,
                PaymentStatus::Completed,
                Some(to_db_time(&completed_at)),
            )
            .await?;
        info!("Payment {} completed", payment.payment_id);
        Ok(payment)
    }

    async fn mark_failed(&self, id: i64) -> Result<Payment, DbError> {
        self.update_returning("", id, PaymentStatus::Failed, None)
            .await
    }

    async fn mark_refunded(&self, id: i64, refund_id: &str) -> Result<Payment, DbError> {
        let payment = self
            .update_returning(
                ", refund_id = $3",
                id,
                PaymentStatus::Refunded,
                Some(refund_id.to_string()),
            )
            .await?;
        info!("Payment {} refunded as {}", payment.payment_id, refund_id);
        Ok(payment)
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Payment>, DbError> {
        let query = format!(
            "SELECT {} FROM payments WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
            PAYMENT_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(user_id)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(query_error)?;
        rows.iter().map(payment_from_row).collect()
    }

    async fn find_owned(&self, payment_id: &str, user_id: i64) -> Result<Option<Payment>, DbError> {
        let query = format!(
            "SELECT {} FROM payments WHERE payment_id = $1 AND user_id = $2",
            PAYMENT_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(payment_id)
            .bind(user_id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(query_error)?;
        row.as_ref().map(payment_from_row).transpose()
    }

    async fn latest_for_booking(&self, booking_id: i64) -> Result<Option<Payment>, DbError> {
        let query = format!(
            "SELECT {} FROM payments WHERE booking_id = $1 ORDER BY created_at DESC, id DESC LIMIT 1",
            PAYMENT_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(booking_id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(query_error)?;
        row.as_ref().map(payment_from_row).transpose()
    }
}
