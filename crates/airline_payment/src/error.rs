// --- File: crates/airline_payment/src/error.rs ---
use airline_common::{AirlineError, HttpStatusCode};
use airline_db::DbError;
use thiserror::Error;

/// Payment-specific error types.
#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Booking not found or does not belong to you")]
    BookingNotOwned,

    #[error("Payment already completed for this booking")]
    AlreadyCompleted,

    #[error("Flight price not found")]
    PriceNotFound,

    /// Amounts are shown the way a client would write them (`150.0`, not `150`).
    #[error("Amount mismatch. Expected: {expected:?}, Got: {got:?}")]
    AmountMismatch { expected: f64, got: f64 },

    #[error("Payment not found")]
    NotFound,

    #[error("Payment already refunded")]
    AlreadyRefunded,

    #[error("Only completed payments can be refunded")]
    NotRefundable,

    /// The gateway could not be reached or answered with an error
    #[error("Payment gateway error: {0}")]
    Gateway(String),

    #[error(transparent)]
    Database(#[from] DbError),
}

impl HttpStatusCode for PaymentError {
    fn status_code(&self) -> u16 {
        match self {
            PaymentError::BookingNotOwned | PaymentError::PriceNotFound | PaymentError::NotFound => {
                404
            }
            PaymentError::AlreadyCompleted
            | PaymentError::AmountMismatch { .. }
            | PaymentError::AlreadyRefunded
            | PaymentError::NotRefundable => 400,
            PaymentError::Gateway(_) => 502,
            PaymentError::Database(_) => 500,
        }
    }
}

/// Convert PaymentError to AirlineError
impl From<PaymentError> for AirlineError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::Database(e) => e.into(),
            PaymentError::Gateway(message) => AirlineError::ExternalServiceError {
                service_name: "Payment gateway".to_string(),
                message,
            },
            e @ (PaymentError::BookingNotOwned
            | PaymentError::PriceNotFound
            | PaymentError::NotFound) => AirlineError::NotFoundError(e.to_string()),
            e => AirlineError::ValidationError(e.to_string()),
        }
    }
}
