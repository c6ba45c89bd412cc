// --- File: crates/airline_notification/src/error.rs ---
use airline_common::{AirlineError, HttpStatusCode};
use thiserror::Error;

/// Mail delivery failures.
#[derive(Error, Debug)]
pub enum MailError {
    #[error("Invalid address {address}: {message}")]
    InvalidAddress { address: String, message: String },

    #[error("Failed to build message: {0}")]
    Build(String),

    /// SMTP relay setup or delivery failed
    #[error("SMTP transport error: {0}")]
    Transport(String),

    #[error("Mail task failed: {0}")]
    Task(String),
}

impl HttpStatusCode for MailError {
    fn status_code(&self) -> u16 {
        500
    }
}

/// Every delivery failure reaches the caller the same way; the cause is only logged.
impl From<MailError> for AirlineError {
    fn from(err: MailError) -> Self {
        tracing::error!("Mail delivery failed: {}", err);
        AirlineError::ServerError("Failed to send email".to_string())
    }
}
