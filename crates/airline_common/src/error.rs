// --- File: crates/airline_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The base error type shared by every airline service.
///
/// Client-facing variants carry the exact message returned in the `detail` field.
/// Server-side variants keep the technical cause for logging and are masked on the wire.
#[derive(Error, Debug)]
pub enum AirlineError {
    /// Missing, malformed or expired credentials
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated, but not allowed to touch the resource
    #[error("{0}")]
    Forbidden(String),

    /// Request rejected by a business rule or input validation
    #[error("{0}")]
    ValidationError(String),

    /// The addressed resource does not exist (or is not visible to the caller)
    #[error("{0}")]
    NotFoundError(String),

    /// Error occurred during database operation
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Error occurred during a call to a sibling service
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),

    /// Server-side failure whose message is safe to show to the caller
    #[error("{0}")]
    ServerError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for AirlineError {
    fn status_code(&self) -> u16 {
        match self {
            AirlineError::Unauthorized(_) => 401,
            AirlineError::Forbidden(_) => 403,
            AirlineError::ValidationError(_) => 400,
            AirlineError::NotFoundError(_) => 404,
            AirlineError::DatabaseError(_) => 500,
            AirlineError::ExternalServiceError { .. } => 502,
            AirlineError::ConfigError(_) => 500,
            AirlineError::InternalError(_) => 500,
            AirlineError::ServerError(_) => 500,
        }
    }
}

impl AirlineError {
    /// The message placed in the response body.
    pub fn detail(&self) -> String {
        match self {
            AirlineError::DatabaseError(_) => "Database error occurred".to_string(),
            AirlineError::ExternalServiceError { service_name, .. } => {
                format!("{} is unavailable", service_name)
            }
            AirlineError::ConfigError(_) | AirlineError::InternalError(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }

    /// True for failures the caller cannot fix by changing the request.
    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

/// A trait for adding context to errors.
pub trait Context<T, E> {
    /// Adds context to an error.
    fn context<C>(self, context: C) -> Result<T, AirlineError>
    where
        C: fmt::Display + Send + Sync + 'static;
}

impl<T, E: std::error::Error + Send + Sync + 'static> Context<T, E> for Result<T, E> {
    fn context<C>(self, context: C) -> Result<T, AirlineError>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|error| AirlineError::InternalError(format!("{}: {}", context, error)))
    }
}

impl From<reqwest::Error> for AirlineError {
    fn from(err: reqwest::Error) -> Self {
        AirlineError::ExternalServiceError {
            service_name: "HTTP".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for AirlineError {
    fn from(err: serde_json::Error) -> Self {
        AirlineError::ValidationError(err.to_string())
    }
}

impl From<std::io::Error> for AirlineError {
    fn from(err: std::io::Error) -> Self {
        AirlineError::InternalError(err.to_string())
    }
}

// Utility functions for error handling
pub fn unauthorized<T: fmt::Display>(message: T) -> AirlineError {
    AirlineError::Unauthorized(message.to_string())
}

pub fn forbidden<T: fmt::Display>(message: T) -> AirlineError {
    AirlineError::Forbidden(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> AirlineError {
    AirlineError::ValidationError(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> AirlineError {
    AirlineError::NotFoundError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> AirlineError {
    AirlineError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}

pub fn internal_error<T: fmt::Display>(message: T) -> AirlineError {
    AirlineError::InternalError(message.to_string())
}

pub fn server_error<T: fmt::Display>(message: T) -> AirlineError {
    AirlineError::ServerError(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_expose_their_message() {
        let err = validation_error("Seat already booked");
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.detail(), "Seat already booked");
        assert!(!err.is_server_error());
    }

    #[test]
    fn database_errors_are_masked() {
        let err = AirlineError::DatabaseError("no such table: flights".to_string());
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.detail(), "Database error occurred");
    }

    #[test]
    fn server_errors_can_expose_their_message() {
        let err = server_error("Failed to send email");
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.detail(), "Failed to send email");
    }

    #[test]
    fn context_wraps_as_internal() {
        let result: Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
        let err = result.context("writing receipt").unwrap_err();
        assert!(matches!(err, AirlineError::InternalError(ref m) if m == "writing receipt: disk full"));
    }
}
