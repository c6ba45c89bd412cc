// --- File: crates/airline_auth/src/error.rs ---
use airline_common::AirlineError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Email already registered")]
    EmailTaken,

    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("{0}")]
    InvalidInput(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Database(#[from] airline_db::DbError),

    #[error(transparent)]
    Common(#[from] AirlineError),
}

impl From<AuthError> for AirlineError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::EmailTaken | AuthError::InvalidEmail | AuthError::InvalidInput(_) => {
                AirlineError::ValidationError(err.to_string())
            }
            AuthError::InvalidCredentials => AirlineError::Unauthorized(err.to_string()),
            AuthError::Hashing(msg) => AirlineError::InternalError(msg),
            AuthError::Database(e) => e.into(),
            AuthError::Common(e) => e,
        }
    }
}
