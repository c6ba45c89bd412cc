// --- File: crates/airline_common/src/lib.rs ---
pub mod auth;
pub mod error;
pub mod http;
pub mod logging;
pub mod models;
pub mod services;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export commonly used types
pub use auth::{AuthUser, HasJwt, JwtKeys};
pub use error::{AirlineError, Context, HttpStatusCode};
pub use http::IntoHttpResponse;
pub use services::{notify_quietly, BoxFuture, HttpNotifier, NotificationEvent, Notifier};
