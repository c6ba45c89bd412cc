// --- File: crates/airline_auth/src/lib.rs ---

pub mod doc;
pub mod error;
pub mod handlers;
pub mod logic;
pub mod routes;

// Re-export for main backend
pub use error::AuthError;
pub use handlers::AuthState;
pub use routes::routes;
