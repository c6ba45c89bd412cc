// --- File: crates/airline_payment/src/lib.rs ---

pub mod doc;
pub mod error;
pub mod handlers;
pub mod logic;
pub mod routes;
pub mod service;

// Re-export for main backend
pub use error::PaymentError;
pub use handlers::PaymentState;
pub use routes::routes;
pub use service::{PaymentGateway, SimulatedGateway};
