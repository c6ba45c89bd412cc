// --- File: crates/airline_baggage/src/lib.rs ---

pub mod doc;
pub mod handlers;
pub mod logic;
pub mod routes;

pub use handlers::BaggageState;
pub use routes::routes;
