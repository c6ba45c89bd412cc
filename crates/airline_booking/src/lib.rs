// --- File: crates/airline_booking/src/lib.rs ---

pub mod doc;
pub mod handlers;
pub mod logic;
pub mod routes;

pub use handlers::BookingState;
pub use routes::routes;
