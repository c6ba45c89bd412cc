// --- File: crates/airline_admin/src/lib.rs ---

pub mod auth;
pub mod doc;
pub mod handlers;
pub mod logic;
pub mod routes;

pub use auth::AdminUser;
pub use handlers::AdminState;
pub use routes::routes;
