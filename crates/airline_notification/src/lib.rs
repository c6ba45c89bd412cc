// --- File: crates/airline_notification/src/lib.rs ---

pub mod auth;
pub mod doc;
pub mod error;
pub mod handlers;
pub mod logic;
pub mod mailer;
pub mod routes;

pub use error::MailError;
pub use handlers::NotificationState;
pub use mailer::{LogMailer, Mailer, SmtpMailer};
pub use routes::routes;
