// --- File: crates/airline_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

// --- Database Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g. sqlite://data/airline.db, overridden by DATABASE_URL
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

// --- JWT Config ---
// The signing secret is shared by every service; it is never serialized back out.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct JwtConfig {
    #[serde(skip_serializing, default)]
    pub secret: String, // Overridden by JWT_SECRET
    #[serde(default = "default_expiration_hours")]
    pub expiration_hours: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            expiration_hours: default_expiration_hours(),
        }
    }
}

fn default_expiration_hours() -> i64 {
    24
}

// --- Sibling service locations ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServicesConfig {
    /// Base URL of the notification service, without the `/api` suffix.
    #[serde(default = "default_notification_url")]
    pub notification_url: String,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            notification_url: default_notification_url(),
        }
    }
}

fn default_notification_url() -> String {
    "http://notification-service:8000".to_string()
}

// --- Notification delivery ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NotificationConfig {
    /// Shared secret for the internal notification endpoints. Loaded from INTERNAL_AUTH_SECRET.
    #[serde(skip_serializing, default)]
    pub internal_secret: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_broadcast_timeout_secs")]
    pub broadcast_timeout_secs: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            internal_secret: None,
            request_timeout_secs: default_request_timeout_secs(),
            broadcast_timeout_secs: default_broadcast_timeout_secs(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    5
}

fn default_broadcast_timeout_secs() -> u64 {
    10
}

// --- SMTP Config ---
// Holds SMTP settings; user and password usually arrive via SMTP_USER / SMTP_PASSWORD.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SmtpConfig {
    #[serde(default = "default_smtp_host")]
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    #[serde(default)]
    pub user: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    #[serde(default = "default_from_email")]
    pub from_email: String,
}

impl SmtpConfig {
    /// True when both credentials are present; otherwise mails are only logged.
    pub fn is_configured(&self) -> bool {
        !self.user.is_empty() && !self.password.is_empty()
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: default_smtp_host(),
            port: default_smtp_port(),
            user: String::new(),
            password: String::new(),
            from_email: default_from_email(),
        }
    }
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_from_email() -> String {
    "noreply@airline.com".to_string()
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_auth: bool,
    #[serde(default)]
    pub use_booking: bool,
    #[serde(default)]
    pub use_payment: bool,
    #[serde(default)]
    pub use_baggage: bool,
    #[serde(default)]
    pub use_notification: bool,
    #[serde(default)]
    pub use_admin: bool,

    #[serde(default)]
    pub database: Option<DatabaseConfig>, // Central DB config shared by all services
    #[serde(default)]
    pub jwt: JwtConfig,
    #[serde(default)]
    pub services: ServicesConfig,
    #[serde(default)]
    pub notification: NotificationConfig,
    #[serde(default)]
    pub smtp: Option<SmtpConfig>,
}

impl AppConfig {
    /// Names of the services switched on by the runtime flags, in mount order.
    pub fn enabled_services(&self) -> Vec<&'static str> {
        [
            (self.use_auth, "auth"),
            (self.use_booking, "booking"),
            (self.use_payment, "payment"),
            (self.use_baggage, "baggage"),
            (self.use_notification, "notification"),
            (self.use_admin, "admin"),
        ]
        .into_iter()
        .filter_map(|(enabled, name)| enabled.then_some(name))
        .collect()
    }
}
