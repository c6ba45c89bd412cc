//! Environment variable handling for the airline services.
//!
//! Structured overrides use the `AIRLINE__SECTION__KEY` pattern and are picked up by the
//! `config` crate directly. The plain variables that deployment scripts already export
//! (`DATABASE_URL`, `JWT_SECRET`, `SMTP_USER`, ...) are mapped onto config paths here.

use serde_json::{Map, Value};
use std::env;

/// The default prefix for configuration environment variables
pub const DEFAULT_PREFIX: &str = "AIRLINE";

/// The separator for configuration environment variables
pub const CONFIG_SEPARATOR: &str = "__";

/// Plain environment variables and the config path each one overrides.
pub const PLAIN_OVERRIDES: &[(&str, &str)] = &[
    ("DATABASE_URL", "database.url"),
    ("JWT_SECRET", "jwt.secret"),
    ("JWT_EXPIRATION_HOURS", "jwt.expiration_hours"),
    ("NOTIFICATION_SERVICE_URL", "services.notification_url"),
    ("INTERNAL_AUTH_SECRET", "notification.internal_secret"),
    ("SMTP_HOST", "smtp.host"),
    ("SMTP_PORT", "smtp.port"),
    ("SMTP_USER", "smtp.user"),
    ("SMTP_PASSWORD", "smtp.password"),
    ("SMTP_FROM_EMAIL", "smtp.from_email"),
];

/// Get the prefix for configuration environment variables
pub fn get_config_prefix() -> String {
    env::var("PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string())
}

/// Convert a configuration path to an environment variable name
///
/// # Arguments
///
/// * `path` - The configuration path (e.g., "server.host")
///
/// # Returns
///
/// The environment variable name (e.g., "AIRLINE__SERVER__HOST")
pub fn config_path_to_env_var(path: &str) -> String {
    let prefix = get_config_prefix();
    let path = path.replace('.', CONFIG_SEPARATOR);
    format!("{}{}{}", prefix, CONFIG_SEPARATOR, path).to_uppercase()
}

/// Normalizes a raw value before it is written into the config tree.
///
/// SMTP app passwords are usually copied with spaces between the groups; those are dropped.
/// Everything else is trimmed.
fn normalize(path: &str, raw: &str) -> String {
    if path == "smtp.password" {
        raw.chars().filter(|c| !c.is_whitespace()).collect()
    } else {
        raw.trim().to_string()
    }
}

/// Converts a plain string to the JSON type the config model expects for numeric keys.
fn typed_value(path: &str, value: String) -> Value {
    match path {
        "jwt.expiration_hours" | "smtp.port" => value
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or(Value::String(value)),
        _ => Value::String(value),
    }
}

/// Writes `value` at the dotted `path`, creating intermediate objects as needed.
fn set_path(root: &mut Value, path: &str, value: Value) {
    let mut current = root;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let Value::Object(map) = current else {
            return;
        };
        if segments.peek().is_none() {
            map.insert(segment.to_string(), value);
            return;
        }
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}

/// Applies the plain-variable overrides to a serialized config tree.
///
/// `lookup` resolves a variable name to its value; production code passes `std::env::var`,
/// tests pass a closure over a fixed map.
///
/// # Returns
///
/// `true` if any values were replaced, `false` otherwise
pub fn apply_plain_overrides<F>(value: &mut Value, lookup: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    let mut replaced = false;
    for (var, path) in PLAIN_OVERRIDES {
        let Some(raw) = lookup(var) else {
            continue;
        };
        let normalized = normalize(path, &raw);
        if normalized.is_empty() {
            continue;
        }
        set_path(value, path, typed_value(path, normalized));
        replaced = true;
    }
    replaced
}
