use config::{Config, Environment, File};
use once_cell::sync::OnceCell;
use std::env;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

pub mod env_vars;
pub mod models;

pub use models::*;

/// Errors raised while assembling the application configuration.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read configuration sources: {0}")]
    Source(#[from] config::ConfigError),

    #[error("configuration does not match the expected shape: {0}")]
    Shape(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Directory holding `default.*` and `{RUN_ENV}.*` config files.
///
/// `CONFIG_DIR` wins; otherwise `./config` relative to the working directory.
fn config_dir() -> PathBuf {
    env::var("CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config"))
}

/// Loads the configuration from files, the `AIRLINE__*` environment and the plain
/// deployment variables, in increasing order of precedence.
pub fn load_config() -> Result<AppConfig, ConfigLoadError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let prefix = env_vars::get_config_prefix();
    let dir = config_dir();

    let default_path = dir.join("default");
    let env_path = dir.join(&run_env);
    debug!(
        "loading config from {} and {}",
        default_path.display(),
        env_path.display()
    );

    let builder = Config::builder()
        .add_source(File::with_name(&default_path.to_string_lossy()).required(false))
        .add_source(File::with_name(&env_path.to_string_lossy()).required(false))
        .add_source(
            Environment::with_prefix(&prefix)
                .prefix_separator(env_vars::CONFIG_SEPARATOR)
                .separator(env_vars::CONFIG_SEPARATOR)
                .try_parsing(true),
        );

    let mut raw: serde_json::Value = builder.build()?.try_deserialize()?;
    env_vars::apply_plain_overrides(&mut raw, |key| env::var(key).ok());

    let config: AppConfig = serde_json::from_value(raw)?;
    validate(&config)?;
    Ok(config)
}

/// Rejects configurations that would start services unable to verify tokens.
pub fn validate(config: &AppConfig) -> Result<(), ConfigLoadError> {
    if config.enabled_services().is_empty() {
        return Err(ConfigLoadError::Invalid(
            "no service enabled; set at least one use_* flag".to_string(),
        ));
    }
    if config.jwt.secret.is_empty() {
        return Err(ConfigLoadError::Invalid(
            "jwt.secret is empty; set JWT_SECRET".to_string(),
        ));
    }
    if config.database.as_ref().map_or(true, |db| db.url.is_empty()) {
        return Err(ConfigLoadError::Invalid(
            "database.url is empty; set DATABASE_URL".to_string(),
        ));
    }
    Ok(())
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Ensures that the dotenv file is loaded into the environment variables.
///
/// `DOTENV_OVERRIDE` selects the file, falling back to a first CLI argument that starts
/// with `.env`, then to `.env`. Loading happens at most once per process.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path_override = env::var("DOTENV_OVERRIDE").ok();
    let dotenv_path_arg = env::args().nth(1).filter(|s| s.starts_with(".env"));

    let dotenv_path = dotenv_path_override
        .or(dotenv_path_arg)
        .unwrap_or_else(|| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}
