//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to deserialize environment variables into a type-safe struct,
//! then validates the database-related parts into [`DatabaseSettings`].

use serde::Deserialize;

use crate::context::{ExecutionContext, UnknownContext};

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `APP_ENV` (required): `development`, `test` or `production`
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
///
/// `DATABASE_URL` and `APP_ENV` are optional at the deserialization layer so their
/// absence is reported as a dedicated [`ConfigError`] rather than a generic envy error.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database_url: Option<String>,

    #[serde(default)]
    pub app_env: Option<String>,

    #[serde(default = "default_port")]
    pub server_port: u16,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

/// Configuration problems that must stop the process before it serves anything.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable could not be parsed into its expected type.
    #[error("failed to read configuration from environment: {0}")]
    Env(#[from] envy::Error),

    #[error("DATABASE_URL is not set")]
    MissingDatabaseUrl,

    /// No fallback: a deployment that forgets `APP_ENV` must not start as Development.
    #[error("APP_ENV is not set (expected development, test or production)")]
    MissingContext,

    /// The connection string is present but unusable. The message never contains the URL itself.
    #[error("DATABASE_URL is invalid: {0}")]
    InvalidDatabaseUrl(String),

    #[error(transparent)]
    UnknownContext(#[from] UnknownContext),
}

/// Validated inputs for building the data layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub database_url: String,
    pub context: ExecutionContext,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if environment variable values cannot be parsed into expected types.
    /// Missing or invalid database settings are reported later by [`Config::database_settings`].
    pub fn from_env() -> Result<Self, ConfigError> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        // Field names are automatically converted: database_url -> DATABASE_URL
        Ok(envy::from_env::<Config>()?)
    }

    /// Build configuration from explicit key/value pairs instead of the process environment.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::from_iter::<_, Config>(vars)?)
    }

    /// Resolve the execution context and validate the connection string.
    ///
    /// The context is checked first so an unrecognized `APP_ENV` is reported even
    /// when the connection string is also missing.
    pub fn database_settings(&self) -> Result<DatabaseSettings, ConfigError> {
        let context = self
            .app_env
            .as_deref()
            .filter(|env| !env.trim().is_empty())
            .ok_or(ConfigError::MissingContext)?
            .parse::<ExecutionContext>()?;

        let database_url = self
            .database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::MissingDatabaseUrl)?;

        validate_database_url(database_url)?;

        Ok(DatabaseSettings {
            database_url: database_url.to_string(),
            context,
        })
    }
}

/// Check that the connection string is a PostgreSQL URL.
fn validate_database_url(database_url: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(database_url)
        .map_err(|e| ConfigError::InvalidDatabaseUrl(e.to_string()))?;

    match parsed.scheme() {
        "postgres" | "postgresql" => Ok(()),
        other => Err(ConfigError::InvalidDatabaseUrl(format!(
            "unsupported scheme `{other}`, expected postgres or postgresql"
        ))),
    }
}
