//! Application settings loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use super::constants::{
    DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS, DEFAULT_DATABASE_MAX_CONNECTIONS, DEFAULT_DATABASE_URL,
    DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, DEFAULT_SHUTDOWN_TIMEOUT_SECS,
    SUPPORTED_DATABASE_SCHEMES,
};
use crate::errors::{AppError, AppResult};

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub database_connect_timeout: Duration,
    pub server_host: String,
    pub server_port: u16,
    pub shutdown_timeout: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("database_max_connections", &self.database_max_connections)
            .field("database_connect_timeout", &self.database_connect_timeout)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("shutdown_timeout", &self.shutdown_timeout)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            database_max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
            database_connect_timeout: Duration::from_secs(DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS),
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            shutdown_timeout: Duration::from_secs(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// `.env` is loaded once by the binary before this runs.
    ///
    /// # Errors
    /// Returns `AppError::Config` when a variable is set but malformed.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Unset keys fall back to the defaults in `config::constants`.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            database_max_connections: parse_positive(
                &lookup,
                "DATABASE_MAX_CONNECTIONS",
                defaults.database_max_connections,
            )?,
            database_connect_timeout: Duration::from_secs(parse_positive(
                &lookup,
                "DATABASE_CONNECT_TIMEOUT_SECS",
                defaults.database_connect_timeout.as_secs(),
            )?),
            server_host: lookup("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parse_positive(&lookup, "SERVER_PORT", defaults.server_port)?,
            shutdown_timeout: Duration::from_secs(parse_positive(
                &lookup,
                "SHUTDOWN_TIMEOUT_SECS",
                defaults.shutdown_timeout.as_secs(),
            )?),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints once, at startup.
    pub fn validate(&self) -> AppResult<()> {
        if self.database_url.trim().is_empty() {
            return Err(AppError::config("DATABASE_URL must not be empty"));
        }

        if !SUPPORTED_DATABASE_SCHEMES
            .iter()
            .any(|scheme| self.database_url.starts_with(scheme))
        {
            return Err(AppError::config(format!(
                "DATABASE_URL must start with one of: {}",
                SUPPORTED_DATABASE_SCHEMES.join(", ")
            )));
        }

        if self.server_host.trim().is_empty() {
            return Err(AppError::config("SERVER_HOST must not be empty"));
        }

        Ok(())
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// Parse a numeric variable that must be strictly positive.
fn parse_positive<F, T>(lookup: &F, key: &str, default: T) -> AppResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialOrd + Default,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };

    let value: T = raw
        .trim()
        .parse()
        .map_err(|_| AppError::config(format!("{key} must be a number, got {raw:?}")))?;

    if value <= T::default() {
        return Err(AppError::config(format!("{key} must be greater than zero")));
    }

    Ok(value)
}
