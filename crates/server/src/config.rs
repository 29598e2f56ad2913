//! Process configuration read from the environment (and `.env`, if present).

use std::path::PathBuf;
use std::time::Duration;

use notesapi_engine::IncrementMode;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub app_host: String,
    pub app_port: u16,
    /// Protocol behind `POST /counter/increment`.
    pub counter_mode: IncrementMode,
    /// Pause inside the racy protocol's read/write window.
    pub race_delay: Duration,
    pub busy_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("data/app.db"),
            app_host: "0.0.0.0".to_string(),
            app_port: 8080,
            counter_mode: IncrementMode::Atomic,
            race_delay: Duration::from_millis(250),
            busy_timeout: Duration::from_millis(5000),
        }
    }
}

impl AppConfig {
    /// Loads `.env` if there is one, then reads:
    ///
    /// - `DATABASE_PATH` (default `data/app.db`)
    /// - `APP_HOST` (default `0.0.0.0`)
    /// - `APP_PORT` (default `8080`)
    /// - `COUNTER_MODE`: `atomic` or `racy` (default `atomic`)
    /// - `COUNTER_RACE_DELAY_MS` (default `250`)
    /// - `BUSY_TIMEOUT_MS` (default `5000`)
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let database_path = lookup("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.database_path);
        let app_host = lookup("APP_HOST").unwrap_or(defaults.app_host);
        let app_port = parse_or(&lookup, "APP_PORT", defaults.app_port)?;
        let counter_mode = parse_or(&lookup, "COUNTER_MODE", defaults.counter_mode)?;
        let race_delay =
            parse_or(&lookup, "COUNTER_RACE_DELAY_MS", 250u64).map(Duration::from_millis)?;
        let busy_timeout =
            parse_or(&lookup, "BUSY_TIMEOUT_MS", 5000u64).map(Duration::from_millis)?;

        Ok(Self {
            database_path,
            app_host,
            app_port,
            counter_mode,
            race_delay,
            busy_timeout,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.app_host, self.app_port)
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        }),
    }
}
