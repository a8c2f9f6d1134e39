//! Application configuration loading from config.toml
//!
//! Every section and field has a default, so an empty (or missing) file yields a
//! usable configuration. `.env` is loaded through `dotenvy` and the variables
//! `MARKET_API_URL` and `DATABASE_URL` take precedence over the file.

use crate::core::retry::RetryPolicy;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding `[api].base_url`
pub const API_URL_ENV: &str = "MARKET_API_URL";
/// Environment variable overriding `[storage].database_url`
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Backend endpoint settings
    pub api: ApiConfig,
    /// Retry behaviour for payment and order-status calls
    pub retry: RetryConfig,
    /// Device-local storage
    pub storage: StorageConfig,
    /// Pickup scheduling options
    pub pickup: PickupConfig,
}

/// `[api]` section
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the PHP backend, e.g. `https://market.example.com/api`
    pub base_url: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            request_timeout_secs: 15,
        }
    }
}

impl ApiConfig {
    /// `request_timeout_secs` as a `Duration`.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// `[retry]` section
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts for `process_payment`
    pub payment_attempts: u32,
    /// Attempts for `update_order_status`
    pub order_status_attempts: u32,
    /// Fixed delay between attempts, in milliseconds
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            payment_attempts: 3,
            order_status_attempts: 2,
            delay_ms: 1000,
        }
    }
}

impl RetryConfig {
    /// Policy for `process_payment`.
    #[must_use]
    pub const fn payment_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(self.payment_attempts, Duration::from_millis(self.delay_ms))
    }

    /// Policy for `update_order_status`.
    #[must_use]
    pub const fn order_status_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(
            self.order_status_attempts,
            Duration::from_millis(self.delay_ms),
        )
    }
}

/// `[storage]` section
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    /// SeaORM connection string for the local store
    pub database_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://data/farm_market.sqlite?mode=rwc".to_string(),
        }
    }
}

/// `[pickup]` section
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PickupConfig {
    /// The market office where every order is collected
    pub location: String,
    /// How many days ahead (starting tomorrow) a pickup may be booked
    pub window_days: u32,
}

impl Default for PickupConfig {
    fn default() -> Self {
        Self {
            location: "Farmers Market Office".to_string(),
            window_days: 7,
        }
    }
}

/// Parses configuration from a TOML string.
///
/// # Errors
/// Returns an error if the TOML syntax is invalid or a field has the wrong type.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    config.validate()?;
    Ok(config)
}

/// Loads configuration from a TOML file and applies environment overrides.
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A value is out of range (zero attempts, zero timeout)
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).inspect_err(|e| {
        tracing::error!("Failed to read config file {}: {}", path_ref.display(), e);
    })?;
    let mut config = parse_config(&contents)?;
    config.apply_env_overrides();
    Ok(config)
}

/// Loads configuration from the default location (./config.toml).
///
/// A missing file is not an error: defaults plus environment overrides are used.
pub fn load_default_config() -> Result<AppConfig> {
    dotenvy::dotenv().ok();
    if Path::new("config.toml").exists() {
        load_config("config.toml")
    } else {
        tracing::info!("No config.toml found, using defaults");
        let mut config = AppConfig::default();
        config.apply_env_overrides();
        Ok(config)
    }
}

impl AppConfig {
    /// Replaces file values with `MARKET_API_URL` / `DATABASE_URL` when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            self.api.base_url = url;
        }
        if let Ok(url) = std::env::var(DATABASE_URL_ENV) {
            self.storage.database_url = url;
        }
    }

    fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(Error::Config {
                message: "api.base_url cannot be empty".to_string(),
            });
        }
        if self.api.request_timeout_secs == 0 {
            return Err(Error::Config {
                message: "api.request_timeout_secs must be at least 1".to_string(),
            });
        }
        if self.retry.payment_attempts == 0 || self.retry.order_status_attempts == 0 {
            return Err(Error::Config {
                message: "retry attempts must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            [api]
            base_url = "https://market.example.com/api"
            request_timeout_secs = 10

            [retry]
            payment_attempts = 3
            order_status_attempts = 2
            delay_ms = 500

            [storage]
            database_url = "sqlite::memory:"

            [pickup]
            location = "Main Street Office"
            window_days = 14
        "#;

        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.api.base_url, "https://market.example.com/api");
        assert_eq!(config.api.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.retry.payment_policy().max_attempts, 3);
        assert_eq!(config.retry.order_status_policy().max_attempts, 2);
        assert_eq!(config.storage.database_url, "sqlite::memory:");
        assert_eq!(config.pickup.location, "Main Street Office");
        assert_eq!(config.pickup.window_days, 14);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.api.request_timeout_secs, 15);
        assert_eq!(config.retry.payment_attempts, 3);
        assert_eq!(config.retry.order_status_attempts, 2);
        assert_eq!(config.pickup.window_days, 7);
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let result = parse_config("[retry]\npayment_attempts = 0\n");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_config("does/not/exist/config.toml");
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let result = parse_config("[api\nbase_url = ");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
