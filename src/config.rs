//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use chrono_tz::Tz;
use serde::Deserialize;
use thiserror::Error;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DEFAULT_TIMEZONE` (optional): IANA zone applied to users who never
///   ran `/timezone`, defaults to `Europe/Paris`
/// - `HISTORY_PAGE_SIZE` (optional): entries shown by `/history`, defaults to 5
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_timezone")]
    pub default_timezone: String,

    #[serde(default = "default_history_page_size")]
    pub history_page_size: usize,
}

/// Default zone if DEFAULT_TIMEZONE is not set. Matches the zone already
/// baked into stored records that predate the setting.
fn default_timezone() -> String {
    "Europe/Paris".to_string()
}

fn default_history_page_size() -> usize {
    5
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("DEFAULT_TIMEZONE is not a valid IANA zone: {0}")]
    InvalidTimezone(String),
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable value cannot be parsed
    /// into the expected type.
    pub fn from_env() -> Result<Self, envy::Error> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        // Parse environment variables into Config struct
        // Field names are automatically converted: default_timezone -> DEFAULT_TIMEZONE
        envy::from_env::<Config>()
    }

    /// The configured default timezone, parsed.
    ///
    /// Parsing happens once at startup so a typo in DEFAULT_TIMEZONE fails
    /// the boot instead of silently degrading every user to UTC.
    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.default_timezone
            .parse()
            .map_err(|_| ConfigError::InvalidTimezone(self.default_timezone.clone()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_timezone: default_timezone(),
            history_page_size: default_history_page_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable() {
        let config = Config::default();
        assert_eq!(config.default_timezone, "Europe/Paris");
        assert_eq!(config.history_page_size, 5);
        assert_eq!(config.timezone().unwrap().name(), "Europe/Paris");
    }

    #[test]
    fn bad_timezone_is_a_startup_error() {
        let config = Config {
            default_timezone: "Europe/Nowhere".into(),
            ..Config::default()
        };
        let err = config.timezone().unwrap_err();
        assert!(err.to_string().contains("Europe/Nowhere"));
    }
}
