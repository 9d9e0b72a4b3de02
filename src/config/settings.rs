//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub bot: BotConfig,
    pub storage: StorageConfig,
    pub redis: RedisConfig,
    pub logging: LoggingConfig,
    pub appointment: AppointmentConfig,
}

/// Telegram bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    pub token: String,
    /// Name the assistant introduces itself with
    pub persona: String,
    /// Channel identifier used as the first segment of storage keys
    pub channel_id: String,
}

/// Which storage medium backs the state accessors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Redis,
}

/// State storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedisConfig {
    pub url: String,
    pub prefix: String,
    /// Expiry for conversation-scoped keys; 0 keeps them forever
    pub ttl_seconds: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: String,
    pub file_name: String,
    pub json: bool,
}

/// Appointment flow configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppointmentConfig {
    /// Earliest accepted cleaning time, `HH:MM`
    pub opening_time: String,
    /// Latest accepted cleaning time, `HH:MM` (inclusive)
    pub closing_time: String,
    pub service_types: Vec<String>,
    pub contact_phone: String,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let defaults = config::Config::try_from(&Settings::default())?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("CLEANBUDDY").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::CleanBuddyError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                token: String::new(),
                persona: "Stacy".to_string(),
                channel_id: "telegram".to_string(),
            },
            storage: StorageConfig {
                backend: StorageBackend::Memory,
            },
            redis: RedisConfig {
                url: "redis://localhost:6379".to_string(),
                prefix: "cleanbuddy:".to_string(),
                ttl_seconds: 7 * 24 * 3600,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                directory: "logs".to_string(),
                file_name: "cleanbuddy.log".to_string(),
                json: false,
            },
            appointment: AppointmentConfig {
                opening_time: "09:00".to_string(),
                closing_time: "17:00".to_string(),
                service_types: vec![
                    "Standard Clean".to_string(),
                    "Deep Clean".to_string(),
                    "Move In/Out Clean".to_string(),
                    "Carpet Clean".to_string(),
                ],
                contact_phone: "406-333-2525".to_string(),
            },
        }
    }
}
