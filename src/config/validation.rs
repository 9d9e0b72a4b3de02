//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{CleanBuddyError, Result};
use crate::utils::helpers::parse_clock_time;
use super::{Settings, StorageBackend};

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_bot_config(&settings.bot)?;
    if settings.storage.backend == StorageBackend::Redis {
        validate_redis_config(&settings.redis)?;
    }
    validate_logging_config(&settings.logging)?;
    validate_appointment_config(&settings.appointment)?;

    Ok(())
}

/// Validate bot configuration
fn validate_bot_config(config: &super::BotConfig) -> Result<()> {
    if config.token.is_empty() {
        return Err(CleanBuddyError::Config(
            "Bot token is required".to_string()
        ));
    }

    if config.persona.trim().is_empty() {
        return Err(CleanBuddyError::Config(
            "Bot persona name is required".to_string()
        ));
    }

    if config.channel_id.is_empty() || config.channel_id.contains('/') {
        return Err(CleanBuddyError::Config(
            "Channel id must be non-empty and must not contain '/'".to_string()
        ));
    }

    Ok(())
}

/// Validate Redis configuration
fn validate_redis_config(config: &super::RedisConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(CleanBuddyError::Config(
            "Redis URL is required".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(CleanBuddyError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(CleanBuddyError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    if config.file_name.is_empty() {
        return Err(CleanBuddyError::Config(
            "Log file name is required".to_string()
        ));
    }

    Ok(())
}

/// Validate appointment flow configuration
fn validate_appointment_config(config: &super::AppointmentConfig) -> Result<()> {
    let opening = parse_clock_time(&config.opening_time).ok_or_else(|| {
        CleanBuddyError::Config(format!("Invalid opening time: {}", config.opening_time))
    })?;
    let closing = parse_clock_time(&config.closing_time).ok_or_else(|| {
        CleanBuddyError::Config(format!("Invalid closing time: {}", config.closing_time))
    })?;

    if opening > closing {
        return Err(CleanBuddyError::Config(
            "Opening time cannot be later than closing time".to_string()
        ));
    }

    if config.service_types.is_empty() {
        return Err(CleanBuddyError::Config(
            "At least one service type must be configured".to_string()
        ));
    }

    if config.service_types.iter().any(|s| s.trim().is_empty()) {
        return Err(CleanBuddyError::Config(
            "Service types must not be blank".to_string()
        ));
    }

    if config.contact_phone.is_empty() {
        return Err(CleanBuddyError::Config(
            "Contact phone number is required".to_string()
        ));
    }

    Ok(())
}
