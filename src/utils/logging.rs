//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the CleanBuddy application.

use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use crate::config::LoggingConfig;
use crate::utils::helpers::truncate_text;
use crate::utils::errors::{CleanBuddyError, Result};

/// Initialize logging based on configuration
///
/// The returned guard flushes the file writer on drop and must be held for
/// the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::try_new(&config.level)
        .map_err(|e| CleanBuddyError::Config(format!("Invalid log filter: {}", e)))?;

    let file_appender = tracing_appender::rolling::daily(&config.directory, &config.file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(config.json.then(|| tracing_subscriber::fmt::layer().json().with_writer(non_blocking.clone())))
        .with((!config.json).then(|| tracing_subscriber::fmt::layer().with_ansi(false).with_writer(non_blocking)))
        .try_init()
        .map_err(|e| CleanBuddyError::Config(format!("Logging already initialized: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log an inbound activity at the start of a turn
pub fn log_turn_received(conversation_id: &str, user_id: &str, kind: &str, text: Option<&str>) {
    let text = text.map(|t| truncate_text(t, 80));
    info!(
        conversation_id = conversation_id,
        user_id = user_id,
        kind = kind,
        text = text.as_deref(),
        "Turn received"
    );
}

/// Log a dialog stack or waterfall transition
pub fn log_dialog_event(conversation_id: &str, dialog_id: &str, step_index: usize, event: &str) {
    debug!(
        conversation_id = conversation_id,
        dialog_id = dialog_id,
        step_index = step_index,
        event = event,
        "Dialog event"
    );
}

/// Log a rejected prompt answer
pub fn log_validation_rejected(conversation_id: &str, dialog_id: &str, prompt: &str, attempts: u32) {
    info!(
        conversation_id = conversation_id,
        dialog_id = dialog_id,
        prompt = prompt,
        attempts = attempts,
        "Prompt answer rejected, re-prompting"
    );
}

/// Log a greeting state machine transition
pub fn log_greeting_transition(conversation_id: &str, from: &str, to: &str) {
    debug!(
        conversation_id = conversation_id,
        from = from,
        to = to,
        "Greeting state transition"
    );
}

/// Log the end-of-turn state flush
pub fn log_state_flush(conversation_id: &str, keys_written: usize) {
    debug!(
        conversation_id = conversation_id,
        keys_written = keys_written,
        "Turn state flushed"
    );
}
