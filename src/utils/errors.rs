//! Error handling for CleanBuddy
//!
//! This module defines the main error type used throughout the application
//! and provides a unified error handling strategy.

use thiserror::Error;

/// Main error type for CleanBuddy application
#[derive(Error, Debug)]
pub enum CleanBuddyError {
    #[error("Telegram API error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing required dependency: {0}")]
    MissingDependency(&'static str),

    #[error("Unknown dialog: {0}")]
    UnknownDialog(String),

    #[error("Dialog already registered: {0}")]
    DuplicateDialog(String),

    #[error("Unknown prompt '{prompt}' in dialog '{dialog}'")]
    UnknownPrompt { dialog: String, prompt: String },

    #[error("Prompt '{prompt}' already registered in dialog '{dialog}'")]
    DuplicatePrompt { dialog: String, prompt: String },

    #[error("State scope '{0}' was not loaded for this turn")]
    StateNotLoaded(String),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for CleanBuddy operations
pub type Result<T> = std::result::Result<T, CleanBuddyError>;

impl CleanBuddyError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            CleanBuddyError::Telegram(_) => true,
            CleanBuddyError::Config(_) => false,
            CleanBuddyError::MissingDependency(_) => false,
            CleanBuddyError::UnknownDialog(_) => false,
            CleanBuddyError::DuplicateDialog(_) => false,
            CleanBuddyError::UnknownPrompt { .. } => false,
            CleanBuddyError::DuplicatePrompt { .. } => false,
            CleanBuddyError::StateNotLoaded(_) => false,
            CleanBuddyError::InvalidStateTransition { .. } => false,
            CleanBuddyError::Redis(_) => true,
            CleanBuddyError::Serialization(_) => false,
            CleanBuddyError::Io(_) => true,
            CleanBuddyError::InvalidInput(_) => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CleanBuddyError::Config(_) => ErrorSeverity::Critical,
            CleanBuddyError::MissingDependency(_) => ErrorSeverity::Critical,
            CleanBuddyError::UnknownDialog(_)
            | CleanBuddyError::DuplicateDialog(_)
            | CleanBuddyError::UnknownPrompt { .. }
            | CleanBuddyError::DuplicatePrompt { .. } => ErrorSeverity::Critical,
            CleanBuddyError::Telegram(_) => ErrorSeverity::Warning,
            CleanBuddyError::InvalidInput(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
