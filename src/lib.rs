//! CleanBuddy Telegram Bot
//!
//! A cleaning assistant bot built on a turn-based waterfall dialog runtime.
//! Each inbound message is one stateless turn; dialog progress, the user
//! profile and conversation flags are persisted between turns and written
//! once at the end of each turn.

#![allow(non_snake_case)]

pub mod config;
pub mod dialogs;
pub mod handlers;
pub mod models;
pub mod services;
pub mod state;
pub mod turn;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{CleanBuddyError, Result};

// Re-export main components for easy access
pub use dialogs::{DialogContext, DialogSet, WaterfallDialog};
pub use services::{TelegramTransport, Transport};
pub use state::{MemoryStorage, RedisStorage, StateManager, StateStorage};
pub use turn::{TurnDispatcher, TurnOutcome};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
