//! Bot handlers module
//!
//! Telegram adapters that turn incoming updates into activities for the
//! turn dispatcher:
//! - Command handlers for /start, /appointment, /cancel and /help
//! - Message handlers for plain text replies

pub mod commands;
pub mod messages;

pub use commands::{handle_command, Command};
pub use messages::handle_message;

use teloxide::types::Message;
use crate::models::{Activity, ConversationRef};

/// Conversation identity of a Telegram message
///
/// The chat is the conversation; the sender is the user, falling back to the
/// chat for anonymous senders.
pub fn conversation_ref(msg: &Message, channel_id: &str) -> ConversationRef {
    let user_id = msg
        .from
        .as_ref()
        .map(|user| user.id.0.to_string())
        .unwrap_or_else(|| msg.chat.id.0.to_string());

    ConversationRef {
        channel_id: channel_id.to_string(),
        conversation_id: msg.chat.id.0.to_string(),
        user_id,
    }
}

/// Message activity for a Telegram text message
pub fn message_activity(msg: &Message, channel_id: &str) -> Activity {
    Activity::message(conversation_ref(msg, channel_id), msg.text().unwrap_or_default())
}
