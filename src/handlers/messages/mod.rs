//! Message handlers module
//!
//! Handles incoming text messages.

use std::sync::Arc;
use teloxide::types::Message;
use tracing::{debug, error, warn};
use crate::config::Settings;
use crate::turn::TurnDispatcher;
use crate::utils::errors::Result;
use super::message_activity;

/// Handle incoming text messages
pub async fn handle_message(
    msg: Message,
    dispatcher: Arc<TurnDispatcher>,
    settings: Arc<Settings>,
) -> Result<()> {
    let chat_id = msg.chat.id;

    if msg.text().is_none() {
        debug!(chat_id = chat_id.0, "Ignoring non-text message");
        return Ok(());
    }

    let activity = message_activity(&msg, &settings.bot.channel_id);
    match dispatcher.on_turn(activity).await {
        Ok(outcome) => {
            debug!(
                chat_id = chat_id.0,
                turn_id = %outcome.turn_id,
                route = ?outcome.route,
                "Message handled"
            );
        }
        Err(e) if e.is_recoverable() => {
            warn!(chat_id = chat_id.0, error = %e, "Recoverable error handling message");
        }
        Err(e) => {
            error!(chat_id = chat_id.0, error = %e, severity = %e.severity(), "Error handling message");
        }
    }

    Ok(())
}
