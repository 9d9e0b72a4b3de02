//! Command handlers module
//!
//! Maps bot commands onto turn dispatcher entry points.

use std::sync::Arc;
use teloxide::{prelude::*, types::Message, utils::command::BotCommands};
use tracing::{debug, error};
use crate::config::Settings;
use crate::dialogs::MAIN_DIALOG;
use crate::models::Activity;
use crate::turn::TurnDispatcher;
use crate::utils::errors::{CleanBuddyError, Result};
use super::{conversation_ref, message_activity};

/// All available bot commands
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "CleanBuddy commands:")]
pub enum Command {
    #[command(description = "Start a conversation with the assistant")]
    Start,
    #[command(description = "Set up a cleaning appointment")]
    Appointment,
    #[command(description = "Cancel the appointment in progress")]
    Cancel,
    #[command(description = "Show help information")]
    Help,
}

/// Main command dispatcher
///
/// Failures are logged; the user is never shown a technical error.
pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    dispatcher: Arc<TurnDispatcher>,
    settings: Arc<Settings>,
) -> Result<()> {
    let channel_id = settings.bot.channel_id.as_str();
    debug!(chat_id = msg.chat.id.0, command = ?cmd, "Processing command");

    let result = match cmd {
        Command::Start => {
            let activity = Activity::conversation_start(conversation_ref(&msg, channel_id));
            dispatcher.on_turn(activity).await.map(|_| ())
        }
        Command::Appointment => dispatcher
            .begin_dialog(message_activity(&msg, channel_id), MAIN_DIALOG)
            .await
            .map(|_| ()),
        Command::Cancel => dispatcher
            .cancel_dialogs(message_activity(&msg, channel_id))
            .await
            .map(|_| ()),
        Command::Help => bot
            .send_message(msg.chat.id, Command::descriptions().to_string())
            .await
            .map(|_| ())
            .map_err(CleanBuddyError::from),
    };

    if let Err(e) = result {
        error!(
            chat_id = msg.chat.id.0,
            error = %e,
            severity = %e.severity(),
            "Error handling command"
        );
    }

    Ok(())
}
