//! Outbound message delivery
//!
//! The turn dispatcher hands its queued replies to a [`Transport`] once state
//! has been saved. The Telegram implementation renders choice lists as a
//! one-time reply keyboard.

use async_trait::async_trait;
use teloxide::{
    prelude::*,
    types::{ChatId, KeyboardButton, KeyboardMarkup, KeyboardRemove},
};
use tracing::{debug, error};
use crate::models::{ConversationRef, Reply};
use crate::utils::errors::{CleanBuddyError, Result};

/// Delivers replies to the conversation they belong to
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, conversation: &ConversationRef, reply: &Reply) -> Result<()>;
}

/// Telegram delivery over the Bot API
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn chat_id(conversation: &ConversationRef) -> Result<ChatId> {
        conversation
            .conversation_id
            .parse::<i64>()
            .map(ChatId)
            .map_err(|_| {
                CleanBuddyError::InvalidInput(format!(
                    "Conversation id '{}' is not a Telegram chat id",
                    conversation.conversation_id
                ))
            })
    }
}

/// One keyboard row per choice
pub fn choice_keyboard(choices: &[String]) -> KeyboardMarkup {
    let rows: Vec<Vec<KeyboardButton>> = choices
        .iter()
        .map(|choice| vec![KeyboardButton::new(choice.clone())])
        .collect();

    KeyboardMarkup::new(rows).resize_keyboard().one_time_keyboard()
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send(&self, conversation: &ConversationRef, reply: &Reply) -> Result<()> {
        let chat_id = Self::chat_id(conversation)?;
        let request = self.bot.send_message(chat_id, reply.text.clone());

        let result = if reply.choices.is_empty() {
            request.reply_markup(KeyboardRemove::new()).await
        } else {
            request.reply_markup(choice_keyboard(&reply.choices)).await
        };

        match result {
            Ok(_) => {
                debug!(chat_id = chat_id.0, choices = reply.choices.len(), "Reply delivered");
                Ok(())
            }
            Err(e) => {
                error!(chat_id = chat_id.0, error = %e, "Failed to deliver reply");
                Err(CleanBuddyError::Telegram(e))
            }
        }
    }
}

impl std::fmt::Debug for TelegramTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramTransport").finish_non_exhaustive()
    }
}
