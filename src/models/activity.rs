//! Inbound activities and outbound replies
//!
//! An [`Activity`] is one inbound message or conversation event; a turn
//! processes exactly one. Replies are queued on the turn and handed to the
//! transport once state has been saved.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDateTime, Utc};

/// Kind of inbound activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// A user message
    Message,
    /// The user joined or (re)started the conversation
    ConversationStart,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Message => "message",
            ActivityKind::ConversationStart => "conversation_start",
        }
    }
}

/// Structured reply data produced by an upstream recognizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ActivityValue {
    /// Already-resolved date/time candidates, best first
    DateTimes(Vec<NaiveDateTime>),
    /// A selected choice, by its text
    Choice(String),
}

/// Identity of the conversation an activity belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationRef {
    pub channel_id: String,
    pub conversation_id: String,
    pub user_id: String,
}

/// One inbound activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub kind: ActivityKind,
    pub conversation: ConversationRef,
    pub text: Option<String>,
    pub value: Option<ActivityValue>,
    pub timestamp: DateTime<Utc>,
}

impl Activity {
    /// Create a text message activity
    pub fn message(conversation: ConversationRef, text: impl Into<String>) -> Self {
        Self {
            kind: ActivityKind::Message,
            conversation,
            text: Some(text.into()),
            value: None,
            timestamp: Utc::now(),
        }
    }

    /// Create a conversation start activity
    pub fn conversation_start(conversation: ConversationRef) -> Self {
        Self {
            kind: ActivityKind::ConversationStart,
            conversation,
            text: None,
            value: None,
            timestamp: Utc::now(),
        }
    }

    /// Attach structured recognizer output
    pub fn with_value(mut self, value: ActivityValue) -> Self {
        self.value = Some(value);
        self
    }

    /// Trimmed text, `None` when absent or blank
    pub fn trimmed_text(&self) -> Option<&str> {
        self.text.as_deref().map(str::trim).filter(|text| !text.is_empty())
    }
}

/// One outbound message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub text: String,
    /// Choices to render alongside the text, empty for plain messages
    #[serde(default)]
    pub choices: Vec<String>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            choices: Vec::new(),
        }
    }

    pub fn with_choices(text: impl Into<String>, choices: Vec<String>) -> Self {
        Self {
            text: text.into(),
            choices,
        }
    }
}
