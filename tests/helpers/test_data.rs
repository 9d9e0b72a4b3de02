//! Test data helpers for creating test activities
//!
//! This module provides helper functions for building inbound activities and
//! the date/time values the appointment flow expects.

use chrono::{NaiveDate, NaiveDateTime};
use CleanBuddy::models::{Activity, ActivityValue, ConversationRef};

pub const TEST_CHANNEL: &str = "telegram";
pub const TEST_CONVERSATION: &str = "100200300";
pub const TEST_USER: &str = "123456789";

/// Conversation used by most tests
pub fn test_conversation() -> ConversationRef {
    create_test_conversation(TEST_CONVERSATION, TEST_USER)
}

pub fn create_test_conversation(conversation_id: &str, user_id: &str) -> ConversationRef {
    ConversationRef {
        channel_id: TEST_CHANNEL.to_string(),
        conversation_id: conversation_id.to_string(),
        user_id: user_id.to_string(),
    }
}

/// Text message in the default conversation
pub fn create_test_message(text: &str) -> Activity {
    Activity::message(test_conversation(), text)
}

/// Message carrying pre-resolved date/time candidates
pub fn create_date_time_message(text: &str, resolutions: Vec<NaiveDateTime>) -> Activity {
    create_test_message(text).with_value(ActivityValue::DateTimes(resolutions))
}

/// Message carrying a structured choice
pub fn create_choice_message(choice: &str) -> Activity {
    create_test_message(choice).with_value(ActivityValue::Choice(choice.to_string()))
}

pub fn create_conversation_start() -> Activity {
    Activity::conversation_start(test_conversation())
}

/// A fixed day at the given wall-clock time
pub fn appointment_at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .expect("valid test time")
}

/// Answers for a complete appointment, in prompt order
pub struct AppointmentAnswers {
    pub description: &'static str,
    pub cleaning_time: &'static str,
    pub phone_number: &'static str,
    pub service_type: &'static str,
}

impl Default for AppointmentAnswers {
    fn default() -> Self {
        Self {
            description: "Kitchen and two bathrooms",
            cleaning_time: "05/01/2024 10:00",
            phone_number: "406-555-0199",
            service_type: "Deep Clean",
        }
    }
}
