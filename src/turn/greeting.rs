//! Scripted greeting path
//!
//! Runs when no dialog is active. The conversation is in one of two states,
//! derived from `ConversationFlags::prompted_for_name`: idle, or waiting for
//! the user's name. A known name short-circuits both.

use crate::models::{ConversationFlags, UserProfile};
use crate::state::{StatePropertyAccessor, TurnContext};
use crate::utils::errors::Result;
use crate::utils::logging::log_greeting_transition;

/// Where the greeting conversation stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GreetingState {
    Idle,
    AwaitingName,
}

impl GreetingState {
    pub fn from_flags(flags: &ConversationFlags) -> Self {
        if flags.prompted_for_name {
            GreetingState::AwaitingName
        } else {
            GreetingState::Idle
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GreetingState::Idle => "idle",
            GreetingState::AwaitingName => "awaiting_name",
        }
    }

    fn apply(self, flags: &mut ConversationFlags) {
        flags.prompted_for_name = self == GreetingState::AwaitingName;
    }
}

/// Greeting path state accessors
#[derive(Debug, Clone)]
pub struct GreetingFlow {
    persona: String,
    profile: StatePropertyAccessor<UserProfile>,
    flags: StatePropertyAccessor<ConversationFlags>,
}

impl GreetingFlow {
    pub fn new(
        persona: &str,
        profile: StatePropertyAccessor<UserProfile>,
        flags: StatePropertyAccessor<ConversationFlags>,
    ) -> Self {
        Self {
            persona: persona.to_string(),
            profile,
            flags,
        }
    }

    /// Run one greeting turn and return the state it leaves behind
    pub fn run(&self, turn: &mut TurnContext) -> Result<GreetingState> {
        // defaults stay in memory; only a transition writes
        let mut profile = self.profile.peek(turn)?.unwrap_or_default();
        let mut flags = self.flags.peek(turn)?.unwrap_or_default();
        let current = GreetingState::from_flags(&flags);

        if let Some(name) = profile.known_name() {
            turn.send_text(format!(
                "Hi, {}. My name is {}, a cleaning assistant bot. Would you like to set up a cleaning appointment?",
                name, self.persona
            ));
            return Ok(current);
        }

        let next = match current {
            GreetingState::Idle => {
                self.ask_name(turn);
                GreetingState::AwaitingName
            }
            GreetingState::AwaitingName => match turn.activity().trimmed_text().map(str::to_string) {
                Some(name) => {
                    turn.send_text(format!(
                        "Thanks, {}. My name is {}, a cleaning assistant bot. Would you like to set up a cleaning appointment?",
                        name, self.persona
                    ));
                    profile.name = Some(name);
                    self.profile.set(turn, &profile)?;
                    GreetingState::Idle
                }
                None => {
                    self.ask_name(turn);
                    GreetingState::AwaitingName
                }
            },
        };

        next.apply(&mut flags);
        self.flags.set(turn, &flags)?;
        if next != current {
            log_greeting_transition(&turn.conversation().conversation_id, current.as_str(), next.as_str());
        }
        Ok(next)
    }

    fn ask_name(&self, turn: &mut TurnContext) {
        turn.send_text(format!(
            "Hello, my name is {}, a cleaning assistant bot. May I have your name, please?",
            self.persona
        ));
    }
}
