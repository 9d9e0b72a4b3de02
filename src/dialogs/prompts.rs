//! Prompt units
//!
//! A [`Prompt`] asks one question and accepts exactly one answer. The
//! waterfall sequencer emits the question when a step returns
//! [`StepAction::Prompt`](super::waterfall::StepAction::Prompt), persists a
//! [`PendingPrompt`], and on the next turn asks the unit to recognize and
//! validate the reply. Rejected replies re-emit the retry text; there is no
//! retry limit.

use std::sync::Arc;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use crate::models::{Activity, ActivityValue, Reply};
use crate::services::recognizers::{recognize_choice, recognize_date_times, Choice, FoundChoice};
use crate::state::TurnContext;

/// What a prompt recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    Text,
    DateTime,
    Choice,
}

/// Per-use prompt configuration, persisted while the prompt is pending
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptOptions {
    pub prompt: String,
    #[serde(default)]
    pub retry_prompt: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl PromptOptions {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn with_retry(mut self, retry_prompt: impl Into<String>) -> Self {
        self.retry_prompt = Some(retry_prompt.into());
        self
    }

    pub fn with_choices(mut self, choices: Vec<Choice>) -> Self {
        self.choices = choices;
        self
    }

    fn render(&self, text: &str) -> Reply {
        if self.choices.is_empty() {
            Reply::text(text)
        } else {
            Reply::with_choices(text, self.choices.iter().map(|c| c.value.clone()).collect())
        }
    }
}

/// A prompt waiting for its answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingPrompt {
    pub unit: String,
    pub options: PromptOptions,
    /// Replies received so far, including rejected ones
    #[serde(default)]
    pub attempts: u32,
}

impl PendingPrompt {
    pub fn new(unit: impl Into<String>, options: PromptOptions) -> Self {
        Self {
            unit: unit.into(),
            options,
            attempts: 0,
        }
    }
}

/// A recognized reply, before validation
#[derive(Debug, Clone, PartialEq)]
pub enum Recognized {
    Text(String),
    DateTimes(Vec<NaiveDateTime>),
    Choice(FoundChoice),
}

impl Recognized {
    /// Value handed to the next step when no validator overrides it
    pub fn into_value(self) -> Value {
        match self {
            Recognized::Text(text) => Value::String(text),
            Recognized::DateTimes(resolutions) => resolutions
                .first()
                .map(|time| Value::String(time.format("%Y-%m-%dT%H:%M:%S").to_string()))
                .unwrap_or(Value::Null),
            Recognized::Choice(choice) => json!({
                "value": choice.value,
                "index": choice.index,
                "score": choice.score,
            }),
        }
    }
}

/// Validator outcome
#[derive(Debug, Clone, PartialEq)]
pub enum Validation {
    Accepted(Value),
    Rejected,
}

/// Answer validator
pub type Validator = Arc<dyn Fn(&Recognized) -> Validation + Send + Sync>;

/// A named question with optional validation
#[derive(Clone)]
pub struct Prompt {
    name: String,
    kind: PromptKind,
    validator: Option<Validator>,
}

impl Prompt {
    fn new(name: &str, kind: PromptKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            validator: None,
        }
    }

    /// Free-text prompt
    pub fn text(name: &str) -> Self {
        Self::new(name, PromptKind::Text)
    }

    /// Date/time prompt
    pub fn date_time(name: &str) -> Self {
        Self::new(name, PromptKind::DateTime)
    }

    /// Single choice prompt; choices come from the options of each use
    pub fn choice(name: &str) -> Self {
        Self::new(name, PromptKind::Choice)
    }

    /// Attach a validator
    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&Recognized) -> Validation + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> PromptKind {
        self.kind
    }

    /// Emit the question
    pub(crate) fn ask(&self, turn: &mut TurnContext, options: &PromptOptions) {
        turn.send(options.render(&options.prompt));
    }

    /// Emit the retry text, falling back to the question
    pub(crate) fn reprompt(&self, turn: &mut TurnContext, options: &PromptOptions) {
        let text = options.retry_prompt.as_deref().unwrap_or(&options.prompt);
        turn.send(options.render(text));
    }

    /// Recognize the reply carried by an activity
    pub fn recognize(&self, activity: &Activity, options: &PromptOptions) -> Option<Recognized> {
        match self.kind {
            PromptKind::Text => activity
                .trimmed_text()
                .map(|text| Recognized::Text(text.to_string())),
            PromptKind::DateTime => {
                let resolutions = match &activity.value {
                    Some(ActivityValue::DateTimes(resolutions)) if !resolutions.is_empty() => {
                        resolutions.clone()
                    }
                    _ => activity
                        .trimmed_text()
                        .map(recognize_date_times)
                        .unwrap_or_default(),
                };
                (!resolutions.is_empty()).then(|| Recognized::DateTimes(resolutions))
            }
            PromptKind::Choice => {
                let reply = match &activity.value {
                    Some(ActivityValue::Choice(choice)) => Some(choice.as_str()),
                    _ => activity.trimmed_text(),
                };
                reply
                    .and_then(|reply| recognize_choice(reply, &options.choices))
                    .map(Recognized::Choice)
            }
        }
    }

    /// Validate a recognized reply; nothing recognized is always a rejection
    pub fn validate(&self, recognized: Option<Recognized>) -> Validation {
        match (recognized, &self.validator) {
            (None, _) => Validation::Rejected,
            (Some(recognized), Some(validator)) => validator(&recognized),
            (Some(recognized), None) => Validation::Accepted(recognized.into_value()),
        }
    }
}

impl std::fmt::Debug for Prompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prompt")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("validated", &self.validator.is_some())
            .finish()
    }
}
