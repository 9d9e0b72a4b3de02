//! Waterfall step sequencer
//!
//! A [`WaterfallDialog`] is an ordered list of steps plus the prompt units
//! those steps may use. Each step is a plain function of the prior result
//! and the instance's scratch values that returns a [`StepAction`]. The
//! sequencer never holds a continuation: on every turn it picks up from the
//! persisted `step_index` and pending prompt.

use std::collections::HashMap;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use crate::state::TurnContext;
use crate::utils::errors::{CleanBuddyError, Result};
use crate::utils::logging::{log_dialog_event, log_validation_rejected};
use super::instance::DialogInstance;
use super::prompts::{PendingPrompt, Prompt, PromptOptions, Validation};

/// What a step wants to happen next
#[derive(Debug, Clone, PartialEq)]
pub enum StepAction {
    /// Ask a registered prompt and wait for the answer
    Prompt { unit: String, options: PromptOptions },
    /// Run the next step now with this prior result
    Continue(Option<Value>),
    /// Start a child dialog; its result becomes the next prior result
    BeginDialog { dialog_id: String, options: Option<Value> },
    /// Finish this dialog
    End(Option<Value>),
}

impl StepAction {
    pub fn prompt(unit: &str, options: PromptOptions) -> Self {
        StepAction::Prompt {
            unit: unit.to_string(),
            options,
        }
    }

    pub fn begin_dialog(dialog_id: &str) -> Self {
        StepAction::BeginDialog {
            dialog_id: dialog_id.to_string(),
            options: None,
        }
    }
}

/// Where a dialog stands after the sequencer ran
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum StepOutcome {
    Waiting,
    BeginChild { dialog_id: String, options: Option<Value> },
    Complete(Option<Value>),
}

/// Everything a step may look at or touch
pub struct StepContext<'a> {
    pub turn: &'a mut TurnContext,
    values: &'a mut Map<String, Value>,
    options: Option<&'a Value>,
    result: Option<Value>,
    step_index: usize,
}

impl<'a> StepContext<'a> {
    /// Prior step's result, the validated answer or a child dialog's result
    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    /// Take the prior result, leaving `None`
    pub fn take_result(&mut self) -> Option<Value> {
        self.result.take()
    }

    pub fn result_as<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        self.result
            .clone()
            .map(serde_json::from_value)
            .transpose()
            .map_err(Into::into)
    }

    pub fn values(&self) -> &Map<String, Value> {
        self.values
    }

    pub fn set_value(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    /// Typed scratch value; a missing key is an error
    pub fn value_as<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let value = self.values.get(key).cloned().ok_or_else(|| {
            CleanBuddyError::InvalidInput(format!("Missing dialog value '{}'", key))
        })?;
        Ok(serde_json::from_value(value)?)
    }

    /// Options the dialog was begun with
    pub fn options(&self) -> Option<&Value> {
        self.options
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }
}

/// A single waterfall step
pub type WaterfallStep = Box<dyn Fn(&mut StepContext<'_>) -> Result<StepAction> + Send + Sync>;

/// An ordered sequence of steps with its prompt units
pub struct WaterfallDialog {
    id: String,
    steps: Vec<WaterfallStep>,
    prompts: HashMap<String, Prompt>,
}

impl WaterfallDialog {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            steps: Vec::new(),
            prompts: HashMap::new(),
        }
    }

    /// Append a step
    pub fn add_step<F>(mut self, step: F) -> Self
    where
        F: Fn(&mut StepContext<'_>) -> Result<StepAction> + Send + Sync + 'static,
    {
        self.steps.push(Box::new(step));
        self
    }

    /// Register a prompt unit; names are unique per dialog
    pub fn add_prompt(mut self, prompt: Prompt) -> Result<Self> {
        if self.prompts.contains_key(prompt.name()) {
            return Err(CleanBuddyError::DuplicatePrompt {
                dialog: self.id.clone(),
                prompt: prompt.name().to_string(),
            });
        }
        self.prompts.insert(prompt.name().to_string(), prompt);
        Ok(self)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn prompt(&self, name: &str) -> Result<&Prompt> {
        self.prompts.get(name).ok_or_else(|| CleanBuddyError::UnknownPrompt {
            dialog: self.id.clone(),
            prompt: name.to_string(),
        })
    }

    /// Run from the first step
    pub(crate) fn begin(&self, turn: &mut TurnContext, instance: &mut DialogInstance) -> Result<StepOutcome> {
        log_dialog_event(&turn.conversation().conversation_id, &self.id, 0, "begin");
        self.run_steps(turn, instance, 0, None)
    }

    /// Deliver the turn's message to the outstanding prompt
    pub(crate) fn continue_dialog(
        &self,
        turn: &mut TurnContext,
        instance: &mut DialogInstance,
    ) -> Result<StepOutcome> {
        let Some(mut pending) = instance.pending_prompt.take() else {
            // no prompt outstanding, the raw text answers the current step
            let text = turn.activity().trimmed_text().map(|text| Value::String(text.to_string()));
            let next = instance.step_index + 1;
            return self.run_steps(turn, instance, next, text);
        };

        let prompt = self.prompt(&pending.unit)?;
        pending.attempts += 1;
        let recognized = prompt.recognize(turn.activity(), &pending.options);

        match prompt.validate(recognized) {
            Validation::Accepted(value) => {
                log_dialog_event(
                    &turn.conversation().conversation_id,
                    &self.id,
                    instance.step_index,
                    "answered",
                );
                let next = instance.step_index + 1;
                self.run_steps(turn, instance, next, Some(value))
            }
            Validation::Rejected => {
                log_validation_rejected(
                    &turn.conversation().conversation_id,
                    &self.id,
                    &pending.unit,
                    pending.attempts,
                );
                prompt.reprompt(turn, &pending.options);
                instance.pending_prompt = Some(pending);
                Ok(StepOutcome::Waiting)
            }
        }
    }

    /// Resume after a child dialog ended with `result`
    pub(crate) fn resume(
        &self,
        turn: &mut TurnContext,
        instance: &mut DialogInstance,
        result: Option<Value>,
    ) -> Result<StepOutcome> {
        log_dialog_event(&turn.conversation().conversation_id, &self.id, instance.step_index, "resume");
        let next = instance.step_index + 1;
        self.run_steps(turn, instance, next, result)
    }

    fn run_steps(
        &self,
        turn: &mut TurnContext,
        instance: &mut DialogInstance,
        mut index: usize,
        mut prior: Option<Value>,
    ) -> Result<StepOutcome> {
        loop {
            let Some(step) = self.steps.get(index) else {
                return Ok(StepOutcome::Complete(prior));
            };
            instance.step_index = index;

            let action = {
                let mut ctx = StepContext {
                    turn: &mut *turn,
                    values: &mut instance.values,
                    options: instance.options.as_ref(),
                    result: prior.take(),
                    step_index: index,
                };
                step(&mut ctx)?
            };

            match action {
                StepAction::Prompt { unit, options } => {
                    let prompt = self.prompt(&unit)?;
                    prompt.ask(turn, &options);
                    instance.pending_prompt = Some(PendingPrompt::new(unit, options));
                    log_dialog_event(&turn.conversation().conversation_id, &self.id, index, "prompt");
                    return Ok(StepOutcome::Waiting);
                }
                StepAction::Continue(value) => {
                    index += 1;
                    prior = value;
                }
                StepAction::BeginDialog { dialog_id, options } => {
                    return Ok(StepOutcome::BeginChild { dialog_id, options });
                }
                StepAction::End(value) => {
                    log_dialog_event(&turn.conversation().conversation_id, &self.id, index, "end");
                    return Ok(StepOutcome::Complete(value));
                }
            }
        }
    }
}

impl std::fmt::Debug for WaterfallDialog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaterfallDialog")
            .field("id", &self.id)
            .field("steps", &self.steps.len())
            .field("prompts", &self.prompts.keys().collect::<Vec<_>>())
            .finish()
    }
}
