//! Dialog stack manager
//!
//! [`DialogSet`] is the registry of dialogs known to the bot. A
//! [`DialogContext`] binds that registry to one turn and one conversation's
//! [`DialogStack`], and implements begin, continue, end, replace and
//! cancel over it. Child results flow back to the parent within the same
//! turn; the stack is written back to state by the caller.

use std::collections::HashMap;
use std::sync::Arc;
use serde_json::Value;
use crate::state::TurnContext;
use crate::utils::errors::{CleanBuddyError, Result};
use crate::utils::logging::log_dialog_event;
use super::instance::{DialogInstance, DialogStack};
use super::waterfall::{StepOutcome, WaterfallDialog};

/// Registry of dialogs by id
#[derive(Debug, Clone, Default)]
pub struct DialogSet {
    dialogs: HashMap<String, Arc<WaterfallDialog>>,
}

impl DialogSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a dialog; ids are unique
    pub fn add(&mut self, dialog: WaterfallDialog) -> Result<()> {
        if self.dialogs.contains_key(dialog.id()) {
            return Err(CleanBuddyError::DuplicateDialog(dialog.id().to_string()));
        }
        self.dialogs.insert(dialog.id().to_string(), Arc::new(dialog));
        Ok(())
    }

    pub fn find(&self, dialog_id: &str) -> Result<&WaterfallDialog> {
        self.dialogs
            .get(dialog_id)
            .map(Arc::as_ref)
            .ok_or_else(|| CleanBuddyError::UnknownDialog(dialog_id.to_string()))
    }

    pub fn contains(&self, dialog_id: &str) -> bool {
        self.dialogs.contains_key(dialog_id)
    }
}

/// Outcome status of a dialog turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogTurnStatus {
    /// No dialog was running
    Empty,
    /// A dialog is waiting for the next message
    Waiting,
    /// The outermost dialog finished this turn
    Complete,
    /// The stack was cleared
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DialogTurnResult {
    pub status: DialogTurnStatus,
    pub result: Option<Value>,
}

impl DialogTurnResult {
    fn new(status: DialogTurnStatus) -> Self {
        Self { status, result: None }
    }
}

/// Dialog operations for one turn
pub struct DialogContext<'a> {
    dialogs: &'a DialogSet,
    turn: &'a mut TurnContext,
    stack: &'a mut DialogStack,
}

impl<'a> DialogContext<'a> {
    pub fn new(dialogs: &'a DialogSet, turn: &'a mut TurnContext, stack: &'a mut DialogStack) -> Self {
        Self { dialogs, turn, stack }
    }

    pub fn is_active(&self) -> bool {
        !self.stack.is_empty()
    }

    /// Id of the dialog receiving the next message
    pub fn active_dialog_id(&self) -> Option<&str> {
        self.stack.active().map(|instance| instance.dialog_id.as_str())
    }

    pub fn turn(&mut self) -> &mut TurnContext {
        self.turn
    }

    /// Push a dialog and run its first step
    pub fn begin_dialog(&mut self, dialog_id: &str, options: Option<Value>) -> Result<DialogTurnResult> {
        let outcome = self.push_and_begin(dialog_id, options)?;
        self.drive(outcome)
    }

    /// Deliver the turn's message to the active dialog
    pub fn continue_dialog(&mut self) -> Result<DialogTurnResult> {
        let dialogs = self.dialogs;
        let Some(instance) = self.stack.active_mut() else {
            return Ok(DialogTurnResult::new(DialogTurnStatus::Empty));
        };

        let outcome = dialogs
            .find(&instance.dialog_id)?
            .continue_dialog(self.turn, instance)?;
        self.drive(outcome)
    }

    /// Ask the active dialog's outstanding question again
    pub fn reprompt_dialog(&mut self) -> Result<DialogTurnResult> {
        let dialogs = self.dialogs;
        let Some(instance) = self.stack.active() else {
            return Ok(DialogTurnResult::new(DialogTurnStatus::Empty));
        };

        if let Some(pending) = &instance.pending_prompt {
            dialogs
                .find(&instance.dialog_id)?
                .prompt(&pending.unit)?
                .ask(self.turn, &pending.options);
        }
        Ok(DialogTurnResult::new(DialogTurnStatus::Waiting))
    }

    /// Pop the active dialog and hand `result` to its parent
    pub fn end_dialog(&mut self, result: Option<Value>) -> Result<DialogTurnResult> {
        if self.stack.is_empty() {
            return Ok(DialogTurnResult::new(DialogTurnStatus::Empty));
        }
        self.drive(StepOutcome::Complete(result))
    }

    /// Swap the active dialog for another without resuming the parent
    pub fn replace_dialog(&mut self, dialog_id: &str, options: Option<Value>) -> Result<DialogTurnResult> {
        // look the new dialog up before touching the stack
        self.dialogs.find(dialog_id)?;
        if let Some(replaced) = self.stack.pop() {
            log_dialog_event(
                &self.turn.conversation().conversation_id,
                &replaced.dialog_id,
                replaced.step_index,
                "replaced",
            );
        }
        self.begin_dialog(dialog_id, options)
    }

    /// Clear the whole stack
    pub fn cancel_all_dialogs(&mut self) -> Result<DialogTurnResult> {
        if self.stack.is_empty() {
            return Ok(DialogTurnResult::new(DialogTurnStatus::Empty));
        }
        for instance in self.stack.iter() {
            log_dialog_event(
                &self.turn.conversation().conversation_id,
                &instance.dialog_id,
                instance.step_index,
                "cancelled",
            );
        }
        self.stack.clear();
        Ok(DialogTurnResult::new(DialogTurnStatus::Cancelled))
    }

    fn push_and_begin(&mut self, dialog_id: &str, options: Option<Value>) -> Result<StepOutcome> {
        let dialog = self.dialogs.find(dialog_id)?;
        self.stack.push(DialogInstance::new(dialog_id, options));
        let instance = active_instance(self.stack)?;
        dialog.begin(self.turn, instance)
    }

    /// Apply sequencer outcomes until a dialog waits or the stack empties
    fn drive(&mut self, mut outcome: StepOutcome) -> Result<DialogTurnResult> {
        let dialogs = self.dialogs;
        loop {
            outcome = match outcome {
                StepOutcome::Waiting => {
                    return Ok(DialogTurnResult::new(DialogTurnStatus::Waiting));
                }
                StepOutcome::BeginChild { dialog_id, options } => {
                    self.push_and_begin(&dialog_id, options)?
                }
                StepOutcome::Complete(result) => {
                    self.stack.pop();
                    let Some(parent) = self.stack.active_mut() else {
                        return Ok(DialogTurnResult {
                            status: DialogTurnStatus::Complete,
                            result,
                        });
                    };
                    dialogs
                        .find(&parent.dialog_id)?
                        .resume(self.turn, parent, result)?
                }
            };
        }
    }
}

fn active_instance(stack: &mut DialogStack) -> Result<&mut DialogInstance> {
    stack
        .active_mut()
        .ok_or_else(|| CleanBuddyError::InvalidStateTransition {
            from: "empty stack".to_string(),
            to: "active dialog".to_string(),
        })
}
