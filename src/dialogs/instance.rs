//! Persisted dialog records
//!
//! A conversation's dialog stack is stored as plain data under the
//! `DialogStack` property of conversation state. Nothing about a running
//! dialog lives outside these records between turns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use super::prompts::PendingPrompt;

/// One running dialog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogInstance {
    pub dialog_id: String,
    /// Step whose prompt or child dialog is outstanding
    pub step_index: usize,
    /// Step-local scratch values
    #[serde(default)]
    pub values: Map<String, Value>,
    /// Options the dialog was begun with
    #[serde(default)]
    pub options: Option<Value>,
    #[serde(default)]
    pub pending_prompt: Option<PendingPrompt>,
    pub started_at: DateTime<Utc>,
}

impl DialogInstance {
    pub fn new(dialog_id: impl Into<String>, options: Option<Value>) -> Self {
        Self {
            dialog_id: dialog_id.into(),
            step_index: 0,
            values: Map::new(),
            options,
            pending_prompt: None,
            started_at: Utc::now(),
        }
    }
}

/// Running dialogs of a conversation, innermost last
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DialogStack {
    instances: Vec<DialogInstance>,
}

impl DialogStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// The dialog receiving the next message
    pub fn active(&self) -> Option<&DialogInstance> {
        self.instances.last()
    }

    pub fn active_mut(&mut self) -> Option<&mut DialogInstance> {
        self.instances.last_mut()
    }

    pub fn push(&mut self, instance: DialogInstance) {
        self.instances.push(instance);
    }

    pub fn pop(&mut self) -> Option<DialogInstance> {
        self.instances.pop()
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }

    /// Outermost first
    pub fn iter(&self) -> impl Iterator<Item = &DialogInstance> {
        self.instances.iter()
    }
}
