//! Per-conversation coordination flags

use serde::{Deserialize, Serialize};

/// Transient flags for the scripted greeting path
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationFlags {
    pub prompted_for_name: bool,
}
