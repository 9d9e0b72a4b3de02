//! Dialog runtime and the bot's dialogs
//!
//! The runtime is split into prompt units, the waterfall sequencer, the
//! persisted instance records and the stack manager. The concrete dialogs
//! are plain builder functions over that runtime.

pub mod cleaning;
pub mod greeting;
pub mod instance;
pub mod main_dialog;
pub mod prompts;
pub mod stack;
pub mod waterfall;

pub use cleaning::CLEANING_DIALOG;
pub use greeting::GREETING_DIALOG;
pub use instance::{DialogInstance, DialogStack};
pub use main_dialog::MAIN_DIALOG;
pub use prompts::{PendingPrompt, Prompt, PromptKind, PromptOptions, Recognized, Validation, Validator};
pub use stack::{DialogContext, DialogSet, DialogTurnResult, DialogTurnStatus};
pub use waterfall::{StepAction, StepContext, WaterfallDialog, WaterfallStep};

use crate::config::Settings;
use crate::models::UserProfile;
use crate::state::{StatePropertyAccessor, StateScope, USER_PROFILE};
use crate::utils::errors::Result;

/// Register every dialog the bot runs
pub fn build_dialog_set(settings: &Settings) -> Result<DialogSet> {
    let profile: StatePropertyAccessor<UserProfile> = StatePropertyAccessor::new(StateScope::User, USER_PROFILE);

    let mut dialogs = DialogSet::new();
    dialogs.add(greeting::greeting_dialog(&settings.bot.persona, profile.clone())?)?;
    dialogs.add(cleaning::cleaning_dialog(&settings.appointment, profile)?)?;
    dialogs.add(main_dialog::main_dialog()?)?;
    Ok(dialogs)
}
