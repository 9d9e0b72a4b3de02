//! Greeting dialog

use serde_json::Value;
use crate::models::UserProfile;
use crate::state::StatePropertyAccessor;
use crate::utils::errors::Result;
use super::prompts::{Prompt, PromptOptions};
use super::waterfall::{StepAction, WaterfallDialog};

pub const GREETING_DIALOG: &str = "GreetingDialog";

const NAME: &str = "name";

/// Ask for the user's name unless it is already known, then greet
pub fn greeting_dialog(persona: &str, profile: StatePropertyAccessor<UserProfile>) -> Result<WaterfallDialog> {
    let persona = persona.to_string();
    let ask_profile = profile.clone();

    WaterfallDialog::new(GREETING_DIALOG)
        .add_step(move |ctx| {
            let current = ask_profile.get(ctx.turn, UserProfile::default)?;
            if current.known_name().is_some() {
                return Ok(StepAction::Continue(None));
            }
            Ok(StepAction::prompt(NAME, PromptOptions::new("May I have your name, please?")))
        })
        .add_step(move |ctx| {
            let mut current = profile.get(ctx.turn, UserProfile::default)?;
            let name = match current.known_name() {
                Some(name) => name.to_string(),
                None => {
                    let name: String = ctx.result_as()?.unwrap_or_default();
                    current.name = Some(name.clone());
                    profile.set(ctx.turn, &current)?;
                    name
                }
            };

            ctx.turn.send_text(format!(
                "Hi {}. My name is {}, a cleaning assistant bot. Let's get your cleaning appointment set up.",
                name, persona
            ));
            Ok(StepAction::End(Some(Value::String(name))))
        })
        .add_prompt(Prompt::text(NAME))
}
