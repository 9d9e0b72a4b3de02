//! Top-level dialog: greeting followed by the appointment flow

use crate::utils::errors::Result;
use super::cleaning::CLEANING_DIALOG;
use super::greeting::GREETING_DIALOG;
use super::waterfall::{StepAction, WaterfallDialog};

pub const MAIN_DIALOG: &str = "MainDialog";

pub fn main_dialog() -> Result<WaterfallDialog> {
    Ok(WaterfallDialog::new(MAIN_DIALOG)
        .add_step(|_| Ok(StepAction::begin_dialog(GREETING_DIALOG)))
        .add_step(|ctx| {
            if let Some(name) = ctx.take_result() {
                ctx.set_value("name", name);
            }
            Ok(StepAction::begin_dialog(CLEANING_DIALOG))
        })
        .add_step(|ctx| Ok(StepAction::End(ctx.take_result()))))
}
