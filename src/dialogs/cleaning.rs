//! Cleaning appointment dialog
//!
//! Collects a description, a cleaning time within business hours, a phone
//! number and the type of clean, then writes all four to the user profile in
//! the summary step and closes with the contact number.

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use regex::Regex;
use serde_json::Value;
use crate::config::AppointmentConfig;
use crate::models::{Appointment, UserProfile};
use crate::services::recognizers::to_choices;
use crate::state::StatePropertyAccessor;
use crate::utils::errors::{CleanBuddyError, Result};
use crate::utils::helpers::{format_appointment_time, parse_clock_time};
use super::prompts::{Prompt, PromptOptions, Recognized, Validation};
use super::waterfall::{StepAction, StepContext, WaterfallDialog};

pub const CLEANING_DIALOG: &str = "CleaningDialog";

const PHONE_PATTERN: &str = r"^(\+\d{1,2}\s)?\(?\d{3}\)?[\s.-]?\d{3}[\s.-]?\d{4}$";

const DESCRIPTION: &str = "description";
const CLEANING_TIME: &str = "cleaningTime";
const PHONE_NUMBER: &str = "phoneNumber";
const SERVICE_TYPE: &str = "serviceType";
const SUMMARY: &str = "summary";

/// Whether a time of day falls within `[opening, closing]`
pub fn within_hours(time: NaiveDateTime, opening: NaiveTime, closing: NaiveTime) -> bool {
    let time_of_day = time.time().with_nanosecond(0).unwrap_or(time.time());
    time_of_day >= opening && time_of_day <= closing
}

fn clock_time(value: &str, field: &str) -> Result<NaiveTime> {
    parse_clock_time(value).ok_or_else(|| {
        CleanBuddyError::Config(format!("Invalid appointment {}: '{}'", field, value))
    })
}

fn appointment_from(ctx: &StepContext<'_>) -> Result<Appointment> {
    Ok(Appointment {
        description: ctx.value_as(DESCRIPTION)?,
        cleaning_time: ctx.value_as(CLEANING_TIME)?,
        phone_number: ctx.value_as(PHONE_NUMBER)?,
        service_type: ctx.value_as(SERVICE_TYPE)?,
    })
}

/// Build the appointment dialog
pub fn cleaning_dialog(
    config: &AppointmentConfig,
    profile: StatePropertyAccessor<UserProfile>,
) -> Result<WaterfallDialog> {
    let opening = clock_time(&config.opening_time, "opening time")?;
    let closing = clock_time(&config.closing_time, "closing time")?;
    let phone = Regex::new(PHONE_PATTERN)
        .map_err(|e| CleanBuddyError::Config(format!("Invalid phone pattern: {}", e)))?;
    let service_types = config.service_types.clone();
    let contact_phone = config.contact_phone.clone();

    let time_prompt = Prompt::date_time(CLEANING_TIME).with_validator(move |recognized| {
        match recognized {
            // only the best resolution counts
            Recognized::DateTimes(resolutions) => match resolutions.first() {
                Some(time) if within_hours(*time, opening, closing) => {
                    serde_json::to_value(time).map_or(Validation::Rejected, Validation::Accepted)
                }
                _ => Validation::Rejected,
            },
            _ => Validation::Rejected,
        }
    });

    let phone_prompt = Prompt::text(PHONE_NUMBER).with_validator(move |recognized| match recognized {
        Recognized::Text(text) if phone.is_match(text) => Validation::Accepted(Value::String(text.clone())),
        _ => Validation::Rejected,
    });

    let service_prompt = Prompt::choice(SERVICE_TYPE).with_validator(|recognized| match recognized {
        Recognized::Choice(found) => Validation::Accepted(Value::String(found.value.clone())),
        _ => Validation::Rejected,
    });

    WaterfallDialog::new(CLEANING_DIALOG)
        .add_step(|_| {
            Ok(StepAction::prompt(
                DESCRIPTION,
                PromptOptions::new("Please enter a description of anything specifically that needs cleaning."),
            ))
        })
        .add_step(|ctx| {
            let description = ctx.take_result().unwrap_or(Value::Null);
            ctx.set_value(DESCRIPTION, description);
            Ok(StepAction::prompt(
                CLEANING_TIME,
                PromptOptions::new(
                    "Please enter a date (MM/DD/YYYY) and time that you would like a cleaning to be scheduled.",
                )
                .with_retry("The value entered must be between the hours of 9 am and 5 pm."),
            ))
        })
        .add_step(|ctx| {
            let cleaning_time = ctx.take_result().unwrap_or(Value::Null);
            ctx.set_value(CLEANING_TIME, cleaning_time);
            Ok(StepAction::prompt(
                PHONE_NUMBER,
                PromptOptions::new("Please enter in a phone number that we can call you at")
                    .with_retry("Please enter a valid phone number"),
            ))
        })
        .add_step(move |ctx| {
            let phone_number = ctx.take_result().unwrap_or(Value::Null);
            ctx.set_value(PHONE_NUMBER, phone_number);
            Ok(StepAction::prompt(
                SERVICE_TYPE,
                PromptOptions::new("Please choose the type of clean you want.")
                    .with_choices(to_choices(&service_types)),
            ))
        })
        .add_step(move |ctx| {
            let service_type = ctx.take_result().unwrap_or(Value::Null);
            ctx.set_value(SERVICE_TYPE, service_type);

            let appointment = appointment_from(ctx)?;
            let mut current = profile.get(ctx.turn, UserProfile::default)?;
            current.apply_appointment(&appointment);
            profile.set(ctx.turn, &current)?;

            ctx.turn.send_text("Here is a summary of your preferred appointment:");
            ctx.turn.send_text(format!("Description: {}", appointment.description));
            ctx.turn.send_text(format!(
                "Cleaning Time: {}",
                format_appointment_time(appointment.cleaning_time)
            ));
            ctx.turn.send_text(format!("Phone Number: {}", appointment.phone_number));
            ctx.turn.send_text(format!("Type of clean: {}", appointment.service_type));

            Ok(StepAction::prompt(SUMMARY, PromptOptions::new("Does the information look correct?")))
        })
        .add_step(move |ctx| {
            // any answer to the confirmation proceeds
            let appointment = appointment_from(ctx)?;
            ctx.turn.send_text(format!(
                "Great, we will contact you within two business days to confirm appointment. \
                 If you need to call, you can reach us at, {}. Thank you and have a wonderful day.",
                contact_phone
            ));
            Ok(StepAction::End(Some(serde_json::to_value(&appointment)?)))
        })
        .add_prompt(Prompt::text(DESCRIPTION))?
        .add_prompt(time_prompt)?
        .add_prompt(phone_prompt)?
        .add_prompt(service_prompt)?
        .add_prompt(Prompt::text(SUMMARY))
}
