//! Appointment scenario integration tests
//!
//! These tests walk the cleaning appointment dialog through the turn
//! dispatcher, from `/appointment` to the closing message.

use serde_json::json;
use CleanBuddy::dialogs::{DialogTurnStatus, CLEANING_DIALOG, MAIN_DIALOG};
use CleanBuddy::state::{StateScope, USER_PROFILE};
use CleanBuddy::turn::TurnRoute;
use crate::helpers::*;
use crate::integration::{run_to_confirmation, setup_integration_test};

#[tokio::test]
async fn test_appointment_starts_with_name_question() -> TestResult {
    let ctx = setup_integration_test();

    let outcome = ctx.begin_appointment().await?;

    assert_eq!(outcome.route, TurnRoute::Command);
    assert_eq!(outcome.dialog_status, Some(DialogTurnStatus::Waiting));
    assert_eq!(ctx.transport.texts(), vec!["May I have your name, please?"]);

    let stack = ctx.dialog_stack().await?;
    let ids: Vec<&str> = stack.iter().map(|i| i.dialog_id.as_str()).collect();
    assert_eq!(ids, vec![MAIN_DIALOG, "GreetingDialog"]);
    Ok(())
}

#[tokio::test]
async fn test_greeting_result_flows_into_cleaning_dialog() -> TestResult {
    let ctx = setup_integration_test();
    ctx.begin_appointment().await?;
    ctx.transport.clear();

    ctx.say("Dana").await?;

    assert_eq!(
        ctx.transport.texts(),
        vec![
            "Hi Dana. My name is Stacy, a cleaning assistant bot. Let's get your cleaning appointment set up.",
            "Please enter a description of anything specifically that needs cleaning.",
        ]
    );
    let stack = ctx.dialog_stack().await?;
    assert_eq!(stack.len(), 2);
    let main = stack.iter().next().expect("main dialog");
    assert_eq!(main.step_index, 1);
    assert_eq!(main.values["name"], json!("Dana"));
    assert_eq!(stack.active().map(|i| i.dialog_id.as_str()), Some(CLEANING_DIALOG));
    Ok(())
}

#[tokio::test]
async fn test_out_of_hours_time_is_retried() -> TestResult {
    let ctx = setup_integration_test();
    ctx.begin_appointment().await?;
    ctx.say("Dana").await?;
    ctx.say("Windows").await?;
    ctx.transport.clear();

    ctx.send(create_date_time_message("8pm", vec![appointment_at(20, 0)])).await?;

    assert_eq!(
        ctx.transport.texts(),
        vec!["The value entered must be between the hours of 9 am and 5 pm."]
    );
    let stack = ctx.dialog_stack().await?;
    let cleaning = stack.active().expect("cleaning dialog active");
    assert_eq!(cleaning.step_index, 1);
    assert!(!cleaning.values.contains_key("cleaningTime"));
    assert_eq!(cleaning.pending_prompt.as_ref().map(|p| p.attempts), Some(1));

    // unrecognizable input is rejected the same way
    ctx.say("sometime next week").await?;
    let stack = ctx.dialog_stack().await?;
    assert_eq!(stack.active().map(|i| i.step_index), Some(1));
    Ok(())
}

#[tokio::test]
async fn test_invalid_phone_is_retried() -> TestResult {
    let ctx = setup_integration_test();
    ctx.begin_appointment().await?;
    ctx.say("Dana").await?;
    ctx.say("Windows").await?;
    ctx.say("05/01/2024 9:30 am").await?;
    ctx.transport.clear();

    ctx.say("call me maybe").await?;

    assert_eq!(ctx.transport.texts(), vec!["Please enter a valid phone number"]);
    assert_eq!(ctx.dialog_stack().await?.active().map(|i| i.step_index), Some(2));
    Ok(())
}

#[tokio::test]
async fn test_summary_persists_all_fields_before_confirmation() -> TestResult {
    let ctx = setup_integration_test();
    let answers = AppointmentAnswers::default();
    ctx.begin_appointment().await?;
    ctx.say("Dana").await?;
    ctx.say(answers.description).await?;
    ctx.say(answers.cleaning_time).await?;
    ctx.say(answers.phone_number).await?;

    // service type prompt offers the configured choices
    let choice_prompt = ctx.transport.replies().last().cloned().expect("choice prompt");
    assert_eq!(choice_prompt.text, "Please choose the type of clean you want.");
    assert_eq!(choice_prompt.choices, ctx.settings.appointment.service_types);
    assert_eq!(ctx.profile().await?.and_then(|p| p.description), None);
    ctx.transport.clear();

    ctx.send(create_choice_message(answers.service_type)).await?;

    assert_eq!(
        ctx.transport.texts(),
        vec![
            "Here is a summary of your preferred appointment:".to_string(),
            format!("Description: {}", answers.description),
            "Cleaning Time: 05/01/2024 10:00 AM".to_string(),
            format!("Phone Number: {}", answers.phone_number),
            format!("Type of clean: {}", answers.service_type),
            "Does the information look correct?".to_string(),
        ]
    );

    let profile = ctx.profile().await?.expect("profile stored");
    assert_eq!(profile.name.as_deref(), Some("Dana"));
    assert_eq!(profile.description.as_deref(), Some(answers.description));
    assert_eq!(profile.cleaning_time, Some(appointment_at(10, 0)));
    assert_eq!(profile.phone_number.as_deref(), Some(answers.phone_number));
    assert_eq!(profile.service_type.as_deref(), Some(answers.service_type));
    Ok(())
}

#[tokio::test]
async fn test_confirmation_closes_and_returns_appointment() -> TestResult {
    let ctx = setup_integration_test();
    run_to_confirmation(&ctx, "Dana", &AppointmentAnswers::default()).await?;
    ctx.transport.clear();

    let outcome = ctx.say("no, but go ahead").await?;

    assert_eq!(outcome.route, TurnRoute::Dialog);
    assert_eq!(outcome.dialog_status, Some(DialogTurnStatus::Complete));
    assert_eq!(
        ctx.transport.texts(),
        vec![
            "Great, we will contact you within two business days to confirm appointment. \
             If you need to call, you can reach us at, 406-333-2525. Thank you and have a wonderful day."
        ]
    );
    assert!(ctx.dialog_stack().await?.is_empty());

    // back to the greeting path with a known name
    ctx.transport.clear();
    assert_eq!(ctx.say("hello").await?.route, TurnRoute::Greeting);
    assert!(ctx.transport.texts()[0].starts_with("Hi, Dana."));
    Ok(())
}

#[tokio::test]
async fn test_appointment_fields_written_exactly_once() -> TestResult {
    let ctx = setup_integration_test();
    run_to_confirmation(&ctx, "Dana", &AppointmentAnswers::default()).await?;
    ctx.say("yes").await?;

    let user_key = StateScope::User.storage_key(&test_conversation());
    let mut previous = None;
    let mut appointment_writes = 0;
    for batch in ctx.storage.batches() {
        for change in batch.iter().filter(|change| change.key == user_key) {
            let description = change.value[USER_PROFILE]["description"].clone();
            if previous.as_ref() != Some(&description) {
                if !description.is_null() {
                    appointment_writes += 1;
                }
                previous = Some(description);
            }
        }
    }
    assert_eq!(appointment_writes, 1);
    Ok(())
}

#[tokio::test]
async fn test_known_name_skips_straight_to_description() -> TestResult {
    let ctx = setup_integration_test();
    ctx.say("Hi").await?;
    ctx.say("Dana").await?;
    ctx.transport.clear();

    ctx.begin_appointment().await?;

    assert_eq!(
        ctx.transport.texts(),
        vec![
            "Hi Dana. My name is Stacy, a cleaning assistant bot. Let's get your cleaning appointment set up.",
            "Please enter a description of anything specifically that needs cleaning.",
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_choice_by_number() -> TestResult {
    let ctx = setup_integration_test();
    let answers = AppointmentAnswers::default();
    ctx.begin_appointment().await?;
    ctx.say("Dana").await?;
    ctx.say(answers.description).await?;
    ctx.say(answers.cleaning_time).await?;
    ctx.say(answers.phone_number).await?;

    ctx.say("1").await?;

    let profile = ctx.profile().await?.expect("profile stored");
    assert_eq!(profile.service_type.as_deref(), Some("Standard Clean"));
    Ok(())
}

#[tokio::test]
async fn test_unknown_service_type_resends_choices() -> TestResult {
    let ctx = setup_integration_test();
    let answers = AppointmentAnswers::default();
    ctx.begin_appointment().await?;
    ctx.say("Dana").await?;
    ctx.say(answers.description).await?;
    ctx.say(answers.cleaning_time).await?;
    ctx.say(answers.phone_number).await?;
    ctx.transport.clear();

    let outcome = ctx.say("window washing").await?;

    assert_eq!(outcome.dialog_status, Some(DialogTurnStatus::Waiting));
    let replies = ctx.transport.replies();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].text, "Please choose the type of clean you want.");
    assert_eq!(replies[0].choices, ctx.settings.appointment.service_types);

    let stack = ctx.dialog_stack().await?;
    let cleaning = stack.active().expect("cleaning dialog active");
    assert_eq!(cleaning.step_index, 3);
    assert!(!cleaning.values.contains_key("serviceType"));
    assert_eq!(ctx.profile().await?.and_then(|p| p.service_type), None);
    Ok(())
}

#[tokio::test]
async fn test_hour_only_time_at_opening_is_accepted() -> TestResult {
    let ctx = setup_integration_test();
    ctx.begin_appointment().await?;
    ctx.say("Dana").await?;
    ctx.say("Windows").await?;
    ctx.transport.clear();

    ctx.say("05/01/2024 9am").await?;

    assert_eq!(
        ctx.transport.texts(),
        vec!["Please enter in a phone number that we can call you at"]
    );
    let stack = ctx.dialog_stack().await?;
    let cleaning = stack.active().expect("cleaning dialog active");
    assert_eq!(cleaning.step_index, 2);
    assert_eq!(cleaning.values["cleaningTime"], json!("2024-05-01T09:00:00"));
    Ok(())
}
