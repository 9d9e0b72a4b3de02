//! Dialog stack integration tests
//!
//! Cancellation, restarts, persistence failures and resumption from
//! persisted state alone.

use std::collections::HashMap;
use serde_json::json;
use CleanBuddy::dialogs::{DialogInstance, DialogStack, DialogTurnStatus, PendingPrompt, PromptOptions, CLEANING_DIALOG};
use CleanBuddy::state::{StateScope, DIALOG_STACK};
use CleanBuddy::turn::TurnRoute;
use CleanBuddy::CleanBuddyError;
use crate::helpers::*;
use crate::integration::setup_integration_test;

#[tokio::test]
async fn test_cancel_clears_stack() -> TestResult {
    let ctx = setup_integration_test();
    ctx.begin_appointment().await?;
    ctx.say("Dana").await?;
    ctx.transport.clear();

    let outcome = ctx.cancel().await?;

    assert_eq!(outcome.dialog_status, Some(DialogTurnStatus::Cancelled));
    assert_eq!(ctx.transport.texts(), vec!["Okay, I've cancelled your appointment request."]);
    assert!(ctx.dialog_stack().await?.is_empty());

    ctx.transport.clear();
    assert_eq!(ctx.cancel().await?.dialog_status, Some(DialogTurnStatus::Empty));
    assert_eq!(ctx.transport.texts(), vec!["There is nothing to cancel."]);
    Ok(())
}

#[tokio::test]
async fn test_restart_repeats_open_question() -> TestResult {
    let ctx = setup_integration_test();
    ctx.begin_appointment().await?;
    ctx.say("Dana").await?;
    ctx.say("Windows").await?;
    ctx.transport.clear();

    let outcome = ctx.start().await?;

    assert_eq!(outcome.route, TurnRoute::Dialog);
    assert_eq!(
        ctx.transport.texts(),
        vec!["Please enter a date (MM/DD/YYYY) and time that you would like a cleaning to be scheduled."]
    );
    assert_eq!(ctx.dialog_stack().await?.active().map(|i| i.step_index), Some(1));
    Ok(())
}

#[tokio::test]
async fn test_begin_discards_running_dialog() -> TestResult {
    let ctx = setup_integration_test();
    ctx.begin_appointment().await?;
    ctx.say("Dana").await?;
    ctx.say("Windows").await?;

    ctx.begin_appointment().await?;

    let stack = ctx.dialog_stack().await?;
    assert_eq!(stack.len(), 2);
    let cleaning = stack.active().expect("cleaning dialog");
    assert_eq!(cleaning.dialog_id, CLEANING_DIALOG);
    assert_eq!(cleaning.step_index, 0);
    assert!(cleaning.values.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_failed_save_delivers_nothing_and_keeps_state() -> TestResult {
    let ctx = setup_integration_test();
    ctx.say("Hi").await?;
    let before = ctx.storage.snapshot().await;
    ctx.transport.clear();

    ctx.storage.fail_writes(true);
    let result = ctx.dispatcher.on_turn(create_test_message("Dana")).await;

    assert!(matches!(result, Err(CleanBuddyError::Io(_))));
    assert!(ctx.transport.texts().is_empty());
    assert_eq!(ctx.storage.snapshot().await, before);

    // the same answer succeeds once storage recovers
    ctx.storage.fail_writes(false);
    ctx.say("Dana").await?;
    assert_eq!(ctx.profile().await?.and_then(|p| p.name).as_deref(), Some("Dana"));
    Ok(())
}

#[tokio::test]
async fn test_state_saved_before_delivery() -> TestResult {
    let ctx = setup_integration_test();
    ctx.transport.fail_sends(true);

    assert!(ctx.say("Hi").await.is_err());

    // the prompt was lost but the turn's state is in place
    assert_eq!(ctx.flags().await?.map(|f| f.prompted_for_name), Some(true));
    Ok(())
}

#[tokio::test]
async fn test_resumes_from_persisted_state_alone() -> TestResult {
    let mut instance = DialogInstance::new(CLEANING_DIALOG, None);
    instance.step_index = 2;
    instance.values.insert("description".to_string(), json!("Garage"));
    instance.values.insert("cleaningTime".to_string(), json!("2024-05-01T11:00:00"));
    instance.pending_prompt = Some(PendingPrompt::new(
        "phoneNumber",
        PromptOptions::new("Please enter in a phone number that we can call you at")
            .with_retry("Please enter a valid phone number"),
    ));
    let mut stack = DialogStack::new();
    stack.push(instance);

    let key = StateScope::Conversation.storage_key(&test_conversation());
    let entries = HashMap::from([(key, json!({ DIALOG_STACK: serde_json::to_value(&stack)? }))]);
    let ctx = TestContext::with_storage(RecordingStorage::with_entries(entries));

    ctx.say("(406) 555-0100").await?;

    let reply = ctx.transport.replies().pop().expect("choice prompt");
    assert_eq!(reply.text, "Please choose the type of clean you want.");
    let stack = ctx.dialog_stack().await?;
    let cleaning = stack.active().expect("still running");
    assert_eq!(cleaning.step_index, 3);
    assert_eq!(cleaning.values["phoneNumber"], json!("(406) 555-0100"));
    Ok(())
}
