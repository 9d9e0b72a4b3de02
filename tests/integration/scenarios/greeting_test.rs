//! Greeting scenario integration tests
//!
//! These tests verify the scripted greeting path that runs while no dialog
//! is active.

use CleanBuddy::models::{ConversationFlags, UserProfile};
use CleanBuddy::turn::{GreetingState, TurnRoute};
use crate::helpers::*;
use crate::integration::setup_integration_test;

#[tokio::test]
async fn test_empty_profile_is_asked_for_name() -> TestResult {
    let ctx = setup_integration_test();

    let outcome = ctx.say("Hi").await?;

    assert_eq!(outcome.route, TurnRoute::Greeting);
    assert_eq!(outcome.greeting_state, Some(GreetingState::AwaitingName));
    assert_eq!(
        ctx.transport.texts(),
        vec!["Hello, my name is Stacy, a cleaning assistant bot. May I have your name, please?"]
    );
    assert_eq!(ctx.flags().await?, Some(ConversationFlags { prompted_for_name: true }));
    Ok(())
}

#[tokio::test]
async fn test_name_reply_is_stored_and_acknowledged() -> TestResult {
    let ctx = setup_integration_test();
    ctx.say("Hi").await?;
    ctx.transport.clear();

    let outcome = ctx.say("  Dana  ").await?;

    assert_eq!(outcome.greeting_state, Some(GreetingState::Idle));
    assert_eq!(
        ctx.transport.texts(),
        vec!["Thanks, Dana. My name is Stacy, a cleaning assistant bot. Would you like to set up a cleaning appointment?"]
    );
    let profile = ctx.profile().await?.unwrap_or_default();
    assert_eq!(profile.name.as_deref(), Some("Dana"));
    assert_eq!(ctx.flags().await?, Some(ConversationFlags { prompted_for_name: false }));
    Ok(())
}

#[tokio::test]
async fn test_known_name_gets_personal_greeting() -> TestResult {
    let ctx = setup_integration_test();
    ctx.say("Hi").await?;
    ctx.say("Dana").await?;
    ctx.transport.clear();
    let profile_before = ctx.profile().await?;

    ctx.say("hello again").await?;

    assert_eq!(
        ctx.transport.texts(),
        vec!["Hi, Dana. My name is Stacy, a cleaning assistant bot. Would you like to set up a cleaning appointment?"]
    );
    assert_eq!(ctx.profile().await?, profile_before);
    Ok(())
}

#[tokio::test]
async fn test_conversation_start_runs_greeting() -> TestResult {
    let ctx = setup_integration_test();

    let outcome = ctx.start().await?;

    assert_eq!(outcome.route, TurnRoute::Greeting);
    assert!(ctx.transport.texts()[0].ends_with("May I have your name, please?"));

    // an empty reply to the name question asks again
    ctx.transport.clear();
    ctx.start().await?;
    assert!(ctx.transport.texts()[0].ends_with("May I have your name, please?"));
    assert_eq!(ctx.flags().await?, Some(ConversationFlags { prompted_for_name: true }));
    assert_eq!(ctx.profile().await?.and_then(|p: UserProfile| p.name), None);
    Ok(())
}

#[tokio::test]
async fn test_users_in_different_conversations_are_independent() -> TestResult {
    let ctx = setup_integration_test();
    let other = create_test_conversation("555", "777");

    ctx.say("Hi").await?;
    ctx.send(CleanBuddy::models::Activity::message(other.clone(), "Hi")).await?;
    ctx.send(CleanBuddy::models::Activity::message(other, "Riley")).await?;

    // the first conversation is still waiting for its name
    assert_eq!(ctx.flags().await?, Some(ConversationFlags { prompted_for_name: true }));
    assert_eq!(ctx.profile().await?.and_then(|p| p.name), None);
    Ok(())
}
