//! Integration tests module
//!
//! This module contains the integration tests for the CleanBuddy turn
//! dispatcher, organized by scenario.

pub mod scenarios;

use std::sync::Once;
use crate::helpers::{AppointmentAnswers, TestContext, TestResult};

static INIT: Once = Once::new();

/// Initialize logging for tests (called once)
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    });
}

/// Common setup function for integration tests
pub fn setup_integration_test() -> TestContext {
    init_test_logging();
    TestContext::new()
}

/// Drive a conversation from `/appointment` to the confirmation prompt
///
/// The name prompt is answered with `name`.
pub async fn run_to_confirmation(ctx: &TestContext, name: &str, answers: &AppointmentAnswers) -> TestResult {
    ctx.begin_appointment().await?;
    ctx.say(name).await?;
    ctx.say(answers.description).await?;
    ctx.say(answers.cleaning_time).await?;
    ctx.say(answers.phone_number).await?;
    ctx.say(answers.service_type).await?;
    Ok(())
}
