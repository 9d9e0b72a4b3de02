//! Test context for unified test setup
//!
//! This module provides a unified test context that wires a turn dispatcher
//! to in-memory storage and a recording transport, plus shortcuts for
//! sending turns and inspecting persisted state.

use std::sync::Arc;
use CleanBuddy::config::Settings;
use CleanBuddy::dialogs::{DialogStack, MAIN_DIALOG};
use CleanBuddy::models::{Activity, ConversationFlags, ConversationRef, UserProfile};
use CleanBuddy::state::{read_property, StateScope, StateStorage, CONVERSATION_FLAGS, DIALOG_STACK, USER_PROFILE};
use CleanBuddy::turn::{TurnDispatcher, TurnOutcome};

use super::recording::{RecordingStorage, RecordingTransport};
use super::test_data::{create_conversation_start, create_test_message, test_conversation};

pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Unified test context that manages all test components
pub struct TestContext {
    pub storage: Arc<RecordingStorage>,
    pub transport: Arc<RecordingTransport>,
    pub dispatcher: TurnDispatcher,
    pub settings: Settings,
}

impl TestContext {
    /// Create a new test context with empty state
    pub fn new() -> Self {
        Self::with_storage(RecordingStorage::new())
    }

    /// Create a test context over pre-populated storage
    pub fn with_storage(storage: RecordingStorage) -> Self {
        let settings = Settings::default();
        let storage = Arc::new(storage);
        let transport = Arc::new(RecordingTransport::new());

        let dispatcher = TurnDispatcher::builder()
            .storage(storage.clone())
            .transport(transport.clone())
            .settings(settings.clone())
            .build()
            .expect("dispatcher should build with storage and transport");

        Self {
            storage,
            transport,
            dispatcher,
            settings,
        }
    }

    /// Send a text message in the default conversation
    pub async fn say(&self, text: &str) -> TestResult<TurnOutcome> {
        Ok(self.dispatcher.on_turn(create_test_message(text)).await?)
    }

    pub async fn send(&self, activity: Activity) -> TestResult<TurnOutcome> {
        Ok(self.dispatcher.on_turn(activity).await?)
    }

    pub async fn start(&self) -> TestResult<TurnOutcome> {
        Ok(self.dispatcher.on_turn(create_conversation_start()).await?)
    }

    /// Begin the top-level appointment dialog
    pub async fn begin_appointment(&self) -> TestResult<TurnOutcome> {
        Ok(self
            .dispatcher
            .begin_dialog(create_test_message("/appointment"), MAIN_DIALOG)
            .await?)
    }

    pub async fn cancel(&self) -> TestResult<TurnOutcome> {
        Ok(self.dispatcher.cancel_dialogs(create_test_message("/cancel")).await?)
    }

    pub async fn profile(&self) -> TestResult<Option<UserProfile>> {
        let key = StateScope::User.storage_key(&test_conversation());
        Ok(read_property(self.storage.as_ref(), &key, USER_PROFILE).await?)
    }

    pub async fn flags(&self) -> TestResult<Option<ConversationFlags>> {
        let key = StateScope::Conversation.storage_key(&test_conversation());
        Ok(read_property(self.storage.as_ref(), &key, CONVERSATION_FLAGS).await?)
    }

    pub async fn dialog_stack(&self) -> TestResult<DialogStack> {
        self.dialog_stack_for(&test_conversation()).await
    }

    pub async fn dialog_stack_for(&self, conversation: &ConversationRef) -> TestResult<DialogStack> {
        let key = StateScope::Conversation.storage_key(conversation);
        let storage: &dyn StateStorage = self.storage.as_ref();
        Ok(read_property(storage, &key, DIALOG_STACK).await?.unwrap_or_default())
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
