//! Turn dispatcher
//!
//! Every inbound activity is one turn: load both state scopes, run the
//! synchronous turn logic, save every change in one batch, then hand the
//! queued replies to the transport. Nothing is delivered if the save fails.

pub mod greeting;

use std::sync::Arc;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;
use crate::config::Settings;
use crate::dialogs::{build_dialog_set, DialogContext, DialogSet, DialogStack, DialogTurnStatus};
use crate::models::{Activity, ActivityKind, ConversationFlags, Reply, UserProfile};
use crate::services::Transport;
use crate::state::{
    StateManager, StatePropertyAccessor, StateScope, StateStorage, TurnContext, CONVERSATION_FLAGS,
    DIALOG_STACK, USER_PROFILE,
};
use crate::utils::errors::{CleanBuddyError, Result};
use crate::utils::logging::log_turn_received;

pub use greeting::{GreetingFlow, GreetingState};

/// Which path handled a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRoute {
    /// The active dialog received the message
    Dialog,
    /// The scripted greeting ran
    Greeting,
    /// A dialog was started or cancelled on request
    Command,
}

/// What a turn did
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub turn_id: Uuid,
    pub route: TurnRoute,
    pub dialog_status: Option<DialogTurnStatus>,
    pub greeting_state: Option<GreetingState>,
    /// Replies delivered, in order
    pub replies: Vec<Reply>,
    /// State documents written by the turn
    pub keys_written: usize,
}

struct TurnLogic {
    route: TurnRoute,
    dialog_status: Option<DialogTurnStatus>,
    greeting_state: Option<GreetingState>,
}

/// Routes each turn to the dialog stack or the greeting path
pub struct TurnDispatcher {
    state: StateManager,
    transport: Arc<dyn Transport>,
    dialogs: Arc<DialogSet>,
    greeting: GreetingFlow,
    dialog_stack: StatePropertyAccessor<DialogStack>,
}

impl TurnDispatcher {
    pub fn builder() -> TurnDispatcherBuilder {
        TurnDispatcherBuilder::default()
    }

    pub fn state(&self) -> &StateManager {
        &self.state
    }

    /// Handle one inbound activity
    pub async fn on_turn(&self, activity: Activity) -> Result<TurnOutcome> {
        self.run_turn(activity, |this, turn| {
            let mut stack = this.dialog_stack.peek(turn)?.unwrap_or_default();

            if !stack.is_empty() {
                let kind = turn.activity().kind;
                let mut dc = DialogContext::new(&this.dialogs, turn, &mut stack);
                let result = match kind {
                    // a restart mid-dialog repeats the open question
                    ActivityKind::ConversationStart => dc.reprompt_dialog()?,
                    ActivityKind::Message => dc.continue_dialog()?,
                };
                this.dialog_stack.set(turn, &stack)?;
                return Ok(TurnLogic {
                    route: TurnRoute::Dialog,
                    dialog_status: Some(result.status),
                    greeting_state: None,
                });
            }

            let state = this.greeting.run(turn)?;
            Ok(TurnLogic {
                route: TurnRoute::Greeting,
                dialog_status: None,
                greeting_state: Some(state),
            })
        })
        .await
    }

    /// Start a dialog, discarding any dialog already running
    pub async fn begin_dialog(&self, activity: Activity, dialog_id: &str) -> Result<TurnOutcome> {
        self.run_turn(activity, |this, turn| {
            let mut stack = this.dialog_stack.peek(turn)?.unwrap_or_default();
            let result = {
                let mut dc = DialogContext::new(&this.dialogs, turn, &mut stack);
                dc.cancel_all_dialogs()?;
                dc.begin_dialog(dialog_id, None)?
            };
            this.dialog_stack.set(turn, &stack)?;
            Ok(TurnLogic {
                route: TurnRoute::Command,
                dialog_status: Some(result.status),
                greeting_state: None,
            })
        })
        .await
    }

    /// Clear the conversation's dialog stack
    pub async fn cancel_dialogs(&self, activity: Activity) -> Result<TurnOutcome> {
        self.run_turn(activity, |this, turn| {
            let mut stack = this.dialog_stack.peek(turn)?.unwrap_or_default();
            let result = DialogContext::new(&this.dialogs, turn, &mut stack).cancel_all_dialogs()?;

            if result.status == DialogTurnStatus::Cancelled {
                this.dialog_stack.set(turn, &stack)?;
                turn.send_text("Okay, I've cancelled your appointment request.");
            } else {
                turn.send_text("There is nothing to cancel.");
            }
            Ok(TurnLogic {
                route: TurnRoute::Command,
                dialog_status: Some(result.status),
                greeting_state: None,
            })
        })
        .await
    }

    async fn run_turn<F>(&self, activity: Activity, logic: F) -> Result<TurnOutcome>
    where
        F: FnOnce(&Self, &mut TurnContext) -> Result<TurnLogic> + Send,
    {
        let mut turn = TurnContext::new(activity);
        let span = info_span!(
            "turn",
            turn_id = %turn.turn_id(),
            conversation_id = %turn.conversation().conversation_id,
        );

        async move {
            let activity = turn.activity();
            log_turn_received(
                &activity.conversation.conversation_id,
                &activity.conversation.user_id,
                activity.kind.as_str(),
                activity.text.as_deref(),
            );

            self.state.load_all(&mut turn, false).await?;
            let outcome = logic(self, &mut turn)?;
            let keys_written = self.state.save_all_changes(&mut turn).await?;

            let replies = turn.take_replies();
            for reply in &replies {
                self.transport.send(turn.conversation(), reply).await?;
            }

            info!(
                route = ?outcome.route,
                dialog_status = ?outcome.dialog_status,
                replies = replies.len(),
                keys_written = keys_written,
                "Turn completed"
            );

            Ok(TurnOutcome {
                turn_id: turn.turn_id(),
                route: outcome.route,
                dialog_status: outcome.dialog_status,
                greeting_state: outcome.greeting_state,
                replies,
                keys_written,
            })
        }
        .instrument(span)
        .await
    }
}

impl std::fmt::Debug for TurnDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnDispatcher")
            .field("state", &self.state)
            .field("dialogs", &self.dialogs)
            .finish_non_exhaustive()
    }
}

/// Builder for [`TurnDispatcher`]; storage and transport are required
#[derive(Default)]
pub struct TurnDispatcherBuilder {
    storage: Option<Arc<dyn StateStorage>>,
    transport: Option<Arc<dyn Transport>>,
    dialogs: Option<DialogSet>,
    settings: Option<Settings>,
}

impl TurnDispatcherBuilder {
    pub fn storage(mut self, storage: Arc<dyn StateStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Replace the default dialog set
    pub fn dialogs(mut self, dialogs: DialogSet) -> Self {
        self.dialogs = Some(dialogs);
        self
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn build(self) -> Result<TurnDispatcher> {
        let storage = self.storage.ok_or(CleanBuddyError::MissingDependency("storage"))?;
        let transport = self.transport.ok_or(CleanBuddyError::MissingDependency("transport"))?;
        let settings = self.settings.unwrap_or_default();
        let dialogs = match self.dialogs {
            Some(dialogs) => dialogs,
            None => build_dialog_set(&settings)?,
        };

        let state = StateManager::new(storage);
        let profile = state.create_property::<UserProfile>(StateScope::User, USER_PROFILE);
        let flags = state.create_property::<ConversationFlags>(StateScope::Conversation, CONVERSATION_FLAGS);
        let dialog_stack = state.create_property::<DialogStack>(StateScope::Conversation, DIALOG_STACK);

        Ok(TurnDispatcher {
            greeting: GreetingFlow::new(&settings.bot.persona, profile, flags),
            state,
            transport,
            dialogs: Arc::new(dialogs),
            dialog_stack,
        })
    }
}
