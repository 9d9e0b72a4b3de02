//! Turn context
//!
//! A [`TurnContext`] carries everything one turn works with: the inbound
//! activity, the replies queued so far, and the in-turn copy of each loaded
//! state scope. It lives for exactly one turn and is rebuilt from storage on
//! the next.

use std::collections::HashMap;
use uuid::Uuid;
use crate::models::{Activity, ConversationRef, Reply};
use super::accessor::{CachedState, StateScope};

/// Working state of a single turn
#[derive(Debug)]
pub struct TurnContext {
    turn_id: Uuid,
    activity: Activity,
    replies: Vec<Reply>,
    state: HashMap<StateScope, CachedState>,
}

impl TurnContext {
    /// Create a context for an inbound activity
    pub fn new(activity: Activity) -> Self {
        Self {
            turn_id: Uuid::new_v4(),
            activity,
            replies: Vec::new(),
            state: HashMap::new(),
        }
    }

    pub fn turn_id(&self) -> Uuid {
        self.turn_id
    }

    pub fn activity(&self) -> &Activity {
        &self.activity
    }

    pub fn conversation(&self) -> &ConversationRef {
        &self.activity.conversation
    }

    /// Queue a reply for delivery at the end of the turn
    pub fn send(&mut self, reply: Reply) {
        self.replies.push(reply);
    }

    /// Queue a plain text reply
    pub fn send_text(&mut self, text: impl Into<String>) {
        self.send(Reply::text(text));
    }

    /// Replies queued so far
    pub fn replies(&self) -> &[Reply] {
        &self.replies
    }

    /// Hand over the queued replies
    pub fn take_replies(&mut self) -> Vec<Reply> {
        std::mem::take(&mut self.replies)
    }

    pub(crate) fn cached_state(&self, scope: StateScope) -> Option<&CachedState> {
        self.state.get(&scope)
    }

    pub(crate) fn cached_state_mut(&mut self, scope: StateScope) -> Option<&mut CachedState> {
        self.state.get_mut(&scope)
    }

    pub(crate) fn insert_cached_state(&mut self, scope: StateScope, cached: CachedState) {
        self.state.insert(scope, cached);
    }
}
