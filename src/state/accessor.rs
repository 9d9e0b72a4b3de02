//! Typed state accessors
//!
//! State is kept in two scopes, one document per user and one per
//! conversation. Each document is a JSON object of named properties. A turn
//! loads both documents once, reads and writes properties against that
//! in-turn copy, and flushes every changed document in a single batch.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;
use crate::models::ConversationRef;
use crate::utils::errors::{CleanBuddyError, Result};
use crate::utils::logging::log_state_flush;
use super::context::TurnContext;
use super::storage::{StateChange, StateStorage};

/// Persistence scope of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateScope {
    User,
    Conversation,
}

impl StateScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateScope::User => "user",
            StateScope::Conversation => "conversation",
        }
    }

    /// Storage key of this scope's document for a conversation
    pub fn storage_key(&self, conversation: &ConversationRef) -> String {
        match self {
            StateScope::User => format!("{}/users/{}", conversation.channel_id, conversation.user_id),
            StateScope::Conversation => format!(
                "{}/conversations/{}",
                conversation.channel_id, conversation.conversation_id
            ),
        }
    }
}

/// In-turn copy of one scope's document
#[derive(Debug, Clone)]
pub(crate) struct CachedState {
    pub(crate) key: String,
    pub(crate) properties: Map<String, Value>,
    loaded: Map<String, Value>,
}

impl CachedState {
    fn new(key: String, properties: Map<String, Value>) -> Self {
        Self {
            key,
            loaded: properties.clone(),
            properties,
        }
    }

    fn is_changed(&self) -> bool {
        self.properties != self.loaded
    }
}

/// Loads and saves the state scopes of a turn
#[derive(Debug, Clone)]
pub struct StateManager {
    storage: Arc<dyn StateStorage>,
    scopes: Vec<StateScope>,
}

impl StateManager {
    /// Create a manager for user and conversation state over one storage
    pub fn new(storage: Arc<dyn StateStorage>) -> Self {
        Self {
            storage,
            scopes: vec![StateScope::User, StateScope::Conversation],
        }
    }

    /// Underlying storage
    pub fn storage(&self) -> &Arc<dyn StateStorage> {
        &self.storage
    }

    /// Create a typed accessor for a named property
    pub fn create_property<T>(&self, scope: StateScope, name: &str) -> StatePropertyAccessor<T> {
        StatePropertyAccessor::new(scope, name)
    }

    /// Load every scope not yet loaded for this turn, in one read
    ///
    /// With `force` the scopes are re-read, discarding unsaved changes.
    pub async fn load_all(&self, turn: &mut TurnContext, force: bool) -> Result<()> {
        let pending: Vec<(StateScope, String)> = self
            .scopes
            .iter()
            .filter(|scope| force || turn.cached_state(**scope).is_none())
            .map(|scope| (*scope, scope.storage_key(turn.conversation())))
            .collect();

        if pending.is_empty() {
            return Ok(());
        }

        let keys: Vec<String> = pending.iter().map(|(_, key)| key.clone()).collect();
        let mut documents = self.storage.read(&keys).await?;

        for (scope, key) in pending {
            let properties = match documents.remove(&key) {
                Some(Value::Object(properties)) => properties,
                Some(other) => {
                    return Err(CleanBuddyError::InvalidInput(format!(
                        "State document '{}' is not an object: {}",
                        key, other
                    )))
                }
                None => Map::new(),
            };
            debug!(scope = scope.as_str(), key = %key, properties = properties.len(), "State scope loaded");
            turn.insert_cached_state(scope, CachedState::new(key, properties));
        }

        Ok(())
    }

    /// Flush every changed scope in one atomic write
    ///
    /// Returns the number of documents written.
    pub async fn save_all_changes(&self, turn: &mut TurnContext) -> Result<usize> {
        let changes: Vec<StateChange> = self
            .scopes
            .iter()
            .filter_map(|scope| {
                turn.cached_state(*scope)
                    .filter(|cached| cached.is_changed())
                    .map(|cached| StateChange {
                        key: cached.key.clone(),
                        scope: *scope,
                        value: Value::Object(cached.properties.clone()),
                    })
            })
            .collect();

        if !changes.is_empty() {
            self.storage.write(&changes).await?;
            for scope in &self.scopes {
                if let Some(cached) = turn.cached_state_mut(*scope) {
                    cached.loaded = cached.properties.clone();
                }
            }
        }

        log_state_flush(&turn.conversation().conversation_id, changes.len());
        Ok(changes.len())
    }

    /// Drop every property of a scope; takes effect at the next save
    pub fn clear(&self, turn: &mut TurnContext, scope: StateScope) -> Result<()> {
        let cached = turn
            .cached_state_mut(scope)
            .ok_or_else(|| CleanBuddyError::StateNotLoaded(scope.as_str().to_string()))?;
        cached.properties.clear();
        Ok(())
    }
}

/// Typed get/set of one named property within a scope
pub struct StatePropertyAccessor<T> {
    scope: StateScope,
    name: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> StatePropertyAccessor<T> {
    pub fn new(scope: StateScope, name: &str) -> Self {
        Self {
            scope,
            name: name.to_string(),
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scope(&self) -> StateScope {
        self.scope
    }
}

impl<T: Serialize + DeserializeOwned> StatePropertyAccessor<T> {
    /// Current value, or `factory()` stored and returned when absent
    pub fn get<F>(&self, turn: &mut TurnContext, factory: F) -> Result<T>
    where
        F: FnOnce() -> T,
    {
        let cached = self.cached(turn)?;
        if let Some(value) = cached.properties.get(&self.name) {
            return Ok(serde_json::from_value(value.clone())?);
        }

        let value = factory();
        cached
            .properties
            .insert(self.name.clone(), serde_json::to_value(&value)?);
        Ok(value)
    }

    /// Current value without storing a default when absent
    pub fn peek(&self, turn: &mut TurnContext) -> Result<Option<T>> {
        match self.cached(turn)?.properties.get(&self.name) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    /// Store a value for this turn
    pub fn set(&self, turn: &mut TurnContext, value: &T) -> Result<()> {
        let serialized = serde_json::to_value(value)?;
        self.cached(turn)?.properties.insert(self.name.clone(), serialized);
        Ok(())
    }

    /// Remove the property for this turn
    pub fn delete(&self, turn: &mut TurnContext) -> Result<()> {
        self.cached(turn)?.properties.remove(&self.name);
        Ok(())
    }

    fn cached<'t>(&self, turn: &'t mut TurnContext) -> Result<&'t mut CachedState> {
        turn.cached_state_mut(self.scope)
            .ok_or_else(|| CleanBuddyError::StateNotLoaded(self.scope.as_str().to_string()))
    }
}

impl<T> Clone for StatePropertyAccessor<T> {
    fn clone(&self) -> Self {
        Self::new(self.scope, &self.name)
    }
}

impl<T> std::fmt::Debug for StatePropertyAccessor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatePropertyAccessor")
            .field("scope", &self.scope)
            .field("name", &self.name)
            .finish()
    }
}

/// Read one property straight from storage, outside of a turn
pub async fn read_property<T: DeserializeOwned>(
    storage: &dyn StateStorage,
    key: &str,
    name: &str,
) -> Result<Option<T>> {
    let mut documents: HashMap<String, Value> = storage.read(&[key.to_string()]).await?;
    match documents.remove(key).and_then(|document| document.get(name).cloned()) {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}
