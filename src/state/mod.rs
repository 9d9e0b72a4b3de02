//! State management module
//!
//! This module handles per-turn state: typed property accessors over the
//! user and conversation scopes, the turn context, and the storage backends.

pub mod accessor;
pub mod context;
pub mod storage;

// Re-export commonly used state components
pub use accessor::{read_property, StateManager, StatePropertyAccessor, StateScope};
pub use context::TurnContext;
pub use storage::{MemoryStorage, RedisStorage, StateChange, StateStorage};

/// Property holding the durable user profile
pub const USER_PROFILE: &str = "UserProfile";
/// Property holding the greeting flags
pub const CONVERSATION_FLAGS: &str = "ConversationFlags";
/// Property holding the persisted dialog stack
pub const DIALOG_STACK: &str = "DialogStack";
