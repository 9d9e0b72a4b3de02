//! Data models
//!
//! Plain records persisted through the state accessors, plus the inbound
//! activity and outbound reply shapes exchanged with the transport.

pub mod activity;
pub mod conversation;
pub mod profile;

pub use activity::{Activity, ActivityKind, ActivityValue, ConversationRef, Reply};
pub use conversation::ConversationFlags;
pub use profile::{Appointment, UserProfile};
