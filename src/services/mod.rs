//! Services module
//!
//! Input recognizers used by prompts and the outbound transport.

pub mod recognizers;
pub mod transport;

pub use recognizers::{recognize_choice, recognize_date_times, to_choices, Choice, FoundChoice};
pub use transport::{TelegramTransport, Transport};
