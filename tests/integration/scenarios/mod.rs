//! Integration test scenarios
//!
//! Complete conversations through the turn dispatcher: the scripted
//! greeting, the appointment dialog and dialog stack composition.

pub mod appointment_test;
pub mod dialog_stack_test;
pub mod greeting_test;
