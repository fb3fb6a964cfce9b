//! Conversation session controller for the mystery chat.
//!
//! Owns the ordered message history of one conversation, reconciles it with
//! stored history and form preferences, and drives model invocations through
//! the [`ports::ModelPort`] boundary.

pub mod ports;
pub mod prompt;
pub mod reconcile;
pub mod session;
pub mod controller;
pub mod history;
pub mod title;
pub mod event_bus;
