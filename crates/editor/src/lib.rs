//! Editor core for vellum.
//!
//! An [`Editor`] owns a [`Registry`](vellum_registry::Registry) assembled
//! from extension descriptors and a [`StateStore`] holding the current
//! [`EditorState`](vellum_primitives::EditorState). Edits arrive as key
//! chords, typed text, named commands run through a [`Chain`], or raw
//! transactions, and every committed change is reported to subscribers.
//!
//! The [`commands`] module carries the built-in command library and the
//! building blocks extensions use for their own commands; [`history`] and
//! [`input_rules`] provide the behaviors behind undo and typed shortcuts.

pub use chain::Chain;
pub use config::{EditorConfig, HistoryConfig, InputRulesConfig};
pub use editor::{Content, Editor};
pub use error::EditorError;
pub use store::{ChangeEvent, StateStore, SubscriberId};

mod chain;
pub mod commands;
mod config;
mod editor;
mod error;
pub mod history;
pub mod input_rules;
mod store;

#[cfg(test)]
mod test_support;
