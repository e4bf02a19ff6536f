//! Core editing primitives: steps, selections, transactions, editor state and
//! the command contract.

/// Commands, command factories and the first-applicable combinator.
pub mod command;
/// Selection types.
pub mod selection;
/// Editor state and behavior slots.
pub mod state;
/// Atomic document edits and position mapping.
pub mod step;
/// Atomic groups of steps.
pub mod transaction;

#[cfg(test)]
mod test_support;

pub use command::{Command, CommandArgs, CommandFactory, Dispatch, command, constant, factory, first_command};
pub use selection::{Selection, textblock_ranges};
pub use state::{ApplyError, Behavior, EditorState, Slot};
pub use step::{Bias, Step, StepError};
pub use transaction::Transaction;
