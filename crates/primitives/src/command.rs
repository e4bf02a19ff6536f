//! The command contract.
//!
//! A [`Command`] inspects an [`EditorState`] and either reports whether it
//! applies (no dispatch callback) or performs its edit by handing exactly
//! one [`Transaction`] to the callback and returning `true`. A command that
//! returns `false` never calls the callback.

use std::sync::Arc;

use serde_json::Value;

use crate::state::EditorState;
use crate::transaction::Transaction;


/// Commit callback handed to a command.
pub type Dispatch<'a> = &'a mut dyn FnMut(Transaction);

/// An editing command.
pub type Command = Arc<dyn Fn(&EditorState, Option<Dispatch<'_>>) -> bool + Send + Sync>;

/// Builds a command from call arguments.
pub type CommandFactory = Arc<dyn Fn(&CommandArgs) -> Command + Send + Sync>;

/// Wraps a closure as a [`Command`].
pub fn command<F>(f: F) -> Command
where
	F: Fn(&EditorState, Option<Dispatch<'_>>) -> bool + Send + Sync + 'static,
{
	Arc::new(f)
}

/// Wraps a closure as a [`CommandFactory`].
pub fn factory<F>(f: F) -> CommandFactory
where
	F: Fn(&CommandArgs) -> Command + Send + Sync + 'static,
{
	Arc::new(f)
}

/// A factory that ignores its arguments.
pub fn constant(cmd: Command) -> CommandFactory {
	factory(move |_| Arc::clone(&cmd))
}

/// Combines `candidates` into a command that runs the first applicable one.
///
/// Each candidate is dry-run against the unmodified state in order; the
/// first whose dry run succeeds is executed with the callback and its result
/// returned. Later candidates are never consulted once one applies.
pub fn first_command(candidates: Vec<Command>) -> Command {
	command(move |state, dispatch| {
		let Some(chosen) = candidates.iter().find(|cmd| cmd(state, None)) else {
			return false;
		};
		match dispatch {
			None => true,
			Some(dispatch) => chosen(state, Some(dispatch)),
		}
	})
}

/// Positional arguments passed to a [`CommandFactory`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandArgs(Vec<Value>);

impl CommandArgs {
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends an argument.
	pub fn with(mut self, value: impl Into<Value>) -> Self {
		self.0.push(value.into());
		self
	}

	pub fn get(&self, index: usize) -> Option<&Value> {
		self.0.get(index)
	}

	pub fn usize(&self, index: usize) -> Option<usize> {
		self.get(index)?.as_u64().and_then(|v| usize::try_from(v).ok())
	}

	pub fn str(&self, index: usize) -> Option<&str> {
		self.get(index)?.as_str()
	}

	pub fn bool(&self, index: usize) -> Option<bool> {
		self.get(index)?.as_bool()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl From<Vec<Value>> for CommandArgs {
	fn from(values: Vec<Value>) -> Self {
		Self(values)
	}
}

impl<V: Into<Value>> FromIterator<V> for CommandArgs {
	fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
		Self(iter.into_iter().map(Into::into).collect())
	}
}
