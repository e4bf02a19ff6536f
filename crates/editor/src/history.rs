//! Undo history.
//!
//! [`History`] is a behavior whose slot keeps two stacks of document
//! snapshots. Every document-changing transaction pushes the state it
//! replaced onto the undo stack and clears the redo stack; [`undo`] and
//! [`redo`] move snapshots between the stacks.

use std::sync::Arc;

use serde_json::Value;
use vellum_model::Node;
use vellum_primitives::{Behavior, Command, EditorState, Selection, Slot, Transaction};

use crate::commands::transaction_command;
use crate::config::DEFAULT_HISTORY_DEPTH;


/// Name of the history behavior and of its extension.
pub const HISTORY: &str = "history";

/// Transaction metadata key. Setting it to `false` keeps a transaction out
/// of the history.
pub const ADD_TO_HISTORY: &str = "add_to_history";

const ACTION: &str = "history_action";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
	Undo,
	Redo,
}

impl Action {
	fn as_str(self) -> &'static str {
		match self {
			Self::Undo => "undo",
			Self::Redo => "redo",
		}
	}

	fn of(tr: &Transaction) -> Option<Self> {
		match tr.meta(ACTION).and_then(Value::as_str)? {
			"undo" => Some(Self::Undo),
			"redo" => Some(Self::Redo),
			_ => None,
		}
	}
}

#[derive(Debug, Clone)]
struct Entry {
	doc: Arc<Node>,
	selection: Selection,
}

/// The history slot.
#[derive(Debug, Clone, Default)]
pub struct HistoryState {
	done: Vec<Entry>,
	undone: Vec<Entry>,
}

impl HistoryState {
	/// Number of steps [`undo`] can take.
	pub fn undo_depth(&self) -> usize {
		self.done.len()
	}

	/// Number of steps [`redo`] can take.
	pub fn redo_depth(&self) -> usize {
		self.undone.len()
	}
}

/// The history behavior, keeping at most `depth` undo steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct History {
	depth: usize,
}

impl History {
	pub fn new(depth: usize) -> Self {
		Self { depth }
	}

	pub fn depth(&self) -> usize {
		self.depth
	}
}

impl Default for History {
	fn default() -> Self {
		Self::new(DEFAULT_HISTORY_DEPTH)
	}
}

impl Behavior for History {
	fn name(&self) -> &str {
		HISTORY
	}

	fn init(&self, _state: &EditorState) -> Option<Slot> {
		Some(Arc::new(HistoryState::default()))
	}

	fn apply(&self, tr: &Transaction, slot: Option<&Slot>, old: &EditorState, _new: &EditorState) -> Option<Slot> {
		let mut history = slot
			.and_then(|slot| slot.downcast_ref::<HistoryState>())
			.cloned()
			.unwrap_or_default();
		let entry = Entry {
			doc: Arc::clone(old.doc_arc()),
			selection: *old.selection(),
		};
		match Action::of(tr) {
			Some(Action::Undo) => {
				history.done.pop();
				history.undone.push(entry);
			}
			Some(Action::Redo) => {
				history.undone.pop();
				history.done.push(entry);
			}
			None if tr.doc_changed() && tr.meta(ADD_TO_HISTORY).and_then(Value::as_bool) != Some(false) => {
				history.done.push(entry);
				if history.done.len() > self.depth {
					let excess = history.done.len() - self.depth;
					history.done.drain(..excess);
				}
				history.undone.clear();
			}
			None => return slot.cloned(),
		}
		Some(Arc::new(history))
	}
}

/// Restores the document before the last recorded change.
pub fn undo() -> Command {
	transaction_command(|state| travel(state, Action::Undo))
}

/// Reapplies the last undone change.
pub fn redo() -> Command {
	transaction_command(|state| travel(state, Action::Redo))
}

/// The history slot of `state`, if the behavior is installed.
pub fn history_state(state: &EditorState) -> Option<&HistoryState> {
	state.slot_as::<HistoryState>(HISTORY)
}

fn travel(state: &EditorState, action: Action) -> Option<Transaction> {
	let history = history_state(state)?;
	let entry = match action {
		Action::Undo => history.done.last()?,
		Action::Redo => history.undone.last()?,
	};
	let mut tr = state.tr();
	tr.replace(0, state.doc().content_size(), entry.doc.content().to_vec()).ok()?;
	let selection = if entry.selection.is_valid(tr.doc(), state.schema()) {
		entry.selection
	} else {
		Selection::at_start(tr.doc(), state.schema())
	};
	tr.set_selection(selection);
	tr.set_meta(ACTION, action.as_str());
	Some(tr)
}
