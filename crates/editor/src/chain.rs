//! Command chains.
//!
//! A [`Chain`] stages commands and runs them in order against a working
//! state. Each command's transaction is applied to that working state on
//! its own, so behaviors see every part separately, and is also folded into
//! one pending transaction. A chain commits the working state exactly once,
//! and only if every staged command succeeded.

use tracing::{error, trace_span, warn};
use vellum_primitives::{Command, CommandArgs, EditorState, Transaction, first_command};

use crate::editor::Editor;


enum Staged {
	Named { name: String, args: CommandArgs },
	Command(Command),
}

/// A sequence of commands run as one atomic edit.
///
/// Built with [`Editor::chain`]. Nothing happens until [`Chain::run`].
#[must_use = "a chain does nothing until run"]
pub struct Chain<'e> {
	editor: &'e mut Editor,
	staged: Vec<Staged>,
	dry_run: bool,
}

impl<'e> Chain<'e> {
	pub(crate) fn new(editor: &'e mut Editor) -> Self {
		Self {
			editor,
			staged: Vec::new(),
			dry_run: false,
		}
	}

	/// Stages the registered command `name`, built with `args`.
	pub fn command(mut self, name: impl Into<String>, args: CommandArgs) -> Self {
		self.staged.push(Staged::Named {
			name: name.into(),
			args,
		});
		self
	}

	/// Stages a command value.
	pub fn then(mut self, command: Command) -> Self {
		self.staged.push(Staged::Command(command));
		self
	}

	/// Stages the first applicable of `candidates`.
	pub fn first(self, candidates: impl IntoIterator<Item = Command>) -> Self {
		self.then(first_command(candidates.into_iter().collect()))
	}

	/// Switches to dry-run mode: [`Chain::run`] only reports whether every
	/// staged command applies, and never commits.
	pub fn can(mut self) -> Self {
		self.dry_run = true;
		self
	}

	/// Runs the staged commands. Returns `true` if all of them succeeded.
	///
	/// In dry-run mode each command is asked against the current state.
	/// Otherwise each runs against the state left by the previous ones and
	/// the combined transaction is committed once at the end. An empty chain
	/// succeeds without committing or notifying.
	pub fn run(self) -> bool {
		let Chain { editor, staged, dry_run } = self;
		if staged.is_empty() {
			return true;
		}
		let trace = editor.config().trace_commands;

		let mut commands = Vec::with_capacity(staged.len());
		for staged in staged {
			match staged {
				Staged::Named { name, args } => match editor.command(&name, &args) {
					Some(cmd) => commands.push((name, cmd)),
					None => {
						warn!(command = %name, "unknown command");
						return false;
					}
				},
				Staged::Command(cmd) => commands.push(("<anonymous>".to_string(), cmd)),
			}
		}

		if dry_run {
			let state = editor.state();
			return commands.iter().all(|(name, cmd)| {
				let _span = trace.then(|| trace_span!("command", name = %name, dry_run = true).entered());
				cmd(state, None)
			});
		}

		let mut working = editor.state().clone();
		let mut pending = working.tr();
		for (name, cmd) in &commands {
			let _span = trace.then(|| trace_span!("command", name = %name).entered());
			let Some(tr) = run_one(name, cmd, &working) else {
				return false;
			};
			working = match working.apply(&tr) {
				Ok(next) => next,
				Err(err) => {
					warn!(command = %name, error = %err, "command produced an inapplicable transaction");
					return false;
				}
			};
			if let Err(err) = pending.append(tr) {
				warn!(command = %name, error = %err, "could not fold transaction into chain");
				return false;
			}
		}

		match editor.commit(&pending, working) {
			Ok(()) => true,
			Err(err) => {
				warn!(error = %err, "chain commit failed");
				false
			}
		}
	}
}

/// Runs `cmd` with a capturing dispatch, enforcing the command contract.
fn run_one(name: &str, cmd: &Command, state: &EditorState) -> Option<Transaction> {
	let mut produced: Vec<Transaction> = Vec::new();
	let mut capture = |tr: Transaction| produced.push(tr);
	let applied = cmd(state, Some(&mut capture));
	match (applied, produced.len()) {
		(true, 1) => produced.pop(),
		(false, 0) => None,
		(applied, count) => {
			error!(command = %name, applied, dispatched = count, "command broke the dispatch contract");
			None
		}
	}
}
