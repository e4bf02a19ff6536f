//! The merged command table.

use vellum_primitives::{Command, CommandArgs, CommandFactory};

use crate::collision::{Collision, DuplicatePolicy, InsertAction, KeyKind, PolicyTable};

/// Source name recorded for commands seeded by the editor itself.
pub const BUILTIN_SOURCE: &str = "builtin";

/// Command factories keyed by name, in first-registration order.
#[derive(Clone)]
pub struct CommandRegistry {
	table: PolicyTable<String, CommandFactory>,
}

impl CommandRegistry {
	pub fn new(policy: DuplicatePolicy) -> Self {
		Self {
			table: PolicyTable::new(KeyKind::Command, policy),
		}
	}

	/// Registers `factory` under `name` on behalf of extension `source`.
	pub fn register(&mut self, source: &str, name: impl Into<String>, factory: CommandFactory) -> InsertAction {
		self.table.insert(name.into(), factory, source)
	}

	pub fn factory(&self, name: &str) -> Option<&CommandFactory> {
		self.table.get(name).map(|owned| &owned.value)
	}

	/// Instantiates the command `name` with `args`.
	pub fn create(&self, name: &str, args: &CommandArgs) -> Option<Command> {
		self.factory(name).map(|factory| factory(args))
	}

	pub fn contains(&self, name: &str) -> bool {
		self.table.get(name).is_some()
	}

	/// The extension whose factory currently answers to `name`.
	pub fn source(&self, name: &str) -> Option<&str> {
		self.table.get(name).map(|owned| owned.source.as_str())
	}

	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.table.iter().map(|(name, _)| name.as_str())
	}

	pub fn len(&self) -> usize {
		self.table.len()
	}

	pub fn is_empty(&self) -> bool {
		self.table.len() == 0
	}

	pub fn policy(&self) -> DuplicatePolicy {
		self.table.policy()
	}

	pub fn collisions(&self) -> &[Collision] {
		self.table.collisions()
	}
}

impl std::fmt::Debug for CommandRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CommandRegistry")
			.field("commands", &self.names().collect::<Vec<_>>())
			.field("policy", &self.policy())
			.finish()
	}
}
