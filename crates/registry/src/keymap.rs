//! The merged chord → command table.

use tracing::warn;
use vellum_keymap::{Chord, ParseError, Platform, parse};

use crate::collision::{Collision, DuplicatePolicy, InsertAction, KeyKind, PolicyTable};
use crate::commands::CommandRegistry;

/// Key bindings keyed by canonical chord.
#[derive(Debug, Clone)]
pub struct Keymap {
	platform: Platform,
	table: PolicyTable<Chord, String>,
}

impl Keymap {
	pub fn new(platform: Platform, policy: DuplicatePolicy) -> Self {
		Self {
			platform,
			table: PolicyTable::new(KeyKind::Chord, policy),
		}
	}

	/// Binds `chord` to the command `command` on behalf of extension `source`.
	///
	/// # Errors
	///
	/// Returns a [`ParseError`] if `chord` is not a valid chord.
	pub fn bind(&mut self, source: &str, chord: &str, command: impl Into<String>) -> Result<InsertAction, ParseError> {
		let chord = parse(chord, self.platform)?;
		Ok(self.table.insert(chord, command.into(), source))
	}

	/// The command bound to `chord`.
	pub fn lookup(&self, chord: &Chord) -> Option<&str> {
		self.table.get(chord).map(|owned| owned.value.as_str())
	}

	/// Parses `chord` and looks it up. Unparseable chords are unbound.
	pub fn lookup_str(&self, chord: &str) -> Option<&str> {
		self.lookup(&parse(chord, self.platform).ok()?)
	}

	/// Drops bindings to commands `registry` does not know, logging each one.
	pub fn retain_known(&mut self, registry: &CommandRegistry) {
		self.table.retain(|chord, owned| {
			let known = registry.contains(&owned.value);
			if !known {
				warn!(
					chord = %chord,
					command = %owned.value,
					extension = %owned.source,
					"dropping key binding to unregistered command"
				);
			}
			known
		});
	}

	/// Bindings in registration order.
	pub fn bindings(&self) -> impl Iterator<Item = (&Chord, &str)> {
		self.table.iter().map(|(chord, owned)| (chord, owned.value.as_str()))
	}

	pub fn platform(&self) -> Platform {
		self.platform
	}

	pub fn len(&self) -> usize {
		self.table.len()
	}

	pub fn is_empty(&self) -> bool {
		self.table.len() == 0
	}

	pub fn collisions(&self) -> &[Collision] {
		self.table.collisions()
	}
}
