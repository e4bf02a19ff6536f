//! Collision types and override policy.
//!
//! Commands, key chords and converters are merged from every resolved
//! extension in resolution order. When two contributions claim the same key,
//! the [`DuplicatePolicy`] decides the winner and the outcome is recorded as a
//! [`Collision`] for diagnostics.

use std::fmt;
use std::hash::Hash;

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::{Deserialize, Serialize};

/// Which contribution wins when two claim the same key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
	/// Keep the first contribution seen for a key.
	FirstWins,
	/// Overwrite with the last contribution seen, so later extensions can
	/// specialize what their dependencies registered.
	#[default]
	LastWins,
}

/// The table a collision happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
	Command,
	Chord,
	Converter,
}

impl fmt::Display for KeyKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Command => write!(f, "command"),
			Self::Chord => write!(f, "chord"),
			Self::Converter => write!(f, "converter"),
		}
	}
}

/// Result of inserting into a policy-governed table.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InsertAction {
	/// Key was new.
	InsertedNew,
	/// Key existed; the existing contribution was kept.
	KeptExisting,
	/// Key existed; the incoming contribution replaced it.
	ReplacedExisting,
}

/// A recorded override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
	pub kind: KeyKind,
	/// The conflicting key, in canonical form.
	pub key: String,
	/// Extension that owned the key before the insertion.
	pub existing: String,
	/// Extension that attempted the insertion.
	pub incoming: String,
	pub resolution: InsertAction,
}

impl fmt::Display for Collision {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let verb = match self.resolution {
			InsertAction::ReplacedExisting => "overrides",
			_ => "ignored in favour of",
		};
		write!(
			f,
			"{} {:?}: {} {verb} {}",
			self.kind, self.key, self.incoming, self.existing
		)
	}
}

/// A value tagged with the extension that contributed it.
#[derive(Debug, Clone)]
pub(crate) struct Owned<V> {
	pub(crate) value: V,
	pub(crate) source: String,
}

/// Declaration-ordered table whose duplicate keys are settled by a [`DuplicatePolicy`].
#[derive(Debug, Clone)]
pub(crate) struct PolicyTable<K, V> {
	kind: KeyKind,
	policy: DuplicatePolicy,
	entries: IndexMap<K, Owned<V>>,
	collisions: Vec<Collision>,
}

impl<K: Hash + Eq + fmt::Display, V> PolicyTable<K, V> {
	pub(crate) fn new(kind: KeyKind, policy: DuplicatePolicy) -> Self {
		Self {
			kind,
			policy,
			entries: IndexMap::new(),
			collisions: Vec::new(),
		}
	}

	/// Inserts `value` under `key`, applying the policy on collision.
	///
	/// A replaced key keeps its original position in iteration order.
	pub(crate) fn insert(&mut self, key: K, value: V, source: &str) -> InsertAction {
		match self.entries.entry(key) {
			Entry::Vacant(slot) => {
				slot.insert(Owned {
					value,
					source: source.to_string(),
				});
				InsertAction::InsertedNew
			}
			Entry::Occupied(mut slot) => {
				let resolution = match self.policy {
					DuplicatePolicy::FirstWins => InsertAction::KeptExisting,
					DuplicatePolicy::LastWins => InsertAction::ReplacedExisting,
				};
				self.collisions.push(Collision {
					kind: self.kind,
					key: slot.key().to_string(),
					existing: slot.get().source.clone(),
					incoming: source.to_string(),
					resolution,
				});
				if resolution == InsertAction::ReplacedExisting {
					slot.insert(Owned {
						value,
						source: source.to_string(),
					});
				}
				resolution
			}
		}
	}

	pub(crate) fn get<Q>(&self, key: &Q) -> Option<&Owned<V>>
	where
		Q: ?Sized + Hash + indexmap::Equivalent<K>,
	{
		self.entries.get(key)
	}

	pub(crate) fn retain(&mut self, mut keep: impl FnMut(&K, &Owned<V>) -> bool) {
		self.entries.retain(|key, owned| keep(key, owned));
	}

	pub(crate) fn iter(&self) -> impl Iterator<Item = (&K, &Owned<V>)> {
		self.entries.iter()
	}

	pub(crate) fn len(&self) -> usize {
		self.entries.len()
	}

	pub(crate) fn policy(&self) -> DuplicatePolicy {
		self.policy
	}

	pub(crate) fn collisions(&self) -> &[Collision] {
		&self.collisions
	}
}
