//! Immutable editor state and behavior state slots.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use vellum_model::{DocumentSchema, Mark, Node, SchemaViolation};

use crate::selection::Selection;
use crate::transaction::Transaction;

#[cfg(test)]
mod tests;

/// Opaque per-behavior state stored inside an [`EditorState`].
pub type Slot = Arc<dyn Any + Send + Sync>;

/// An editor-level behavior contributed by an extension.
///
/// Behaviors are passed through to the rendering collaborator unmodified. A
/// behavior that needs state across transactions owns a [`Slot`]: `init`
/// produces it for a fresh state and `apply` derives the next slot from a
/// transaction. Slots are never mutated in place.
pub trait Behavior: Any + Send + Sync {
	/// Unique name, used to look up the behavior's slot.
	fn name(&self) -> &str;

	/// Produces the slot for a freshly created state.
	fn init(&self, _state: &EditorState) -> Option<Slot> {
		None
	}

	/// Produces the next slot after `tr` has been applied to `old`.
	///
	/// `new` carries the new document and selection, with slots of behaviors
	/// earlier in the list already updated.
	fn apply(&self, _tr: &Transaction, slot: Option<&Slot>, _old: &EditorState, _new: &EditorState) -> Option<Slot> {
		slot.cloned()
	}
}

/// A transaction could not be applied to a state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
	#[error("transaction was built against a different document")]
	Stale,
	#[error("selection {0:?} is not valid in the resulting document")]
	InvalidSelection(Selection),
}

/// The complete, immutable state of one editor.
///
/// States are values: applying a transaction produces a new state and leaves
/// the old one intact. Two states compare equal when their documents,
/// selections and stored marks are equal and they share the same schema,
/// behaviors and slot values.
#[derive(Clone)]
pub struct EditorState {
	doc: Arc<Node>,
	selection: Selection,
	schema: Arc<DocumentSchema>,
	stored_marks: Option<Vec<Mark>>,
	behaviors: Arc<[Arc<dyn Behavior>]>,
	slots: Arc<[Option<Slot>]>,
}

impl EditorState {
	/// Creates a state for `doc`, which is checked against `schema`.
	///
	/// `selection` defaults to the first cursor position.
	///
	/// # Errors
	///
	/// Returns a [`SchemaViolation`] if `doc` does not conform.
	pub fn create(
		schema: Arc<DocumentSchema>,
		doc: Node,
		selection: Option<Selection>,
		behaviors: Arc<[Arc<dyn Behavior>]>,
	) -> Result<Self, SchemaViolation> {
		schema.check(&doc)?;
		let selection = selection
			.filter(|sel| sel.is_valid(&doc, &schema))
			.unwrap_or_else(|| Selection::at_start(&doc, &schema));
		let mut state = Self {
			doc: Arc::new(doc),
			selection,
			schema,
			stored_marks: None,
			behaviors: Arc::clone(&behaviors),
			slots: behaviors.iter().map(|_| None).collect(),
		};
		let slots: Vec<Option<Slot>> = behaviors.iter().map(|b| b.init(&state)).collect();
		state.slots = slots.into();
		Ok(state)
	}

	pub fn doc(&self) -> &Node {
		&self.doc
	}

	pub fn doc_arc(&self) -> &Arc<Node> {
		&self.doc
	}

	pub fn selection(&self) -> &Selection {
		&self.selection
	}

	pub fn schema(&self) -> &DocumentSchema {
		&self.schema
	}

	pub fn schema_arc(&self) -> &Arc<DocumentSchema> {
		&self.schema
	}

	pub fn stored_marks(&self) -> Option<&[Mark]> {
		self.stored_marks.as_deref()
	}

	pub fn behaviors(&self) -> &[Arc<dyn Behavior>] {
		&self.behaviors
	}

	/// The slot owned by the behavior named `name`.
	pub fn slot(&self, name: &str) -> Option<&Slot> {
		let index = self.behaviors.iter().position(|b| b.name() == name)?;
		self.slots.get(index)?.as_ref()
	}

	/// The slot owned by `name`, downcast to `T`.
	pub fn slot_as<T: Any>(&self, name: &str) -> Option<&T> {
		self.slot(name)?.downcast_ref()
	}

	/// Starts a transaction on this state.
	pub fn tr(&self) -> Transaction {
		Transaction::new(self)
	}

	/// Applies `tr`, producing the next state.
	///
	/// # Errors
	///
	/// Returns [`ApplyError::Stale`] if `tr` was built from another document,
	/// or [`ApplyError::InvalidSelection`] if its selection does not fit the
	/// resulting document.
	pub fn apply(&self, tr: &Transaction) -> Result<EditorState, ApplyError> {
		if !Arc::ptr_eq(tr.before(), &self.doc) && **tr.before() != *self.doc {
			return Err(ApplyError::Stale);
		}
		let selection = *tr.selection();
		if tr.selection_set() && !selection.is_valid(tr.doc(), &self.schema) {
			return Err(ApplyError::InvalidSelection(selection));
		}
		let stored_marks = if tr.stored_marks_set() {
			tr.stored_marks().map(<[Mark]>::to_vec)
		} else if tr.doc_changed() || tr.selection_set() {
			None
		} else {
			self.stored_marks.clone()
		};

		let mut next = EditorState {
			doc: Arc::clone(tr.doc_arc()),
			selection,
			schema: Arc::clone(&self.schema),
			stored_marks,
			behaviors: Arc::clone(&self.behaviors),
			slots: Arc::clone(&self.slots),
		};
		for (index, behavior) in self.behaviors.iter().enumerate() {
			let slot = behavior.apply(tr, self.slots[index].as_ref(), self, &next);
			let mut slots = next.slots.to_vec();
			slots[index] = slot;
			next.slots = slots.into();
		}
		Ok(next)
	}

	/// Returns a state holding `doc` with the same schema and behaviors and
	/// freshly initialized slots.
	///
	/// # Errors
	///
	/// Returns a [`SchemaViolation`] if `doc` does not conform.
	pub fn with_document(&self, doc: Node) -> Result<EditorState, SchemaViolation> {
		Self::create(Arc::clone(&self.schema), doc, None, Arc::clone(&self.behaviors))
	}
}

impl PartialEq for EditorState {
	fn eq(&self, other: &Self) -> bool {
		self.doc == other.doc
			&& self.selection == other.selection
			&& self.stored_marks == other.stored_marks
			&& Arc::ptr_eq(&self.schema, &other.schema)
			&& Arc::ptr_eq(&self.behaviors, &other.behaviors)
			&& self.slots.len() == other.slots.len()
			&& self.slots.iter().zip(other.slots.iter()).all(|pair| match pair {
				(Some(a), Some(b)) => Arc::ptr_eq(a, b),
				(None, None) => true,
				_ => false,
			})
	}
}

impl fmt::Debug for EditorState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EditorState")
			.field("doc", &self.doc)
			.field("selection", &self.selection)
			.field("stored_marks", &self.stored_marks)
			.field("behaviors", &self.behaviors.iter().map(|b| b.name()).collect::<Vec<_>>())
			.finish_non_exhaustive()
	}
}
