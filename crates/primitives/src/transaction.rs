//! Transactions: atomic groups of steps plus the resulting selection.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use vellum_model::{DocumentSchema, Mark, Node, ResolvedPos};

use crate::selection::Selection;
use crate::state::EditorState;
use crate::step::{Bias, Step, StepError};


/// An ordered list of steps built against one editor state.
///
/// Every step is applied as it is added, so [`Transaction::doc`] always holds
/// the document as it will look once the transaction is committed. A step
/// that fails to apply is rejected and leaves the transaction unchanged.
#[derive(Debug, Clone)]
pub struct Transaction {
	schema: Arc<DocumentSchema>,
	before: Arc<Node>,
	doc: Arc<Node>,
	steps: Vec<Step>,
	selection: Selection,
	selection_set: bool,
	stored_marks: Option<Vec<Mark>>,
	stored_marks_set: bool,
	meta: BTreeMap<String, Value>,
}

impl Transaction {
	/// Starts an empty transaction on top of `state`.
	pub fn new(state: &EditorState) -> Self {
		Self {
			schema: Arc::clone(state.schema_arc()),
			before: Arc::clone(state.doc_arc()),
			doc: Arc::clone(state.doc_arc()),
			steps: Vec::new(),
			selection: *state.selection(),
			selection_set: false,
			stored_marks: state.stored_marks().map(<[Mark]>::to_vec),
			stored_marks_set: false,
			meta: BTreeMap::new(),
		}
	}

	pub fn schema(&self) -> &DocumentSchema {
		&self.schema
	}

	/// The document the transaction started from.
	pub fn before(&self) -> &Arc<Node> {
		&self.before
	}

	/// The document with every step applied.
	pub fn doc(&self) -> &Node {
		&self.doc
	}

	pub fn doc_arc(&self) -> &Arc<Node> {
		&self.doc
	}

	pub fn steps(&self) -> &[Step] {
		&self.steps
	}

	pub fn doc_changed(&self) -> bool {
		!self.steps.is_empty()
	}

	/// The selection after the transaction: explicitly set, or the starting
	/// selection mapped through every step.
	pub fn selection(&self) -> &Selection {
		&self.selection
	}

	pub fn selection_set(&self) -> bool {
		self.selection_set
	}

	/// Stored marks after the transaction.
	pub fn stored_marks(&self) -> Option<&[Mark]> {
		self.stored_marks.as_deref()
	}

	pub fn stored_marks_set(&self) -> bool {
		self.stored_marks_set
	}

	/// Applies `step` and appends it.
	///
	/// # Errors
	///
	/// Returns the [`StepError`] and leaves the transaction unchanged if the
	/// step does not apply.
	pub fn step(&mut self, step: Step) -> Result<&mut Self, StepError> {
		let doc = step.apply(&self.doc, &self.schema)?;
		self.selection = self.selection.map(&step, &doc, &self.schema);
		self.doc = Arc::new(doc);
		self.steps.push(step);
		if !self.stored_marks_set {
			self.stored_marks = None;
		}
		Ok(self)
	}

	/// Replaces `[from, to)` with `content`.
	pub fn replace(&mut self, from: usize, to: usize, content: Vec<Node>) -> Result<&mut Self, StepError> {
		self.step(Step::Replace { from, to, content })
	}

	/// Inserts `content` at `pos`.
	pub fn insert(&mut self, pos: usize, content: Vec<Node>) -> Result<&mut Self, StepError> {
		self.step(Step::Insert { pos, content })
	}

	/// Deletes `[from, to)`.
	pub fn delete(&mut self, from: usize, to: usize) -> Result<&mut Self, StepError> {
		self.step(Step::Delete { from, to })
	}

	/// Replaces `[from, to)` with `text`, carrying the stored marks or the
	/// marks at `from`. Empty text deletes the range.
	pub fn insert_text(&mut self, text: &str, from: usize, to: usize) -> Result<&mut Self, StepError> {
		if text.is_empty() {
			return self.delete(from, to);
		}
		let marks = match &self.stored_marks {
			Some(marks) => marks.clone(),
			None => {
				let pos = ResolvedPos::resolve(&self.doc, from)?;
				self.schema.marks_at(&pos)
			}
		};
		let node = self.schema.text(text, marks);
		self.replace(from, to, vec![node])?;
		if !self.selection_set {
			self.selection = Selection::cursor(from + text.chars().count());
		}
		Ok(self)
	}

	/// Adds `mark` over `[from, to)`.
	pub fn add_mark(&mut self, from: usize, to: usize, mark: Mark) -> Result<&mut Self, StepError> {
		self.step(Step::AddMark { from, to, mark })
	}

	/// Removes marks of type `kind` over `[from, to)`.
	pub fn remove_mark(&mut self, from: usize, to: usize, kind: &str) -> Result<&mut Self, StepError> {
		self.step(Step::RemoveMark {
			from,
			to,
			mark: Mark::new(kind),
		})
	}

	/// Replaces the selection. Clears stored marks unless they are set afterwards.
	pub fn set_selection(&mut self, selection: Selection) -> &mut Self {
		self.selection = selection;
		self.selection_set = true;
		if !self.stored_marks_set {
			self.stored_marks = None;
		}
		self
	}

	/// Sets the marks applied to the next inserted text.
	pub fn set_stored_marks(&mut self, marks: Option<Vec<Mark>>) -> &mut Self {
		self.stored_marks = marks;
		self.stored_marks_set = true;
		self
	}

	/// Attaches metadata read by behaviors.
	pub fn set_meta(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
		self.meta.insert(key.into(), value.into());
		self
	}

	pub fn meta(&self, key: &str) -> Option<&Value> {
		self.meta.get(key)
	}

	/// Maps a position from the starting document through every step.
	pub fn map(&self, pos: usize, bias: Bias) -> usize {
		self.steps.iter().fold(pos, |pos, step| step.map_pos(pos, bias))
	}

	/// Appends the steps, selection, stored marks and metadata of `other`,
	/// which must have been built on this transaction's resulting document.
	///
	/// # Errors
	///
	/// Returns the first [`StepError`]; the transaction is unchanged on error.
	pub fn append(&mut self, other: Transaction) -> Result<&mut Self, StepError> {
		let mut merged = self.clone();
		for step in other.steps {
			merged.step(step)?;
		}
		if other.selection_set {
			merged.set_selection(other.selection);
		}
		if other.stored_marks_set {
			merged.set_stored_marks(other.stored_marks);
		}
		merged.meta.extend(other.meta);
		*self = merged;
		Ok(self)
	}
}
