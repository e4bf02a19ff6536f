//! Atomic document edits.
//!
//! A [`Step`] is the smallest unit of change. Steps are applied against a
//! document and the schema it conforms to, producing a new document or a
//! [`StepError`] without touching the input.

use thiserror::Error;
use vellum_model::{DocumentSchema, Mark, Node, NodeType, PositionError, ResolvedPos, SchemaViolation};


/// Bias determines how positions at step boundaries are mapped.
///
/// When content is inserted exactly at a position, bias decides whether the
/// position stays before the insertion or moves after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
	/// Position stays before insertions at the same location.
	Left,
	/// Position moves after insertions at the same location.
	Right,
}

/// A step could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
	#[error(transparent)]
	Position(#[from] PositionError),
	#[error("invalid range {from}..{to}")]
	InvalidRange { from: usize, to: usize },
	#[error("range {from}..{to} does not lie within a single parent")]
	CrossesParent { from: usize, to: usize },
	#[error(transparent)]
	Schema(#[from] SchemaViolation),
}

/// A single atomic edit.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
	/// Inserts `content` at `pos`.
	Insert { pos: usize, content: Vec<Node> },
	/// Deletes `[from, to)`.
	Delete { from: usize, to: usize },
	/// Replaces `[from, to)` with `content`.
	Replace { from: usize, to: usize, content: Vec<Node> },
	/// Adds `mark` to every inline node in `[from, to)` whose parent allows it.
	AddMark { from: usize, to: usize, mark: Mark },
	/// Removes marks of `mark`'s type from every inline node in `[from, to)`.
	RemoveMark { from: usize, to: usize, mark: Mark },
}

impl Step {
	/// The replaced range and the size of its replacement, `None` for mark steps.
	///
	/// # Returns
	/// `(from, to, new_size)` for structural steps.
	pub fn replaced_range(&self) -> Option<(usize, usize, usize)> {
		match self {
			Self::Insert { pos, content } => Some((*pos, *pos, vellum_model::fragment_size(content))),
			Self::Delete { from, to } => Some((*from, *to, 0)),
			Self::Replace { from, to, content } => Some((*from, *to, vellum_model::fragment_size(content))),
			Self::AddMark { .. } | Self::RemoveMark { .. } => None,
		}
	}

	/// Maps a position in the document before the step to the document after it.
	///
	/// Positions inside a replaced range collapse to its start (`Bias::Left`)
	/// or to the end of the replacement (`Bias::Right`). The range boundaries
	/// themselves stick to their side.
	pub fn map_pos(&self, pos: usize, bias: Bias) -> usize {
		let Some((from, to, size)) = self.replaced_range() else {
			return pos;
		};
		if pos < from {
			return pos;
		}
		if pos > to {
			return pos - (to - from) + size;
		}
		let side = if from == to {
			bias
		} else if pos == from {
			Bias::Left
		} else if pos == to {
			Bias::Right
		} else {
			bias
		};
		match side {
			Bias::Left => from,
			Bias::Right => from + size,
		}
	}

	/// Applies the step to `doc`.
	///
	/// # Errors
	///
	/// Returns a [`StepError`] if positions are invalid, the range crosses
	/// parents, or the result violates the schema.
	pub fn apply(&self, doc: &Node, schema: &DocumentSchema) -> Result<Node, StepError> {
		match self {
			Self::Insert { pos, content } => replace(doc, schema, *pos, *pos, content),
			Self::Delete { from, to } => replace(doc, schema, *from, *to, &[]),
			Self::Replace { from, to, content } => replace(doc, schema, *from, *to, content),
			Self::AddMark { from, to, mark } => {
				let mark = schema.mark(&mark.kind, &mark.attrs)?;
				map_inline_marks(doc, schema, *from, *to, &|parent, marks| {
					parent
						.allows_mark(&mark.kind)
						.then(|| schema.add_mark_to_set(&mark, marks))
				})
			}
			Self::RemoveMark { from, to, mark } => map_inline_marks(doc, schema, *from, *to, &|_, marks| {
				Some(schema.remove_mark_from_set(&mark.kind, marks))
			}),
		}
	}
}

fn replace(doc: &Node, schema: &DocumentSchema, from: usize, to: usize, content: &[Node]) -> Result<Node, StepError> {
	if from > to {
		return Err(StepError::InvalidRange { from, to });
	}
	let start = ResolvedPos::resolve(doc, from)?;
	let end = ResolvedPos::resolve(doc, to)?;
	if !start.same_parent(&end) {
		return Err(StepError::CrossesParent { from, to });
	}
	for node in content {
		schema.check(node)?;
	}

	let depth = start.depth();
	let parent = start.parent();
	let first = start.index(depth);
	let last = end.index(depth);

	let mut children = Vec::with_capacity(parent.child_count() + content.len());
	children.extend(parent.content()[..first].iter().cloned());
	if start.text_offset() > 0
		&& let Some(child) = parent.child(first)
	{
		children.push(child.cut_text(0, start.text_offset()));
	}
	children.extend(content.iter().cloned());
	let resume = if end.text_offset() > 0 {
		if let Some(child) = parent.child(last) {
			children.push(child.cut_text(end.text_offset(), child.node_size()));
		}
		last + 1
	} else {
		last
	};
	children.extend(parent.content().iter().skip(resume).cloned());

	let updated = parent.copy(children);
	schema.check_content(updated.kind(), updated.content())?;
	Ok(rebuild(&start, depth, updated))
}

/// Replaces the ancestor at `depth` of `pos` with `node` and rebuilds the path to the root.
fn rebuild(pos: &ResolvedPos<'_>, depth: usize, node: Node) -> Node {
	(0..depth)
		.rev()
		.fold(node, |child, d| pos.node(d).replace_child(pos.index(d), child))
}

type MarkFn<'a> = dyn Fn(&NodeType, &[Mark]) -> Option<Vec<Mark>> + 'a;

fn map_inline_marks(
	doc: &Node,
	schema: &DocumentSchema,
	from: usize,
	to: usize,
	f: &MarkFn<'_>,
) -> Result<Node, StepError> {
	if from > to {
		return Err(StepError::InvalidRange { from, to });
	}
	let size = doc.content_size();
	if to > size {
		return Err(PositionError::OutOfRange { pos: to, size }.into());
	}
	map_children(doc, 0, from, to, schema, f)
}

/// Rebuilds `node`, whose content starts at absolute position `base`,
/// rewriting the marks of inline descendants overlapping `[from, to)`.
fn map_children(
	node: &Node,
	base: usize,
	from: usize,
	to: usize,
	schema: &DocumentSchema,
	f: &MarkFn<'_>,
) -> Result<Node, StepError> {
	let ty = schema
		.node_type(node.kind())
		.ok_or_else(|| SchemaViolation::UnknownNodeType(node.kind().to_string()))?;
	let mut children = Vec::with_capacity(node.child_count());
	let mut pos = base;
	for child in node.content() {
		let size = child.node_size();
		let end = pos + size;
		if end <= from || pos >= to {
			children.push(child.clone());
		} else if child.is_text() {
			let cut_from = from.saturating_sub(pos);
			let cut_to = (to - pos).min(size);
			if cut_from > 0 {
				children.push(child.cut_text(0, cut_from));
			}
			let middle = child.cut_text(cut_from, cut_to);
			match f(ty, middle.marks()) {
				Some(marks) => children.push(middle.mark(marks)),
				None => children.push(middle),
			}
			if cut_to < size {
				children.push(child.cut_text(cut_to, size));
			}
		} else if child.is_leaf() {
			match f(ty, child.marks()) {
				Some(marks) if schema.node_type(child.kind()).is_some_and(NodeType::is_inline) => {
					children.push(child.mark(marks))
				}
				_ => children.push(child.clone()),
			}
		} else {
			children.push(map_children(child, pos + 1, from, to, schema, f)?);
		}
		pos = end;
	}
	Ok(node.copy(children))
}
