//! Selections over a document.

use vellum_model::{DocumentSchema, Node, ResolvedPos};

use crate::step::{Bias, Step};

#[cfg(test)]
mod tests;

/// The selected part of a document.
///
/// Text selections are defined by an anchor (the fixed end) and a head (the
/// moving end). Both ends are expected to lie inside textblocks; mapping and
/// [`Selection::near`] restore that after edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
	/// A text range, possibly empty (a cursor).
	Text {
		/// The fixed end of the range.
		anchor: usize,
		/// The moving end of the range (cursor position).
		head: usize,
	},
	/// The single node starting at `pos`.
	Node { pos: usize },
	/// The whole document.
	All,
}

impl Selection {
	/// A collapsed text selection.
	pub fn cursor(pos: usize) -> Self {
		Self::Text { anchor: pos, head: pos }
	}

	pub fn text(anchor: usize, head: usize) -> Self {
		Self::Text { anchor, head }
	}

	pub fn node(pos: usize) -> Self {
		Self::Node { pos }
	}

	/// Start of the selected range.
	pub fn from(&self) -> usize {
		match *self {
			Self::Text { anchor, head } => anchor.min(head),
			Self::Node { pos } => pos,
			Self::All => 0,
		}
	}

	/// End of the selected range in `doc`.
	pub fn to(&self, doc: &Node) -> usize {
		match *self {
			Self::Text { anchor, head } => anchor.max(head),
			Self::Node { pos } => pos + doc.node_at(pos).map_or(0, Node::node_size),
			Self::All => doc.content_size(),
		}
	}

	/// Returns true if nothing is selected.
	pub fn is_empty(&self, doc: &Node) -> bool {
		self.from() == self.to(doc)
	}

	/// The cursor position of a collapsed text selection.
	pub fn cursor_pos(&self) -> Option<usize> {
		match *self {
			Self::Text { anchor, head } if anchor == head => Some(head),
			_ => None,
		}
	}

	/// The head of a text selection, or the end of other selections.
	pub fn head(&self, doc: &Node) -> usize {
		match *self {
			Self::Text { head, .. } => head,
			_ => self.to(doc),
		}
	}

	/// Maps the selection through `step`, whose result is `doc`.
	pub fn map(&self, step: &Step, doc: &Node, schema: &DocumentSchema) -> Self {
		match *self {
			Self::Text { anchor, head } => {
				let anchor = Self::snap(doc, schema, step.map_pos(anchor, Bias::Right), Bias::Right);
				let head = Self::snap(doc, schema, step.map_pos(head, Bias::Right), Bias::Right);
				Self::Text { anchor, head }
			}
			Self::Node { pos } => {
				let mapped = step.map_pos(pos, Bias::Right);
				let deleted = step
					.replaced_range()
					.is_some_and(|(from, to, _)| from <= pos && pos < to);
				if deleted || doc.node_at(mapped).is_none() {
					Self::near(doc, schema, mapped.min(doc.content_size()), Bias::Right)
				} else {
					Self::Node { pos: mapped }
				}
			}
			Self::All => Self::All,
		}
	}

	/// The first valid cursor position in `doc`.
	pub fn at_start(doc: &Node, schema: &DocumentSchema) -> Self {
		Self::near(doc, schema, 0, Bias::Right)
	}

	/// The last valid cursor position in `doc`.
	pub fn at_end(doc: &Node, schema: &DocumentSchema) -> Self {
		Self::near(doc, schema, doc.content_size(), Bias::Left)
	}

	/// A cursor at `pos` if it lies in a textblock, else at the nearest
	/// textblock boundary in the direction of `bias`, then the other way.
	///
	/// Falls back to [`Selection::All`] when the document has no textblock.
	pub fn near(doc: &Node, schema: &DocumentSchema, pos: usize, bias: Bias) -> Self {
		match nearest_text_pos(doc, schema, pos, bias) {
			Some(pos) => Self::cursor(pos),
			None => Self::All,
		}
	}

	/// Returns `pos` if it lies in a textblock, else the nearest such position.
	fn snap(doc: &Node, schema: &DocumentSchema, pos: usize, bias: Bias) -> usize {
		let pos = pos.min(doc.content_size());
		nearest_text_pos(doc, schema, pos, bias).unwrap_or(pos)
	}

	/// Returns true if every end of the selection is valid in `doc`.
	pub fn is_valid(&self, doc: &Node, schema: &DocumentSchema) -> bool {
		let in_textblock = |pos: usize| {
			ResolvedPos::resolve(doc, pos).is_ok_and(|rp| schema.is_textblock(rp.parent()))
		};
		match *self {
			Self::Text { anchor, head } => in_textblock(anchor) && in_textblock(head),
			Self::Node { pos } => doc.node_at(pos).is_some() && pos < doc.content_size(),
			Self::All => true,
		}
	}
}

/// Content ranges `(start, end)` of every textblock in document order.
pub fn textblock_ranges(doc: &Node, schema: &DocumentSchema) -> Vec<(usize, usize)> {
	let mut ranges = Vec::new();
	doc.nodes_between(0, doc.content_size(), &mut |node, pos, _, _| {
		if schema.is_textblock(node) {
			ranges.push((pos + 1, pos + 1 + node.content_size()));
			false
		} else {
			!node.is_text()
		}
	});
	ranges
}

fn nearest_text_pos(doc: &Node, schema: &DocumentSchema, pos: usize, bias: Bias) -> Option<usize> {
	let ranges = textblock_ranges(doc, schema);
	if ranges.iter().any(|&(start, end)| start <= pos && pos <= end) {
		return Some(pos);
	}
	let before = ranges.iter().rev().find(|(_, end)| *end < pos).map(|&(_, end)| end);
	let after = ranges.iter().find(|(start, _)| *start > pos).map(|&(start, _)| start);
	match bias {
		Bias::Left => before.or(after),
		Bias::Right => after.or(before),
	}
}
