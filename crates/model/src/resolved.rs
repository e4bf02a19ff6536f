use smallvec::SmallVec;
use thiserror::Error;

use crate::mark::Mark;
use crate::node::Node;

/// A position could not be resolved against a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
	#[error("position {pos} is outside the document (content size {size})")]
	OutOfRange { pos: usize, size: usize },
}

#[derive(Debug, Clone, Copy)]
struct Level<'a> {
	node: &'a Node,
	/// Index of the child the position points into (or before).
	index: usize,
	/// Absolute position of the start of `node`'s content.
	start: usize,
}

/// A position resolved into the path of ancestors that contain it.
///
/// Depth `0` is the root; [`ResolvedPos::parent`] is the innermost node whose
/// content holds the position. Text nodes are never part of the path: a
/// position inside a text run resolves into its parent with a non-zero
/// [`ResolvedPos::text_offset`].
#[derive(Debug, Clone)]
pub struct ResolvedPos<'a> {
	pos: usize,
	levels: SmallVec<[Level<'a>; 4]>,
	parent_offset: usize,
	text_offset: usize,
}

impl<'a> ResolvedPos<'a> {
	/// Resolves `pos` against `doc`.
	///
	/// # Errors
	///
	/// Returns [`PositionError::OutOfRange`] when `pos` exceeds the content size.
	pub fn resolve(doc: &'a Node, pos: usize) -> Result<Self, PositionError> {
		let size = doc.content_size();
		if pos > size {
			return Err(PositionError::OutOfRange { pos, size });
		}

		let mut levels = SmallVec::new();
		let mut node = doc;
		let mut start = 0;
		let mut rel = pos;
		loop {
			let (index, offset) = find_index(node, rel);
			levels.push(Level { node, index, start });
			let rem = rel - offset;
			if rem == 0 {
				return Ok(Self {
					pos,
					levels,
					parent_offset: rel,
					text_offset: 0,
				});
			}
			let Some(child) = node.child(index) else {
				return Err(PositionError::OutOfRange { pos, size });
			};
			if child.is_text() || child.is_leaf() {
				return Ok(Self {
					pos,
					levels,
					parent_offset: rel,
					text_offset: rem,
				});
			}
			node = child;
			start += offset + 1;
			rel = rem - 1;
		}
	}

	/// The absolute position.
	pub fn pos(&self) -> usize {
		self.pos
	}

	/// Depth of the innermost containing node.
	pub fn depth(&self) -> usize {
		self.levels.len() - 1
	}

	/// Ancestor at `depth`.
	pub fn node(&self, depth: usize) -> &'a Node {
		self.levels[depth].node
	}

	/// The innermost node containing the position.
	pub fn parent(&self) -> &'a Node {
		self.node(self.depth())
	}

	/// The root node.
	pub fn doc(&self) -> &'a Node {
		self.node(0)
	}

	/// Index into the ancestor at `depth`.
	pub fn index(&self, depth: usize) -> usize {
		self.levels[depth].index
	}

	/// Index pointing after the position in the ancestor at `depth`.
	pub fn index_after(&self, depth: usize) -> usize {
		let index = self.index(depth);
		if depth == self.depth() && self.text_offset == 0 {
			index
		} else {
			index + 1
		}
	}

	/// Offset into the parent's content.
	pub fn parent_offset(&self) -> usize {
		self.parent_offset
	}

	/// Offset into the text node the position points into, `0` between nodes.
	pub fn text_offset(&self) -> usize {
		self.text_offset
	}

	/// Absolute position at which the content of the ancestor at `depth` starts.
	pub fn start(&self, depth: usize) -> usize {
		self.levels[depth].start
	}

	/// Absolute position at which the content of the ancestor at `depth` ends.
	pub fn end(&self, depth: usize) -> usize {
		self.start(depth) + self.node(depth).content_size()
	}

	/// Absolute position just before the ancestor at `depth` (`depth >= 1`).
	pub fn before(&self, depth: usize) -> usize {
		self.start(depth) - 1
	}

	/// Absolute position just after the ancestor at `depth` (`depth >= 1`).
	pub fn after(&self, depth: usize) -> usize {
		self.end(depth) + 1
	}

	/// The node directly after the position, cut when pointing into text.
	pub fn node_after(&self) -> Option<Node> {
		let child = self.parent().child(self.index(self.depth()))?;
		if self.text_offset > 0 {
			Some(child.cut_text(self.text_offset, child.node_size()))
		} else {
			Some(child.clone())
		}
	}

	/// The node directly before the position, cut when pointing into text.
	pub fn node_before(&self) -> Option<Node> {
		let index = self.index(self.depth());
		if self.text_offset > 0 {
			return self.parent().child(index).map(|child| child.cut_text(0, self.text_offset));
		}
		index.checked_sub(1).and_then(|i| self.parent().child(i)).cloned()
	}

	/// Marks active at the position: those of the text it points into, else of
	/// the node before it, else of the node after it.
	pub fn marks(&self) -> Vec<Mark> {
		let parent = self.parent();
		let index = self.index(self.depth());
		if self.text_offset > 0 {
			return parent.child(index).map(|c| c.marks().to_vec()).unwrap_or_default();
		}
		index
			.checked_sub(1)
			.and_then(|i| parent.child(i))
			.or_else(|| parent.child(index))
			.map(|c| c.marks().to_vec())
			.unwrap_or_default()
	}

	/// Deepest depth whose content contains both this position and `pos`.
	pub fn shared_depth(&self, pos: usize) -> usize {
		(0..=self.depth())
			.rev()
			.find(|&d| self.start(d) <= pos && self.end(d) >= pos)
			.unwrap_or(0)
	}

	/// Returns true if `other` resolves into the same parent node.
	pub fn same_parent(&self, other: &ResolvedPos<'_>) -> bool {
		self.depth() == other.depth() && self.start(self.depth()) == other.start(other.depth())
	}
}

/// Finds the child index for a content offset and the offset at which that child starts.
fn find_index(node: &Node, offset: usize) -> (usize, usize) {
	let mut pos = 0;
	for (index, child) in node.content().iter().enumerate() {
		let end = pos + child.node_size();
		if end > offset {
			return (index, pos);
		}
		pos = end;
	}
	(node.child_count(), pos)
}
