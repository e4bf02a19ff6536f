//! The immutable document tree.
//!
//! A [`Node`] is either a text run (carrying a string and a mark set), a leaf
//! (an atom such as a horizontal rule or hard break) or a branch holding child
//! nodes. Nodes are values: editing produces new trees, never mutates shared
//! ones.

use serde::{Deserialize, Serialize};

use crate::attrs::{Attrs, Value};
use crate::mark::Mark;


/// A node in the document tree.
///
/// The serialized form is the JSON content shape used for documents
/// (`{"type": "paragraph", "content": [...]}`), so trees round-trip through
/// `serde_json` without a separate representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
	#[serde(rename = "type")]
	kind: String,
	#[serde(default, skip_serializing_if = "Attrs::is_empty")]
	attrs: Attrs,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	content: Vec<Node>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	marks: Vec<Mark>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	text: Option<String>,
	/// Leaf nodes occupy a single position. Set from the node type by the schema.
	#[serde(skip)]
	leaf: bool,
}

impl Node {
	/// Creates a branch node. Adjacent text children are normalized.
	pub fn branch(kind: impl Into<String>, attrs: Attrs, content: Vec<Node>) -> Self {
		Self {
			kind: kind.into(),
			attrs,
			content: normalize_fragment(content),
			marks: Vec::new(),
			text: None,
			leaf: false,
		}
	}

	/// Creates a leaf (atom) node.
	pub fn leaf(kind: impl Into<String>, attrs: Attrs) -> Self {
		Self {
			kind: kind.into(),
			attrs,
			content: Vec::new(),
			marks: Vec::new(),
			text: None,
			leaf: true,
		}
	}

	/// Creates a text node without marks.
	pub fn text(text: impl Into<String>) -> Self {
		Self {
			kind: "text".to_string(),
			attrs: Attrs::new(),
			content: Vec::new(),
			marks: Vec::new(),
			text: Some(text.into()),
			leaf: false,
		}
	}

	/// Returns the node with its mark set replaced.
	pub fn with_marks(mut self, marks: Vec<Mark>) -> Self {
		self.marks = marks;
		self
	}

	/// Returns the node with an additional attribute.
	pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.attrs.insert(name.into(), value.into());
		self
	}

	/// Name of the node type.
	pub fn kind(&self) -> &str {
		&self.kind
	}

	pub fn attrs(&self) -> &Attrs {
		&self.attrs
	}

	pub fn attr(&self, name: &str) -> Option<&Value> {
		self.attrs.get(name)
	}

	pub fn content(&self) -> &[Node] {
		&self.content
	}

	pub fn marks(&self) -> &[Mark] {
		&self.marks
	}

	/// Text of a text node, `None` for every other node.
	pub fn as_text(&self) -> Option<&str> {
		self.text.as_deref()
	}

	pub fn is_text(&self) -> bool {
		self.text.is_some()
	}

	pub fn is_leaf(&self) -> bool {
		self.leaf
	}

	pub fn child_count(&self) -> usize {
		self.content.len()
	}

	pub fn child(&self, index: usize) -> Option<&Node> {
		self.content.get(index)
	}

	pub fn first_child(&self) -> Option<&Node> {
		self.content.first()
	}

	pub fn last_child(&self) -> Option<&Node> {
		self.content.last()
	}

	/// Number of positions this node occupies inside its parent.
	pub fn node_size(&self) -> usize {
		match &self.text {
			Some(text) => text.chars().count(),
			None if self.leaf => 1,
			None => self.content_size() + 2,
		}
	}

	/// Number of positions occupied by this node's children.
	pub fn content_size(&self) -> usize {
		fragment_size(&self.content)
	}

	/// Concatenated text of every descendant text node.
	pub fn text_content(&self) -> String {
		match &self.text {
			Some(text) => text.clone(),
			None => self.content.iter().map(Node::text_content).collect(),
		}
	}

	/// Returns a copy of this node with different children.
	pub fn copy(&self, content: Vec<Node>) -> Node {
		Node {
			kind: self.kind.clone(),
			attrs: self.attrs.clone(),
			content: normalize_fragment(content),
			marks: self.marks.clone(),
			text: None,
			leaf: self.leaf,
		}
	}

	/// Returns a copy of a text node with different text and the same marks.
	pub fn with_text(&self, text: impl Into<String>) -> Node {
		Node {
			text: Some(text.into()),
			..self.clone()
		}
	}

	/// Returns a copy of this node with a different mark set.
	pub fn mark(&self, marks: Vec<Mark>) -> Node {
		Node {
			marks,
			..self.clone()
		}
	}

	/// Returns a copy of this node retyped to `kind` with `attrs`, keeping children.
	pub fn retyped(&self, kind: impl Into<String>, attrs: Attrs) -> Node {
		Node {
			kind: kind.into(),
			attrs,
			..self.clone()
		}
	}

	/// Cuts a text node to the character range `[from, to)`.
	///
	/// Non-text nodes are returned unchanged.
	pub fn cut_text(&self, from: usize, to: usize) -> Node {
		match &self.text {
			Some(text) => {
				let cut: String = text.chars().skip(from).take(to.saturating_sub(from)).collect();
				self.with_text(cut)
			}
			None => self.clone(),
		}
	}

	/// Returns a copy with the child at `index` replaced.
	pub fn replace_child(&self, index: usize, child: Node) -> Node {
		let mut content = self.content.clone();
		if index < content.len() {
			content[index] = child;
		}
		self.copy(content)
	}

	/// Returns the node that starts exactly at `pos`, descending as needed.
	pub fn node_at(&self, pos: usize) -> Option<&Node> {
		let mut node = self;
		let mut pos = pos;
		loop {
			let mut offset = 0;
			let mut found = None;
			for child in &node.content {
				let end = offset + child.node_size();
				if pos < end {
					found = Some((child, offset));
					break;
				}
				offset = end;
			}
			let (child, start) = found?;
			if start == pos || child.is_text() {
				return Some(child);
			}
			node = child;
			pos -= start + 1;
		}
	}

	/// Calls `f` for every descendant overlapping `[from, to)`.
	///
	/// `f` receives the node, its absolute start position, its parent and its
	/// index in the parent. Returning `false` skips the node's children.
	pub fn nodes_between(&self, from: usize, to: usize, f: &mut dyn FnMut(&Node, usize, &Node, usize) -> bool) {
		self.nodes_between_inner(from, to, 0, f);
	}

	fn nodes_between_inner(
		&self,
		from: usize,
		to: usize,
		base: usize,
		f: &mut dyn FnMut(&Node, usize, &Node, usize) -> bool,
	) {
		let mut pos = 0;
		for (index, child) in self.content.iter().enumerate() {
			if pos >= to {
				break;
			}
			let end = pos + child.node_size();
			if end > from && f(child, base + pos, self, index) && !child.content.is_empty() {
				let start = pos + 1;
				child.nodes_between_inner(
					from.saturating_sub(start),
					child.content_size().min(to.saturating_sub(start)),
					base + start,
					f,
				);
			}
			pos = end;
		}
	}

	/// Collects the text in `[from, to)`.
	///
	/// `block_separator` is inserted between branch nodes that contain text,
	/// `leaf_text` stands in for every leaf node.
	pub fn text_between(&self, from: usize, to: usize, block_separator: Option<&str>, leaf_text: &str) -> String {
		let mut out = String::new();
		let mut separated = true;
		self.nodes_between(from, to, &mut |node, pos, _, _| {
			if let Some(text) = node.as_text() {
				let start = from.saturating_sub(pos);
				let end = to.saturating_sub(pos).min(text.chars().count());
				out.extend(text.chars().skip(start).take(end.saturating_sub(start)));
				separated = block_separator.is_none();
			} else if node.is_leaf() {
				out.push_str(leaf_text);
				separated = block_separator.is_none();
			} else if !separated && let Some(sep) = block_separator {
				out.push_str(sep);
				separated = true;
			}
			true
		});
		out
	}

	pub(crate) fn set_leaf(&mut self, leaf: bool) {
		self.leaf = leaf;
	}

	pub(crate) fn attrs_mut(&mut self) -> &mut Attrs {
		&mut self.attrs
	}

	pub(crate) fn marks_mut(&mut self) -> &mut Vec<Mark> {
		&mut self.marks
	}

	pub(crate) fn take_content(&mut self) -> Vec<Node> {
		std::mem::take(&mut self.content)
	}

	pub(crate) fn set_content(&mut self, content: Vec<Node>) {
		self.content = content;
	}
}

/// Total size of a list of sibling nodes.
pub fn fragment_size(nodes: &[Node]) -> usize {
	nodes.iter().map(Node::node_size).sum()
}

/// Merges adjacent text nodes with equal mark sets and drops empty text.
pub fn normalize_fragment(nodes: Vec<Node>) -> Vec<Node> {
	let mut out: Vec<Node> = Vec::with_capacity(nodes.len());
	for node in nodes {
		if node.as_text().is_some_and(str::is_empty) {
			continue;
		}
		if let Some(last) = out.last_mut()
			&& let (Some(prev), Some(next)) = (last.text.as_mut(), node.text.as_deref())
			&& last.marks == node.marks
		{
			prev.push_str(next);
			continue;
		}
		out.push(node);
	}
	out
}
