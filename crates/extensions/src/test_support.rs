//! Editors and document builders shared by unit tests.

use serde_json::json;
use vellum_editor::{Content, Editor, EditorConfig};
use vellum_model::{Attrs, Node};

use crate::basic_editor;

pub(crate) fn p(text: &str) -> Node {
	let content = if text.is_empty() { vec![] } else { vec![Node::text(text)] };
	Node::branch("paragraph", Attrs::new(), content)
}

pub(crate) fn h(level: u64, text: &str) -> Node {
	p(text).retyped("heading", Attrs::from([("level".to_string(), json!(level))]))
}

pub(crate) fn doc(content: Vec<Node>) -> Node {
	Node::branch("doc", Attrs::new(), content)
}

/// A basic-kit editor over `content` with the cursor at the start.
pub(crate) fn editor(content: Vec<Node>) -> Editor {
	basic_editor(EditorConfig::default(), Content::Doc(doc(content))).expect("basic editor builds")
}

pub(crate) fn typing(editor: &mut Editor, text: &str) {
	for ch in text.chars() {
		assert!(editor.handle_text_input(&ch.to_string()), "typing {ch:?}");
	}
}

/// Text of every top-level block, in order.
pub(crate) fn blocks(doc: &Node) -> Vec<String> {
	doc.content().iter().map(Node::text_content).collect()
}

/// Kind of every top-level block, in order.
pub(crate) fn kinds(doc: &Node) -> Vec<&str> {
	doc.content().iter().map(Node::kind).collect()
}

/// Mark names on each inline child of the first block.
pub(crate) fn runs(doc: &Node) -> Vec<(String, Vec<String>)> {
	doc.child(0)
		.map(|block| {
			block
				.content()
				.iter()
				.map(|n| (n.text_content(), n.marks().iter().map(|m| m.kind.clone()).collect()))
				.collect()
		})
		.unwrap_or_default()
}
