//! Schema and document builders shared by unit tests.

use std::sync::Arc;

use vellum_model::{AttrSpec, Attrs, DocumentSchema, MarkSpec, Node, NodeSpec, SchemaBuilder};

use crate::selection::Selection;
use crate::state::{Behavior, EditorState};

pub(crate) fn schema() -> Arc<DocumentSchema> {
	let mut b = SchemaBuilder::new();
	b.add_node("doc", NodeSpec::new("doc").content("block+"))
		.add_node("paragraph", NodeSpec::new("paragraph").content("inline*").group("block"))
		.add_node(
			"heading",
			NodeSpec::new("heading")
				.content("inline*")
				.group("block")
				.attr("level", AttrSpec::with_default(1)),
		)
		.add_node("blockquote", NodeSpec::new("blockquote").content("block+").group("block"))
		.add_node("horizontal_rule", NodeSpec::new("horizontal_rule").group("block"))
		.add_node("text", NodeSpec::new("text").group("inline"))
		.add_node("hard_break", NodeSpec::new("hard_break").group("inline").inline())
		.add_mark("em", MarkSpec::new("em"))
		.add_mark("strong", MarkSpec::new("strong"))
		.add_mark("code", MarkSpec::new("code").excludes("_"));
	Arc::new(b.build().expect("test schema is valid"))
}

pub(crate) fn p(text: &str) -> Node {
	let content = if text.is_empty() { vec![] } else { vec![Node::text(text)] };
	Node::branch("paragraph", Attrs::new(), content)
}

pub(crate) fn doc(content: Vec<Node>) -> Node {
	Node::branch("doc", Attrs::new(), content)
}

pub(crate) fn prepared(schema: &DocumentSchema, node: Node) -> Node {
	schema.prepare(node).expect("test document is valid")
}

pub(crate) fn state_with(content: Vec<Node>, selection: Option<Selection>, behaviors: Vec<Arc<dyn Behavior>>) -> EditorState {
	let schema = schema();
	let doc = prepared(&schema, doc(content));
	EditorState::create(schema, doc, selection, behaviors.into()).expect("test state is valid")
}

pub(crate) fn state(content: Vec<Node>) -> EditorState {
	state_with(content, None, Vec::new())
}

/// Text of every top-level block, in order.
pub(crate) fn blocks(doc: &Node) -> Vec<String> {
	doc.content().iter().map(Node::text_content).collect()
}
