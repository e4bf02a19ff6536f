//! Extensions and document builders shared by unit tests.

use std::sync::Arc;

use serde_json::json;
use vellum_model::{AttrSpec, Attrs, MarkSpec, Node, NodeSpec};
use vellum_primitives::{Behavior, Command, EditorState, Selection, Transaction, constant};
use vellum_registry::{CommandMap, ExtensionDescriptor, Registry};

use crate::commands::{builtins, toggle_mark};
use crate::config::EditorConfig;
use crate::editor::{Content, Editor};
use crate::history::{HISTORY, History, redo, undo};
use crate::input_rules::{INPUT_RULES, InputRules, textblock_type_rule, undo_input_rule};

fn toggle(name: &str, kind: &'static str) -> CommandMap {
	let mut map = CommandMap::new();
	map.insert(name.into(), constant(toggle_mark(kind, Attrs::new())));
	map
}

fn keys(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
	pairs.iter().map(|(k, c)| (k.to_string(), c.to_string())).collect()
}

/// A small but complete rich-text extension set.
pub(crate) fn extensions() -> Vec<ExtensionDescriptor> {
	vec![
		ExtensionDescriptor::node("doc", |_| NodeSpec::new("doc").content("block+")),
		ExtensionDescriptor::node("paragraph", |_| NodeSpec::new("paragraph").content("inline*").group("block")),
		ExtensionDescriptor::node("heading", |_| {
			NodeSpec::new("heading")
				.content("inline*")
				.group("block")
				.defining()
				.attr("level", AttrSpec::with_default(1))
		}),
		ExtensionDescriptor::node("blockquote", |_| NodeSpec::new("blockquote").content("block+").group("block")),
		ExtensionDescriptor::node("code_block", |_| {
			NodeSpec::new("code_block").content("text*").group("block").code().marks("")
		}),
		ExtensionDescriptor::node("horizontal_rule", |_| NodeSpec::new("horizontal_rule").group("block")),
		ExtensionDescriptor::node("text", |_| NodeSpec::new("text").group("inline")),
		ExtensionDescriptor::node("hard_break", |_| NodeSpec::new("hard_break").group("inline").inline()),
		ExtensionDescriptor::mark("em", |_| MarkSpec::new("em"))
			.commands(|_, _| toggle("toggleItalic", "em"))
			.keys(|_| keys(&[("Mod-i", "toggleItalic")])),
		ExtensionDescriptor::mark("strong", |_| MarkSpec::new("strong"))
			.commands(|_, _| toggle("toggleBold", "strong"))
			.keys(|_| keys(&[("Mod-b", "toggleBold")])),
		ExtensionDescriptor::mark("code", |_| MarkSpec::new("code").excludes("_")),
		ExtensionDescriptor::behavior(HISTORY)
			.behaviors(|ctx, _| {
				let depth = ctx.config.usize("depth").unwrap_or(crate::config::DEFAULT_HISTORY_DEPTH);
				vec![Arc::new(History::new(depth)) as Arc<dyn Behavior>]
			})
			.commands(|_, _| {
				let mut map = CommandMap::new();
				map.insert("undo".into(), constant(undo()));
				map.insert("redo".into(), constant(redo()));
				map
			})
			.keys(|_| keys(&[("Mod-z", "undo"), ("Shift-Mod-z", "redo")])),
		ExtensionDescriptor::behavior(INPUT_RULES)
			.requires("heading")
			.behaviors(|_, _| vec![Arc::new(InputRules) as Arc<dyn Behavior>])
			.commands(|_, _| {
				let mut map = CommandMap::new();
				map.insert("undoInputRule".into(), constant(undo_input_rule()));
				map
			})
			.input_rules(|_| {
				Ok(vec![textblock_type_rule("heading", r"^(#{1,6})\s$", "heading", |caps| {
					let level = caps.get(1).map_or(1, |m| m.as_str().len());
					Attrs::from([("level".to_string(), json!(level))])
				})?])
			}),
		ExtensionDescriptor::behavior("base_keymap")
			.keys(|_| keys(&[("Enter", "enter"), ("Backspace", "backspace"), ("Delete", "del"), ("Mod-a", "selectAll")])),
	]
}

pub(crate) fn registry() -> Registry {
	Registry::build(&extensions(), EditorConfig::default().registry_options(), builtins()).expect("test extensions assemble")
}

pub(crate) fn p(text: &str) -> Node {
	let content = if text.is_empty() { vec![] } else { vec![Node::text(text)] };
	Node::branch("paragraph", Attrs::new(), content)
}

pub(crate) fn h(level: u64, text: &str) -> Node {
	p(text).retyped("heading", Attrs::from([("level".to_string(), json!(level))]))
}

pub(crate) fn quote(content: Vec<Node>) -> Node {
	Node::branch("blockquote", Attrs::new(), content)
}

pub(crate) fn code(text: &str) -> Node {
	p(text).retyped("code_block", Attrs::new())
}

pub(crate) fn hr() -> Node {
	Node::leaf("horizontal_rule", Attrs::new())
}

pub(crate) fn doc(content: Vec<Node>) -> Node {
	Node::branch("doc", Attrs::new(), content)
}

/// A state over `content` with the test extensions' behaviors installed.
pub(crate) fn state(content: Vec<Node>, selection: Selection) -> EditorState {
	let registry = registry();
	let doc = registry.schema().prepare(doc(content)).expect("test document is valid");
	EditorState::create(Arc::clone(registry.schema()), doc, Some(selection), Arc::clone(registry.behaviors()))
		.expect("test state is valid")
}

/// Runs `cmd` for real, returning the resulting state if it applied.
pub(crate) fn run(cmd: &Command, state: &EditorState) -> Option<EditorState> {
	let mut produced = None;
	let mut capture = |tr: Transaction| produced = Some(tr);
	if !cmd(state, Some(&mut capture)) {
		return None;
	}
	let tr = produced.expect("applied command dispatched");
	Some(state.apply(&tr).expect("command transaction applies"))
}

pub(crate) fn editor(content: Vec<Node>) -> Editor {
	Editor::new(EditorConfig::default(), &extensions(), Content::Doc(doc(content))).expect("test editor builds")
}

/// Text of every top-level block, in order.
pub(crate) fn blocks(doc: &Node) -> Vec<String> {
	doc.content().iter().map(Node::text_content).collect()
}

/// Kind of every top-level block, in order.
pub(crate) fn kinds(doc: &Node) -> Vec<&str> {
	doc.content().iter().map(Node::kind).collect()
}
