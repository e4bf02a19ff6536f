//! Extensions that contribute behavior rather than document types.

use std::sync::Arc;

use vellum_editor::HistoryConfig;
use vellum_editor::commands::transaction_command;
use vellum_editor::history::{HISTORY, History, redo, undo};
use vellum_editor::input_rules::{INPUT_RULES, InputRules, undo_input_rule};
use vellum_model::ResolvedPos;
use vellum_primitives::{Behavior, Command, Selection, constant};
use vellum_registry::{CommandMap, ExtensionDescriptor};


fn bind(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
	pairs.iter().map(|(chord, cmd)| (chord.to_string(), cmd.to_string())).collect()
}

/// Binds the built-in editing commands to their usual keys.
pub fn base_keymap() -> ExtensionDescriptor {
	ExtensionDescriptor::behavior("base_keymap").keys(|_| {
		bind(&[
			("Enter", "enter"),
			("Backspace", "backspace"),
			("Mod-Backspace", "backspace"),
			("Shift-Backspace", "backspace"),
			("Delete", "del"),
			("Mod-Delete", "del"),
			("Mod-[", "lift"),
		])
	})
}

/// Selects the node enclosing the selection. Does not apply at the top level.
pub fn select_parent_node() -> Command {
	transaction_command(|state| {
		let doc = state.doc();
		let selection = state.selection();
		if *selection == Selection::All {
			return None;
		}
		let from = ResolvedPos::resolve(doc, selection.from()).ok()?;
		let depth = from.shared_depth(selection.to(doc));
		if depth == 0 {
			return None;
		}
		let mut tr = state.tr();
		tr.set_selection(Selection::node(from.before(depth)));
		Some(tr)
	})
}

/// `selectAll` on `Mod-a` and `selectParentNode` on `Escape`.
pub fn selection() -> ExtensionDescriptor {
	ExtensionDescriptor::behavior("selection")
		.commands(|_, _| {
			let mut map = CommandMap::new();
			map.insert("selectParentNode".into(), constant(select_parent_node()));
			map
		})
		.keys(|_| bind(&[("Mod-a", "selectAll"), ("Escape", "selectParentNode")]))
}

/// Undo history. The `depth` option bounds the undo stack.
pub fn history() -> ExtensionDescriptor {
	ExtensionDescriptor::behavior(HISTORY)
		.behaviors(|ctx, _| {
			let depth = ctx.config.usize("depth").unwrap_or(HistoryConfig::default().depth);
			vec![Arc::new(History::new(depth)) as Arc<dyn Behavior>]
		})
		.commands(|_, _| {
			let mut map = CommandMap::new();
			map.insert("undo".into(), constant(undo()));
			map.insert("redo".into(), constant(redo()));
			map
		})
		.keys(|_| bind(&[("Mod-z", "undo"), ("Mod-y", "redo"), ("Shift-Mod-z", "redo")]))
}

/// Tracks applied input rules so `undoInputRule` can revert them. The rules
/// themselves come from the node and mark extensions.
pub fn input_rules() -> ExtensionDescriptor {
	ExtensionDescriptor::behavior(INPUT_RULES)
		.behaviors(|_, _| vec![Arc::new(InputRules) as Arc<dyn Behavior>])
		.commands(|_, _| {
			let mut map = CommandMap::new();
			map.insert("undoInputRule".into(), constant(undo_input_rule()));
			map
		})
}
