//! The built-in command library.
//!
//! [`builtins`] returns the factories every editor starts with. The public
//! constructors are also the building blocks extensions use for their own
//! commands, e.g. a heading extension binding `setHeading2` to
//! [`set_block_type`].
//!
//! Every command follows the dry-run contract: called without a dispatch
//! callback it only reports whether it applies; called with one it hands
//! exactly one transaction over and returns `true`.

use serde_json::Value;
use vellum_model::{DocumentSchema, Node};
use vellum_primitives::{Command, CommandArgs, Dispatch, EditorState, Transaction, command, constant, factory, first_command};
use vellum_registry::CommandMap;

use crate::input_rules::undo_input_rule;

mod marks;
mod selection;
mod structure;
mod text;

#[cfg(test)]
mod tests;

pub use marks::{mark_active, toggle_mark};
pub use selection::{select_all, select_node_backward, select_node_forward, select_text, set_node_selection, set_text_selection};
pub use structure::{
	BlockPlacement, create_paragraph_near, insert_block, insert_node, join_backward, join_forward, lift, lift_empty_block,
	set_block_type, split_block, toggle_wrap, wrap_in,
};
pub use text::{delete_selection, insert_text, newline_in_code, replace_range_text};

/// Builds a command from a function producing its transaction.
///
/// `build` returning `None` means the command does not apply.
pub fn transaction_command<F>(build: F) -> Command
where
	F: Fn(&EditorState) -> Option<Transaction> + Send + Sync + 'static,
{
	command(move |state, dispatch| match build(state) {
		Some(tr) => commit(tr, dispatch),
		None => false,
	})
}

/// Hands `tr` to `dispatch` when present. Returns `true`.
pub(crate) fn commit(tr: Transaction, dispatch: Option<Dispatch<'_>>) -> bool {
	if let Some(dispatch) = dispatch {
		dispatch(tr);
	}
	true
}

/// `backspace`: undo a just-applied input rule, else delete the selection,
/// else join backward, else select the node before.
pub fn backspace() -> Command {
	first_command(vec![undo_input_rule(), delete_selection(), join_backward(), select_node_backward()])
}

/// `del`: delete the selection, else join forward, else select the node after.
pub fn del() -> Command {
	first_command(vec![delete_selection(), join_forward(), select_node_forward()])
}

/// `enter`: newline in code, else a paragraph next to a selected block, else
/// lift an empty block, else split the block.
pub fn enter() -> Command {
	first_command(vec![newline_in_code(), create_paragraph_near(), lift_empty_block(), split_block()])
}

/// Factories for every built-in command, keyed by name.
pub fn builtins() -> CommandMap {
	let mut map = CommandMap::new();
	map.insert(
		"selectText".into(),
		factory(|args| select_text(args.usize(0).unwrap_or(0), args.usize(1).unwrap_or(0), args.usize(2).unwrap_or(0))),
	);
	map.insert("selectAll".into(), constant(select_all()));
	map.insert(
		"setTextSelection".into(),
		factory(|args| {
			let anchor = args.usize(0).unwrap_or(0);
			set_text_selection(anchor, args.usize(1).unwrap_or(anchor))
		}),
	);
	map.insert("setNodeSelection".into(), factory(|args| set_node_selection(args.usize(0).unwrap_or(0))));
	map.insert(
		"insertText".into(),
		factory(|args| {
			let range = args.usize(1).map(|from| (from, args.usize(2).unwrap_or(from)));
			insert_text(args.str(0).unwrap_or_default(), range)
		}),
	);
	map.insert("deleteSelection".into(), constant(delete_selection()));
	map.insert(
		"replaceRangeText".into(),
		factory(|args| {
			let from = args.usize(0).unwrap_or(0);
			replace_range_text(from, args.usize(1).unwrap_or(from), args.str(2).unwrap_or_default())
		}),
	);
	map.insert("joinBackward".into(), constant(join_backward()));
	map.insert("joinForward".into(), constant(join_forward()));
	map.insert("selectNodeBackward".into(), constant(select_node_backward()));
	map.insert("selectNodeForward".into(), constant(select_node_forward()));
	map.insert("splitBlock".into(), constant(split_block()));
	map.insert("newlineInCode".into(), constant(newline_in_code()));
	map.insert("createParagraphNear".into(), constant(create_paragraph_near()));
	map.insert("liftEmptyBlock".into(), constant(lift_empty_block()));
	map.insert("lift".into(), constant(lift()));
	for (name, placement) in [
		("insertBlockBefore", BlockPlacement::Before),
		("insertBlockAfter", BlockPlacement::After),
		("insertBlockSmart", BlockPlacement::Smart),
	] {
		map.insert(name.into(), factory(move |args| insert_block_from_args(args, placement)));
	}
	map.insert("backspace".into(), constant(backspace()));
	map.insert("del".into(), constant(del()));
	map.insert("enter".into(), constant(enter()));
	map
}

/// `insertBlock*` arguments: a position, then the node as document JSON.
fn insert_block_from_args(args: &CommandArgs, placement: BlockPlacement) -> Command {
	let pos = args.usize(0).unwrap_or(0);
	let node = args.get(1).cloned().unwrap_or(Value::Null);
	insert_block(pos, node, placement)
}

/// Children of `node` within content offsets `[from, to)`, cutting text runs.
///
/// Offsets must not fall inside a non-text child.
pub(crate) fn slice_content(node: &Node, from: usize, to: usize) -> Vec<Node> {
	let mut out = Vec::new();
	let mut pos = 0;
	for child in node.content() {
		let end = pos + child.node_size();
		if end > from && pos < to {
			if child.is_text() {
				out.push(child.cut_text(from.saturating_sub(pos), to.min(end) - pos));
			} else {
				out.push(child.clone());
			}
		}
		pos = end;
	}
	out
}

/// The type new plain blocks get: the first non-code textblock type without
/// required attributes.
pub(crate) fn default_textblock(schema: &DocumentSchema) -> Option<&str> {
	schema
		.nodes()
		.find(|ty| ty.is_textblock() && !ty.is_code() && !ty.has_required_attrs())
		.map(|ty| ty.name())
}
