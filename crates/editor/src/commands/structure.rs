//! Block structure commands: joining, splitting, lifting, wrapping, retyping
//! and inserting nodes.
//!
//! Edits are expressed as whole-node replacements at the level of the
//! affected blocks' parent, so every step stays inside a single parent. The
//! resulting selection is always set explicitly.

use std::sync::Arc;

use serde_json::Value;
use vellum_model::{Attrs, DocumentSchema, Node, ResolvedPos};
use vellum_primitives::{Bias, Command, EditorState, Selection, Transaction, command};

use super::selection::{cut_after, cut_before, textblock_cursor};
use super::text::delete_selection_tr;
use super::{default_textblock, slice_content, transaction_command};

/// Where [`insert_block`] places a block relative to the top-level block
/// containing the target position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockPlacement {
	Before,
	After,
	/// Before when the position is at the start of its block, else after.
	Smart,
}

/// With the cursor at the start of a textblock, joins it into the block
/// before, deletes a leaf before it, or lifts it out of its wrapper.
pub fn join_backward() -> Command {
	transaction_command(|state| {
		let pos = textblock_cursor(state)?;
		if pos.parent_offset() > 0 {
			return None;
		}
		let depth = pos.depth();
		let Some(cut) = cut_before(&pos) else {
			return lift_block_tr(state, &pos);
		};
		let cut_pos = ResolvedPos::resolve(state.doc(), cut).ok()?;
		if cut_pos.depth() + 1 != depth {
			return lift_block_tr(state, &pos);
		}
		let before = cut_pos.node_before()?;
		let block = pos.parent();
		let schema = state.schema();
		let mut tr = state.tr();

		if before.is_leaf() {
			if block.content_size() == 0 {
				tr.delete(pos.before(depth), pos.after(depth)).ok()?;
				tr.set_selection(Selection::node(cut - 1));
			} else {
				tr.delete(cut - 1, cut).ok()?;
			}
			return Some(tr);
		}

		let join = last_textblock_end(schema, &before, cut)?;
		let merged = append_to_last_textblock(schema, &before, block.content().to_vec())?;
		tr.replace(cut - before.node_size(), pos.after(depth), vec![merged]).ok()?;
		tr.set_selection(Selection::cursor(join));
		Some(tr)
	})
}

/// With the cursor at the end of a textblock, joins the next block into it
/// or deletes a leaf after it.
pub fn join_forward() -> Command {
	transaction_command(|state| {
		let pos = textblock_cursor(state)?;
		let block = pos.parent();
		if pos.parent_offset() < block.content_size() {
			return None;
		}
		let depth = pos.depth();
		let cut = cut_after(&pos)?;
		if ResolvedPos::resolve(state.doc(), cut).ok()?.depth() + 1 != depth {
			return None;
		}
		let after = state.doc().node_at(cut)?;
		let mut tr = state.tr();

		if after.is_leaf() {
			tr.delete(cut, cut + 1).ok()?;
			return Some(tr);
		}

		let (tail, rest) = take_first_textblock(state.schema(), after)?;
		let mut content = block.content().to_vec();
		content.extend(tail);
		let mut replacement = vec![block.copy(content)];
		replacement.extend(rest);
		tr.replace(pos.before(depth), cut + after.node_size(), replacement).ok()?;
		tr.set_selection(Selection::cursor(pos.pos()));
		Some(tr)
	})
}

/// Splits the textblock at the selection, deleting selected text.
///
/// Splitting at the very end starts a block of the default type.
pub fn split_block() -> Command {
	transaction_command(|state| {
		let Selection::Text { .. } = state.selection() else {
			return None;
		};
		let doc = state.doc();
		let schema = state.schema();
		let start = ResolvedPos::resolve(doc, state.selection().from()).ok()?;
		let end = ResolvedPos::resolve(doc, state.selection().to(doc)).ok()?;
		if start.depth() == 0 || !start.same_parent(&end) || !schema.is_textblock(start.parent()) {
			return None;
		}

		let depth = start.depth();
		let block = start.parent();
		let first = block.copy(slice_content(block, 0, start.parent_offset()));
		let second = if end.parent_offset() == block.content_size() {
			schema.create_and_fill(default_textblock(schema)?, &Attrs::new()).ok()?
		} else {
			block.copy(slice_content(block, end.parent_offset(), block.content_size()))
		};
		let cursor = start.before(depth) + first.node_size() + 1;

		let mut tr = state.tr();
		tr.replace(start.before(depth), start.after(depth), vec![first, second]).ok()?;
		tr.set_selection(Selection::cursor(cursor));
		Some(tr)
	})
}

/// With a block node selected, inserts an empty default block next to it.
pub fn create_paragraph_near() -> Command {
	transaction_command(|state| {
		let Selection::Node { pos } = *state.selection() else {
			return None;
		};
		let doc = state.doc();
		let schema = state.schema();
		let node = doc.node_at(pos)?;
		let resolved = ResolvedPos::resolve(doc, pos).ok()?;
		if schema.is_textblock(resolved.parent()) {
			return None;
		}
		let side = if resolved.parent_offset() == 0 {
			pos
		} else {
			pos + node.node_size()
		};
		let paragraph = schema.create_and_fill(default_textblock(schema)?, &Attrs::new()).ok()?;

		let mut tr = state.tr();
		tr.insert(side, vec![paragraph]).ok()?;
		tr.set_selection(Selection::cursor(side + 1));
		Some(tr)
	})
}

/// Moves an empty textblock out of its wrapper.
pub fn lift_empty_block() -> Command {
	transaction_command(|state| {
		let pos = textblock_cursor(state)?;
		if pos.parent().content_size() > 0 {
			return None;
		}
		lift_block_tr(state, &pos)
	})
}

/// Moves the textblock holding the selection out of its wrapper, splitting
/// the wrapper around it.
pub fn lift() -> Command {
	transaction_command(|state| {
		let doc = state.doc();
		let start = ResolvedPos::resolve(doc, state.selection().from()).ok()?;
		let end = ResolvedPos::resolve(doc, state.selection().to(doc)).ok()?;
		if !start.same_parent(&end) || !state.schema().is_textblock(start.parent()) {
			return None;
		}
		lift_block_tr(state, &start)
	})
}

fn lift_block_tr(state: &EditorState, pos: &ResolvedPos<'_>) -> Option<Transaction> {
	let depth = pos.depth();
	if depth < 2 {
		return None;
	}
	let wrapper = pos.node(depth - 1);
	let index = pos.index(depth - 1);
	let left = &wrapper.content()[..index];
	let right = &wrapper.content()[index + 1..];

	let mut content = Vec::with_capacity(3);
	let mut new_start = pos.before(depth - 1) + 1;
	if !left.is_empty() {
		let node = wrapper.copy(left.to_vec());
		new_start += node.node_size();
		content.push(node);
	}
	content.push(pos.parent().clone());
	if !right.is_empty() {
		content.push(wrapper.copy(right.to_vec()));
	}

	let (old_start, old_end) = (pos.start(depth), pos.end(depth));
	let relocate = |p: usize| new_start + p.clamp(old_start, old_end) - old_start;
	let selection = match *state.selection() {
		Selection::Text { anchor, head } => Selection::text(relocate(anchor), relocate(head)),
		_ => Selection::cursor(relocate(pos.pos())),
	};

	let mut tr = state.tr();
	tr.replace(pos.before(depth - 1), pos.after(depth - 1), content).ok()?;
	tr.set_selection(selection);
	Some(tr)
}

/// Retypes every textblock touched by the selection to `kind` with `attrs`.
///
/// Marks the new type does not allow are dropped. Fails when no block changes.
pub fn set_block_type(kind: impl Into<String>, attrs: Attrs) -> Command {
	let kind = kind.into();
	transaction_command(move |state| {
		let doc = state.doc();
		let schema = state.schema();
		if !schema.node_type(&kind)?.is_textblock() {
			return None;
		}
		let (from, to) = (state.selection().from(), state.selection().to(doc));
		let mut blocks = Vec::new();
		doc.nodes_between(from, to, &mut |node, pos, _, _| {
			if schema.is_textblock(node) {
				blocks.push((pos, node.clone()));
				false
			} else {
				true
			}
		});

		let mut tr = state.tr();
		for (pos, node) in blocks {
			let retyped = retype(schema, &node, &kind, &attrs)?;
			if retyped.kind() != node.kind() || retyped.attrs() != node.attrs() {
				tr.replace(pos, pos + node.node_size(), vec![retyped]).ok()?;
			}
		}
		if !tr.doc_changed() {
			return None;
		}
		tr.set_selection(*state.selection());
		Some(tr)
	})
}

fn retype(schema: &DocumentSchema, node: &Node, kind: &str, attrs: &Attrs) -> Option<Node> {
	let ty = schema.node_type(kind)?;
	let content = node
		.content()
		.iter()
		.map(|child| child.mark(child.marks().iter().filter(|m| ty.allows_mark(&m.kind)).cloned().collect()))
		.collect();
	schema.create(kind, attrs, content).ok()
}

/// Wraps the blocks covered by the selection in a new `kind` node.
pub fn wrap_in(kind: impl Into<String>, attrs: Attrs) -> Command {
	let kind = kind.into();
	transaction_command(move |state| {
		let doc = state.doc();
		let schema = state.schema();
		let selection = *state.selection();
		let (from, to) = (selection.from(), selection.to(doc));
		let start = ResolvedPos::resolve(doc, from).ok()?;
		let end = ResolvedPos::resolve(doc, to).ok()?;

		let mut depth = start.shared_depth(to);
		if schema.is_textblock(start.node(depth)) {
			depth = depth.checked_sub(1)?;
		}
		let first = start.index(depth);
		let range_from = if start.depth() == depth { from } else { start.before(depth + 1) };
		let (last, range_to) = if end.depth() == depth {
			(end.index(depth).checked_sub(1)?, to)
		} else {
			(end.index(depth), end.after(depth + 1))
		};
		let children = start.node(depth).content().get(first..=last)?.to_vec();
		let wrapper = schema.create(&kind, &attrs, children).ok()?;

		let mut tr = state.tr();
		tr.replace(range_from, range_to, vec![wrapper]).ok()?;
		tr.set_selection(match selection {
			Selection::Text { anchor, head } => Selection::text(anchor + 1, head + 1),
			Selection::Node { pos } => Selection::node(pos + 1),
			Selection::All => Selection::All,
		});
		Some(tr)
	})
}

/// Lifts out of a `kind` ancestor when inside one, else wraps in `kind`.
pub fn toggle_wrap(kind: impl Into<String>, attrs: Attrs) -> Command {
	let kind = kind.into();
	let wrap = wrap_in(kind.clone(), attrs);
	let unwrap = lift();
	command(move |state, dispatch| {
		let inside = ResolvedPos::resolve(state.doc(), state.selection().from())
			.is_ok_and(|pos| (1..=pos.depth()).any(|d| pos.node(d).kind() == kind));
		if inside { unwrap(state, dispatch) } else { wrap(state, dispatch) }
	})
}

/// Inserts a node of type `kind` at the selection, replacing selected content.
///
/// Inline nodes go in at the cursor. Block nodes split the textblock around
/// the cursor, or go before it when the cursor is at its start.
pub fn insert_node(kind: impl Into<String>, attrs: Attrs) -> Command {
	let kind = kind.into();
	transaction_command(move |state| {
		let schema = state.schema();
		let node = schema.create_and_fill(&kind, &attrs).ok()?;
		let inline = schema.node_type(&kind)?.is_inline();
		let size = node.node_size();

		let mut tr = delete_selection_tr(state).unwrap_or_else(|| state.tr());
		let at = match *tr.selection() {
			Selection::Text { .. } => tr.selection().from(),
			Selection::Node { .. } => tr.selection().to(tr.doc()),
			Selection::All => return None,
		};
		if inline {
			tr.insert(at, vec![node]).ok()?;
			tr.set_selection(Selection::cursor(at + size));
			return Some(tr);
		}

		let doc = Arc::clone(tr.doc_arc());
		let pos = ResolvedPos::resolve(&doc, at).ok()?;
		let depth = pos.depth();
		if !schema.is_textblock(pos.parent()) {
			tr.insert(at, vec![node]).ok()?;
			tr.set_selection(Selection::near(tr.doc(), schema, at + size, Bias::Right));
			return Some(tr);
		}
		if depth == 0 {
			return None;
		}
		if pos.parent_offset() == 0 {
			tr.insert(pos.before(depth), vec![node]).ok()?;
			tr.set_selection(Selection::cursor(at + size));
			return Some(tr);
		}

		let block = pos.parent();
		let left = block.copy(slice_content(block, 0, pos.parent_offset()));
		let right = if pos.parent_offset() == block.content_size() {
			schema.create_and_fill(default_textblock(schema)?, &Attrs::new()).ok()?
		} else {
			block.copy(slice_content(block, pos.parent_offset(), block.content_size()))
		};
		let cursor = pos.before(depth) + left.node_size() + size + 1;
		tr.replace(pos.before(depth), pos.after(depth), vec![left, node, right]).ok()?;
		tr.set_selection(Selection::cursor(cursor));
		Some(tr)
	})
}

/// Inserts `node`, given as document JSON, next to the top-level block
/// containing `pos`. At the root level it goes in at `pos` itself.
pub fn insert_block(pos: usize, node: Value, placement: BlockPlacement) -> Command {
	transaction_command(move |state| {
		let node: Node = serde_json::from_value(node.clone()).ok()?;
		let node = state.schema().prepare(node).ok()?;
		let resolved = ResolvedPos::resolve(state.doc(), pos).ok()?;
		let at = if resolved.depth() == 0 {
			pos
		} else {
			let before = match placement {
				BlockPlacement::Before => true,
				BlockPlacement::After => false,
				BlockPlacement::Smart => resolved.parent_offset() == 0,
			};
			if before { resolved.before(1) } else { resolved.after(1) }
		};
		let mut tr = state.tr();
		tr.insert(at, vec![node]).ok()?;
		Some(tr)
	})
}

/// Appends `tail` to the last textblock reached through last children.
pub(crate) fn append_to_last_textblock(schema: &DocumentSchema, node: &Node, tail: Vec<Node>) -> Option<Node> {
	if schema.is_textblock(node) {
		let mut content = node.content().to_vec();
		content.extend(tail);
		return Some(node.copy(content));
	}
	let last = node.last_child()?;
	if last.is_leaf() || last.is_text() {
		return None;
	}
	let merged = append_to_last_textblock(schema, last, tail)?;
	Some(node.replace_child(node.child_count() - 1, merged))
}

/// End of the content of the last textblock in `node`, which ends at `node_end`.
fn last_textblock_end(schema: &DocumentSchema, node: &Node, node_end: usize) -> Option<usize> {
	if schema.is_textblock(node) {
		return Some(node_end - 1);
	}
	let last = node.last_child()?;
	if last.is_leaf() || last.is_text() {
		return None;
	}
	last_textblock_end(schema, last, node_end - 1)
}

/// Removes the first textblock reached through first children, returning its
/// content and what is left of `node`. Wrappers left empty are dropped.
pub(crate) fn take_first_textblock(schema: &DocumentSchema, node: &Node) -> Option<(Vec<Node>, Option<Node>)> {
	if schema.is_textblock(node) {
		return Some((node.content().to_vec(), None));
	}
	let first = node.first_child()?;
	if first.is_leaf() || first.is_text() {
		return None;
	}
	let (content, rest) = take_first_textblock(schema, first)?;
	let mut children: Vec<Node> = rest.into_iter().collect();
	children.extend(node.content()[1..].iter().cloned());
	let remaining = (!children.is_empty()).then(|| node.copy(children));
	Some((content, remaining))
}
