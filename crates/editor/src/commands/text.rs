use vellum_model::{Attrs, DocumentSchema, Node, ResolvedPos};
use vellum_primitives::{Bias, Command, EditorState, Selection, Transaction};

use super::structure::{append_to_last_textblock, take_first_textblock};
use super::{default_textblock, slice_content, transaction_command};

/// Inserts `text` over `range`, or over the selection when `range` is `None`.
///
/// A non-empty selection is deleted first. The text carries the stored marks,
/// or the marks at the insertion point.
pub fn insert_text(text: impl Into<String>, range: Option<(usize, usize)>) -> Command {
	let text = text.into();
	transaction_command(move |state| {
		let mut tr = match range {
			Some(_) => state.tr(),
			None => delete_selection_tr(state).unwrap_or_else(|| state.tr()),
		};
		let (from, to) = match range {
			Some(range) => range,
			None => {
				let from = tr.selection().from();
				(from, tr.selection().to(tr.doc()))
			}
		};
		tr.insert_text(&text, from, to).ok()?;
		Some(tr)
	})
}

/// Replaces `[from, to)` with `text`. Empty text deletes the range.
pub fn replace_range_text(from: usize, to: usize, text: impl Into<String>) -> Command {
	let text = text.into();
	transaction_command(move |state| {
		let mut tr = state.tr();
		tr.insert_text(&text, from, to).ok()?;
		Some(tr)
	})
}

/// Deletes the selected content. Fails on an empty selection.
pub fn delete_selection() -> Command {
	transaction_command(delete_selection_tr)
}

/// Inserts a newline when the selection lies in a code textblock.
pub fn newline_in_code() -> Command {
	transaction_command(|state| {
		let selection = state.selection();
		let Selection::Text { .. } = selection else {
			return None;
		};
		let (from, to) = (selection.from(), selection.to(state.doc()));
		let start = ResolvedPos::resolve(state.doc(), from).ok()?;
		let end = ResolvedPos::resolve(state.doc(), to).ok()?;
		if !start.same_parent(&end) || !state.schema().is_code(start.parent()) {
			return None;
		}
		let mut tr = state.tr();
		tr.insert_text("\n", from, to).ok()?;
		Some(tr)
	})
}

pub(crate) fn delete_selection_tr(state: &EditorState) -> Option<Transaction> {
	let doc = state.doc();
	let schema = state.schema();
	let mut tr = state.tr();
	match *state.selection() {
		Selection::Text { .. } => {
			let (from, to) = (state.selection().from(), state.selection().to(doc));
			if from == to {
				return None;
			}
			let start = ResolvedPos::resolve(doc, from).ok()?;
			let end = ResolvedPos::resolve(doc, to).ok()?;
			if start.same_parent(&end) {
				tr.delete(from, to).ok()?;
			} else {
				let (range_from, range_to, content) = join_across(schema, &start, &end)?;
				tr.replace(range_from, range_to, content).ok()?;
			}
			tr.set_selection(Selection::cursor(from));
		}
		Selection::Node { pos } => {
			let size = doc.node_at(pos)?.node_size();
			if tr.delete(pos, pos + size).is_err() {
				let filler = schema.create_and_fill(default_textblock(schema)?, &Attrs::new()).ok()?;
				tr.replace(pos, pos + size, vec![filler]).ok()?;
				tr.set_selection(Selection::near(tr.doc(), schema, pos, Bias::Right));
			}
		}
		Selection::All => {
			let empty = schema.empty_document().ok()?;
			tr.replace(0, doc.content_size(), empty.content().to_vec()).ok()?;
			tr.set_selection(Selection::at_start(tr.doc(), schema));
		}
	}
	Some(tr)
}

/// Builds the replacement for a range whose ends lie in different textblocks:
/// the head of the first block joined with the tail of the last one.
///
/// Returns the range to replace at the deepest shared ancestor, and its content.
fn join_across(
	schema: &DocumentSchema,
	start: &ResolvedPos<'_>,
	end: &ResolvedPos<'_>,
) -> Option<(usize, usize, Vec<Node>)> {
	let shared = start.shared_depth(end.pos());
	let textblocks = schema.is_textblock(start.parent()) && schema.is_textblock(end.parent());
	if !textblocks || shared >= start.depth() || shared >= end.depth() {
		return None;
	}

	let mut left = {
		let block = start.parent();
		block.copy(slice_content(block, 0, start.parent_offset()))
	};
	for d in (shared + 1..start.depth()).rev() {
		let node = start.node(d);
		let mut children = node.content()[..start.index(d)].to_vec();
		children.push(left);
		left = node.copy(children);
	}

	let mut right = {
		let block = end.parent();
		block.copy(slice_content(block, end.parent_offset(), block.content_size()))
	};
	for d in (shared + 1..end.depth()).rev() {
		let node = end.node(d);
		let mut children = vec![right];
		children.extend(node.content()[end.index(d) + 1..].iter().cloned());
		right = node.copy(children);
	}

	let (tail, rest) = take_first_textblock(schema, &right)?;
	let mut content = vec![append_to_last_textblock(schema, &left, tail)?];
	content.extend(rest);
	Some((start.before(shared + 1), end.after(shared + 1), content))
}
