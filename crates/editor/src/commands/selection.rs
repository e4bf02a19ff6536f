use vellum_model::ResolvedPos;
use vellum_primitives::{Command, EditorState, Selection, textblock_ranges};

use super::transaction_command;

/// Selects `length` characters of text starting `text_start` characters into
/// the textblock with index `block`.
///
/// Offsets count characters, with every inline leaf counting as one. They run
/// on into later textblocks and clamp to the end of the last one. Fails when
/// there is no textblock with that index.
pub fn select_text(text_start: usize, length: usize, block: usize) -> Command {
	transaction_command(move |state| {
		let ranges = textblock_ranges(state.doc(), state.schema());
		let ranges = ranges.get(block..).filter(|r| !r.is_empty())?;
		let anchor = locate(ranges, text_start);
		let head = locate(ranges, text_start.saturating_add(length));
		let mut tr = state.tr();
		tr.set_selection(Selection::text(anchor, head));
		Some(tr)
	})
}

/// Document position of the character `offset` places into `ranges`.
fn locate(ranges: &[(usize, usize)], offset: usize) -> usize {
	let mut left = offset;
	for &(start, end) in ranges {
		let size = end - start;
		if left <= size {
			return start + left;
		}
		left -= size;
	}
	ranges.last().map_or(0, |&(_, end)| end)
}

pub fn select_all() -> Command {
	transaction_command(|state| {
		let mut tr = state.tr();
		tr.set_selection(Selection::All);
		Some(tr)
	})
}

/// Sets a text selection. Fails unless both ends lie in textblocks.
pub fn set_text_selection(anchor: usize, head: usize) -> Command {
	transaction_command(move |state| {
		let selection = Selection::text(anchor, head);
		if !selection.is_valid(state.doc(), state.schema()) {
			return None;
		}
		let mut tr = state.tr();
		tr.set_selection(selection);
		Some(tr)
	})
}

/// Selects the non-text node starting at `pos`.
pub fn set_node_selection(pos: usize) -> Command {
	transaction_command(move |state| {
		let node = state.doc().node_at(pos)?;
		if node.is_text() || pos >= state.doc().content_size() {
			return None;
		}
		let mut tr = state.tr();
		tr.set_selection(Selection::node(pos));
		Some(tr)
	})
}

/// Selects the node before the textblock when the cursor sits at its start.
pub fn select_node_backward() -> Command {
	transaction_command(|state| {
		let pos = textblock_cursor(state)?;
		if pos.parent_offset() > 0 {
			return None;
		}
		let cut = cut_before(&pos)?;
		let before = ResolvedPos::resolve(state.doc(), cut).ok()?.node_before()?;
		let mut tr = state.tr();
		tr.set_selection(Selection::node(cut - before.node_size()));
		Some(tr)
	})
}

/// Selects the node after the textblock when the cursor sits at its end.
pub fn select_node_forward() -> Command {
	transaction_command(|state| {
		let pos = textblock_cursor(state)?;
		if pos.parent_offset() < pos.parent().content_size() {
			return None;
		}
		let cut = cut_after(&pos)?;
		state.doc().node_at(cut)?;
		let mut tr = state.tr();
		tr.set_selection(Selection::node(cut));
		Some(tr)
	})
}

/// The cursor of a collapsed text selection, resolved, when it lies in a
/// textblock below the root.
pub(crate) fn textblock_cursor(state: &EditorState) -> Option<ResolvedPos<'_>> {
	let pos = state.selection().cursor_pos()?;
	let resolved = ResolvedPos::resolve(state.doc(), pos).ok()?;
	(resolved.depth() > 0 && state.schema().is_textblock(resolved.parent())).then_some(resolved)
}

/// The position before the nearest ancestor that has a previous sibling.
pub(crate) fn cut_before(pos: &ResolvedPos<'_>) -> Option<usize> {
	(0..pos.depth()).rev().find(|&d| pos.index(d) > 0).map(|d| pos.before(d + 1))
}

/// The position after the nearest ancestor that has a next sibling.
pub(crate) fn cut_after(pos: &ResolvedPos<'_>) -> Option<usize> {
	(0..pos.depth())
		.rev()
		.find(|&d| pos.index(d) + 1 < pos.node(d).child_count())
		.map(|d| pos.after(d + 1))
}
