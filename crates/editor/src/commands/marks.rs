use vellum_model::{Attrs, Mark, ResolvedPos};
use vellum_primitives::{Command, EditorState};

use super::transaction_command;

/// Toggles a `kind` mark over the selection.
///
/// When every markable inline node in the range already carries the mark it
/// is removed, otherwise added. A cursor toggles the stored marks instead.
/// Fails where no node in the range may carry the mark, so code blocks are
/// skipped.
pub fn toggle_mark(kind: impl Into<String>, attrs: Attrs) -> Command {
	let kind = kind.into();
	transaction_command(move |state| {
		let schema = state.schema();
		let mark = schema.mark(&kind, &attrs).ok()?;
		let doc = state.doc();
		let selection = state.selection();
		let mut tr = state.tr();

		if let Some(pos) = selection.cursor_pos() {
			let resolved = ResolvedPos::resolve(doc, pos).ok()?;
			if !schema.node_type(resolved.parent().kind())?.allows_mark(&kind) {
				return None;
			}
			let current = match state.stored_marks() {
				Some(marks) => marks.to_vec(),
				None => schema.marks_at(&resolved),
			};
			let next = if mark.type_in_set(&current) {
				schema.remove_mark_from_set(&kind, &current)
			} else {
				schema.add_mark_to_set(&mark, &current)
			};
			tr.set_stored_marks(Some(next));
			return Some(tr);
		}

		let (from, to) = (selection.from(), selection.to(doc));
		match coverage(state, from, to, &mark) {
			Coverage::None => return None,
			Coverage::Full => tr.remove_mark(from, to, &kind).ok()?,
			Coverage::Partial => tr.add_mark(from, to, mark).ok()?,
		};
		Some(tr)
	})
}

/// Returns true if the mark is active at the selection: in the stored marks
/// or at a cursor, or on every markable node of a range.
pub fn mark_active(state: &EditorState, kind: &str) -> bool {
	let doc = state.doc();
	let selection = state.selection();
	if let Some(pos) = selection.cursor_pos() {
		return match state.stored_marks() {
			Some(marks) => marks.iter().any(|m| m.kind == kind),
			None => ResolvedPos::resolve(doc, pos)
				.is_ok_and(|resolved| state.schema().marks_at(&resolved).iter().any(|m| m.kind == kind)),
		};
	}
	matches!(coverage(state, selection.from(), selection.to(doc), &Mark::new(kind)), Coverage::Full)
}

enum Coverage {
	/// Nothing in the range may carry the mark.
	None,
	Partial,
	Full,
}

fn coverage(state: &EditorState, from: usize, to: usize, mark: &Mark) -> Coverage {
	let schema = state.schema();
	let mut markable = false;
	let mut all = true;
	state.doc().nodes_between(from, to, &mut |node, _, parent, _| {
		let inline = node.is_text() || schema.node_type(node.kind()).is_some_and(|ty| ty.is_inline());
		if inline && schema.node_type(parent.kind()).is_some_and(|ty| ty.allows_mark(&mark.kind)) {
			markable = true;
			all &= mark.type_in_set(node.marks());
		}
		true
	});
	match (markable, all) {
		(false, _) => Coverage::None,
		(true, true) => Coverage::Full,
		(true, false) => Coverage::Partial,
	}
}
