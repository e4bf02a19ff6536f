use std::sync::Arc;

use vellum_model::Mark;

use super::*;
use crate::test_support::{blocks, p, state, state_with};

/// Counts document-changing transactions.
struct EditCounter;

impl Behavior for EditCounter {
	fn name(&self) -> &str {
		"edit_counter"
	}

	fn init(&self, _state: &EditorState) -> Option<Slot> {
		Some(Arc::new(0usize))
	}

	fn apply(&self, tr: &Transaction, slot: Option<&Slot>, _old: &EditorState, _new: &EditorState) -> Option<Slot> {
		let count = slot.and_then(|s| s.downcast_ref::<usize>()).copied().unwrap_or(0);
		if tr.doc_changed() {
			Some(Arc::new(count + 1))
		} else {
			slot.cloned()
		}
	}
}

#[test]
fn test_create_checks_document() {
	let schema = crate::test_support::schema();
	let bad = crate::test_support::doc(Vec::new());
	assert!(EditorState::create(schema, bad, None, Arc::from(Vec::new())).is_err());
}

#[test]
fn test_default_selection_is_first_cursor() {
	let state = state(vec![p("ab")]);
	assert_eq!(state.selection(), &Selection::cursor(1));
}

#[test]
fn test_apply_produces_new_state() {
	let state = state(vec![p("ab")]);
	let mut tr = state.tr();
	tr.insert_text("c", 3, 3).unwrap();
	let next = state.apply(&tr).unwrap();
	assert_eq!(blocks(next.doc()), vec!["abc"]);
	assert_eq!(blocks(state.doc()), vec!["ab"]);
	assert_eq!(next.selection(), &Selection::cursor(4));
	assert_ne!(next, state);
}

#[test]
fn test_apply_rejects_stale_transaction() {
	let state = state(vec![p("ab")]);
	let mut tr = state.tr();
	tr.insert_text("c", 3, 3).unwrap();
	let next = state.apply(&tr).unwrap();
	assert_eq!(next.apply(&tr), Err(ApplyError::Stale));
}

#[test]
fn test_apply_rejects_invalid_selection() {
	let state = state(vec![p("ab")]);
	let mut tr = state.tr();
	tr.set_selection(Selection::cursor(0));
	assert_eq!(state.apply(&tr), Err(ApplyError::InvalidSelection(Selection::cursor(0))));
}

#[test]
fn test_stored_marks_lifecycle() {
	let state = state(vec![p("ab")]);
	let mut tr = state.tr();
	tr.set_stored_marks(Some(vec![Mark::new("em")]));
	let marked = state.apply(&tr).unwrap();
	assert_eq!(marked.stored_marks(), Some(&[Mark::new("em")][..]));

	// Unrelated metadata-only transactions keep them.
	let mut tr = marked.tr();
	tr.set_meta("note", true);
	let kept = marked.apply(&tr).unwrap();
	assert!(kept.stored_marks().is_some());

	// Moving the selection clears them.
	let mut tr = kept.tr();
	tr.set_selection(Selection::cursor(2));
	assert_eq!(kept.apply(&tr).unwrap().stored_marks(), None);
}

#[test]
fn test_behavior_slots() {
	let counter: Arc<dyn Behavior> = Arc::new(EditCounter);
	let state = state_with(vec![p("ab")], None, vec![counter]);
	assert_eq!(state.slot_as::<usize>("edit_counter"), Some(&0));

	let mut tr = state.tr();
	tr.insert_text("x", 1, 1).unwrap();
	let edited = state.apply(&tr).unwrap();
	assert_eq!(edited.slot_as::<usize>("edit_counter"), Some(&1));

	let mut tr = edited.tr();
	tr.set_selection(Selection::cursor(2));
	let moved = edited.apply(&tr).unwrap();
	assert_eq!(moved.slot_as::<usize>("edit_counter"), Some(&1));
	assert!(Arc::ptr_eq(
		moved.slot("edit_counter").unwrap(),
		edited.slot("edit_counter").unwrap()
	));
	assert_eq!(state.slot_as::<usize>("edit_counter"), Some(&0));
	assert!(state.slot("missing").is_none());
}

#[test]
fn test_structural_equality() {
	let state = state(vec![p("ab")]);
	let same = state.clone();
	assert_eq!(state, same);
	let tr = state.tr();
	assert_eq!(state.apply(&tr).unwrap(), state);
}
