use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;
use vellum_model::{Attrs, Mark, Node};
use vellum_primitives::{EditorState, Selection};

use super::*;
use crate::test_support::{blocks, code, h, hr, kinds, p, quote, run, state};

fn exec(cmd: Command, content: Vec<Node>, selection: Selection) -> EditorState {
	run(&cmd, &state(content, selection)).expect("command applies")
}

fn fails(cmd: Command, content: Vec<Node>, selection: Selection) -> bool {
	let state = state(content, selection);
	!cmd(&state, None) && run(&cmd, &state).is_none()
}

fn level(attrs: u64) -> Attrs {
	Attrs::from([("level".to_string(), json!(attrs))])
}

fn text_runs(block: &Node) -> Vec<(String, Vec<String>)> {
	block
		.content()
		.iter()
		.map(|n| {
			let marks = n.marks().iter().map(|m| m.kind.clone()).collect();
			(n.text_content(), marks)
		})
		.collect()
}

#[test]
fn test_select_text_counts_from_block() {
	let next = exec(select_text(2, 4, 0), vec![p("Lorem ipsum")], Selection::cursor(1));
	assert_eq!(next.selection(), &Selection::text(3, 7));

	let next = exec(select_text(1, 3, 0), vec![p("ab"), p("cd")], Selection::cursor(1));
	assert_eq!(next.selection(), &Selection::text(2, 7));

	let next = exec(select_text(0, 100, 1), vec![p("ab"), p("cd")], Selection::cursor(1));
	assert_eq!(next.selection(), &Selection::text(5, 7));

	assert!(fails(select_text(0, 1, 5), vec![p("ab")], Selection::cursor(1)));
}

#[test]
fn test_dry_run_does_not_dispatch() {
	let state = state(vec![p("ab"), p("cd")], Selection::cursor(5));
	assert!(join_backward()(&state, None));
	assert!(!join_forward()(&state, None));
}

#[test]
fn test_insert_text_replaces_selection() {
	let next = exec(insert_text("X", None), vec![p("abcd")], Selection::text(2, 4));
	assert_eq!(blocks(next.doc()), vec!["aXd"]);
	assert_eq!(next.selection(), &Selection::cursor(3));

	let next = exec(insert_text("X", Some((1, 2))), vec![p("abcd")], Selection::cursor(4));
	assert_eq!(blocks(next.doc()), vec!["Xbcd"]);
}

#[test]
fn test_replace_range_text_with_empty_text_deletes() {
	let next = exec(replace_range_text(2, 4, ""), vec![p("abcd")], Selection::cursor(1));
	assert_eq!(blocks(next.doc()), vec!["ad"]);
}

#[test]
fn test_delete_selection_joins_blocks() {
	let next = exec(delete_selection(), vec![p("ab"), p("cd")], Selection::text(2, 6));
	assert_eq!(blocks(next.doc()), vec!["ad"]);
	assert_eq!(next.selection(), &Selection::cursor(2));
}

#[test]
fn test_delete_selection_out_of_wrapper() {
	let next = exec(delete_selection(), vec![quote(vec![p("ab")]), p("cd")], Selection::text(3, 8));
	assert_eq!(kinds(next.doc()), vec!["blockquote"]);
	assert_eq!(blocks(next.doc()), vec!["ad"]);
	assert_eq!(next.selection(), &Selection::cursor(3));
}

#[test]
fn test_delete_all_leaves_empty_document() {
	let next = exec(delete_selection(), vec![p("ab"), p("cd")], Selection::All);
	assert_eq!(blocks(next.doc()), vec![""]);
	assert_eq!(next.selection(), &Selection::cursor(1));
}

#[test]
fn test_delete_selected_leaf() {
	let next = exec(delete_selection(), vec![p("ab"), hr(), p("cd")], Selection::node(4));
	assert_eq!(kinds(next.doc()), vec!["paragraph", "paragraph"]);
	assert_eq!(next.selection(), &Selection::cursor(5));
}

#[test]
fn test_delete_selection_needs_content() {
	assert!(fails(delete_selection(), vec![p("ab")], Selection::cursor(2)));
}

#[test]
fn test_join_backward_merges_textblocks() {
	let next = exec(join_backward(), vec![p("ab"), p("cd")], Selection::cursor(5));
	assert_eq!(blocks(next.doc()), vec!["abcd"]);
	assert_eq!(next.selection(), &Selection::cursor(3));

	assert!(fails(join_backward(), vec![p("ab"), p("cd")], Selection::cursor(6)));
}

#[test]
fn test_join_backward_over_leaf() {
	let next = exec(join_backward(), vec![p("ab"), hr(), p("")], Selection::cursor(6));
	assert_eq!(kinds(next.doc()), vec!["paragraph", "horizontal_rule"]);
	assert_eq!(next.selection(), &Selection::node(4));

	let next = exec(join_backward(), vec![p("ab"), hr(), p("cd")], Selection::cursor(6));
	assert_eq!(kinds(next.doc()), vec!["paragraph", "paragraph"]);
	assert_eq!(next.selection(), &Selection::cursor(5));
}

#[test]
fn test_join_backward_lifts_first_child() {
	let next = exec(join_backward(), vec![quote(vec![p("ab")])], Selection::cursor(2));
	assert_eq!(kinds(next.doc()), vec!["paragraph"]);
	assert_eq!(next.selection(), &Selection::cursor(1));
}

#[test]
fn test_join_forward_merges_next_block() {
	let next = exec(join_forward(), vec![p("ab"), p("cd")], Selection::cursor(3));
	assert_eq!(blocks(next.doc()), vec!["abcd"]);
	assert_eq!(next.selection(), &Selection::cursor(3));
}

#[test]
fn test_select_node_around_leaf() {
	let content = || vec![p("ab"), hr(), p("cd")];
	let next = exec(select_node_backward(), content(), Selection::cursor(6));
	assert_eq!(next.selection(), &Selection::node(4));
	let next = exec(select_node_forward(), content(), Selection::cursor(3));
	assert_eq!(next.selection(), &Selection::node(4));
	assert!(fails(select_node_forward(), content(), Selection::cursor(2)));
}

#[test]
fn test_split_block() {
	let next = exec(split_block(), vec![p("abcd")], Selection::cursor(3));
	assert_eq!(blocks(next.doc()), vec!["ab", "cd"]);
	assert_eq!(next.selection(), &Selection::cursor(5));

	let next = exec(split_block(), vec![h(1, "ab")], Selection::cursor(3));
	assert_eq!(kinds(next.doc()), vec!["heading", "paragraph"]);
	assert_eq!(next.selection(), &Selection::cursor(5));
}

#[test]
fn test_enter_variants() {
	let next = exec(enter(), vec![code("ab")], Selection::cursor(2));
	assert_eq!(blocks(next.doc()), vec!["a\nb"]);

	let next = exec(enter(), vec![quote(vec![p("ab"), p("")])], Selection::cursor(6));
	assert_eq!(kinds(next.doc()), vec!["blockquote", "paragraph"]);
	assert_eq!(next.selection(), &Selection::cursor(7));

	let next = exec(enter(), vec![p("ab"), hr()], Selection::node(4));
	assert_eq!(kinds(next.doc()), vec!["paragraph", "horizontal_rule", "paragraph"]);
	assert_eq!(next.selection(), &Selection::cursor(6));
}

#[test]
fn test_backspace_and_del_join() {
	let next = exec(backspace(), vec![p("ab"), p("cd")], Selection::cursor(5));
	assert_eq!(blocks(next.doc()), vec!["abcd"]);
	let next = exec(del(), vec![p("ab"), p("cd")], Selection::cursor(3));
	assert_eq!(blocks(next.doc()), vec!["abcd"]);
}

#[test]
fn test_set_block_type() {
	let next = exec(set_block_type("heading", level(2)), vec![p("ab")], Selection::cursor(2));
	assert_eq!(kinds(next.doc()), vec!["heading"]);
	assert_eq!(next.doc().child(0).and_then(|n| n.attr("level")), Some(&json!(2)));
	assert_eq!(next.selection(), &Selection::cursor(2));

	assert!(fails(set_block_type("heading", level(2)), vec![h(2, "ab")], Selection::cursor(2)));
	assert!(fails(set_block_type("blockquote", Attrs::new()), vec![p("ab")], Selection::cursor(2)));
}

#[test]
fn test_set_block_type_drops_disallowed_marks() {
	let marked = Node::branch("paragraph", Attrs::new(), vec![Node::text("ab").with_marks(vec![Mark::new("em")])]);
	let next = exec(set_block_type("code_block", Attrs::new()), vec![marked], Selection::cursor(2));
	let block = next.doc().child(0).unwrap();
	assert_eq!(block.kind(), "code_block");
	assert_eq!(text_runs(block), vec![("ab".to_string(), vec![])]);
}

#[test]
fn test_wrap_and_unwrap() {
	let next = exec(wrap_in("blockquote", Attrs::new()), vec![p("ab"), p("cd")], Selection::text(2, 6));
	assert_eq!(kinds(next.doc()), vec!["blockquote"]);
	assert_eq!(next.doc().child(0).map(Node::child_count), Some(2));
	assert_eq!(next.selection(), &Selection::text(3, 7));

	let wrapped = exec(toggle_wrap("blockquote", Attrs::new()), vec![p("ab")], Selection::cursor(2));
	assert_eq!(kinds(wrapped.doc()), vec!["blockquote"]);
	assert_eq!(wrapped.selection(), &Selection::cursor(3));
	let unwrapped = run(&toggle_wrap("blockquote", Attrs::new()), &wrapped).unwrap();
	assert_eq!(kinds(unwrapped.doc()), vec!["paragraph"]);
	assert_eq!(unwrapped.selection(), &Selection::cursor(2));
}

#[test]
fn test_lift_splits_wrapper() {
	let content = vec![quote(vec![p("ab"), p("cd"), p("ef")])];
	let next = exec(lift(), content, Selection::cursor(7));
	assert_eq!(kinds(next.doc()), vec!["blockquote", "paragraph", "blockquote"]);
	assert_eq!(blocks(next.doc()), vec!["ab", "cd", "ef"]);
	assert_eq!(next.selection(), &Selection::cursor(8));
}

#[test]
fn test_insert_node() {
	let next = exec(insert_node("horizontal_rule", Attrs::new()), vec![p("abcd")], Selection::cursor(3));
	assert_eq!(kinds(next.doc()), vec!["paragraph", "horizontal_rule", "paragraph"]);
	assert_eq!(blocks(next.doc()), vec!["ab", "", "cd"]);
	assert_eq!(next.selection(), &Selection::cursor(6));

	let next = exec(insert_node("hard_break", Attrs::new()), vec![p("ab")], Selection::cursor(2));
	let block = next.doc().child(0).unwrap();
	assert_eq!(block.child_count(), 3);
	assert_eq!(block.child(1).map(Node::kind), Some("hard_break"));
	assert_eq!(next.selection(), &Selection::cursor(3));
}

#[test]
fn test_insert_block_placement() {
	let content = || vec![p("ab"), p("cd")];
	let rule = json!({"type": "horizontal_rule"});
	let after = exec(insert_block(2, rule.clone(), BlockPlacement::After), content(), Selection::cursor(1));
	assert_eq!(kinds(after.doc()), vec!["paragraph", "horizontal_rule", "paragraph"]);
	let before = exec(insert_block(6, rule.clone(), BlockPlacement::Before), content(), Selection::cursor(1));
	assert_eq!(kinds(before.doc()), vec!["paragraph", "horizontal_rule", "paragraph"]);
	let smart = exec(insert_block(6, rule.clone(), BlockPlacement::Smart), content(), Selection::cursor(1));
	assert_eq!(kinds(smart.doc()), vec!["paragraph", "paragraph", "horizontal_rule"]);

	assert!(fails(insert_block(2, json!({"type": "nope"}), BlockPlacement::After), content(), Selection::cursor(1)));
}

#[test]
fn test_builtin_factories_read_args() {
	let map = builtins();
	let factory = map.get("selectText").unwrap();
	let cmd = factory(&CommandArgs::new().with(2).with(4).with(0));
	let next = exec(cmd, vec![p("Lorem ipsum")], Selection::cursor(1));
	assert_eq!(next.selection(), &Selection::text(3, 7));

	let factory = map.get("insertBlockAfter").unwrap();
	let cmd = factory(&CommandArgs::new().with(2).with(json!({"type": "horizontal_rule"})));
	let next = exec(cmd, vec![p("ab")], Selection::cursor(1));
	assert_eq!(kinds(next.doc()), vec!["paragraph", "horizontal_rule"]);
}

#[test]
fn test_toggle_mark_over_range() {
	let marked = exec(toggle_mark("em", Attrs::new()), vec![p("Lorem ipsum")], Selection::text(3, 7));
	let block = marked.doc().child(0).unwrap();
	assert_eq!(
		text_runs(block),
		vec![
			("Lo".to_string(), vec![]),
			("rem ".to_string(), vec!["em".to_string()]),
			("ipsum".to_string(), vec![]),
		]
	);
	assert!(mark_active(&marked, "em"));

	let cleared = run(&toggle_mark("em", Attrs::new()), &marked).unwrap();
	assert_eq!(cleared.doc().child(0).map(Node::child_count), Some(1));
	assert!(!mark_active(&cleared, "em"));
}

#[test]
fn test_toggle_mark_at_cursor_stores_marks() {
	let stored = exec(toggle_mark("strong", Attrs::new()), vec![p("ab")], Selection::cursor(2));
	assert!(mark_active(&stored, "strong"));
	let typed = run(&insert_text("x", None), &stored).unwrap();
	let block = typed.doc().child(0).unwrap();
	assert_eq!(block.child(1).map(|n| n.marks().len()), Some(1));
	assert_eq!(blocks(typed.doc()), vec!["axb"]);
}

#[test]
fn test_toggle_mark_skips_code() {
	assert!(fails(toggle_mark("em", Attrs::new()), vec![code("ab")], Selection::text(1, 3)));
}

proptest! {
	#[test]
	fn select_text_always_yields_valid_selection(start in 0usize..40, len in 0usize..40, block in 0usize..2) {
		let state = state(vec![p("Lorem"), h(2, "ipsum dolor")], Selection::cursor(1));
		let next = run(&select_text(start, len, block), &state).unwrap();
		prop_assert!(next.selection().is_valid(next.doc(), next.schema()));
		prop_assert!(next.selection().from() <= next.selection().to(next.doc()));
	}
}
