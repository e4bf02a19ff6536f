use vellum_model::{Attrs, Node};

use super::*;
use crate::test_support::{doc, p, prepared, schema};

#[test]
fn test_ranges() {
	let schema = schema();
	let d = prepared(&schema, doc(vec![p("Lorem"), p("ipsum")]));
	let sel = Selection::text(4, 2);
	assert_eq!(sel.from(), 2);
	assert_eq!(sel.to(&d), 4);
	assert!(!sel.is_empty(&d));
	assert_eq!(Selection::All.to(&d), 14);
	assert_eq!(Selection::node(7).to(&d), 14);
	assert_eq!(Selection::cursor(3).cursor_pos(), Some(3));
	assert_eq!(sel.cursor_pos(), None);
}

#[test]
fn test_near_snaps_into_textblocks() {
	let schema = schema();
	let hr = Node::leaf("horizontal_rule", Attrs::new());
	let d = prepared(&schema, doc(vec![p("ab"), hr, p("cd")]));
	// p(0..4) hr(4) p(5..9)
	assert_eq!(Selection::at_start(&d, &schema), Selection::cursor(1));
	assert_eq!(Selection::at_end(&d, &schema), Selection::cursor(8));
	assert_eq!(Selection::near(&d, &schema, 4, Bias::Right), Selection::cursor(6));
	assert_eq!(Selection::near(&d, &schema, 4, Bias::Left), Selection::cursor(3));
	assert_eq!(Selection::near(&d, &schema, 2, Bias::Left), Selection::cursor(2));
}

#[test]
fn test_near_without_textblocks() {
	let schema = schema();
	let d = prepared(&schema, doc(vec![Node::leaf("horizontal_rule", Attrs::new())]));
	assert_eq!(Selection::at_start(&d, &schema), Selection::All);
}

#[test]
fn test_validity() {
	let schema = schema();
	let hr = Node::leaf("horizontal_rule", Attrs::new());
	let d = prepared(&schema, doc(vec![p("ab"), hr]));
	assert!(Selection::cursor(2).is_valid(&d, &schema));
	assert!(!Selection::cursor(0).is_valid(&d, &schema));
	assert!(Selection::node(4).is_valid(&d, &schema));
	assert!(!Selection::node(5).is_valid(&d, &schema));
}

#[test]
fn test_map_through_insert() {
	let schema = schema();
	let before = prepared(&schema, doc(vec![p("Lorem")]));
	let step = Step::Insert {
		pos: 1,
		content: vec![Node::text(">>")],
	};
	let after = step.apply(&before, &schema).unwrap();
	assert_eq!(Selection::cursor(1).map(&step, &after, &schema), Selection::cursor(3));
	assert_eq!(Selection::text(2, 4).map(&step, &after, &schema), Selection::text(4, 6));
	assert_eq!(Selection::All.map(&step, &after, &schema), Selection::All);
}

#[test]
fn test_node_selection_dropped_when_deleted() {
	let schema = schema();
	let hr = Node::leaf("horizontal_rule", Attrs::new());
	let before = prepared(&schema, doc(vec![p("ab"), hr]));
	let step = Step::Delete { from: 4, to: 5 };
	let after = step.apply(&before, &schema).unwrap();
	assert_eq!(Selection::node(4).map(&step, &after, &schema), Selection::cursor(3));
}
