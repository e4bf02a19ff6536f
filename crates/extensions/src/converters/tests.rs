use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;
use vellum_editor::{Content, EditorConfig, EditorError};
use vellum_model::{Attrs, Node};
use vellum_registry::{ConvertError, ExtensionConfig};

use super::*;
use crate::basic_editor;
use crate::test_support::{blocks, doc, editor, h, kinds, p};

#[test]
fn test_json_round_trip() {
	let editor = editor(vec![h(2, "Title"), p("body")]);
	let bytes = editor.save_document(JSON_MIME).unwrap();
	let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
	assert_eq!(value, editor.to_json().unwrap());

	let loaded = basic_editor(EditorConfig::default(), Content::Bytes {
		mime: JSON_MIME.into(),
		bytes,
	})
	.unwrap();
	assert_eq!(loaded.document(), editor.document());
}

#[test]
fn test_json_errors_leave_state_alone() {
	let mut editor = editor(vec![p("keep")]);
	let err = editor.load_document(JSON_MIME, b"{not json").unwrap_err();
	assert!(matches!(err, EditorError::Convert(ConvertError::Json { .. })), "{err}");

	let err = editor
		.load_document(JSON_MIME, br#"{"type": "doc", "content": [{"type": "table"}]}"#)
		.unwrap_err();
	assert!(matches!(err, EditorError::Convert(ConvertError::Schema(_)) | EditorError::Schema(_)), "{err}");
	assert_eq!(blocks(editor.document()), vec!["keep"]);
}

#[test]
fn test_pretty_json_option() {
	let mut options = ExtensionConfig::new();
	options.set("pretty", true);
	let mut config = EditorConfig::default();
	config.extensions.insert("json".into(), options);
	let editor = basic_editor(config, Content::Empty).unwrap();
	let saved = String::from_utf8(editor.save_document(JSON_MIME).unwrap()).unwrap();
	assert!(saved.contains('\n'));
}

#[test]
fn test_plain_text_lines() {
	let schema = editor(vec![p("")]).schema().clone();
	let doc = PlainTextConverter.to_doc(b"one\n\nthree", &schema).unwrap();
	assert_eq!(blocks(&doc), vec!["one", "", "three"]);

	let crlf = PlainTextConverter.to_doc(b"one\r\ntwo\r\n", &schema).unwrap();
	assert_eq!(blocks(&crlf), vec!["one", "two", ""]);

	let empty = PlainTextConverter.to_doc(b"", &schema).unwrap();
	assert_eq!(blocks(&empty), vec![""]);

	let err = PlainTextConverter.to_doc(&[0xff, 0xfe], &schema).unwrap_err();
	assert!(matches!(err, ConvertError::Encoding { ref mime, .. } if mime == TEXT_MIME));
}

#[test]
fn test_plain_text_keeps_trailing_empty_lines() {
	let mut editor = editor(vec![p("")]);
	for source in [&b"\n"[..], b"a\n\nb\n"] {
		editor.load_document(TEXT_MIME, source).unwrap();
		assert_eq!(editor.save_document(TEXT_MIME).unwrap(), source.to_vec());
	}
	assert_eq!(blocks(editor.document()), vec!["a", "", "b", ""]);
}

#[test]
fn test_plain_text_save_flattens_structure() {
	let quote = Node::branch("blockquote", Attrs::new(), vec![p("quoted")]);
	let broken = Node::branch(
		"paragraph",
		Attrs::new(),
		vec![Node::text("a"), Node::leaf("hard_break", Attrs::new()), Node::text("b")],
	);
	let editor = basic_editor(
		EditorConfig::default(),
		Content::Doc(doc(vec![h(1, "Title"), quote, broken, Node::leaf("horizontal_rule", Attrs::new())])),
	)
	.unwrap();
	assert_eq!(editor.save_document(TEXT_MIME).unwrap(), b"Title\nquoted\na\nb".to_vec());
}

#[test]
fn test_loading_text_replaces_document() {
	let mut editor = editor(vec![h(1, "Title")]);
	editor.load_document(TEXT_MIME, b"first\nsecond").unwrap();
	assert_eq!(kinds(editor.document()), vec!["paragraph", "paragraph"]);
	assert_eq!(editor.to_json().unwrap()["content"][1], json!({"type": "paragraph", "content": [{"type": "text", "text": "second"}]}));
}

proptest! {
	#[test]
	fn test_plain_text_round_trips_lines(lines in prop::collection::vec("[a-z ]{0,8}", 1..6)) {
		let editor = editor(vec![p("")]);
		let source = lines.join("\n");
		let doc = PlainTextConverter.to_doc(source.as_bytes(), editor.schema()).unwrap();
		let saved = PlainTextConverter.from_doc(&doc, editor.schema()).unwrap();
		prop_assert_eq!(String::from_utf8(saved).unwrap(), source);
	}
}
