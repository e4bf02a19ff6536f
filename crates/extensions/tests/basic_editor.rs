//! End-to-end scenarios over the basic kit.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use pretty_assertions::assert_eq;
use serde_json::json;
use vellum_editor::{ChangeEvent, Content, Editor, EditorConfig};
use vellum_extensions::{BASIC_EDITOR, basic_editor, basic_extensions, basic_kit};
use vellum_primitives::{CommandArgs, Selection, command, first_command};
use vellum_registry::{ExtensionDescriptor, resolve};

fn init_tracing() {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn lorem() -> Editor {
	init_tracing();
	basic_editor(
		EditorConfig::default(),
		Content::Json(json!({
			"type": "doc",
			"content": [{"type": "paragraph", "content": [{"type": "text", "text": "Lorem ipsum"}]}],
		})),
	)
	.unwrap()
}

fn changes(editor: &mut Editor) -> Arc<AtomicUsize> {
	let count = Arc::new(AtomicUsize::new(0));
	let sink = Arc::clone(&count);
	editor.subscribe(move |event| {
		if matches!(event, ChangeEvent::Changed { .. }) {
			sink.fetch_add(1, Ordering::SeqCst);
		}
	});
	count
}

fn run_count(editor: &Editor) -> usize {
	editor.document().child(0).map_or(0, |block| block.child_count())
}

fn select_text(start: usize, len: usize) -> CommandArgs {
	CommandArgs::new().with(start).with(len).with(0)
}

#[test]
fn italic_toggle_undo_and_redo() {
	let mut editor = lorem();
	let changed = changes(&mut editor);

	assert!(
		editor
			.chain()
			.command("selectText", select_text(2, 4))
			.command("toggleItalic", CommandArgs::new())
			.run()
	);
	assert_eq!(run_count(&editor), 3);
	let middle = editor.document().child(0).and_then(|b| b.child(1)).unwrap();
	assert_eq!(middle.as_text(), Some("rem "));
	assert_eq!(middle.marks()[0].kind, "em");
	assert_eq!(changed.load(Ordering::SeqCst), 1);

	assert!(editor.handle_key("Mod-z"));
	assert_eq!(run_count(&editor), 1);
	assert_eq!(changed.load(Ordering::SeqCst), 2);

	assert!(editor.handle_key("Mod-y"));
	assert_eq!(run_count(&editor), 3);
	assert_eq!(changed.load(Ordering::SeqCst), 3);

	assert!(editor.run("toggleItalic", CommandArgs::new()));
	assert_eq!(run_count(&editor), 1);
	assert!(editor.document().child(0).and_then(|b| b.child(0)).unwrap().marks().is_empty());
}

#[test]
fn heading_shortcut_and_revert() {
	init_tracing();
	let mut editor = basic_editor(EditorConfig::default(), Content::Empty).unwrap();
	assert!(editor.handle_text_input("#"));
	assert!(editor.handle_text_input(" "));
	let block = editor.document().child(0).unwrap();
	assert_eq!(block.kind(), "heading");
	assert_eq!(block.attr("level"), Some(&json!(1)));

	assert!(editor.handle_key("Backspace"));
	let block = editor.document().child(0).unwrap();
	assert_eq!(block.kind(), "paragraph");
	assert_eq!(block.text_content(), "# ");
}

#[test]
fn dry_run_predicts_commit() {
	let mut editor = lorem();
	let changed = changes(&mut editor);
	let before = editor.document().clone();

	assert!(
		editor
			.can()
			.command("selectText", select_text(0, 5))
			.command("toggleStrong", CommandArgs::new())
			.run()
	);
	assert_eq!(editor.document(), &before);
	assert_eq!(changed.load(Ordering::SeqCst), 0);

	assert!(
		editor
			.chain()
			.command("selectText", select_text(0, 5))
			.command("toggleStrong", CommandArgs::new())
			.run()
	);
	assert_eq!(run_count(&editor), 2);
	assert_eq!(changed.load(Ordering::SeqCst), 1);
}

#[test]
fn first_command_runs_one_candidate() {
	let mut editor = lorem();
	let calls = Arc::new(AtomicUsize::new(0));
	let counted = |calls: &Arc<AtomicUsize>| {
		let calls = Arc::clone(calls);
		command(move |state, dispatch| {
			if let Some(dispatch) = dispatch {
				calls.fetch_add(1, Ordering::SeqCst);
				let mut tr = state.tr();
				tr.set_selection(Selection::All);
				dispatch(tr);
			}
			true
		})
	};
	let never = command(|_, _| false);

	let combined = first_command(vec![never, counted(&calls), counted(&calls)]);
	assert!(editor.chain().then(combined).run());
	assert_eq!(calls.load(Ordering::SeqCst), 1);
	assert_eq!(editor.selection(), &Selection::All);
}

#[test]
fn duplicate_declarations_resolve_once() {
	let a = || ExtensionDescriptor::behavior("a");
	let b = ExtensionDescriptor::behavior("b").requires("a");
	let resolved = resolve(&[a(), b, a()]).unwrap();
	assert_eq!(resolved.names(), vec!["a", "b"]);

	let mut doubled = basic_extensions();
	doubled.extend(basic_extensions());
	let twice = Editor::new(EditorConfig::default(), &doubled, Content::Empty).unwrap();
	let once = basic_editor(EditorConfig::default(), Content::Empty).unwrap();
	assert_eq!(twice.schema().nodes().count(), once.schema().nodes().count());
	assert!(once.registry().extensions().contains(BASIC_EDITOR));
}

#[test]
fn kit_bundle_contains_every_extension() {
	let kit = basic_kit();
	let names: Vec<_> = kit.bundled().iter().map(ExtensionDescriptor::name).collect();
	assert_eq!(names.len(), basic_extensions().len());
	assert!(names.contains(&"history"));
	assert!(names.contains(&"plain_text"));
}

#[test]
fn json_and_text_documents() {
	let mut editor = lorem();
	let saved = editor.save_document("application/json").unwrap();
	assert_eq!(serde_json::from_slice::<serde_json::Value>(&saved).unwrap(), editor.to_json().unwrap());

	editor.load_document("text/plain", b"alpha\nbeta").unwrap();
	assert_eq!(editor.save_document("text/plain").unwrap(), b"alpha\nbeta".to_vec());
	assert!(editor.load_document("text/html", b"<p>x</p>").is_err());
	assert_eq!(editor.document().child_count(), 2);
}
