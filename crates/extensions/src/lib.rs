//! Basic extension kit for vellum.
//!
//! Each function here returns one [`ExtensionDescriptor`]. Together they make
//! a complete rich-text editor: block and inline nodes, the `em`, `strong`,
//! `code` and `strike` marks, a base keymap, undo history, markdown-style
//! input rules and converters for `application/json` and `text/plain`.
//!
//! ```no_run
//! use vellum_editor::{Content, EditorConfig};
//!
//! let mut editor = vellum_extensions::basic_editor(EditorConfig::default(), Content::Empty)?;
//! editor.handle_text_input("# ");
//! # Ok::<(), vellum_editor::EditorError>(())
//! ```

use tracing::debug;
use vellum_editor::{Content, Editor, EditorConfig, EditorError};
use vellum_registry::ExtensionDescriptor;

pub use behaviors::{base_keymap, history, input_rules, select_parent_node, selection};
pub use converters::{JSON_MIME, JsonConverter, PlainTextConverter, TEXT_MIME, json, plain_text};
pub use marks::{code, em, strike, strong};
pub use nodes::{blockquote, code_block, doc, hard_break, heading, horizontal_rule, paragraph, text};

mod behaviors;
mod converters;
mod marks;
mod nodes;

#[cfg(test)]
mod test_support;

/// Name of the extension bundling the whole kit.
pub const BASIC_EDITOR: &str = "basic_editor";

/// Every extension in the kit, in declaration order.
pub fn basic_extensions() -> Vec<ExtensionDescriptor> {
	vec![
		doc(),
		paragraph(),
		text(),
		heading(),
		blockquote(),
		code_block(),
		horizontal_rule(),
		hard_break(),
		strong(),
		em(),
		code(),
		strike(),
		base_keymap(),
		selection(),
		history(),
		input_rules(),
		json(),
		plain_text(),
	]
}

/// One extension that bundles the whole kit.
pub fn basic_kit() -> ExtensionDescriptor {
	basic_extensions()
		.into_iter()
		.fold(ExtensionDescriptor::behavior(BASIC_EDITOR), ExtensionDescriptor::bundle)
}

/// Builds an editor over the basic kit.
///
/// # Errors
///
/// Returns an [`EditorError`] when `content` cannot be loaded or the
/// configuration rejects the kit.
pub fn basic_editor(config: EditorConfig, content: Content) -> Result<Editor, EditorError> {
	let editor = Editor::new(config, &[basic_kit()], content)?;
	debug!(extensions = editor.registry().extensions().len(), "basic editor ready");
	Ok(editor)
}
