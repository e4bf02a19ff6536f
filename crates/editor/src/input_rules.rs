//! Input rules at runtime.
//!
//! [`run_input_rules`] matches the registered rules against the text before
//! the cursor plus the text being typed. When a rule fires, the
//! [`InputRules`] behavior remembers what it replaced until the next
//! document or selection change, which is what lets [`undo_input_rule`]
//! put the typed text back.

use std::sync::Arc;

use regex::Captures;
use serde::{Deserialize, Serialize};
use vellum_model::{Attrs, Node, ResolvedPos};
use vellum_primitives::{Behavior, Command, EditorState, Selection, Slot, Transaction};
use vellum_registry::InputRule;

use crate::commands::transaction_command;


/// Name of the input rules behavior and of its extension.
pub const INPUT_RULES: &str = "input_rules";

const APPLIED: &str = "input_rule";

/// How far back before the cursor rules can match, in characters.
const MAX_MATCH: usize = 500;

/// Stands in for inline leaves in the text rules match against.
const LEAF_TEXT: &str = "\u{fffc}";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AppliedMeta {
	rule: String,
	from: usize,
	to: usize,
	text: String,
}

/// The input rules slot: the last rule applied.
#[derive(Debug, Clone)]
pub struct AppliedRule {
	rule: String,
	before: Arc<Node>,
	after: Arc<Node>,
	from: usize,
	to: usize,
	text: String,
}

impl AppliedRule {
	/// Name of the rule that fired.
	pub fn rule(&self) -> &str {
		&self.rule
	}

	/// The typed text the rule consumed.
	pub fn text(&self) -> &str {
		&self.text
	}
}

/// Tracks the last applied input rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputRules;

impl Behavior for InputRules {
	fn name(&self) -> &str {
		INPUT_RULES
	}

	fn apply(&self, tr: &Transaction, slot: Option<&Slot>, old: &EditorState, new: &EditorState) -> Option<Slot> {
		if let Some(meta) = tr.meta(APPLIED).and_then(|v| serde_json::from_value::<AppliedMeta>(v.clone()).ok()) {
			return Some(Arc::new(AppliedRule {
				rule: meta.rule,
				before: Arc::clone(old.doc_arc()),
				after: Arc::clone(new.doc_arc()),
				from: meta.from,
				to: meta.to,
				text: meta.text,
			}));
		}
		if tr.doc_changed() || tr.selection_set() {
			None
		} else {
			slot.cloned()
		}
	}
}

/// Runs `rules` for `text` typed at the cursor of `state`.
///
/// Rules never run inside code textblocks or over a non-empty selection.
/// Returns the transaction of the first rule that fires.
pub fn run_input_rules(state: &EditorState, rules: &[InputRule], text: &str) -> Option<Transaction> {
	let cursor = state.selection().cursor_pos()?;
	let doc = state.doc();
	let schema = state.schema();
	let resolved = ResolvedPos::resolve(doc, cursor).ok()?;
	let parent = resolved.parent();
	if !schema.is_textblock(parent) || schema.is_code(parent) {
		return None;
	}

	let text_start = resolved.start(resolved.depth()).max(cursor.saturating_sub(MAX_MATCH));
	let before = doc.text_between(text_start, cursor, None, LEAF_TEXT);
	let combined = format!("{before}{text}");
	let typed = text.chars().count();

	rules.iter().find_map(|rule| {
		let mut tr = rule.apply(state, &combined, text_start, typed)?;
		let meta = AppliedMeta {
			rule: rule.name().to_string(),
			from: cursor,
			to: cursor,
			text: text.to_string(),
		};
		tr.set_meta(APPLIED, serde_json::to_value(meta).ok()?);
		Some(tr)
	})
}

/// Reverts the input rule applied by the previous transaction, inserting the
/// typed text it consumed instead.
pub fn undo_input_rule() -> Command {
	transaction_command(|state| {
		let applied = state.slot_as::<AppliedRule>(INPUT_RULES)?;
		if !Arc::ptr_eq(state.doc_arc(), &applied.after) && **state.doc_arc() != *applied.after {
			return None;
		}
		let mut tr = state.tr();
		tr.replace(0, state.doc().content_size(), applied.before.content().to_vec()).ok()?;
		tr.insert_text(&applied.text, applied.from, applied.to).ok()?;
		Some(tr)
	})
}

/// A rule that turns the textblock where `pattern` matched into a `kind`
/// block, with attributes derived from the captures. The matched text is
/// removed.
///
/// # Errors
///
/// Returns the regex compile error for an invalid pattern.
pub fn textblock_type_rule<F>(
	name: impl Into<String>,
	pattern: &str,
	kind: impl Into<String>,
	attrs: F,
) -> Result<InputRule, regex::Error>
where
	F: Fn(&Captures<'_>) -> Attrs + Send + Sync + 'static,
{
	let kind = kind.into();
	InputRule::new(name, pattern, move |state, captures, start, end| {
		let block_pos = block_before(state, start)?;
		let mut tr = state.tr();
		tr.delete(start, end).ok()?;
		let block = tr.doc().node_at(block_pos)?.clone();
		let retyped = state.schema().create(&kind, &attrs(captures), block.content().to_vec()).ok()?;
		tr.replace(block_pos, block_pos + block.node_size(), vec![retyped]).ok()?;
		tr.set_selection(Selection::cursor(start));
		Some(tr)
	})
}

/// A rule that wraps the textblock where `pattern` matched in a `kind`
/// node. The matched text is removed.
///
/// # Errors
///
/// Returns the regex compile error for an invalid pattern.
pub fn wrapping_rule<F>(
	name: impl Into<String>,
	pattern: &str,
	kind: impl Into<String>,
	attrs: F,
) -> Result<InputRule, regex::Error>
where
	F: Fn(&Captures<'_>) -> Attrs + Send + Sync + 'static,
{
	let kind = kind.into();
	InputRule::new(name, pattern, move |state, captures, start, end| {
		let block_pos = block_before(state, start)?;
		let mut tr = state.tr();
		tr.delete(start, end).ok()?;
		let block = tr.doc().node_at(block_pos)?.clone();
		let size = block.node_size();
		let wrapper = state.schema().create(&kind, &attrs(captures), vec![block]).ok()?;
		tr.replace(block_pos, block_pos + size, vec![wrapper]).ok()?;
		tr.set_selection(Selection::cursor(start + 1));
		Some(tr)
	})
}

/// A rule that applies the `kind` mark to delimited text.
///
/// Capture group 1 is the whole delimited token and group 2 the text inside
/// the delimiters. The delimiters are removed, the inner text is marked and
/// the cursor ends after it with the mark no longer stored.
///
/// # Errors
///
/// Returns the regex compile error for an invalid pattern.
pub fn mark_rule(name: impl Into<String>, pattern: &str, kind: impl Into<String>) -> Result<InputRule, regex::Error> {
	let kind = kind.into();
	InputRule::new(name, pattern, move |state, captures, start, end| {
		let whole = captures.get(0)?;
		let token = captures.get(1)?;
		let inner = captures.get(2)?;
		let chars_before = |offset: usize| whole.as_str()[..offset - whole.start()].chars().count();

		let token_from = start + chars_before(token.start());
		let inner_from = start + chars_before(inner.start());
		let inner_to = inner_from + inner.as_str().chars().count();
		if inner_to > end || inner_from == inner_to {
			return None;
		}

		let mark = state.schema().mark(&kind, &Attrs::new()).ok()?;
		let mut tr = state.tr();
		if end > inner_to {
			tr.delete(inner_to, end).ok()?;
		}
		tr.add_mark(inner_from, inner_to, mark).ok()?;
		if inner_from > token_from {
			tr.delete(token_from, inner_from).ok()?;
		}
		let cursor = inner_to - (inner_from - token_from);
		let marks = ResolvedPos::resolve(tr.doc(), cursor).ok()?.marks();
		let stored = state.schema().remove_mark_from_set(&kind, &marks);
		tr.set_selection(Selection::cursor(cursor));
		tr.set_stored_marks(Some(stored));
		Some(tr)
	})
}

/// Position before the textblock holding `pos`.
fn block_before(state: &EditorState, pos: usize) -> Option<usize> {
	let resolved = ResolvedPos::resolve(state.doc(), pos).ok()?;
	let depth = resolved.depth();
	(depth > 0 && state.schema().is_textblock(resolved.parent())).then(|| resolved.before(depth))
}
