//! Input rules: text patterns that trigger an edit as the user types.

use std::fmt;
use std::sync::Arc;

use regex::{Captures, Regex};
use vellum_primitives::{EditorState, Transaction};

/// Builds the transaction for a matched rule.
///
/// Receives the state before the typed text is inserted, the captures of the
/// pattern against the text before the cursor plus the typed text, and the
/// document range `start..end` covered by the part of the match already in
/// the document. Returning `None` lets the next rule try.
pub type InputRuleHandler =
	Arc<dyn Fn(&EditorState, &Captures<'_>, usize, usize) -> Option<Transaction> + Send + Sync>;

/// A pattern anchored at the cursor plus the edit it triggers.
#[derive(Clone)]
pub struct InputRule {
	name: String,
	regex: Regex,
	handler: InputRuleHandler,
}

impl InputRule {
	/// Creates a rule. A `$` anchor is appended when `pattern` lacks one.
	///
	/// # Errors
	///
	/// Returns the regex compile error for an invalid pattern.
	pub fn new<F>(name: impl Into<String>, pattern: &str, handler: F) -> Result<Self, regex::Error>
	where
		F: Fn(&EditorState, &Captures<'_>, usize, usize) -> Option<Transaction> + Send + Sync + 'static,
	{
		let anchored = if pattern.ends_with('$') {
			pattern.to_string()
		} else {
			format!("{pattern}$")
		};
		Ok(Self {
			name: name.into(),
			regex: Regex::new(&anchored)?,
			handler: Arc::new(handler),
		})
	}

	/// A rule that replaces the matched text with `replacement`.
	///
	/// # Errors
	///
	/// Returns the regex compile error for an invalid pattern.
	pub fn replace(name: impl Into<String>, pattern: &str, replacement: impl Into<String>) -> Result<Self, regex::Error> {
		let replacement = replacement.into();
		Self::new(name, pattern, move |state, _, start, end| {
			let mut tr = state.tr();
			tr.insert_text(&replacement, start, end).ok()?;
			Some(tr)
		})
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn regex(&self) -> &Regex {
		&self.regex
	}

	/// Runs the rule against `text`, which ends at the cursor after typing.
	///
	/// `text_start` is the document position of the first character of
	/// `text`, and `typed_len` the number of trailing characters not yet in
	/// the document.
	pub fn apply(&self, state: &EditorState, text: &str, text_start: usize, typed_len: usize) -> Option<Transaction> {
		let captures = self.regex.captures(text)?;
		let matched = captures.get(0)?;
		let char_start = text[..matched.start()].chars().count();
		let char_len = text.chars().count();
		let end = text_start + char_len.saturating_sub(typed_len);
		let start = (text_start + char_start).min(end);
		(self.handler)(state, &captures, start, end)
	}
}

impl fmt::Debug for InputRule {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("InputRule")
			.field("name", &self.name)
			.field("pattern", &self.regex.as_str())
			.finish_non_exhaustive()
	}
}
