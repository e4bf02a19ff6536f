//! # Parser
//!
//! Parses plain-text key chords such as `"Mod-Shift-z"`, `"Ctrl-Alt-F1"` or
//! `"Backspace"` into a canonical [`Chord`].
//!
//! ## Supported Syntax
//!
//! ```text
//! chord     = modifiers* key
//! modifiers = modifier "-"
//! modifier  = "mod" | "ctrl" | "control" | "c" | "alt" | "a"
//!           | "meta" | "cmd" | "m" | "shift" | "s"
//! key       = fn-key | named-key | char
//! fn-key    = "f" digit digit?
//! named-key = "backspace" | "enter" | "arrowup" | ...
//! char      = any single character, including "-"
//! ```
//!
//! Modifier and named-key spellings are case-insensitive. Letter keys are
//! stored lowercase, so `Shift-A` and `shift-a` are the same chord. `Mod`
//! resolves through [`Platform::primary`].

use crate::chord::{Chord, KEY_SEP, Key, Modifiers, NamedKey, Platform};

#[cfg(test)]
mod tests;

/// Function pointer type for parser combinators.
type ParserFn<T> = fn(&mut Parser) -> Result<Option<T>, ParseError>;

/// Represents an error that occurred during parsing.
#[derive(Debug, PartialEq, Eq, Clone, thiserror::Error)]
#[error("invalid key chord {input:?} at position {position}: {message}")]
pub struct ParseError {
	/// The chord text that failed to parse.
	pub input: String,
	/// Human-readable description of the parse error.
	pub message: String,
	/// Byte offset in the input where the error occurred.
	pub position: usize,
}

/// Maintains the parser's state for recursive descent parsing.
struct Parser<'a> {
	source: &'a str,
	input: &'a str,
	position: usize,
	platform: Platform,
}

impl<'a> Parser<'a> {
	fn new(input: &'a str, platform: Platform) -> Self {
		Self {
			source: input,
			input,
			position: 0,
			platform,
		}
	}

	fn peek(&self) -> Option<char> {
		self.input.chars().next()
	}

	fn peek_at(&self, n: usize) -> Option<char> {
		self.input.chars().nth(n)
	}

	/// Consumes and returns the next character, advancing the parser.
	fn next(&mut self) -> Option<char> {
		let ch = self.peek()?;
		self.position += ch.len_utf8();
		self.input = &self.input[ch.len_utf8()..];
		Some(ch)
	}

	fn is_end(&self) -> bool {
		self.input.is_empty()
	}

	/// Consumes the next character if it matches the expected one.
	fn take(&mut self, expected: char) -> Result<(), ParseError> {
		match self.next() {
			Some(ch) if ch == expected => Ok(()),
			Some(ch) => Err(ParseError {
				input: self.source.to_string(),
				message: format!("expected '{expected}', found '{ch}'"),
				position: self.position - ch.len_utf8(),
			}),
			None => Err(self.error(format!("expected '{expected}', found end of input"))),
		}
	}

	/// Attempts to parse with a fallback: restores state if parsing fails.
	fn try_parse<T, F>(&mut self, f: F) -> Result<Option<T>, ParseError>
	where
		F: FnOnce(&mut Parser<'a>) -> Result<Option<T>, ParseError>,
	{
		let snapshot = (self.input, self.position);
		match f(self) {
			Ok(Some(val)) => Ok(Some(val)),
			Ok(None) | Err(_) => {
				self.input = snapshot.0;
				self.position = snapshot.1;
				Ok(None)
			}
		}
	}

	/// Consumes and returns characters that satisfy a predicate.
	fn take_while<F>(&mut self, predicate: F) -> String
	where
		F: Fn(char) -> bool,
	{
		let mut result = String::new();
		while let Some(ch) = self.peek() {
			if !predicate(ch) {
				break;
			}
			result.push(ch);
			self.next();
		}
		result
	}

	/// Tries multiple parsers in sequence, returning the result of the first successful one.
	fn alt<T>(&mut self, parsers: &[ParserFn<T>]) -> Result<Option<T>, ParseError> {
		for p in parsers {
			if let Some(value) = p(self)? {
				return Ok(Some(value));
			}
		}
		Ok(None)
	}

	fn error(&self, message: String) -> ParseError {
		ParseError {
			input: self.source.to_string(),
			message,
			position: self.position,
		}
	}
}

/// Parses a single chord, resolving `Mod` for `platform`.
///
/// # Errors
///
/// Returns a [`ParseError`] if the input does not match the chord grammar,
/// repeats a modifier, or names an unknown key.
pub fn parse(s: &str, platform: Platform) -> Result<Chord, ParseError> {
	let mut parser = Parser::new(s, platform);
	let chord = parse_chord(&mut parser)?;

	if let Some(ch) = parser.peek() {
		return Err(parser.error(format!("expected end of input, found '{ch}'")));
	}

	Ok(chord)
}

/// Parses a chord and returns its canonical spelling.
///
/// # Errors
///
/// Same as [`parse`].
pub fn normalize(s: &str, platform: Platform) -> Result<String, ParseError> {
	parse(s, platform).map(|chord| chord.to_string())
}

/// Grammar: `chord = modifiers* key`
fn parse_chord(parser: &mut Parser) -> Result<Chord, ParseError> {
	let mut modifiers = Modifiers::empty();

	while let Some((start, modifier)) = try_parse_modifier(parser)? {
		if modifiers.contains(modifier) {
			return Err(ParseError {
				input: parser.source.to_string(),
				message: "duplicate modifier".to_string(),
				position: start,
			});
		}
		modifiers |= modifier;
	}

	let key = parse_key(parser)?;
	Ok(Chord::new(modifiers, key))
}

fn modifier_named(name: &str, platform: Platform) -> Option<Modifiers> {
	Some(match name.to_ascii_lowercase().as_str() {
		"mod" => platform.primary(),
		"ctrl" | "control" | "c" => Modifiers::CTRL,
		"alt" | "option" | "a" => Modifiers::ALT,
		"meta" | "cmd" | "command" | "m" => Modifiers::META,
		"shift" | "s" => Modifiers::SHIFT,
		_ => return None,
	})
}

/// Attempts to parse a single modifier followed by `-` and at least one more character.
///
/// Returns the modifier's start offset so duplicates can be reported there.
fn try_parse_modifier(parser: &mut Parser) -> Result<Option<(usize, Modifiers)>, ParseError> {
	parser.try_parse(|p| {
		let start = p.position;
		let name = p.take_while(|ch| ch.is_ascii_alphabetic());
		let Some(modifier) = modifier_named(&name, p.platform) else {
			return Ok(None);
		};

		p.take(KEY_SEP)?;
		if p.is_end() {
			return Ok(None);
		}

		Ok(Some((start, modifier)))
	})
}

fn parse_key(parser: &mut Parser) -> Result<Key, ParseError> {
	match parser.alt(&[try_parse_fn_key, try_parse_named_key, try_parse_char])? {
		Some(key) => Ok(key),
		None => Err(parser.error("expected a key".to_string())),
	}
}

/// Attempts to parse a function key (`F1` to `F24`).
///
/// Only activates when the input is `f` followed by digits up to the end.
fn try_parse_fn_key(parser: &mut Parser) -> Result<Option<Key>, ParseError> {
	if !matches!(parser.peek(), Some('f' | 'F')) {
		return Ok(None);
	}
	if !matches!(parser.peek_at(1), Some(ch) if ch.is_ascii_digit()) {
		return Ok(None);
	}

	parser.next();
	let num = parser.take_while(|ch| ch.is_ascii_digit());

	match num.parse::<u8>() {
		Ok(n) if (1..=24).contains(&n) => Ok(Some(Key::F(n))),
		_ => Err(parser.error("invalid function key number (must be 1-24)".to_string())),
	}
}

/// Attempts to parse a named key such as `Backspace` or `ArrowLeft`.
///
/// A run of two or more letters that is not a known name is an error rather
/// than a sequence of character keys.
fn try_parse_named_key(parser: &mut Parser) -> Result<Option<Key>, ParseError> {
	let len = parser.input.chars().take_while(char::is_ascii_alphabetic).count();
	if len < 2 {
		return Ok(None);
	}

	let start = parser.position;
	let name = parser.take_while(|ch| ch.is_ascii_alphabetic());
	match name.parse::<NamedKey>() {
		Ok(named) => Ok(Some(Key::Named(named))),
		Err(()) => Err(ParseError {
			input: parser.source.to_string(),
			message: format!("unknown key '{name}'"),
			position: start,
		}),
	}
}

/// Parses a single character key. A literal space is the `Space` key.
fn try_parse_char(parser: &mut Parser) -> Result<Option<Key>, ParseError> {
	let Some(ch) = parser.peek() else {
		return Ok(None);
	};
	if ch.is_control() {
		return Ok(None);
	}
	parser.next();

	Ok(Some(match ch {
		' ' => Key::Named(NamedKey::Space),
		ch if ch.is_alphabetic() => Key::Char(ch.to_lowercase().next().unwrap_or(ch)),
		ch => Key::Char(ch),
	}))
}
