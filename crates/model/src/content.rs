//! # Content expressions
//!
//! A content expression describes which child sequences a node accepts.
//!
//! ## Supported Syntax
//!
//! ```text
//! choice  = seq ("|" seq)*
//! seq     = postfix+
//! postfix = atom ("*" | "+" | "?")*
//! atom    = name | "(" choice ")"
//! name    = (alnum | "_" | "-")+
//! ```
//!
//! A name refers either to a node type or to a group declared by node types.
//! An empty expression accepts only empty content.

use std::collections::BTreeSet;

use thiserror::Error;

#[cfg(test)]
mod tests;

/// Function pointer type for parser combinators.
type ParserFn<T> = fn(&mut Parser) -> Result<Option<T>, ContentExprError>;

/// A content expression failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid content expression `{expr}` at {position}: {message}")]
pub struct ContentExprError {
	/// The full source expression.
	pub expr: String,
	/// Human-readable description of the problem.
	pub message: String,
	/// Byte offset of the problem in `expr`.
	pub position: usize,
}

/// Parsed content expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentExpr {
	/// A node type name or group name.
	Name(String),
	/// Every element in order.
	Seq(Vec<ContentExpr>),
	/// Any one of the alternatives.
	Choice(Vec<ContentExpr>),
	/// Zero or more repetitions.
	Star(Box<ContentExpr>),
	/// One or more repetitions.
	Plus(Box<ContentExpr>),
	/// Zero or one occurrence.
	Opt(Box<ContentExpr>),
}

impl ContentExpr {
	/// Parses an expression such as `"(paragraph | heading) block*"`.
	///
	/// # Errors
	///
	/// Returns a [`ContentExprError`] when the input does not match the grammar.
	pub fn parse(source: &str) -> Result<Self, ContentExprError> {
		let mut parser = Parser::new(source);
		parser.skip_ws();
		if parser.is_end() {
			return Ok(Self::Seq(Vec::new()));
		}

		let expr = parse_choice(&mut parser)?;
		parser.skip_ws();
		if let Some(ch) = parser.peek() {
			return Err(parser.error(format!("unexpected '{ch}'")));
		}
		Ok(expr)
	}

	/// Every name referenced by the expression, in order of appearance.
	pub fn names(&self) -> Vec<&str> {
		let mut out = Vec::new();
		self.collect_names(&mut out);
		out
	}

	fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
		match self {
			Self::Name(name) => out.push(name.as_str()),
			Self::Seq(items) | Self::Choice(items) => items.iter().for_each(|item| item.collect_names(out)),
			Self::Star(inner) | Self::Plus(inner) | Self::Opt(inner) => inner.collect_names(out),
		}
	}

	/// Tests a child sequence against the expression.
	///
	/// `accepts(term, child)` decides whether the child type name `child`
	/// satisfies the expression term `term` (a type name or a group).
	pub fn matches<S: AsRef<str>>(&self, children: &[S], accepts: &dyn Fn(&str, &str) -> bool) -> bool {
		let children: Vec<&str> = children.iter().map(AsRef::as_ref).collect();
		self.advance(&children, 0, accepts).contains(&children.len())
	}

	/// Returns the child indices at which a match starting at `start` can end.
	fn advance(&self, children: &[&str], start: usize, accepts: &dyn Fn(&str, &str) -> bool) -> BTreeSet<usize> {
		match self {
			Self::Name(term) => match children.get(start) {
				Some(&child) if accepts(term.as_str(), child) => BTreeSet::from([start + 1]),
				_ => BTreeSet::new(),
			},
			Self::Seq(items) => {
				let mut states = BTreeSet::from([start]);
				for item in items {
					states = states
						.iter()
						.flat_map(|&s| item.advance(children, s, accepts))
						.collect();
					if states.is_empty() {
						break;
					}
				}
				states
			}
			Self::Choice(items) => items
				.iter()
				.flat_map(|item| item.advance(children, start, accepts))
				.collect(),
			Self::Opt(inner) => {
				let mut states = inner.advance(children, start, accepts);
				states.insert(start);
				states
			}
			Self::Star(inner) => Self::repeat(inner, children, BTreeSet::from([start]), accepts),
			Self::Plus(inner) => {
				let first = inner.advance(children, start, accepts);
				Self::repeat(inner, children, first, accepts)
			}
		}
	}

	fn repeat(
		inner: &ContentExpr,
		children: &[&str],
		seed: BTreeSet<usize>,
		accepts: &dyn Fn(&str, &str) -> bool,
	) -> BTreeSet<usize> {
		let mut reached = seed.clone();
		let mut frontier = seed;
		while !frontier.is_empty() {
			let next: BTreeSet<usize> = frontier
				.iter()
				.flat_map(|&s| inner.advance(children, s, accepts))
				.filter(|s| !reached.contains(s))
				.collect();
			reached.extend(next.iter().copied());
			frontier = next;
		}
		reached
	}

	/// Computes the shortest list of terms satisfying the expression.
	///
	/// `resolve(term)` maps a term to a concrete, creatable node type name,
	/// or `None` when nothing can be created for it. Returns `None` when the
	/// expression cannot be filled.
	pub fn fill(&self, resolve: &dyn Fn(&str) -> Option<String>) -> Option<Vec<String>> {
		match self {
			Self::Name(term) => resolve(term.as_str()).map(|name| vec![name]),
			Self::Seq(items) => {
				let mut out = Vec::new();
				for item in items {
					out.extend(item.fill(resolve)?);
				}
				Some(out)
			}
			Self::Choice(items) => items.iter().find_map(|item| item.fill(resolve)),
			Self::Star(_) | Self::Opt(_) => Some(Vec::new()),
			Self::Plus(inner) => inner.fill(resolve),
		}
	}

	/// Returns true if the expression accepts an empty child list.
	pub fn accepts_empty(&self) -> bool {
		self.matches::<&str>(&[], &|_, _| false)
	}
}

/// Maintains the parser's state for recursive descent parsing.
struct Parser<'a> {
	/// The full source, kept for error reporting.
	source: &'a str,
	/// The remaining input.
	input: &'a str,
	/// Current byte position in the source.
	position: usize,
}

impl<'a> Parser<'a> {
	fn new(source: &'a str) -> Self {
		Self {
			source,
			input: source,
			position: 0,
		}
	}

	fn peek(&self) -> Option<char> {
		self.input.chars().next()
	}

	fn next(&mut self) -> Option<char> {
		let ch = self.peek()?;
		self.position += ch.len_utf8();
		self.input = &self.input[ch.len_utf8()..];
		Some(ch)
	}

	fn is_end(&self) -> bool {
		self.input.is_empty()
	}

	fn skip_ws(&mut self) {
		while self.peek().is_some_and(char::is_whitespace) {
			self.next();
		}
	}

	/// Consumes the next non-whitespace character if it matches.
	fn eat(&mut self, expected: char) -> bool {
		self.skip_ws();
		if self.peek() == Some(expected) {
			self.next();
			true
		} else {
			false
		}
	}

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
	fn alt<T>(&mut self, parsers: &[ParserFn<T>]) -> Result<Option<T>, ContentExprError> {
		for p in parsers {
			if let Some(value) = p(self)? {
				return Ok(Some(value));
			}
		}
		Ok(None)
	}

	fn error(&self, message: String) -> ContentExprError {
		ContentExprError {
			expr: self.source.to_string(),
			message,
			position: self.position,
		}
	}
}

fn is_name_char(ch: char) -> bool {
	ch.is_alphanumeric() || ch == '_' || ch == '-'
}

/// Grammar: `choice = seq ("|" seq)*`
fn parse_choice(parser: &mut Parser) -> Result<ContentExpr, ContentExprError> {
	let mut items = vec![parse_seq(parser)?];
	while parser.eat('|') {
		items.push(parse_seq(parser)?);
	}
	Ok(if items.len() == 1 {
		items.remove(0)
	} else {
		ContentExpr::Choice(items)
	})
}

/// Grammar: `seq = postfix+`
fn parse_seq(parser: &mut Parser) -> Result<ContentExpr, ContentExprError> {
	let mut items = Vec::new();
	loop {
		parser.skip_ws();
		match parser.peek() {
			None | Some('|') | Some(')') => break,
			_ => items.push(parse_postfix(parser)?),
		}
	}

	match items.len() {
		0 => Err(parser.error("expected a node name or group".to_string())),
		1 => Ok(items.remove(0)),
		_ => Ok(ContentExpr::Seq(items)),
	}
}

/// Grammar: `postfix = atom ("*" | "+" | "?")*`
fn parse_postfix(parser: &mut Parser) -> Result<ContentExpr, ContentExprError> {
	let mut expr = match parser.alt(&[try_parse_group, try_parse_name])? {
		Some(expr) => expr,
		None => {
			let found = parser.peek().map_or("end of input".to_string(), |ch| format!("'{ch}'"));
			return Err(parser.error(format!("expected a node name or group, found {found}")));
		}
	};

	loop {
		expr = match parser.peek() {
			Some('*') => ContentExpr::Star(Box::new(expr)),
			Some('+') => ContentExpr::Plus(Box::new(expr)),
			Some('?') => ContentExpr::Opt(Box::new(expr)),
			_ => return Ok(expr),
		};
		parser.next();
	}
}

/// Attempts to parse a parenthesized sub-expression.
fn try_parse_group(parser: &mut Parser) -> Result<Option<ContentExpr>, ContentExprError> {
	if parser.peek() != Some('(') {
		return Ok(None);
	}
	parser.next();
	let inner = parse_choice(parser)?;
	if !parser.eat(')') {
		return Err(parser.error("expected ')'".to_string()));
	}
	Ok(Some(inner))
}

/// Attempts to parse a type or group name.
fn try_parse_name(parser: &mut Parser) -> Result<Option<ContentExpr>, ContentExprError> {
	let name = parser.take_while(is_name_char);
	Ok((!name.is_empty()).then_some(ContentExpr::Name(name)))
}
