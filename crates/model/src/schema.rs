//! Type descriptors and the compiled document schema.
//!
//! Extensions contribute [`NodeSpec`]s and [`MarkSpec`]s. A [`SchemaBuilder`]
//! merges them, validates the result and compiles a read-only
//! [`DocumentSchema`] that every document and edit is checked against.

use indexmap::IndexMap;
use thiserror::Error;

use crate::attrs::{AttrSpec, Attrs, Value};
use crate::content::{ContentExpr, ContentExprError};
use crate::mark::Mark;
use crate::node::{Node, normalize_fragment};
use crate::resolved::ResolvedPos;


/// Maximum nesting depth explored when synthesizing filler content.
const MAX_FILL_DEPTH: usize = 32;

/// Declaration of a node type.
#[derive(Debug, Clone, Default)]
pub struct NodeSpec {
	/// Type name, unique across nodes and marks.
	pub name: String,
	/// Content expression. `None` declares a leaf.
	pub content: Option<String>,
	/// Groups the type belongs to (`block`, `inline`, ...).
	pub groups: Vec<String>,
	/// Inline nodes live inside textblocks.
	pub inline: bool,
	/// Marks allowed on children: `_` for all, space separated names, or
	/// `None` for all marks in textblocks and none elsewhere.
	pub marks: Option<String>,
	/// Content is code: input rules and mark commands skip it.
	pub code: bool,
	/// Content is kept when the node is replaced.
	pub defining: bool,
	/// Marks the document root.
	pub root: bool,
	/// Attribute declarations in declaration order.
	pub attrs: IndexMap<String, AttrSpec>,
}

impl NodeSpec {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..Self::default()
		}
	}

	pub fn content(mut self, expr: impl Into<String>) -> Self {
		self.content = Some(expr.into());
		self
	}

	pub fn group(mut self, group: impl Into<String>) -> Self {
		self.groups.push(group.into());
		self
	}

	pub fn inline(mut self) -> Self {
		self.inline = true;
		self
	}

	pub fn marks(mut self, marks: impl Into<String>) -> Self {
		self.marks = Some(marks.into());
		self
	}

	pub fn code(mut self) -> Self {
		self.code = true;
		self
	}

	pub fn defining(mut self) -> Self {
		self.defining = true;
		self
	}

	pub fn root(mut self) -> Self {
		self.root = true;
		self
	}

	pub fn attr(mut self, name: impl Into<String>, spec: AttrSpec) -> Self {
		self.attrs.insert(name.into(), spec);
		self
	}
}

/// Declaration of a mark type.
#[derive(Debug, Clone)]
pub struct MarkSpec {
	/// Type name, unique across nodes and marks.
	pub name: String,
	/// Attribute declarations in declaration order.
	pub attrs: IndexMap<String, AttrSpec>,
	/// Space separated marks this mark cannot coexist with, `_` for all.
	/// `None` excludes only marks of the same type.
	pub excludes: Option<String>,
	/// Whether text typed at the end of the mark picks it up.
	pub inclusive: bool,
}

impl MarkSpec {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			attrs: IndexMap::new(),
			excludes: None,
			inclusive: true,
		}
	}

	pub fn attr(mut self, name: impl Into<String>, spec: AttrSpec) -> Self {
		self.attrs.insert(name.into(), spec);
		self
	}

	pub fn excludes(mut self, excludes: impl Into<String>) -> Self {
		self.excludes = Some(excludes.into());
		self
	}

	pub fn non_inclusive(mut self) -> Self {
		self.inclusive = false;
		self
	}
}

/// Schema assembly failed. Every variant names the contributing extension.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
	#[error("type name `{name}` declared by `{second}` is already declared by `{first}`")]
	DuplicateName { name: String, first: String, second: String },
	#[error("no root node: flag a node as root or declare a node named `doc`")]
	MissingRoot,
	#[error("root node declared by both `{first}` and `{second}`")]
	MultipleRoots { first: String, second: String },
	#[error("mark `{mark}` from `{source_ext}` excludes unknown mark `{excluded}`")]
	UnknownExcludedMark {
		source_ext: String,
		mark: String,
		excluded: String,
	},
	#[error("node `{node}` from `{source_ext}` has an invalid content expression: {error}")]
	InvalidContent {
		source_ext: String,
		node: String,
		error: ContentExprError,
	},
	#[error("node `{node}` from `{source_ext}` references unknown node or group `{name}`")]
	UnknownContentName {
		source_ext: String,
		node: String,
		name: String,
	},
	#[error("node `{node}` from `{source_ext}` allows unknown mark `{mark}`")]
	UnknownAllowedMark {
		source_ext: String,
		node: String,
		mark: String,
	},
	#[error("cannot build an empty `{root}` document: {violation}")]
	UnfillableRoot { root: String, violation: SchemaViolation },
}

/// A document or node does not conform to the schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaViolation {
	#[error("unknown node type `{0}`")]
	UnknownNodeType(String),
	#[error("unknown mark type `{0}`")]
	UnknownMarkType(String),
	#[error("`{owner}` is missing required attribute `{attr}`")]
	MissingAttr { owner: String, attr: String },
	#[error("`{owner}` has an invalid value for attribute `{attr}`")]
	InvalidAttr { owner: String, attr: String },
	#[error("content of `{node}` does not match its content expression")]
	InvalidContent { node: String },
	#[error("mark `{mark}` is not allowed inside `{node}`")]
	MarkNotAllowed { node: String, mark: String },
	#[error("text node without text")]
	EmptyText,
	#[error("cannot synthesize content for `{node}`")]
	Unfillable { node: String },
}

/// A compiled node type.
#[derive(Debug, Clone)]
pub struct NodeType {
	spec: NodeSpec,
	source: String,
	content: ContentExpr,
	inline_content: bool,
	/// `None` allows every mark.
	allowed_marks: Option<Vec<String>>,
}

impl NodeType {
	pub fn name(&self) -> &str {
		&self.spec.name
	}

	pub fn spec(&self) -> &NodeSpec {
		&self.spec
	}

	/// Name of the extension that declared the type.
	pub fn source(&self) -> &str {
		&self.source
	}

	pub fn content_expr(&self) -> &ContentExpr {
		&self.content
	}

	pub fn is_text(&self) -> bool {
		self.spec.name == "text"
	}

	pub fn is_leaf(&self) -> bool {
		!self.is_text() && self.spec.content.is_none()
	}

	pub fn is_inline(&self) -> bool {
		self.spec.inline || self.is_text()
	}

	pub fn is_block(&self) -> bool {
		!self.is_inline()
	}

	/// Returns true if the content expression admits inline nodes.
	pub fn inline_content(&self) -> bool {
		self.inline_content
	}

	/// A block whose content is inline.
	pub fn is_textblock(&self) -> bool {
		self.is_block() && self.inline_content
	}

	pub fn is_code(&self) -> bool {
		self.spec.code
	}

	pub fn in_group(&self, group: &str) -> bool {
		self.spec.groups.iter().any(|g| g == group)
	}

	pub fn allows_mark(&self, mark: &str) -> bool {
		self.allowed_marks.as_ref().is_none_or(|allowed| allowed.iter().any(|m| m == mark))
	}

	pub fn has_required_attrs(&self) -> bool {
		self.spec.attrs.values().any(AttrSpec::is_required)
	}
}

/// A compiled mark type.
#[derive(Debug, Clone)]
pub struct MarkType {
	spec: MarkSpec,
	source: String,
	rank: usize,
	excludes: Vec<String>,
}

impl MarkType {
	pub fn name(&self) -> &str {
		&self.spec.name
	}

	pub fn spec(&self) -> &MarkSpec {
		&self.spec
	}

	/// Name of the extension that declared the type.
	pub fn source(&self) -> &str {
		&self.source
	}

	/// Position of the type in the canonical mark order.
	pub fn rank(&self) -> usize {
		self.rank
	}

	pub fn excludes(&self, other: &str) -> bool {
		self.excludes.iter().any(|m| m == other)
	}

	pub fn is_inclusive(&self) -> bool {
		self.spec.inclusive
	}
}

/// Collects type contributions and compiles them into a [`DocumentSchema`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
	nodes: Vec<(String, NodeSpec)>,
	marks: Vec<(String, MarkSpec)>,
}

impl SchemaBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a node type contributed by the extension named `source`.
	pub fn add_node(&mut self, source: impl Into<String>, spec: NodeSpec) -> &mut Self {
		self.nodes.push((source.into(), spec));
		self
	}

	/// Adds a mark type contributed by the extension named `source`.
	pub fn add_mark(&mut self, source: impl Into<String>, spec: MarkSpec) -> &mut Self {
		self.marks.push((source.into(), spec));
		self
	}

	/// Validates the contributions and compiles the schema.
	///
	/// Checks run in order: unique names, root presence, mark exclusions,
	/// content expressions, allowed marks, then an empty root document must
	/// be constructible.
	///
	/// # Errors
	///
	/// Returns the first [`SchemaError`] found.
	pub fn build(self) -> Result<DocumentSchema, SchemaError> {
		let mut owners: IndexMap<&str, &str> = IndexMap::new();
		let declared = self
			.nodes
			.iter()
			.map(|(source, spec)| (source, &spec.name))
			.chain(self.marks.iter().map(|(source, spec)| (source, &spec.name)));
		for (source, name) in declared {
			if let Some(first) = owners.insert(name.as_str(), source.as_str()) {
				return Err(SchemaError::DuplicateName {
					name: name.clone(),
					first: first.to_string(),
					second: source.clone(),
				});
			}
		}

		let root = find_root(&self.nodes)?;

		let mark_names: Vec<String> = self.marks.iter().map(|(_, spec)| spec.name.clone()).collect();
		let mut marks = IndexMap::new();
		for (rank, (source, spec)) in self.marks.into_iter().enumerate() {
			let excludes = match spec.excludes.as_deref() {
				None => vec![spec.name.clone()],
				Some("_") => mark_names.clone(),
				Some(list) => {
					let names: Vec<String> = list.split_whitespace().map(str::to_string).collect();
					if let Some(excluded) = names.iter().find(|n| !mark_names.contains(n)) {
						return Err(SchemaError::UnknownExcludedMark {
							source_ext: source,
							mark: spec.name,
							excluded: excluded.clone(),
						});
					}
					names
				}
			};
			marks.insert(
				spec.name.clone(),
				MarkType {
					spec,
					source,
					rank,
					excludes,
				},
			);
		}

		let groups: Vec<&str> = self
			.nodes
			.iter()
			.flat_map(|(_, spec)| spec.groups.iter().map(String::as_str))
			.collect();
		let known = |name: &str| groups.contains(&name) || self.nodes.iter().any(|(_, spec)| spec.name == name);

		let mut compiled = Vec::with_capacity(self.nodes.len());
		for (source, spec) in &self.nodes {
			let content = ContentExpr::parse(spec.content.as_deref().unwrap_or("")).map_err(|error| {
				SchemaError::InvalidContent {
					source_ext: source.clone(),
					node: spec.name.clone(),
					error,
				}
			})?;
			if let Some(name) = content.names().into_iter().find(|name| !known(*name)) {
				return Err(SchemaError::UnknownContentName {
					source_ext: source.clone(),
					node: spec.name.clone(),
					name: name.to_string(),
				});
			}
			compiled.push(content);
		}

		let is_inline_term = |term: &str| {
			self.nodes.iter().any(|(_, spec)| {
				(spec.name == term || spec.groups.iter().any(|g| g == term)) && (spec.inline || spec.name == "text")
			})
		};

		let mut nodes = IndexMap::new();
		for ((source, spec), content) in self.nodes.iter().zip(compiled) {
			let inline_content = content.names().into_iter().any(|name| is_inline_term(name));
			let allowed_marks = match spec.marks.as_deref() {
				Some("_") => None,
				Some(list) => {
					let names: Vec<String> = list.split_whitespace().map(str::to_string).collect();
					if let Some(mark) = names.iter().find(|n| !marks.contains_key(n.as_str())) {
						return Err(SchemaError::UnknownAllowedMark {
							source_ext: source.clone(),
							node: spec.name.clone(),
							mark: mark.clone(),
						});
					}
					Some(names)
				}
				None if inline_content => None,
				None => Some(Vec::new()),
			};
			nodes.insert(
				spec.name.clone(),
				NodeType {
					spec: spec.clone(),
					source: source.clone(),
					content,
					inline_content,
					allowed_marks,
				},
			);
		}

		let schema = DocumentSchema { nodes, marks, root };
		schema.empty_document().map_err(|violation| SchemaError::UnfillableRoot {
			root: schema.root.clone(),
			violation,
		})?;
		Ok(schema)
	}
}

fn find_root(nodes: &[(String, NodeSpec)]) -> Result<String, SchemaError> {
	let mut flagged = nodes.iter().filter(|(_, spec)| spec.root);
	match (flagged.next(), flagged.next()) {
		(Some((first, _)), Some((second, _))) => Err(SchemaError::MultipleRoots {
			first: first.clone(),
			second: second.clone(),
		}),
		(Some((_, spec)), None) => Ok(spec.name.clone()),
		(None, _) => nodes
			.iter()
			.find(|(_, spec)| spec.name == "doc")
			.map(|(_, spec)| spec.name.clone())
			.ok_or(SchemaError::MissingRoot),
	}
}

/// The merged, validated type system for one editor instance.
#[derive(Debug, Clone)]
pub struct DocumentSchema {
	nodes: IndexMap<String, NodeType>,
	marks: IndexMap<String, MarkType>,
	root: String,
}

impl DocumentSchema {
	pub fn node_type(&self, name: &str) -> Option<&NodeType> {
		self.nodes.get(name)
	}

	pub fn mark_type(&self, name: &str) -> Option<&MarkType> {
		self.marks.get(name)
	}

	/// Node types in declaration order.
	pub fn nodes(&self) -> impl Iterator<Item = &NodeType> {
		self.nodes.values()
	}

	/// Mark types in canonical order.
	pub fn marks(&self) -> impl Iterator<Item = &MarkType> {
		self.marks.values()
	}

	/// Name of the root node type.
	pub fn root(&self) -> &str {
		&self.root
	}

	/// Returns true if the node type `child` satisfies content term `term`.
	pub fn satisfies(&self, term: &str, child: &str) -> bool {
		term == child || self.nodes.get(child).is_some_and(|t| t.in_group(term))
	}

	/// Returns true if `node` is a textblock according to its type.
	pub fn is_textblock(&self, node: &Node) -> bool {
		self.nodes.get(node.kind()).is_some_and(NodeType::is_textblock)
	}

	/// Returns true if `node` holds code.
	pub fn is_code(&self, node: &Node) -> bool {
		self.nodes.get(node.kind()).is_some_and(NodeType::is_code)
	}

	/// Checks a child list against the content expression and allowed marks of `parent`.
	///
	/// # Errors
	///
	/// Returns the first [`SchemaViolation`].
	pub fn check_content(&self, parent: &str, children: &[Node]) -> Result<(), SchemaViolation> {
		let ty = self.lookup_node(parent)?;
		let kinds: Vec<&str> = children.iter().map(Node::kind).collect();
		if !ty.content.matches(&kinds, &|term, child| self.satisfies(term, child)) {
			return Err(SchemaViolation::InvalidContent { node: parent.to_string() });
		}
		for mark in children.iter().flat_map(Node::marks) {
			if !ty.allows_mark(&mark.kind) {
				return Err(SchemaViolation::MarkNotAllowed {
					node: parent.to_string(),
					mark: mark.kind.clone(),
				});
			}
		}
		Ok(())
	}

	/// Validates a whole tree without modifying it.
	///
	/// # Errors
	///
	/// Returns the first [`SchemaViolation`] found, depth first.
	pub fn check(&self, node: &Node) -> Result<(), SchemaViolation> {
		let ty = self.lookup_node(node.kind())?;
		if ty.is_text() && node.as_text().is_none_or(str::is_empty) {
			return Err(SchemaViolation::EmptyText);
		}
		for mark in node.marks() {
			self.lookup_mark(&mark.kind)?;
		}
		if !ty.is_text() {
			self.check_content(node.kind(), node.content())?;
		}
		node.content().iter().try_for_each(|child| self.check(child))
	}

	/// Brings an externally built tree in line with the schema: fills default
	/// attributes, marks leaves, orders mark sets and merges text runs, then
	/// validates the result.
	///
	/// # Errors
	///
	/// Returns a [`SchemaViolation`] when the tree cannot conform.
	pub fn prepare(&self, mut node: Node) -> Result<Node, SchemaViolation> {
		let ty = self.lookup_node(node.kind())?;
		if ty.is_text() {
			if node.as_text().is_none_or(str::is_empty) {
				return Err(SchemaViolation::EmptyText);
			}
		} else if node.is_text() {
			return Err(SchemaViolation::InvalidContent {
				node: node.kind().to_string(),
			});
		}

		let attrs = compute_attrs(ty.name(), &ty.spec.attrs, node.attrs())?;
		*node.attrs_mut() = attrs;
		node.set_leaf(ty.is_leaf());

		let marks = std::mem::take(node.marks_mut());
		let mut set = Vec::with_capacity(marks.len());
		for mark in marks {
			let mark = self.mark(&mark.kind, &mark.attrs)?;
			set = self.add_mark_to_set(&mark, &set);
		}
		*node.marks_mut() = set;

		let children = node
			.take_content()
			.into_iter()
			.map(|child| self.prepare(child))
			.collect::<Result<Vec<_>, _>>()?;
		node.set_content(normalize_fragment(children));

		if !ty.is_text() {
			self.check_content(node.kind(), node.content())?;
		}
		Ok(node)
	}

	/// Creates a node of type `kind`, computing attributes and checking content.
	///
	/// # Errors
	///
	/// Returns a [`SchemaViolation`] for unknown types, bad attributes or content.
	pub fn create(&self, kind: &str, attrs: &Attrs, content: Vec<Node>) -> Result<Node, SchemaViolation> {
		let ty = self.lookup_node(kind)?;
		let attrs = compute_attrs(kind, &ty.spec.attrs, attrs)?;
		let node = if ty.is_leaf() {
			Node::leaf(kind, attrs)
		} else {
			Node::branch(kind, attrs, content)
		};
		self.check_content(kind, node.content())?;
		Ok(node)
	}

	/// Creates a node of type `kind`, synthesizing the minimal valid content.
	///
	/// # Errors
	///
	/// Returns [`SchemaViolation::Unfillable`] when no valid content can be built.
	pub fn create_and_fill(&self, kind: &str, attrs: &Attrs) -> Result<Node, SchemaViolation> {
		self.create_and_fill_at(kind, attrs, 0)
	}

	fn create_and_fill_at(&self, kind: &str, attrs: &Attrs, depth: usize) -> Result<Node, SchemaViolation> {
		if depth > MAX_FILL_DEPTH {
			return Err(SchemaViolation::Unfillable { node: kind.to_string() });
		}
		let ty = self.lookup_node(kind)?;
		let resolve = |term: &str| {
			self.nodes
				.values()
				.find(|t| (t.name() == term || t.in_group(term)) && !t.is_text() && !t.has_required_attrs())
				.map(|t| t.name().to_string())
		};
		let names = ty
			.content
			.fill(&resolve)
			.ok_or_else(|| SchemaViolation::Unfillable { node: kind.to_string() })?;
		let content = names
			.iter()
			.map(|name| self.create_and_fill_at(name, &Attrs::new(), depth + 1))
			.collect::<Result<Vec<_>, _>>()?;
		self.create(kind, attrs, content)
	}

	/// The minimal valid document: the root filled with required content.
	///
	/// # Errors
	///
	/// Returns a [`SchemaViolation`] when the root cannot be filled.
	pub fn empty_document(&self) -> Result<Node, SchemaViolation> {
		self.create_and_fill(&self.root, &Attrs::new())
	}

	/// Creates a text node carrying `marks`.
	pub fn text(&self, text: impl Into<String>, marks: Vec<Mark>) -> Node {
		Node::text(text).with_marks(marks)
	}

	/// Creates a mark of type `kind`, filling default attributes.
	///
	/// # Errors
	///
	/// Returns a [`SchemaViolation`] for unknown types or bad attributes.
	pub fn mark(&self, kind: &str, attrs: &Attrs) -> Result<Mark, SchemaViolation> {
		let ty = self.lookup_mark(kind)?;
		Ok(Mark {
			kind: kind.to_string(),
			attrs: compute_attrs(kind, &ty.spec.attrs, attrs)?,
		})
	}

	/// Returns true if `a` excludes marks of type `b`.
	pub fn mark_excludes(&self, a: &str, b: &str) -> bool {
		self.marks.get(a).is_some_and(|t| t.excludes(b))
	}

	fn rank(&self, kind: &str) -> usize {
		self.marks.get(kind).map_or(usize::MAX, MarkType::rank)
	}

	/// Adds `mark` to a rank-ordered set.
	///
	/// An equal mark leaves the set unchanged, marks excluded by `mark` are
	/// dropped, and a mark that excludes `mark` prevents the addition.
	pub fn add_mark_to_set(&self, mark: &Mark, set: &[Mark]) -> Vec<Mark> {
		let mut out = Vec::with_capacity(set.len() + 1);
		let mut placed = false;
		for other in set {
			if other == mark {
				return set.to_vec();
			}
			if self.mark_excludes(&mark.kind, &other.kind) {
				continue;
			}
			if self.mark_excludes(&other.kind, &mark.kind) {
				return set.to_vec();
			}
			if !placed && self.rank(&other.kind) > self.rank(&mark.kind) {
				out.push(mark.clone());
				placed = true;
			}
			out.push(other.clone());
		}
		if !placed {
			out.push(mark.clone());
		}
		out
	}

	/// Removes every mark of type `kind` from `set`.
	pub fn remove_mark_from_set(&self, kind: &str, set: &[Mark]) -> Vec<Mark> {
		set.iter().filter(|m| m.kind != kind).cloned().collect()
	}

	/// Marks that text inserted at `pos` picks up.
	///
	/// Non-inclusive marks only continue when the node after the position
	/// carries them as well.
	pub fn marks_at(&self, pos: &ResolvedPos<'_>) -> Vec<Mark> {
		let marks = pos.marks();
		if pos.text_offset() > 0 {
			return marks;
		}
		let after = pos.node_after();
		marks
			.into_iter()
			.filter(|mark| {
				self.marks.get(&mark.kind).is_none_or(MarkType::is_inclusive)
					|| after.as_ref().is_some_and(|n| mark.is_in_set(n.marks()))
			})
			.collect()
	}

	fn lookup_node(&self, kind: &str) -> Result<&NodeType, SchemaViolation> {
		self.nodes
			.get(kind)
			.ok_or_else(|| SchemaViolation::UnknownNodeType(kind.to_string()))
	}

	fn lookup_mark(&self, kind: &str) -> Result<&MarkType, SchemaViolation> {
		self.marks
			.get(kind)
			.ok_or_else(|| SchemaViolation::UnknownMarkType(kind.to_string()))
	}
}

/// Builds the attribute map for a node or mark from its declarations.
///
/// Undeclared attributes are dropped.
fn compute_attrs(owner: &str, specs: &IndexMap<String, AttrSpec>, given: &Attrs) -> Result<Attrs, SchemaViolation> {
	let mut attrs = Attrs::new();
	for (name, spec) in specs {
		let value: Value = match (given.get(name), &spec.default) {
			(Some(value), _) => value.clone(),
			(None, Some(default)) => default.clone(),
			(None, None) => {
				return Err(SchemaViolation::MissingAttr {
					owner: owner.to_string(),
					attr: name.clone(),
				});
			}
		};
		if spec.validate.is_some_and(|validate| !validate(&value)) {
			return Err(SchemaViolation::InvalidAttr {
				owner: owner.to_string(),
				attr: name.clone(),
			});
		}
		attrs.insert(name.clone(), value);
	}
	Ok(attrs)
}
