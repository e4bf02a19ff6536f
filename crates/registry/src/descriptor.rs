//! Extension descriptors.
//!
//! An [`ExtensionDescriptor`] is a tagged set of optional capabilities: a
//! node or mark type, command factories, key bindings, behaviors, input
//! rules and converters. Descriptors are built once with the builder methods
//! and are cheap to clone afterwards.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use vellum_keymap::Platform;
use vellum_model::{DocumentSchema, MarkSpec, MarkType, NodeSpec, NodeType};
use vellum_primitives::{Behavior, CommandFactory};

use crate::config::ExtensionConfig;
use crate::convert::Converter;
use crate::input_rule::InputRule;

#[cfg(test)]
mod tests;

/// What an extension primarily contributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
	Node,
	Mark,
	Behavior,
}

/// The type an extension contributed, as it ended up in the assembled schema.
#[derive(Debug, Clone, Copy)]
pub enum ResolvedType<'a> {
	Node(&'a NodeType),
	Mark(&'a MarkType),
}

impl ResolvedType<'_> {
	pub fn name(&self) -> &str {
		match self {
			Self::Node(node) => node.name(),
			Self::Mark(mark) => mark.name(),
		}
	}
}

/// What capability hooks see of the editor being assembled.
#[derive(Clone, Copy)]
pub struct ExtensionContext<'a> {
	/// Name of the extension whose hook is running.
	pub name: &'a str,
	pub config: &'a ExtensionConfig,
	pub schema: &'a Arc<DocumentSchema>,
	pub platform: Platform,
}

/// Command factories keyed by command name.
pub type CommandMap = IndexMap<String, CommandFactory>;

type NodeHook = Arc<dyn Fn(&ExtensionConfig) -> NodeSpec + Send + Sync>;
type MarkHook = Arc<dyn Fn(&ExtensionConfig) -> MarkSpec + Send + Sync>;
type CommandsHook = Arc<dyn Fn(&ExtensionContext<'_>, Option<ResolvedType<'_>>) -> CommandMap + Send + Sync>;
type KeysHook = Arc<dyn Fn(&ExtensionContext<'_>) -> Vec<(String, String)> + Send + Sync>;
type BehaviorsHook =
	Arc<dyn Fn(&ExtensionContext<'_>, &Arc<DocumentSchema>) -> Vec<Arc<dyn Behavior>> + Send + Sync>;
type InputRulesHook = Arc<dyn Fn(&ExtensionContext<'_>) -> Result<Vec<InputRule>, regex::Error> + Send + Sync>;
type ConvertersHook = Arc<dyn Fn(&ExtensionContext<'_>) -> Vec<Arc<dyn Converter>> + Send + Sync>;

#[derive(Clone)]
enum TypeHook {
	Node(NodeHook),
	Mark(MarkHook),
	None,
}

/// A declarative extension: a name, its dependencies and its capabilities.
#[derive(Clone)]
pub struct ExtensionDescriptor {
	name: String,
	kind: TypeHook,
	requires: Vec<String>,
	conflicts: Vec<String>,
	bundles: Vec<ExtensionDescriptor>,
	config: ExtensionConfig,
	commands: Option<CommandsHook>,
	keys: Option<KeysHook>,
	behaviors: Option<BehaviorsHook>,
	input_rules: Option<InputRulesHook>,
	converters: Option<ConvertersHook>,
}

impl ExtensionDescriptor {
	fn with_kind(name: impl Into<String>, kind: TypeHook) -> Self {
		Self {
			name: name.into(),
			kind,
			requires: Vec::new(),
			conflicts: Vec::new(),
			bundles: Vec::new(),
			config: ExtensionConfig::new(),
			commands: None,
			keys: None,
			behaviors: None,
			input_rules: None,
			converters: None,
		}
	}

	/// An extension contributing a node type.
	pub fn node<F>(name: impl Into<String>, spec: F) -> Self
	where
		F: Fn(&ExtensionConfig) -> NodeSpec + Send + Sync + 'static,
	{
		Self::with_kind(name, TypeHook::Node(Arc::new(spec)))
	}

	/// An extension contributing a mark type.
	pub fn mark<F>(name: impl Into<String>, spec: F) -> Self
	where
		F: Fn(&ExtensionConfig) -> MarkSpec + Send + Sync + 'static,
	{
		Self::with_kind(name, TypeHook::Mark(Arc::new(spec)))
	}

	/// An extension contributing no type, only commands, keys or behaviors.
	pub fn behavior(name: impl Into<String>) -> Self {
		Self::with_kind(name, TypeHook::None)
	}

	/// Declares a dependency on the extension named `name`.
	pub fn requires(mut self, name: impl Into<String>) -> Self {
		self.requires.push(name.into());
		self
	}

	/// Declares that `name` must not be present alongside this extension.
	pub fn conflicts(mut self, name: impl Into<String>) -> Self {
		self.conflicts.push(name.into());
		self
	}

	/// Bundles `child`: it joins the resolution pool and is implicitly required.
	pub fn bundle(mut self, child: ExtensionDescriptor) -> Self {
		self.bundles.push(child);
		self
	}

	/// Sets one option.
	pub fn option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.config.set(key, value);
		self
	}

	/// Overlays `config` on the current options.
	pub fn configure(mut self, config: &ExtensionConfig) -> Self {
		self.config.merge(config);
		self
	}

	/// Contributes command factories. The hook receives the extension's own
	/// resolved type for node and mark extensions.
	pub fn commands<F>(mut self, hook: F) -> Self
	where
		F: Fn(&ExtensionContext<'_>, Option<ResolvedType<'_>>) -> CommandMap + Send + Sync + 'static,
	{
		self.commands = Some(Arc::new(hook));
		self
	}

	/// Contributes `(chord, command name)` bindings.
	pub fn keys<F>(mut self, hook: F) -> Self
	where
		F: Fn(&ExtensionContext<'_>) -> Vec<(String, String)> + Send + Sync + 'static,
	{
		self.keys = Some(Arc::new(hook));
		self
	}

	/// Contributes behaviors, passed through to the renderer unmodified.
	pub fn behaviors<F>(mut self, hook: F) -> Self
	where
		F: Fn(&ExtensionContext<'_>, &Arc<DocumentSchema>) -> Vec<Arc<dyn Behavior>> + Send + Sync + 'static,
	{
		self.behaviors = Some(Arc::new(hook));
		self
	}

	pub fn input_rules<F>(mut self, hook: F) -> Self
	where
		F: Fn(&ExtensionContext<'_>) -> Result<Vec<InputRule>, regex::Error> + Send + Sync + 'static,
	{
		self.input_rules = Some(Arc::new(hook));
		self
	}

	pub fn converters<F>(mut self, hook: F) -> Self
	where
		F: Fn(&ExtensionContext<'_>) -> Vec<Arc<dyn Converter>> + Send + Sync + 'static,
	{
		self.converters = Some(Arc::new(hook));
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn category(&self) -> Category {
		match self.kind {
			TypeHook::Node(_) => Category::Node,
			TypeHook::Mark(_) => Category::Mark,
			TypeHook::None => Category::Behavior,
		}
	}

	pub fn required(&self) -> &[String] {
		&self.requires
	}

	pub fn conflicting(&self) -> &[String] {
		&self.conflicts
	}

	pub fn bundled(&self) -> &[ExtensionDescriptor] {
		&self.bundles
	}

	pub fn config(&self) -> &ExtensionConfig {
		&self.config
	}

	/// Names this extension depends on: declared requirements, then bundled children.
	pub fn dependencies(&self) -> impl Iterator<Item = &str> {
		self.requires
			.iter()
			.map(String::as_str)
			.chain(self.bundles.iter().map(ExtensionDescriptor::name))
	}

	pub fn node_spec(&self) -> Option<NodeSpec> {
		match &self.kind {
			TypeHook::Node(hook) => Some(hook(&self.config)),
			_ => None,
		}
	}

	pub fn mark_spec(&self) -> Option<MarkSpec> {
		match &self.kind {
			TypeHook::Mark(hook) => Some(hook(&self.config)),
			_ => None,
		}
	}

	pub fn command_factories(&self, ctx: &ExtensionContext<'_>, ty: Option<ResolvedType<'_>>) -> CommandMap {
		self.commands.as_ref().map(|hook| hook(ctx, ty)).unwrap_or_default()
	}

	pub fn key_bindings(&self, ctx: &ExtensionContext<'_>) -> Vec<(String, String)> {
		self.keys.as_ref().map(|hook| hook(ctx)).unwrap_or_default()
	}

	pub fn behavior_plugins(&self, ctx: &ExtensionContext<'_>, schema: &Arc<DocumentSchema>) -> Vec<Arc<dyn Behavior>> {
		self.behaviors.as_ref().map(|hook| hook(ctx, schema)).unwrap_or_default()
	}

	/// # Errors
	///
	/// Returns the compile error of the first invalid rule pattern.
	pub fn rules(&self, ctx: &ExtensionContext<'_>) -> Result<Vec<InputRule>, regex::Error> {
		match &self.input_rules {
			Some(hook) => hook(ctx),
			None => Ok(Vec::new()),
		}
	}

	pub fn format_converters(&self, ctx: &ExtensionContext<'_>) -> Vec<Arc<dyn Converter>> {
		self.converters.as_ref().map(|hook| hook(ctx)).unwrap_or_default()
	}
}

impl fmt::Debug for ExtensionDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ExtensionDescriptor")
			.field("name", &self.name)
			.field("category", &self.category())
			.field("requires", &self.requires)
			.field("conflicts", &self.conflicts)
			.field("bundles", &self.bundles.iter().map(ExtensionDescriptor::name).collect::<Vec<_>>())
			.field("config", &self.config)
			.finish_non_exhaustive()
	}
}
