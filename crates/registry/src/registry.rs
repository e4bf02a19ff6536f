//! The assembly pipeline: resolve, assemble, collect behaviors, commands,
//! key bindings, input rules and converters.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;
use vellum_keymap::Platform;
use vellum_model::DocumentSchema;
use vellum_primitives::Behavior;

use crate::assembler::assemble;
use crate::collision::{Collision, DuplicatePolicy, KeyKind, PolicyTable};
use crate::commands::{BUILTIN_SOURCE, CommandRegistry};
use crate::config::ExtensionConfig;
use crate::convert::Converter;
use crate::descriptor::{Category, CommandMap, ExtensionContext, ExtensionDescriptor, ResolvedType};
use crate::error::ConfigError;
use crate::input_rule::InputRule;
use crate::keymap::Keymap;
use crate::resolver::{ResolvedExtensions, resolve_with};


/// Options that shape assembly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistryOptions {
	pub platform: Platform,
	pub policy: DuplicatePolicy,
	/// Per-extension options overlaid on the declared ones, keyed by extension name.
	pub overrides: IndexMap<String, ExtensionConfig>,
}

/// Everything assembled from one extension list.
///
/// Built once per editor; rebuilding means re-running [`Registry::build`].
#[derive(Clone)]
pub struct Registry {
	extensions: ResolvedExtensions,
	schema: Arc<DocumentSchema>,
	behaviors: Arc<[Arc<dyn Behavior>]>,
	commands: CommandRegistry,
	keymap: Keymap,
	input_rules: Arc<[InputRule]>,
	converters: PolicyTable<String, Arc<dyn Converter>>,
}

impl Registry {
	/// Runs the assembly pipeline over `extensions`.
	///
	/// `builtins` seeds the command table before any extension contributes,
	/// so extensions may override built-in commands.
	///
	/// # Errors
	///
	/// Returns the first [`ConfigError`] raised by resolution, schema
	/// assembly, chord parsing, input rule compilation or behavior naming.
	pub fn build(extensions: &[ExtensionDescriptor], options: RegistryOptions, builtins: CommandMap) -> Result<Self, ConfigError> {
		let extensions = resolve_with(extensions, &options.overrides)?;
		let schema = Arc::new(assemble(&extensions)?);

		let mut behaviors: Vec<Arc<dyn Behavior>> = Vec::new();
		let mut behavior_owners: IndexMap<String, String> = IndexMap::new();
		let mut commands = CommandRegistry::new(options.policy);
		let mut keymap = Keymap::new(options.platform, options.policy);
		let mut input_rules = Vec::new();
		let mut converters = PolicyTable::new(KeyKind::Converter, options.policy);

		for (name, factory) in builtins {
			commands.register(BUILTIN_SOURCE, name, factory);
		}

		for ext in &extensions {
			let ctx = ExtensionContext {
				name: ext.name(),
				config: ext.config(),
				schema: &schema,
				platform: options.platform,
			};

			for behavior in ext.behavior_plugins(&ctx, &schema) {
				if let Some(first) = behavior_owners.insert(behavior.name().to_string(), ext.name().to_string()) {
					return Err(ConfigError::DuplicateBehavior {
						name: behavior.name().to_string(),
						first,
						second: ext.name().to_string(),
					});
				}
				behaviors.push(behavior);
			}

			for (name, factory) in ext.command_factories(&ctx, resolved_type(&schema, ext)) {
				commands.register(ext.name(), name, factory);
			}

			for (chord, command) in ext.key_bindings(&ctx) {
				keymap
					.bind(ext.name(), &chord, command)
					.map_err(|source| ConfigError::InvalidChord {
						extension: ext.name().to_string(),
						source,
					})?;
			}

			let rules = ext.rules(&ctx).map_err(|source| ConfigError::InvalidInputRule {
				extension: ext.name().to_string(),
				source,
			})?;
			input_rules.extend(rules);

			for converter in ext.format_converters(&ctx) {
				converters.insert(converter.mime().to_string(), converter, ext.name());
			}
		}

		keymap.retain_known(&commands);

		debug!(
			extensions = extensions.len(),
			behaviors = behaviors.len(),
			commands = commands.len(),
			bindings = keymap.len(),
			input_rules = input_rules.len(),
			converters = converters.len(),
			collisions = commands.collisions().len() + keymap.collisions().len() + converters.collisions().len(),
			"assembled registry"
		);

		Ok(Self {
			extensions,
			schema,
			behaviors: behaviors.into(),
			commands,
			keymap,
			input_rules: input_rules.into(),
			converters,
		})
	}

	pub fn extensions(&self) -> &ResolvedExtensions {
		&self.extensions
	}

	pub fn schema(&self) -> &Arc<DocumentSchema> {
		&self.schema
	}

	pub fn behaviors(&self) -> &Arc<[Arc<dyn Behavior>]> {
		&self.behaviors
	}

	pub fn commands(&self) -> &CommandRegistry {
		&self.commands
	}

	pub fn keymap(&self) -> &Keymap {
		&self.keymap
	}

	pub fn input_rules(&self) -> &Arc<[InputRule]> {
		&self.input_rules
	}

	/// The converter registered for `mime`.
	pub fn converter(&self, mime: &str) -> Option<&Arc<dyn Converter>> {
		self.converters.get(mime).map(|owned| &owned.value)
	}

	pub fn mime_types(&self) -> impl Iterator<Item = &str> {
		self.converters.iter().map(|(mime, _)| mime.as_str())
	}

	/// Every override recorded while merging commands, chords and converters.
	pub fn collisions(&self) -> impl Iterator<Item = &Collision> {
		self.commands
			.collisions()
			.iter()
			.chain(self.keymap.collisions())
			.chain(self.converters.collisions())
	}
}

fn resolved_type<'s>(schema: &'s DocumentSchema, ext: &ExtensionDescriptor) -> Option<ResolvedType<'s>> {
	match ext.category() {
		Category::Node => schema.nodes().find(|n| n.source() == ext.name()).map(ResolvedType::Node),
		Category::Mark => schema.marks().find(|m| m.source() == ext.name()).map(ResolvedType::Mark),
		Category::Behavior => None,
	}
}
