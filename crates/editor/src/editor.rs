//! The editor facade.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};
use vellum_keymap::Chord;
use vellum_model::{DocumentSchema, Node};
use vellum_primitives::{Behavior, Command, CommandArgs, EditorState, Selection, Transaction};
use vellum_registry::{ConvertError, ExtensionDescriptor, Registry};

use crate::chain::Chain;
use crate::commands::{builtins, insert_text};
use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::input_rules::run_input_rules;
use crate::store::{ChangeEvent, StateStore, SubscriberId};


/// Initial document content for [`Editor::new`].
#[derive(Debug, Clone, Default)]
pub enum Content {
	/// The schema's minimal valid document.
	#[default]
	Empty,
	/// A document tree, prepared against the schema.
	Doc(Node),
	/// Document JSON (`{"type": "doc", "content": [...]}`).
	Json(Value),
	/// Bytes decoded by the converter registered for `mime`.
	Bytes { mime: String, bytes: Vec<u8> },
}

/// An editor instance: the assembled extensions plus the live state.
pub struct Editor {
	config: EditorConfig,
	registry: Registry,
	store: StateStore,
}

impl Editor {
	/// Assembles `extensions` and loads `content`.
	///
	/// # Errors
	///
	/// Returns [`EditorError::Config`] if the extensions do not assemble, or a
	/// content error if `content` cannot be turned into a conforming document.
	pub fn new(config: EditorConfig, extensions: &[ExtensionDescriptor], content: Content) -> Result<Self, EditorError> {
		let registry = Registry::build(extensions, config.registry_options(), builtins())?;
		let doc = load_content(&registry, content)?;
		let state = EditorState::create(Arc::clone(registry.schema()), doc, None, Arc::clone(registry.behaviors()))?;
		debug!(
			extensions = registry.extensions().len(),
			size = state.doc().content_size(),
			"editor created"
		);
		Ok(Self {
			config,
			registry,
			store: StateStore::new(state),
		})
	}

	pub fn config(&self) -> &EditorConfig {
		&self.config
	}

	pub fn registry(&self) -> &Registry {
		&self.registry
	}

	pub fn schema(&self) -> &Arc<DocumentSchema> {
		self.registry.schema()
	}

	pub fn state(&self) -> &EditorState {
		self.store.state()
	}

	pub fn document(&self) -> &Node {
		self.store.state().doc()
	}

	pub fn selection(&self) -> &Selection {
		self.store.state().selection()
	}

	/// Behaviors of the assembled extensions, for the rendering side.
	pub fn behaviors(&self) -> &[Arc<dyn Behavior>] {
		self.registry.behaviors()
	}

	/// The current document as JSON.
	///
	/// # Errors
	///
	/// Returns the serializer's error if an attribute value cannot be
	/// represented as JSON.
	pub fn to_json(&self) -> Result<Value, serde_json::Error> {
		serde_json::to_value(self.document())
	}

	/// Replaces the document with one decoded from `bytes` by the `mime`
	/// converter. Behavior slots start fresh.
	///
	/// # Errors
	///
	/// Returns [`EditorError::Convert`] when no converter handles `mime` or
	/// decoding fails, and [`EditorError::Schema`] for a non-conforming result.
	pub fn load_document(&mut self, mime: &str, bytes: &[u8]) -> Result<(), EditorError> {
		let doc = decode(&self.registry, mime, bytes)?;
		self.set_document(doc)
	}

	/// Replaces the document with `doc`. Behavior slots start fresh.
	///
	/// # Errors
	///
	/// Returns [`EditorError::Schema`] if `doc` does not conform.
	pub fn set_document(&mut self, doc: Node) -> Result<(), EditorError> {
		let doc = self.schema().prepare(doc)?;
		let state = self.store.state().with_document(doc)?;
		self.store.replace(state);
		Ok(())
	}

	/// Encodes the document with the `mime` converter.
	///
	/// # Errors
	///
	/// Returns [`EditorError::Convert`] when no converter handles `mime` or
	/// encoding fails.
	pub fn save_document(&self, mime: &str) -> Result<Vec<u8>, EditorError> {
		let converter = self
			.registry
			.converter(mime)
			.ok_or_else(|| ConvertError::UnknownMime(mime.to_string()))?;
		Ok(converter.from_doc(self.document(), self.schema())?)
	}

	/// Starts a command chain.
	pub fn chain(&mut self) -> Chain<'_> {
		Chain::new(self)
	}

	/// Starts a dry-run chain.
	pub fn can(&mut self) -> Chain<'_> {
		Chain::new(self).can()
	}

	/// Builds the registered command `name` with `args`.
	pub fn command(&self, name: &str, args: &CommandArgs) -> Option<Command> {
		self.registry.commands().create(name, args)
	}

	/// Runs the registered command `name` on its own.
	pub fn run(&mut self, name: &str, args: CommandArgs) -> bool {
		self.chain().command(name, args).run()
	}

	/// Runs the command bound to `chord`, written like `Mod-b`.
	///
	/// Returns `false` for unparsable or unbound chords and for commands that
	/// do not apply.
	pub fn handle_key(&mut self, chord: &str) -> bool {
		match vellum_keymap::parse(chord, self.registry.keymap().platform()) {
			Ok(chord) => self.handle_chord(&chord),
			Err(err) => {
				debug!(error = %err, "ignoring unparsable chord");
				false
			}
		}
	}

	/// Runs the command bound to `chord`.
	pub fn handle_chord(&mut self, chord: &Chord) -> bool {
		let Some(name) = self.registry.keymap().lookup(chord).map(str::to_string) else {
			return false;
		};
		self.run(&name, CommandArgs::new())
	}

	/// Inserts typed `text` at the selection, giving input rules a chance to
	/// transform it first.
	pub fn handle_text_input(&mut self, text: &str) -> bool {
		if text.is_empty() {
			return false;
		}
		if self.config.input_rules.enabled
			&& let Some(tr) = run_input_rules(self.state(), self.registry.input_rules(), text)
		{
			return match self.dispatch(tr) {
				Ok(()) => true,
				Err(err) => {
					warn!(error = %err, "input rule produced an inapplicable transaction");
					false
				}
			};
		}
		self.chain().then(insert_text(text, None)).run()
	}

	/// Commits `tr` to the store.
	///
	/// # Errors
	///
	/// Returns [`EditorError::Apply`] if `tr` does not apply to the current state.
	pub fn dispatch(&mut self, tr: Transaction) -> Result<(), EditorError> {
		self.store.apply(&tr)?;
		Ok(())
	}

	/// Installs `next`, built by applying the parts of `tr` one at a time.
	pub(crate) fn commit(&mut self, tr: &Transaction, next: EditorState) -> Result<(), EditorError> {
		self.store.commit(tr, next)?;
		Ok(())
	}

	/// Subscribes to state changes.
	pub fn subscribe<F>(&mut self, subscriber: F) -> SubscriberId
	where
		F: FnMut(&ChangeEvent<'_>) + Send + 'static,
	{
		self.store.subscribe(subscriber)
	}

	pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
		self.store.unsubscribe(id)
	}

	/// Reassembles the editor from a new configuration and extension list.
	///
	/// The document is kept when it conforms to the new schema and replaced
	/// by an empty one otherwise. Subscribers are kept; behavior slots start
	/// fresh.
	///
	/// # Errors
	///
	/// Returns [`EditorError::Config`] if the extensions do not assemble. The
	/// editor is unchanged on error.
	pub fn reconfigure(&mut self, config: EditorConfig, extensions: &[ExtensionDescriptor]) -> Result<(), EditorError> {
		let registry = Registry::build(extensions, config.registry_options(), builtins())?;
		let current = self.store.state();
		let doc = match registry.schema().prepare(current.doc().clone()) {
			Ok(doc) => doc,
			Err(err) => {
				warn!(error = %err, "document does not fit the new schema, starting empty");
				registry.schema().empty_document()?
			}
		};
		let state = EditorState::create(
			Arc::clone(registry.schema()),
			doc,
			Some(*current.selection()),
			Arc::clone(registry.behaviors()),
		)?;
		debug!(extensions = registry.extensions().len(), "editor reconfigured");
		self.config = config;
		self.registry = registry;
		self.store.replace(state);
		Ok(())
	}
}

impl fmt::Debug for Editor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Editor")
			.field("config", &self.config)
			.field("extensions", &self.registry.extensions().names())
			.field("store", &self.store)
			.finish()
	}
}

fn load_content(registry: &Registry, content: Content) -> Result<Node, EditorError> {
	let schema = registry.schema();
	match content {
		Content::Empty => Ok(schema.empty_document()?),
		Content::Doc(doc) => Ok(schema.prepare(doc)?),
		Content::Json(value) => Ok(schema.prepare(serde_json::from_value(value)?)?),
		Content::Bytes { mime, bytes } => decode(registry, &mime, &bytes),
	}
}

fn decode(registry: &Registry, mime: &str, bytes: &[u8]) -> Result<Node, EditorError> {
	let converter = registry
		.converter(mime)
		.ok_or_else(|| ConvertError::UnknownMime(mime.to_string()))?;
	let doc = converter.to_doc(bytes, registry.schema())?;
	Ok(registry.schema().prepare(doc)?)
}
