//! Editor configuration.
//!
//! Configuration is plain TOML deserialized with serde. Every field has a
//! default, so an empty file is a valid configuration:
//!
//! ```toml
//! platform = "mac"
//! override_policy = "first_wins"
//! trace_commands = true
//!
//! [history]
//! depth = 50
//!
//! [input_rules]
//! enabled = false
//!
//! [extensions.heading]
//! levels = 3
//! ```

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use vellum_keymap::Platform;
use vellum_registry::{DuplicatePolicy, ExtensionConfig, RegistryOptions};

use crate::error::EditorError;
use crate::history::HISTORY;


/// Default number of undo steps kept by the history behavior.
pub const DEFAULT_HISTORY_DEPTH: usize = 100;

/// Top-level editor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
	/// Platform used to resolve `Mod` in key chords.
	pub platform: Platform,
	/// How duplicate command names, chords and converters are settled.
	pub override_policy: DuplicatePolicy,
	/// Wraps every chained command in a `command` tracing span.
	pub trace_commands: bool,
	pub history: HistoryConfig,
	pub input_rules: InputRulesConfig,
	/// Per-extension option overrides, keyed by extension name.
	pub extensions: IndexMap<String, ExtensionConfig>,
}

impl Default for EditorConfig {
	fn default() -> Self {
		Self {
			platform: Platform::current(),
			override_policy: DuplicatePolicy::default(),
			trace_commands: false,
			history: HistoryConfig::default(),
			input_rules: InputRulesConfig::default(),
			extensions: IndexMap::new(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistoryConfig {
	/// Maximum number of undo entries.
	pub depth: usize,
}

impl Default for HistoryConfig {
	fn default() -> Self {
		Self {
			depth: DEFAULT_HISTORY_DEPTH,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputRulesConfig {
	pub enabled: bool,
}

impl Default for InputRulesConfig {
	fn default() -> Self {
		Self { enabled: true }
	}
}

impl EditorConfig {
	/// Parses a configuration from TOML source.
	///
	/// # Errors
	///
	/// Returns [`EditorError::Toml`] for malformed input or unknown keys.
	pub fn from_toml(source: &str) -> Result<Self, EditorError> {
		Ok(toml::from_str(source)?)
	}

	/// Reads and parses the configuration file at `path`.
	///
	/// # Errors
	///
	/// Returns [`EditorError::Io`] if the file cannot be read, or
	/// [`EditorError::Toml`] if it does not parse.
	pub fn load(path: &Path) -> Result<Self, EditorError> {
		let source = std::fs::read_to_string(path).map_err(|error| EditorError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml(&source)
	}

	/// Options for assembling the registry under this configuration.
	///
	/// `history.depth` becomes the `depth` option of the `history` extension
	/// unless `[extensions.history]` sets it explicitly.
	pub fn registry_options(&self) -> RegistryOptions {
		let mut overrides = self.extensions.clone();
		let history = overrides.entry(HISTORY.to_string()).or_default();
		if history.get("depth").is_none() {
			history.set("depth", Value::from(self.history.depth));
		}
		RegistryOptions {
			platform: self.platform,
			policy: self.override_policy,
			overrides,
		}
	}
}
