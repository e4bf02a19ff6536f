use thiserror::Error;
use vellum_keymap::ParseError;
use vellum_model::SchemaError;

/// A configuration-time failure. No editor is built when one occurs.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("extension `{extension}` requires `{required}`, which is not available")]
	MissingDependency { extension: String, required: String },

	#[error("circular extension dependency: {}", cycle.join(" -> "))]
	CircularDependency { cycle: Vec<String> },

	#[error("extension `{extension}` conflicts with `{conflicts_with}`")]
	Conflict { extension: String, conflicts_with: String },

	#[error(transparent)]
	Schema(#[from] SchemaError),

	#[error("extension `{extension}` binds invalid chord")]
	InvalidChord {
		extension: String,
		#[source]
		source: ParseError,
	},

	#[error("extension `{extension}` has an invalid input rule pattern")]
	InvalidInputRule {
		extension: String,
		#[source]
		source: regex::Error,
	},

	#[error("behavior `{name}` contributed by `{second}` is already contributed by `{first}`")]
	DuplicateBehavior { name: String, first: String, second: String },
}
