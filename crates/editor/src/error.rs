//! Error types for the editor core.

use std::path::PathBuf;

use thiserror::Error;
use vellum_model::SchemaViolation;
use vellum_primitives::{ApplyError, StepError};
use vellum_registry::{ConfigError, ConvertError};

/// Errors surfaced by [`Editor`](crate::Editor) operations.
#[derive(Debug, Error)]
pub enum EditorError {
	/// The extension set could not be assembled.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// The editor configuration file is not valid TOML for [`EditorConfig`](crate::EditorConfig).
	#[error("invalid editor configuration: {0}")]
	Toml(#[from] toml::de::Error),

	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// Initial content could not be decoded from JSON.
	#[error("invalid document JSON: {0}")]
	Json(#[from] serde_json::Error),

	/// A document does not conform to the assembled schema.
	#[error(transparent)]
	Schema(#[from] SchemaViolation),

	/// A converter failed, or none is registered for the format.
	#[error(transparent)]
	Convert(#[from] ConvertError),

	/// A transaction could not be applied to the current state.
	#[error(transparent)]
	Apply(#[from] ApplyError),

	#[error(transparent)]
	Step(#[from] StepError),
}
