//! Format converters between serialized bytes and documents.

use thiserror::Error;
use vellum_model::{DocumentSchema, Node, SchemaViolation};

/// A document could not be converted to or from a serialized format.
#[derive(Debug, Error)]
pub enum ConvertError {
	#[error("no converter registered for {0:?}")]
	UnknownMime(String),
	#[error("{mime} input is not valid UTF-8")]
	Encoding {
		mime: String,
		#[source]
		source: std::str::Utf8Error,
	},
	#[error("malformed {mime} input")]
	Json {
		mime: String,
		#[source]
		source: serde_json::Error,
	},
	#[error("converted document does not fit the schema")]
	Schema(#[from] SchemaViolation),
	#[error("{mime}: {message}")]
	Unsupported { mime: String, message: String },
}

/// Converts between one MIME type and documents of a schema.
pub trait Converter: Send + Sync {
	/// The MIME type this converter handles, e.g. `text/plain`.
	fn mime(&self) -> &str;

	/// Parses `bytes` into a document conforming to `schema`.
	fn to_doc(&self, bytes: &[u8], schema: &DocumentSchema) -> Result<Node, ConvertError>;

	/// Serializes `doc`.
	fn from_doc(&self, doc: &Node, schema: &DocumentSchema) -> Result<Vec<u8>, ConvertError>;
}
