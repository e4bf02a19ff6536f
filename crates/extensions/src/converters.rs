//! Document converters for `application/json` and `text/plain`.

use std::sync::Arc;

use vellum_model::{Attrs, DocumentSchema, Node};
use vellum_registry::{ConvertError, Converter, ExtensionDescriptor};

#[cfg(test)]
mod tests;

pub const JSON_MIME: &str = "application/json";
pub const TEXT_MIME: &str = "text/plain";

/// The document tree as JSON, in the same shape as `Editor::to_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonConverter {
	/// Indents saved documents.
	pub pretty: bool,
}

impl JsonConverter {
	fn json_error(source: serde_json::Error) -> ConvertError {
		ConvertError::Json {
			mime: JSON_MIME.to_string(),
			source,
		}
	}
}

impl Converter for JsonConverter {
	fn mime(&self) -> &str {
		JSON_MIME
	}

	fn to_doc(&self, bytes: &[u8], schema: &DocumentSchema) -> Result<Node, ConvertError> {
		let doc: Node = serde_json::from_slice(bytes).map_err(Self::json_error)?;
		Ok(schema.prepare(doc)?)
	}

	fn from_doc(&self, doc: &Node, _schema: &DocumentSchema) -> Result<Vec<u8>, ConvertError> {
		let bytes = if self.pretty {
			serde_json::to_vec_pretty(doc)
		} else {
			serde_json::to_vec(doc)
		};
		bytes.map_err(Self::json_error)
	}
}

/// One paragraph per line.
///
/// Loading splits on `\n` and drops a trailing `\r` from each line, so
/// trailing empty lines survive a load and save. Saving writes the text of every textblock on its own line. Hard breaks
/// become line breaks, so they load back as separate paragraphs.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextConverter;

impl PlainTextConverter {
	fn paragraph_type(schema: &DocumentSchema) -> Result<&str, ConvertError> {
		schema
			.node_type("paragraph")
			.map(|ty| ty.name())
			.ok_or_else(|| ConvertError::Unsupported {
				mime: TEXT_MIME.to_string(),
				message: "schema has no paragraph node".to_string(),
			})
	}
}

impl Converter for PlainTextConverter {
	fn mime(&self) -> &str {
		TEXT_MIME
	}

	fn to_doc(&self, bytes: &[u8], schema: &DocumentSchema) -> Result<Node, ConvertError> {
		let text = std::str::from_utf8(bytes).map_err(|source| ConvertError::Encoding {
			mime: TEXT_MIME.to_string(),
			source,
		})?;
		if text.is_empty() {
			return Ok(schema.empty_document()?);
		}
		let paragraph = Self::paragraph_type(schema)?;
		let blocks = text
			.split('\n')
			.map(|line| line.strip_suffix('\r').unwrap_or(line))
			.map(|line| {
				let content = if line.is_empty() {
					Vec::new()
				} else {
					vec![schema.text(line, Vec::new())]
				};
				schema.create(paragraph, &Attrs::new(), content)
			})
			.collect::<Result<Vec<_>, _>>()?;
		Ok(schema.create(schema.root(), &Attrs::new(), blocks)?)
	}

	fn from_doc(&self, doc: &Node, schema: &DocumentSchema) -> Result<Vec<u8>, ConvertError> {
		let mut lines = Vec::new();
		doc.nodes_between(0, doc.content_size(), &mut |node, _, _, _| {
			if schema.is_textblock(node) {
				lines.push(node.text_between(0, node.content_size(), None, "\n"));
				return false;
			}
			true
		});
		Ok(lines.join("\n").into_bytes())
	}
}

/// Registers [`JsonConverter`]. The `pretty` option indents saved documents.
pub fn json() -> ExtensionDescriptor {
	ExtensionDescriptor::behavior("json").converters(|ctx| {
		let pretty = ctx.config.bool("pretty").unwrap_or(false);
		vec![Arc::new(JsonConverter { pretty }) as Arc<dyn Converter>]
	})
}

/// Registers [`PlainTextConverter`].
pub fn plain_text() -> ExtensionDescriptor {
	ExtensionDescriptor::behavior("plain_text").converters(|_| vec![Arc::new(PlainTextConverter) as Arc<dyn Converter>])
}
