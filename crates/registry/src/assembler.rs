//! Schema assembly from resolved node and mark extensions.

use tracing::debug;
use vellum_model::{DocumentSchema, SchemaBuilder};

use crate::error::ConfigError;
use crate::resolver::ResolvedExtensions;

/// Merges the node and mark types of `extensions` into one schema.
///
/// Types are declared in resolution order, which fixes the canonical mark
/// order. Each type records its contributing extension for diagnostics.
///
/// # Errors
///
/// Returns [`ConfigError::Schema`] when the merged types do not form a valid
/// schema.
pub fn assemble(extensions: &ResolvedExtensions) -> Result<DocumentSchema, ConfigError> {
	let mut builder = SchemaBuilder::new();
	for ext in extensions {
		if let Some(spec) = ext.node_spec() {
			builder.add_node(ext.name(), spec);
		}
		if let Some(spec) = ext.mark_spec() {
			builder.add_mark(ext.name(), spec);
		}
	}
	let schema = builder.build()?;
	debug!(
		root = schema.root(),
		nodes = ?schema.nodes().map(|n| n.name()).collect::<Vec<_>>(),
		marks = ?schema.marks().map(|m| m.name()).collect::<Vec<_>>(),
		"assembled schema"
	);
	Ok(schema)
}
