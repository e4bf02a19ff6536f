use serde::{Deserialize, Serialize};

use crate::attrs::{Attrs, Value};

/// A styling mark attached to an inline node (emphasis, strong, links, ...).
///
/// Marks are plain values. Set semantics (ordering, exclusion) depend on the
/// schema and live on [`DocumentSchema`](crate::DocumentSchema).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
	/// Name of the mark type.
	#[serde(rename = "type")]
	pub kind: String,
	/// Attribute values.
	#[serde(default, skip_serializing_if = "Attrs::is_empty")]
	pub attrs: Attrs,
}

impl Mark {
	/// Creates a mark without attributes.
	pub fn new(kind: impl Into<String>) -> Self {
		Self {
			kind: kind.into(),
			attrs: Attrs::new(),
		}
	}

	/// Returns the mark with an additional attribute.
	pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.attrs.insert(name.into(), value.into());
		self
	}

	/// Returns true if a mark of the same type is present in `set`.
	pub fn type_in_set(&self, set: &[Mark]) -> bool {
		set.iter().any(|m| m.kind == self.kind)
	}

	/// Returns true if this exact mark (type and attributes) is present in `set`.
	pub fn is_in_set(&self, set: &[Mark]) -> bool {
		set.iter().any(|m| m == self)
	}

	/// Compares two mark sets by content, ignoring nothing.
	///
	/// Sets produced by the schema are kept in rank order, so plain equality
	/// is enough.
	pub fn same_set(a: &[Mark], b: &[Mark]) -> bool {
		a == b
	}
}
