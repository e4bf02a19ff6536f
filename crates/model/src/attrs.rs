use std::collections::BTreeMap;

pub use serde_json::Value;

/// Attribute map attached to a node or mark.
///
/// Ordered so that two structurally equal nodes always compare and serialize
/// identically.
pub type Attrs = BTreeMap<String, Value>;

/// Validator run against an attribute value when a node or mark is checked.
pub type AttrValidator = fn(&Value) -> bool;

/// Declaration of a single attribute on a node or mark type.
#[derive(Debug, Clone)]
pub struct AttrSpec {
	/// Value used when the attribute is omitted. `None` makes the attribute required.
	pub default: Option<Value>,
	/// Optional check applied to every supplied value.
	pub validate: Option<AttrValidator>,
}

impl AttrSpec {
	/// An attribute that must always be supplied.
	pub fn required() -> Self {
		Self {
			default: None,
			validate: None,
		}
	}

	/// An attribute that falls back to `value` when omitted.
	pub fn with_default(value: impl Into<Value>) -> Self {
		Self {
			default: Some(value.into()),
			validate: None,
		}
	}

	/// Attaches a validator.
	pub fn validated(mut self, validate: AttrValidator) -> Self {
		self.validate = Some(validate);
		self
	}

	/// Returns true if the attribute has no default.
	pub fn is_required(&self) -> bool {
		self.default.is_none()
	}
}
