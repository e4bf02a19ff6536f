use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque per-extension options.
///
/// The core never interprets these; an extension reads its own options in its
/// capability hooks with the typed getters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtensionConfig(Map<String, Value>);

impl ExtensionConfig {
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets `key`, replacing any previous value.
	pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
		self.0.insert(key.into(), value.into());
		self
	}

	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	pub fn usize(&self, key: &str) -> Option<usize> {
		self.get(key)?.as_u64().and_then(|v| usize::try_from(v).ok())
	}

	pub fn str(&self, key: &str) -> Option<&str> {
		self.get(key)?.as_str()
	}

	pub fn bool(&self, key: &str) -> Option<bool> {
		self.get(key)?.as_bool()
	}

	/// Deserializes `key` into `T`, returning `None` if it is absent or has
	/// the wrong shape.
	pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
		serde_json::from_value(self.get(key)?.clone()).ok()
	}

	/// Overlays `other` on top of this config.
	pub fn merge(&mut self, other: &ExtensionConfig) {
		for (key, value) in &other.0 {
			self.0.insert(key.clone(), value.clone());
		}
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl From<Map<String, Value>> for ExtensionConfig {
	fn from(map: Map<String, Value>) -> Self {
		Self(map)
	}
}
