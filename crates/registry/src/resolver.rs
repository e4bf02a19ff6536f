//! Extension resolution.
//!
//! Turns a declared, possibly overlapping list of extensions into an
//! ordered, duplicate-free, dependency-closed set in which every extension
//! appears after everything it requires.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::config::ExtensionConfig;
use crate::descriptor::ExtensionDescriptor;
use crate::error::ConfigError;

#[cfg(test)]
mod tests;

/// The ordered result of [`resolve`].
#[derive(Debug, Clone, Default)]
pub struct ResolvedExtensions {
	ordered: Vec<ExtensionDescriptor>,
}

impl ResolvedExtensions {
	pub fn iter(&self) -> std::slice::Iter<'_, ExtensionDescriptor> {
		self.ordered.iter()
	}

	pub fn names(&self) -> Vec<&str> {
		self.ordered.iter().map(ExtensionDescriptor::name).collect()
	}

	pub fn get(&self, name: &str) -> Option<&ExtensionDescriptor> {
		self.ordered.iter().find(|ext| ext.name() == name)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.get(name).is_some()
	}

	pub fn len(&self) -> usize {
		self.ordered.len()
	}

	pub fn is_empty(&self) -> bool {
		self.ordered.is_empty()
	}
}

impl<'a> IntoIterator for &'a ResolvedExtensions {
	type Item = &'a ExtensionDescriptor;
	type IntoIter = std::slice::Iter<'a, ExtensionDescriptor>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
	InProgress,
	Done,
}

/// Resolves `extensions` into dependency order.
///
/// The pool is built by walking the input and bundled children depth-first;
/// the first occurrence of a name wins and keeps its options. Each pool
/// entry is then visited in pool order, its requirements and bundles first.
///
/// # Errors
///
/// Returns [`ConfigError::MissingDependency`] for a requirement absent from
/// the pool, [`ConfigError::CircularDependency`] for a requirement cycle, and
/// [`ConfigError::Conflict`] when a declared conflict is part of the result.
pub fn resolve(extensions: &[ExtensionDescriptor]) -> Result<ResolvedExtensions, ConfigError> {
	resolve_with(extensions, &IndexMap::new())
}

/// Like [`resolve`], overlaying `overrides[name]` on the options of the
/// extension called `name`.
///
/// # Errors
///
/// As [`resolve`].
pub fn resolve_with(
	extensions: &[ExtensionDescriptor],
	overrides: &IndexMap<String, ExtensionConfig>,
) -> Result<ResolvedExtensions, ConfigError> {
	let mut pool: IndexMap<&str, &ExtensionDescriptor> = IndexMap::new();
	for ext in extensions {
		collect_pool(ext, &mut pool);
	}

	let mut walk = Walk {
		pool: &pool,
		overrides,
		marks: FxHashMap::default(),
		path: Vec::new(),
		ordered: Vec::with_capacity(pool.len()),
	};
	for name in pool.keys() {
		walk.visit(name, None)?;
	}

	let ordered = walk.ordered;
	for ext in &ordered {
		if let Some(other) = ext.conflicting().iter().find(|name| ordered.iter().any(|o| o.name() == name.as_str())) {
			return Err(ConfigError::Conflict {
				extension: ext.name().to_string(),
				conflicts_with: other.clone(),
			});
		}
	}

	let resolved = ResolvedExtensions { ordered };
	debug!(count = resolved.len(), order = ?resolved.names(), "resolved extensions");
	Ok(resolved)
}

fn collect_pool<'a>(ext: &'a ExtensionDescriptor, pool: &mut IndexMap<&'a str, &'a ExtensionDescriptor>) {
	if pool.contains_key(ext.name()) {
		return;
	}
	pool.insert(ext.name(), ext);
	for child in ext.bundled() {
		collect_pool(child, pool);
	}
}

struct Walk<'p, 'a> {
	pool: &'p IndexMap<&'a str, &'a ExtensionDescriptor>,
	overrides: &'p IndexMap<String, ExtensionConfig>,
	marks: FxHashMap<&'a str, Mark>,
	path: Vec<&'a str>,
	ordered: Vec<ExtensionDescriptor>,
}

impl<'a> Walk<'_, 'a> {
	fn visit(&mut self, name: &str, required_by: Option<&str>) -> Result<(), ConfigError> {
		let Some((&name, &ext)) = self.pool.get_key_value(name) else {
			return Err(ConfigError::MissingDependency {
				extension: required_by.unwrap_or_default().to_string(),
				required: name.to_string(),
			});
		};
		match self.marks.get(name) {
			Some(Mark::Done) => return Ok(()),
			Some(Mark::InProgress) => {
				let start = self.path.iter().position(|n| *n == name).unwrap_or(0);
				let mut cycle: Vec<String> = self.path[start..].iter().map(|n| n.to_string()).collect();
				cycle.push(name.to_string());
				return Err(ConfigError::CircularDependency { cycle });
			}
			None => {}
		}

		self.marks.insert(name, Mark::InProgress);
		self.path.push(name);
		for dep in ext.dependencies() {
			self.visit(dep, Some(name))?;
		}
		self.path.pop();
		self.marks.insert(name, Mark::Done);
		let resolved = match self.overrides.get(name) {
			Some(config) => ext.clone().configure(config),
			None => ext.clone(),
		};
		self.ordered.push(resolved);
		Ok(())
	}
}
