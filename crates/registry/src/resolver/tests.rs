use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;

fn ext(name: &str) -> ExtensionDescriptor {
	ExtensionDescriptor::behavior(name)
}

#[test]
fn test_duplicates_collapse_to_first_occurrence() {
	let a = ext("a").option("which", "first");
	let b = ext("b").requires("a");
	let again = ext("a").option("which", "second");
	let resolved = resolve(&[a, b, again]).unwrap();
	assert_eq!(resolved.names(), vec!["a", "b"]);
	assert_eq!(resolved.get("a").and_then(|a| a.config().str("which")), Some("first"));
}

#[test]
fn test_dependencies_precede_dependents() {
	let resolved = resolve(&[ext("c").requires("b"), ext("b").requires("a"), ext("a")]).unwrap();
	assert_eq!(resolved.names(), vec!["a", "b", "c"]);
}

#[test]
fn test_bundles_join_pool_and_come_first() {
	let kit = ext("kit").bundle(ext("x").requires("y")).bundle(ext("y"));
	let resolved = resolve(&[ext("user").requires("x"), kit]).unwrap();
	assert_eq!(resolved.names(), vec!["y", "x", "user", "kit"]);
}

#[test]
fn test_missing_dependency() {
	let err = resolve(&[ext("b").requires("a")]).unwrap_err();
	match err {
		ConfigError::MissingDependency { extension, required } => {
			assert_eq!(extension, "b");
			assert_eq!(required, "a");
		}
		other => panic!("unexpected error: {other:?}"),
	}
}

#[test]
fn test_circular_dependency_names_cycle() {
	let err = resolve(&[ext("a").requires("b"), ext("b").requires("c"), ext("c").requires("a")]).unwrap_err();
	match err {
		ConfigError::CircularDependency { cycle } => {
			assert_eq!(cycle, vec!["a", "b", "c", "a"]);
		}
		other => panic!("unexpected error: {other:?}"),
	}
	assert!(matches!(
		resolve(&[ext("self").requires("self")]),
		Err(ConfigError::CircularDependency { .. })
	));
}

#[test]
fn test_conflicts() {
	let err = resolve(&[ext("a").conflicts("b"), ext("b")]).unwrap_err();
	assert!(matches!(err, ConfigError::Conflict { ref extension, ref conflicts_with } if extension == "a" && conflicts_with == "b"));
	assert!(resolve(&[ext("a").conflicts("b")]).is_ok());
}

#[test]
fn test_overrides_overlay_declared_options() {
	let mut history = ExtensionConfig::new();
	history.set("depth", 5);
	let overrides = IndexMap::from([("history".to_string(), history)]);
	let resolved = resolve_with(&[ext("history").option("depth", 100).option("group", 500)], &overrides).unwrap();
	let config = resolved.get("history").map(ExtensionDescriptor::config).cloned().unwrap_or_default();
	assert_eq!(config.usize("depth"), Some(5));
	assert_eq!(config.usize("group"), Some(500));
}

/// Builds an acyclic set where extension `i` may only require extensions `< i`.
fn acyclic_set() -> impl Strategy<Value = Vec<(usize, Vec<usize>)>> {
	(1usize..8)
		.prop_flat_map(|n| {
			proptest::collection::vec(proptest::collection::vec(any::<prop::sample::Index>(), 0..3), n)
		})
		.prop_map(|deps| {
			deps.into_iter()
				.enumerate()
				.map(|(i, picks)| {
					let required = if i == 0 {
						Vec::new()
					} else {
						picks.iter().map(|pick| pick.index(i)).collect()
					};
					(i, required)
				})
				.collect()
		})
}

fn build(set: &[(usize, Vec<usize>)]) -> Vec<ExtensionDescriptor> {
	set.iter()
		.rev()
		.map(|(i, deps)| {
			deps.iter()
				.fold(ext(&format!("e{i}")), |d, dep| d.requires(format!("e{dep}")))
		})
		.collect()
}

proptest! {
	#[test]
	fn prop_resolution_is_deterministic_and_ordered(set in acyclic_set()) {
		let input = build(&set);
		let first = resolve(&input).unwrap();
		let second = resolve(&input).unwrap();
		prop_assert_eq!(first.names(), second.names());
		prop_assert_eq!(first.len(), set.len());

		let names = first.names();
		for ext in &first {
			let at = names.iter().position(|n| *n == ext.name()).unwrap();
			for dep in ext.required() {
				let dep_at = names.iter().position(|n| *n == dep.as_str()).unwrap();
				prop_assert!(dep_at < at);
			}
		}
	}
}
