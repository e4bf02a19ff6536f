use super::*;

#[test]
fn test_builder_records_capabilities() {
	let kit = ExtensionDescriptor::behavior("kit")
		.requires("history")
		.conflicts("legacy")
		.bundle(ExtensionDescriptor::node("doc", |_| NodeSpec::new("doc").content("block+")))
		.option("depth", 3);

	assert_eq!(kit.name(), "kit");
	assert_eq!(kit.category(), Category::Behavior);
	assert_eq!(kit.conflicting(), ["legacy".to_string()]);
	assert_eq!(kit.dependencies().collect::<Vec<_>>(), vec!["history", "doc"]);
	assert_eq!(kit.config().usize("depth"), Some(3));
	assert!(kit.node_spec().is_none());
	assert_eq!(kit.bundled()[0].category(), Category::Node);
}

#[test]
fn test_type_hooks_see_config() {
	let heading = ExtensionDescriptor::node("heading", |config| {
		let levels = config.usize("levels").unwrap_or(6);
		NodeSpec::new("heading").content("inline*").group(if levels > 3 { "block" } else { "small" })
	})
	.option("levels", 2);
	assert_eq!(heading.node_spec().map(|spec| spec.groups), Some(vec!["small".to_string()]));

	let em = ExtensionDescriptor::mark("em", |_| MarkSpec::new("em"));
	assert_eq!(em.category(), Category::Mark);
	assert_eq!(em.mark_spec().map(|spec| spec.name), Some("em".to_string()));
}

#[test]
fn test_configure_overlays_options() {
	let mut overrides = ExtensionConfig::new();
	overrides.set("depth", 10).set("enabled", true);
	let history = ExtensionDescriptor::behavior("history")
		.option("depth", 100)
		.option("group", "typing")
		.configure(&overrides);
	assert_eq!(history.config().usize("depth"), Some(10));
	assert_eq!(history.config().str("group"), Some("typing"));
	assert_eq!(history.config().bool("enabled"), Some(true));
}
