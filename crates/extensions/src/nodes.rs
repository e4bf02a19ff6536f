//! Node extensions.

use serde_json::{Value, json};
use vellum_editor::commands::{insert_node, set_block_type, toggle_wrap};
use vellum_editor::input_rules::{textblock_type_rule, wrapping_rule};
use vellum_keymap::Platform;
use vellum_model::{AttrSpec, Attrs, NodeSpec};
use vellum_primitives::{constant, factory};
use vellum_registry::{CommandMap, ExtensionConfig, ExtensionDescriptor, ResolvedType};


/// Heading levels available when the `levels` option is unset.
pub const MAX_HEADING_LEVEL: usize = 6;

/// Name of the node type an extension hook was invoked for.
fn node_name<'a>(ty: Option<ResolvedType<'a>>, fallback: &'a str) -> String {
	match ty {
		Some(ResolvedType::Node(node)) => node.name().to_string(),
		_ => fallback.to_string(),
	}
}

fn bind(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
	pairs.iter().map(|(chord, cmd)| (chord.to_string(), cmd.to_string())).collect()
}

fn level_attrs(level: usize) -> Attrs {
	Attrs::from([("level".to_string(), json!(level))])
}

fn heading_levels(config: &ExtensionConfig) -> usize {
	config.usize("levels").unwrap_or(MAX_HEADING_LEVEL).clamp(1, MAX_HEADING_LEVEL)
}

fn valid_level(value: &Value) -> bool {
	value.as_u64().is_some_and(|level| (1..=MAX_HEADING_LEVEL as u64).contains(&level))
}

/// The root node: one or more blocks.
pub fn doc() -> ExtensionDescriptor {
	ExtensionDescriptor::node("doc", |_| NodeSpec::new("doc").content("block+"))
}

pub fn text() -> ExtensionDescriptor {
	ExtensionDescriptor::node("text", |_| NodeSpec::new("text").group("inline"))
}

/// `setParagraph` on `Shift-Ctrl-0`.
pub fn paragraph() -> ExtensionDescriptor {
	ExtensionDescriptor::node("paragraph", |_| NodeSpec::new("paragraph").content("inline*").group("block"))
		.requires("doc")
		.commands(|ctx, ty| {
			let kind = node_name(ty, ctx.name);
			let mut map = CommandMap::new();
			map.insert("setParagraph".into(), constant(set_block_type(kind, Attrs::new())));
			map
		})
		.keys(|_| bind(&[("Shift-Ctrl-0", "setParagraph")]))
}

/// Headings with a `level` attribute.
///
/// The `levels` option caps how many levels get a `setHeadingN` command, a
/// `Shift-Ctrl-N` binding and a `#` input rule. `setHeading` takes the level
/// as its first argument.
pub fn heading() -> ExtensionDescriptor {
	ExtensionDescriptor::node("heading", |_| {
		NodeSpec::new("heading")
			.content("inline*")
			.group("block")
			.defining()
			.attr("level", AttrSpec::with_default(1).validated(valid_level))
	})
	.requires("doc")
	.option("levels", MAX_HEADING_LEVEL)
	.commands(|ctx, ty| {
		let kind = node_name(ty, ctx.name);
		let levels = heading_levels(ctx.config);
		let mut map = CommandMap::new();
		for level in 1..=levels {
			map.insert(format!("setHeading{level}"), constant(set_block_type(kind.clone(), level_attrs(level))));
		}
		map.insert(
			"setHeading".into(),
			factory(move |args| {
				let level = args.usize(0).unwrap_or(1).clamp(1, levels);
				set_block_type(kind.clone(), level_attrs(level))
			}),
		);
		map
	})
	.keys(|ctx| {
		(1..=heading_levels(ctx.config))
			.map(|level| (format!("Shift-Ctrl-{level}"), format!("setHeading{level}")))
			.collect()
	})
	.input_rules(|ctx| {
		let pattern = format!(r"^(#{{1,{}}})\s$", heading_levels(ctx.config));
		Ok(vec![textblock_type_rule("heading", &pattern, ctx.name, |caps| {
			level_attrs(caps.get(1).map_or(1, |m| m.as_str().len()))
		})?])
	})
}

/// `toggleBlockquote` on `Ctrl->`; a leading `> ` wraps the block.
pub fn blockquote() -> ExtensionDescriptor {
	ExtensionDescriptor::node("blockquote", |_| {
		NodeSpec::new("blockquote").content("block+").group("block").defining()
	})
	.requires("doc")
	.commands(|ctx, ty| {
		let kind = node_name(ty, ctx.name);
		let mut map = CommandMap::new();
		map.insert("toggleBlockquote".into(), constant(toggle_wrap(kind, Attrs::new())));
		map
	})
	.keys(|_| bind(&[("Ctrl->", "toggleBlockquote")]))
	.input_rules(|ctx| Ok(vec![wrapping_rule("blockquote", r"^\s*>\s$", ctx.name, |_| Attrs::new())?]))
}

/// Preformatted text with an optional `language`. Marks are not allowed.
///
/// `setCodeBlock` takes the language as its first argument. Typing three
/// backticks at the start of a block turns it into a code block.
pub fn code_block() -> ExtensionDescriptor {
	ExtensionDescriptor::node("code_block", |_| {
		NodeSpec::new("code_block")
			.content("text*")
			.group("block")
			.code()
			.defining()
			.marks("")
			.attr("language", AttrSpec::with_default(Value::Null))
	})
	.requires("doc")
	.requires("text")
	.commands(|ctx, ty| {
		let kind = node_name(ty, ctx.name);
		let mut map = CommandMap::new();
		map.insert(
			"setCodeBlock".into(),
			factory(move |args| {
				let language = args.str(0).map_or(Value::Null, Value::from);
				set_block_type(kind.clone(), Attrs::from([("language".to_string(), language)]))
			}),
		);
		map
	})
	.keys(|_| bind(&[("Shift-Ctrl-\\", "setCodeBlock")]))
	.input_rules(|ctx| Ok(vec![textblock_type_rule("code_block", "^```$", ctx.name, |_| Attrs::new())?]))
}

/// `setHorizontalRule` on `Mod-_`.
pub fn horizontal_rule() -> ExtensionDescriptor {
	ExtensionDescriptor::node("horizontal_rule", |_| NodeSpec::new("horizontal_rule").group("block"))
		.requires("doc")
		.commands(|ctx, ty| {
			let kind = node_name(ty, ctx.name);
			let mut map = CommandMap::new();
			map.insert("setHorizontalRule".into(), constant(insert_node(kind, Attrs::new())));
			map
		})
		.keys(|_| bind(&[("Mod-_", "setHorizontalRule")]))
}

/// `setHardBreak` on `Ctrl-Enter`, plus `Mod-Enter` and `Shift-Enter` on mac.
pub fn hard_break() -> ExtensionDescriptor {
	ExtensionDescriptor::node("hard_break", |_| NodeSpec::new("hard_break").group("inline").inline())
		.requires("doc")
		.commands(|ctx, ty| {
			let kind = node_name(ty, ctx.name);
			let mut map = CommandMap::new();
			map.insert("setHardBreak".into(), constant(insert_node(kind, Attrs::new())));
			map
		})
		.keys(|ctx| {
			let mut keys = bind(&[("Ctrl-Enter", "setHardBreak")]);
			if ctx.platform == Platform::Mac {
				keys.extend(bind(&[("Mod-Enter", "setHardBreak"), ("Shift-Enter", "setHardBreak")]));
			}
			keys
		})
}
