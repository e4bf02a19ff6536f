//! Mark extensions: a toggle command, a key binding and markdown-style
//! delimiter rules for each mark.

use vellum_editor::commands::toggle_mark;
use vellum_editor::input_rules::mark_rule;
use vellum_model::{Attrs, MarkSpec};
use vellum_primitives::constant;
use vellum_registry::{CommandMap, ExtensionDescriptor, ResolvedType};


struct MarkKit {
	name: &'static str,
	command: &'static str,
	chord: &'static str,
	/// Delimiter rules as `(rule name, pattern)`. Group 1 is the delimited
	/// token, group 2 the text inside it.
	rules: &'static [(&'static str, &'static str)],
}

fn mark_extension(kit: MarkKit, spec: fn(MarkSpec) -> MarkSpec) -> ExtensionDescriptor {
	let MarkKit {
		name,
		command,
		chord,
		rules,
	} = kit;
	ExtensionDescriptor::mark(name, move |_| spec(MarkSpec::new(name)))
		.requires("doc")
		.commands(move |ctx, ty| {
			let kind = match ty {
				Some(ResolvedType::Mark(mark)) => mark.name().to_string(),
				_ => ctx.name.to_string(),
			};
			let mut map = CommandMap::new();
			map.insert(command.into(), constant(toggle_mark(kind, Attrs::new())));
			map
		})
		.keys(move |_| vec![(chord.to_string(), command.to_string())])
		.input_rules(move |ctx| {
			rules
				.iter()
				.map(|(rule, pattern)| mark_rule(*rule, pattern, ctx.name))
				.collect()
		})
}

/// Emphasis. `toggleItalic` on `Mod-i`, `*text*` and `_text_`.
pub fn em() -> ExtensionDescriptor {
	mark_extension(
		MarkKit {
			name: "em",
			command: "toggleItalic",
			chord: "Mod-i",
			rules: &[
				("em_star", r"(?:^|\s)(\*([^*\s][^*]*)\*)$"),
				("em_underscore", r"(?:^|\s)(_([^_\s][^_]*)_)$"),
			],
		},
		|spec| spec,
	)
}

/// Strong emphasis. `toggleStrong` on `Mod-b`, `**text**` and `__text__`.
pub fn strong() -> ExtensionDescriptor {
	mark_extension(
		MarkKit {
			name: "strong",
			command: "toggleStrong",
			chord: "Mod-b",
			rules: &[
				("strong_star", r"(?:^|\s)(\*\*([^*]+)\*\*)$"),
				("strong_underscore", r"(?:^|\s)(__([^_]+)__)$"),
			],
		},
		|spec| spec,
	)
}

/// Inline code. `toggleCode` on ``Mod-` ``, `` `text` ``. Excludes every
/// other mark.
pub fn code() -> ExtensionDescriptor {
	mark_extension(
		MarkKit {
			name: "code",
			command: "toggleCode",
			chord: "Mod-`",
			rules: &[("code", r"(?:^|\s)(`([^`]+)`)$")],
		},
		|spec| spec.excludes("_"),
	)
}

/// Strikethrough. `toggleStrike` on `Mod-s`, `~~text~~`.
pub fn strike() -> ExtensionDescriptor {
	mark_extension(
		MarkKit {
			name: "strike",
			command: "toggleStrike",
			chord: "Mod-s",
			rules: &[("strike", r"(?:^|\s)(~~([^~]+)~~)$")],
		},
		|spec| spec,
	)
}
