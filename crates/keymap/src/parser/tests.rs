use proptest::prelude::*;

use super::*;

fn other(s: &str) -> Chord {
	parse(s, Platform::Other).unwrap()
}

#[test]
fn test_parse_plain_keys() {
	assert_eq!(other("a"), Chord::plain(Key::Char('a')));
	assert_eq!(other("A"), Chord::plain(Key::Char('a')));
	assert_eq!(other("-"), Chord::plain(Key::Char('-')));
	assert_eq!(other("`"), Chord::plain(Key::Char('`')));
	assert_eq!(other(" "), Chord::plain(Key::Named(NamedKey::Space)));
	assert_eq!(other("Backspace"), Chord::plain(Key::Named(NamedKey::Backspace)));
	assert_eq!(other("enter"), Chord::plain(Key::Named(NamedKey::Enter)));
	assert_eq!(other("F12"), Chord::plain(Key::F(12)));
}

#[test]
fn test_parse_modifiers() {
	assert_eq!(other("Ctrl-b"), Chord::new(Modifiers::CTRL, Key::Char('b')));
	assert_eq!(other("c-b"), Chord::new(Modifiers::CTRL, Key::Char('b')));
	assert_eq!(
		other("Shift-Ctrl-0"),
		Chord::new(Modifiers::CTRL | Modifiers::SHIFT, Key::Char('0'))
	);
	assert_eq!(other("Mod--"), Chord::new(Modifiers::CTRL, Key::Char('-')));
	assert_eq!(other("a-s"), Chord::new(Modifiers::ALT, Key::Char('s')));
	assert_eq!(
		other("Alt-ArrowUp"),
		Chord::new(Modifiers::ALT, Key::Named(NamedKey::ArrowUp))
	);
}

#[test]
fn test_mod_depends_on_platform() {
	assert_eq!(other("Mod-z"), Chord::new(Modifiers::CTRL, Key::Char('z')));
	assert_eq!(
		parse("Mod-z", Platform::Mac).unwrap(),
		Chord::new(Modifiers::META, Key::Char('z'))
	);
}

#[test]
fn test_canonical_display() {
	assert_eq!(normalize("Shift-Mod-z", Platform::Other).unwrap(), "Ctrl-Shift-z");
	assert_eq!(normalize("Mod-Shift-z", Platform::Mac).unwrap(), "Meta-Shift-z");
	assert_eq!(normalize("shift-alt-cmd-ctrl-F3", Platform::Other).unwrap(), "Alt-Ctrl-Meta-Shift-F3");
	assert_eq!(normalize("Mod-`", Platform::Other).unwrap(), "Ctrl-`");
	assert_eq!(other("Shift-Mod-z"), other("Ctrl-Shift-z"));
}

#[test]
fn test_errors() {
	let err = parse("Ctrl-Ctrl-a", Platform::Other).unwrap_err();
	assert_eq!(err.position, 5);
	assert_eq!(err.message, "duplicate modifier");

	let err = parse("Ctrl-Bogus", Platform::Other).unwrap_err();
	assert_eq!(err.position, 5);
	assert_eq!(err.message, "unknown key 'Bogus'");

	assert!(parse("", Platform::Other).is_err());
	assert!(parse("F25", Platform::Other).is_err());
	assert!(parse("Ctrl-", Platform::Other).is_err());
	assert!(parse("ab c", Platform::Other).is_err());
}

fn modifier_names() -> impl Strategy<Value = Vec<&'static str>> {
	proptest::sample::subsequence(vec!["Alt", "Ctrl", "Meta", "Shift"], 0..=4).prop_shuffle()
}

proptest! {
	#[test]
	fn prop_modifier_order_is_irrelevant(names in modifier_names(), key in "[a-z0-9]") {
		let mut text = names.join("-");
		if !text.is_empty() {
			text.push('-');
		}
		text.push_str(&key);

		let chord = parse(&text, Platform::Other).unwrap();
		let canonical = chord.to_string();
		prop_assert_eq!(parse(&canonical, Platform::Other).unwrap(), chord);
		prop_assert!(canonical.ends_with(&key));
	}
}
